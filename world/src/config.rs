//! Level-wide simulation parameters.

use actorsim_core::{Fixed, MapThingFlags, TICRATE};
use serde::{Deserialize, Serialize};

/// Level gravity that yields one map unit per tic squared.
const STANDARD_GRAVITY: f64 = 800.0;
/// Converts level gravity into fixed-point units per tic.
const GRAVITY_SCALE: f64 = 81.92;
/// Air control at or below this value leaves airborne momentum untouched.
const AIR_CONTROL_THRESHOLD: i32 = 256;

/// Difficulty setting of the running game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    /// Easiest difficulty.
    Baby,
    /// Easy difficulty.
    Easy,
    /// Medium difficulty.
    #[default]
    Medium,
    /// Hard difficulty.
    Hard,
    /// Hard difficulty with fast, respawning monsters.
    Nightmare,
}

impl Skill {
    /// Placement flag a thing must carry to appear on this skill.
    #[must_use]
    pub const fn spawn_filter(self) -> MapThingFlags {
        match self {
            Self::Baby | Self::Easy => MapThingFlags::EASY,
            Self::Medium => MapThingFlags::NORMAL,
            Self::Hard | Self::Nightmare => MapThingFlags::HARD,
        }
    }
}

/// Rules the game is played under.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// One player against the level.
    #[default]
    Single,
    /// Several players against the level.
    Cooperative,
    /// Players against each other.
    Deathmatch,
}

impl GameMode {
    /// Placement flag a thing must carry to appear in this mode.
    #[must_use]
    pub const fn spawn_filter(self) -> MapThingFlags {
        match self {
            Self::Single => MapThingFlags::SINGLE,
            Self::Cooperative => MapThingFlags::COOPERATIVE,
            Self::Deathmatch => MapThingFlags::DEATHMATCH,
        }
    }
}

/// Parameters that shape physics and respawn behavior for a level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Difficulty of the game.
    pub skill: Skill,
    /// Rules of the game.
    pub game_mode: GameMode,
    /// Level gravity; 800 is the standard pull.
    pub gravity: f64,
    /// Player control while airborne, in raw fixed-point units.
    pub air_control: Fixed,
    /// Ground friction applied when the geometry supplies none.
    pub friction: Fixed,
    /// Forces pickup respawning on or off; by default only deathmatch respawns pickups.
    pub items_respawn: Option<bool>,
    /// Makes dead monsters respawn regardless of skill.
    pub monsters_respawn: bool,
    /// Lets player missiles follow the free-look pitch.
    pub free_aim: bool,
    /// Tics per second of game time.
    pub tic_rate: u32,
    /// Seconds a consumed pickup stays away.
    pub item_respawn_seconds: u32,
    /// Seed of the deterministic random stream.
    pub seed: u64,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            skill: Skill::default(),
            game_mode: GameMode::default(),
            gravity: STANDARD_GRAVITY,
            air_control: Fixed::from_raw(AIR_CONTROL_THRESHOLD),
            friction: Fixed::from_raw(0xe800),
            items_respawn: None,
            monsters_respawn: false,
            free_aim: false,
            tic_rate: TICRATE,
            item_respawn_seconds: 30,
            seed: 0x5eed_0fac_7075,
        }
    }
}

impl LevelConfig {
    /// Downward acceleration applied each tic.
    #[must_use]
    pub fn gravity_per_tic(&self) -> Fixed {
        Fixed::from_raw((self.gravity * GRAVITY_SCALE) as i32)
    }

    /// Momentum multiplier applied to airborne players.
    #[must_use]
    pub fn air_friction(&self) -> Fixed {
        if self.air_control.raw() <= AIR_CONTROL_THRESHOLD {
            return Fixed::ONE;
        }
        Fixed::from_f64(self.air_control.to_f64() * -0.0941 + 1.0004)
    }

    /// Reports whether dead monsters come back.
    #[must_use]
    pub fn respawn_monsters(&self) -> bool {
        self.monsters_respawn || self.skill == Skill::Nightmare
    }

    /// Reports whether consumed pickups come back.
    #[must_use]
    pub fn respawn_items(&self) -> bool {
        self.items_respawn.unwrap_or(self.game_mode == GameMode::Deathmatch)
    }

    /// Tics a consumed pickup stays away.
    #[must_use]
    pub const fn item_respawn_tics(&self) -> u32 {
        self.item_respawn_seconds * self.tic_rate
    }

    /// Tics a corpse must lie still before it may respawn.
    #[must_use]
    pub const fn nightmare_respawn_tics(&self) -> i32 {
        12 * self.tic_rate as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_gravity_is_one_unit_per_tic() {
        assert_eq!(LevelConfig::default().gravity_per_tic(), Fixed::ONE);
    }

    #[test]
    fn low_air_control_keeps_momentum() {
        let config = LevelConfig::default();
        assert_eq!(config.air_friction(), Fixed::ONE);
    }

    #[test]
    fn high_air_control_bleeds_momentum() {
        let config = LevelConfig {
            air_control: Fixed::from_raw(1 << 15),
            ..LevelConfig::default()
        };
        let friction = config.air_friction();
        assert!(friction < Fixed::ONE);
        assert!(friction > Fixed::from_f64(0.95));
    }

    #[test]
    fn nightmare_forces_monster_respawn() {
        let config = LevelConfig {
            skill: Skill::Nightmare,
            ..LevelConfig::default()
        };
        assert!(config.respawn_monsters());
        assert!(!LevelConfig::default().respawn_monsters());
    }

    #[test]
    fn deathmatch_respawns_items_unless_overridden() {
        let mut config = LevelConfig {
            game_mode: GameMode::Deathmatch,
            ..LevelConfig::default()
        };
        assert!(config.respawn_items());
        config.items_respawn = Some(false);
        assert!(!config.respawn_items());
        assert_eq!(config.item_respawn_tics(), 30 * 35);
    }
}
