//! Level descriptions loaded from TOML.

use std::{fs, path::Path};

use actorsim_core::{Fixed, MapSpawnRecord, MapThingFlags, ThingId};
use actorsim_world::{LevelConfig, OpenArena};
use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Highest number of players a level can seat.
const MAX_PLAYERS: u8 = 4;

/// Everything needed to populate and run a level.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct Scenario {
    /// Rules the level runs under.
    pub(crate) level: LevelConfig,
    /// Room the actors live in.
    pub(crate) arena: ArenaSpec,
    /// Number of players spawned at their starts.
    pub(crate) players: u8,
    /// Placements, in the order they are realized.
    #[serde(rename = "thing")]
    pub(crate) things: Vec<ThingSpec>,
}

impl Default for Scenario {
    fn default() -> Self {
        let things = [
            (1, -256, 0, 0),
            (2, -256, 128, 0),
            (11, 0, -384, 90),
            (3001, 320, 0, 180),
            (3001, 320, 160, 180),
            (3001, 320, -160, 180),
            (3005, 480, 320, 225),
            (3006, 200, -300, 135),
            (2012, -64, 64, 0),
            (2013, 0, 400, 0),
        ]
        .into_iter()
        .map(|(kind, x, y, angle)| ThingSpec {
            kind,
            x,
            y,
            angle,
            ..ThingSpec::default()
        })
        .collect();

        Self {
            level: LevelConfig::default(),
            arena: ArenaSpec::default(),
            players: 1,
            things,
        }
    }
}

impl Scenario {
    /// Loads a scenario from the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let scenario: Self =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;
        if scenario.players > MAX_PLAYERS {
            bail!(
                "scenario seats {} players; at most {MAX_PLAYERS} are supported",
                scenario.players
            );
        }
        if scenario.arena.ceiling <= scenario.arena.floor {
            bail!(
                "arena ceiling {} must be above its floor {}",
                scenario.arena.ceiling,
                scenario.arena.floor
            );
        }
        Ok(scenario)
    }

    /// Placement records for every thing, in order.
    pub(crate) fn placements(&self) -> impl Iterator<Item = MapSpawnRecord> + '_ {
        self.things.iter().map(ThingSpec::record)
    }
}

/// Dimensions and surface properties of the room.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct ArenaSpec {
    half_extent: i32,
    floor: i32,
    ceiling: i32,
    sky: bool,
    water_depth: Option<i32>,
    friction: Option<f64>,
}

impl Default for ArenaSpec {
    fn default() -> Self {
        Self {
            half_extent: 1024,
            floor: 0,
            ceiling: 256,
            sky: false,
            water_depth: None,
            friction: None,
        }
    }
}

impl ArenaSpec {
    pub(crate) fn build(&self) -> OpenArena {
        let mut arena = OpenArena::new(self.half_extent, self.floor, self.ceiling);
        if self.sky {
            arena = arena.with_sky();
        }
        if let Some(depth) = self.water_depth {
            arena = arena.with_water(depth);
        }
        if let Some(friction) = self.friction {
            arena = arena.with_friction(Fixed::from_f64(friction));
        }
        arena
    }
}

/// One placement as written in a scenario file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ThingSpec {
    kind: u16,
    x: i16,
    y: i16,
    z: i16,
    angle: i16,
    tid: u16,
    ambush: bool,
    dormant: bool,
    /// Restricts the placement to skills and modes; present everywhere when
    /// omitted.
    only: Option<Vec<String>>,
}

impl ThingSpec {
    fn record(&self) -> MapSpawnRecord {
        let mut flags = match &self.only {
            None => MapThingFlags::all() - MapThingFlags::AMBUSH - MapThingFlags::DORMANT,
            Some(names) => names
                .iter()
                .filter_map(|name| MapThingFlags::from_name(&name.to_ascii_uppercase()))
                .collect(),
        };
        flags.set(MapThingFlags::AMBUSH, self.ambush);
        flags.set(MapThingFlags::DORMANT, self.dormant);

        MapSpawnRecord {
            x: self.x,
            y: self.y,
            z: self.z,
            angle: self.angle,
            kind: self.kind,
            flags,
            tid: ThingId::new(self.tid),
            ..MapSpawnRecord::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use actorsim_world::{GameMode, Skill};

    use super::*;

    #[test]
    fn parses_level_arena_and_things() {
        let scenario = Scenario::parse(
            r#"
            players = 2

            [level]
            skill = "nightmare"
            game_mode = "deathmatch"
            seed = 7

            [arena]
            half_extent = 512
            sky = true

            [[thing]]
            kind = 3001
            x = 64
            y = -32
            angle = 90
            tid = 5
            ambush = true

            [[thing]]
            kind = 2012
            only = ["normal", "deathmatch"]
            "#,
        )
        .expect("valid scenario");

        assert_eq!(scenario.players, 2);
        assert_eq!(scenario.level.skill, Skill::Nightmare);
        assert_eq!(scenario.level.game_mode, GameMode::Deathmatch);
        assert_eq!(scenario.level.seed, 7);
        assert!(scenario.arena.sky);

        let records: Vec<MapSpawnRecord> = scenario.placements().collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tid, ThingId::new(5));
        assert!(records[0].flags.contains(MapThingFlags::AMBUSH | MapThingFlags::SINGLE));
        assert_eq!(
            records[1].flags,
            MapThingFlags::NORMAL | MapThingFlags::DEATHMATCH
        );
    }

    #[test]
    fn rejects_too_many_players() {
        let error = Scenario::parse("players = 9").expect_err("too many players");
        assert!(error.to_string().contains("at most 4"));
    }

    #[test]
    fn rejects_inverted_arena() {
        assert!(Scenario::parse("[arena]\nfloor = 64\nceiling = 0").is_err());
    }

    #[test]
    fn built_in_level_has_starts_for_its_players() {
        let scenario = Scenario::default();
        let starts = scenario
            .placements()
            .filter(|record| (1..=4).contains(&record.kind))
            .count();
        assert!(starts >= usize::from(scenario.players));
    }
}
