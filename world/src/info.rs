//! Static sprite, state, and actor type tables.

use std::{collections::HashMap, fmt};

use actorsim_core::{ActorFlags, ActorId, Fixed, MobjType, SpriteNum, StateNum};

use crate::{
    states::{a_fall, a_pain, a_scream},
    Sim, SimError,
};

/// Behavior callback bound to a state.
pub type ActionFn = fn(&mut Sim<'_>, ActorId) -> Result<(), SimError>;

/// Named behavior callback.
#[derive(Clone, Copy)]
pub struct Action {
    name: &'static str,
    run: ActionFn,
}

impl Action {
    /// Binds a callback to a diagnostic name.
    #[must_use]
    pub const fn new(name: &'static str, run: ActionFn) -> Self {
        Self { name, run }
    }

    /// Diagnostic name of the callback.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn invoke(self, sim: &mut Sim<'_>, actor: ActorId) -> Result<(), SimError> {
        (self.run)(sim, actor)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Action").field(&self.name).finish()
    }
}

/// Sprite entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteInfo {
    /// Four-character lump prefix.
    pub name: &'static str,
    /// Number of frames available to the sprite.
    pub frames: u8,
}

/// Node of the animation and behavior graph.
#[derive(Clone, Copy, Debug)]
pub struct StateInfo {
    /// Sprite displayed while in the state.
    pub sprite: SpriteNum,
    /// Frame of the sprite.
    pub frame: u8,
    /// Duration in tics; `-1` never expires.
    pub tics: i32,
    /// Callback invoked on entry.
    pub action: Option<Action>,
    /// State entered when the duration runs out.
    pub next: StateNum,
}

/// Static description of an actor type.
#[derive(Clone, Debug)]
pub struct MobjInfo {
    /// Diagnostic name.
    pub name: &'static str,
    /// Placement code used by level data, if the type can be placed.
    pub editor_number: Option<u16>,
    /// State entered on construction.
    pub spawn_state: StateNum,
    /// First state of the chase sequence.
    pub see_state: StateNum,
    /// State entered when hurt.
    pub pain_state: StateNum,
    /// State entered on death or detonation.
    pub death_state: StateNum,
    /// Starting health.
    pub spawn_health: i32,
    /// Tics before the first reaction.
    pub reaction_time: i32,
    /// Travel speed; map units per tic for projectiles.
    pub speed: Fixed,
    /// Collision radius.
    pub radius: Fixed,
    /// Collision height.
    pub height: Fixed,
    /// Capability bits granted on construction.
    pub flags: ActorFlags,
    /// Opacity where one is fully opaque.
    pub translucency: Fixed,
    /// Sound played on sighting or launch.
    pub see_sound: Option<&'static str>,
    /// Sound played on pain.
    pub pain_sound: Option<&'static str>,
    /// Sound played on death or detonation.
    pub death_sound: Option<&'static str>,
}

impl MobjInfo {
    /// Creates a type description with default dimensions and no sounds.
    #[must_use]
    pub const fn new(name: &'static str, spawn_state: StateNum) -> Self {
        Self {
            name,
            editor_number: None,
            spawn_state,
            see_state: StateNum::NULL,
            pain_state: StateNum::NULL,
            death_state: StateNum::NULL,
            spawn_health: 1000,
            reaction_time: 8,
            speed: Fixed::ZERO,
            radius: Fixed::from_int(20),
            height: Fixed::from_int(16),
            flags: ActorFlags::empty(),
            translucency: Fixed::ONE,
            see_sound: None,
            pain_sound: None,
            death_sound: None,
        }
    }
}

/// Types the world creates on its own behalf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeRoles {
    /// Player bodies.
    pub player: MobjType,
    /// Placeholder for unusable placements.
    pub unknown: MobjType,
    /// Fog left behind by monster respawns.
    pub teleport_fog: MobjType,
    /// Fog marking a respawned pickup.
    pub item_fog: MobjType,
    /// Bullet puff; its third state is the melee variant.
    pub puff: MobjType,
    /// Blood splat; its second and third states are the lighter variants.
    pub blood: MobjType,
}

/// How the last state of a sequence continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceEnd {
    /// Back to the first state of the sequence.
    Loop,
    /// To an arbitrary state.
    Goto(StateNum),
}

/// Immutable sprite, state, and type tables shared by the simulation.
#[derive(Debug)]
pub struct ActorTables {
    sprites: Vec<SpriteInfo>,
    states: Vec<StateInfo>,
    types: Vec<MobjInfo>,
    roles: TypeRoles,
    editor_numbers: HashMap<u16, MobjType>,
}

impl ActorTables {
    /// Creates empty tables that will use the provided role assignments.
    #[must_use]
    pub fn new(roles: TypeRoles) -> Self {
        Self {
            sprites: Vec::new(),
            states: Vec::new(),
            types: Vec::new(),
            roles,
            editor_numbers: HashMap::new(),
        }
    }

    /// Appends a sprite.
    pub fn add_sprite(&mut self, sprite: SpriteInfo) -> SpriteNum {
        self.sprites.push(sprite);
        SpriteNum::new((self.sprites.len() - 1) as u16)
    }

    /// Appends a single state.
    pub fn add_state(&mut self, state: StateInfo) -> StateNum {
        self.states.push(state);
        StateNum::new((self.states.len() - 1) as u16)
    }

    /// Appends consecutive states of one sprite, each linked to the following
    /// one, and returns the first.
    pub fn add_sequence(
        &mut self,
        sprite: SpriteNum,
        frames: &[(u8, i32, Option<Action>)],
        end: SequenceEnd,
    ) -> StateNum {
        let first = StateNum::new(self.states.len() as u16);
        for (offset, &(frame, tics, action)) in frames.iter().enumerate() {
            let next = if offset + 1 < frames.len() {
                first.offset(offset as u16 + 1)
            } else {
                match end {
                    SequenceEnd::Loop => first,
                    SequenceEnd::Goto(state) => state,
                }
            };
            self.states.push(StateInfo {
                sprite,
                frame,
                tics,
                action,
                next,
            });
        }
        first
    }

    /// Appends an actor type and registers its placement code.
    pub fn add_type(&mut self, info: MobjInfo) -> MobjType {
        let kind = MobjType::new(self.types.len() as u16);
        if let Some(editor_number) = info.editor_number {
            let _ = self.editor_numbers.insert(editor_number, kind);
        }
        self.types.push(info);
        kind
    }

    /// Looks up a sprite.
    #[must_use]
    pub fn sprite(&self, sprite: SpriteNum) -> Option<&SpriteInfo> {
        self.sprites.get(sprite.index())
    }

    /// Looks up a state.
    #[must_use]
    pub fn state(&self, state: StateNum) -> Option<&StateInfo> {
        self.states.get(state.index())
    }

    /// Looks up an actor type.
    #[must_use]
    pub fn mobj(&self, kind: MobjType) -> Option<&MobjInfo> {
        self.types.get(kind.index())
    }

    /// Number of actor types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Resolves a placement code.
    #[must_use]
    pub fn by_editor_number(&self, editor_number: u16) -> Option<MobjType> {
        self.editor_numbers.get(&editor_number).copied()
    }

    /// Types the world spawns on its own behalf.
    #[must_use]
    pub const fn roles(&self) -> TypeRoles {
        self.roles
    }

    /// Builds the stock tables shipped with the simulation.
    #[must_use]
    pub fn stock() -> Self {
        let mut tables = Self::new(TypeRoles {
            player: MT_PLAYER,
            unknown: MT_UNKNOWN,
            teleport_fog: MT_TFOG,
            item_fog: MT_IFOG,
            puff: MT_PUFF,
            blood: MT_BLOOD,
        });
        tables.add_stock_sprites();
        tables.add_stock_states();
        tables.add_stock_types();
        tables
    }

    fn add_stock_sprites(&mut self) {
        for (name, frames) in [
            ("TNT1", 0),
            ("UNKN", 1),
            ("PLAY", 11),
            ("TROO", 13),
            ("BAL1", 5),
            ("MISL", 4),
            ("PUFF", 4),
            ("BLUD", 3),
            ("TFOG", 4),
            ("IFOG", 4),
            ("SKUL", 10),
            ("HEAD", 12),
            ("MEDI", 1),
            ("SOUL", 2),
        ] {
            let _ = self.add_sprite(SpriteInfo { name, frames });
        }
    }

    fn add_stock_states(&mut self) {
        use SequenceEnd::{Goto, Loop};

        let scream = Some(Action::new("A_Scream", a_scream));
        let fall = Some(Action::new("A_Fall", a_fall));
        let pain = Some(Action::new("A_Pain", a_pain));
        let null = Goto(S_NULL);

        let sequences: [(u16, &[(u8, i32, Option<Action>)], SequenceEnd); 25] = [
            (SPR_TNT1, &[(0, -1, None)], null),
            (SPR_UNKN, &[(0, -1, None)], Loop),
            (SPR_PLAY, &[(0, -1, None)], Loop),
            (SPR_PLAY, &[(0, 4, None), (1, 4, None), (2, 4, None), (3, 4, None)], Loop),
            (SPR_PLAY, &[(6, 4, pain)], Goto(S_PLAY)),
            (
                SPR_PLAY,
                &[(7, 10, None), (8, 10, scream), (9, 10, fall), (10, -1, None)],
                null,
            ),
            (SPR_TROO, &[(0, 10, None), (1, 10, None)], Loop),
            (SPR_TROO, &[(0, 3, None), (1, 3, None), (2, 3, None), (3, 3, None)], Loop),
            (SPR_TROO, &[(7, 2, None), (7, 2, pain)], Goto(S_TROO_RUN1)),
            (
                SPR_TROO,
                &[
                    (8, 8, None),
                    (9, 8, scream),
                    (10, 6, None),
                    (11, 6, fall),
                    (12, -1, None),
                ],
                null,
            ),
            (SPR_BAL1, &[(0, 4, None), (1, 4, None)], Loop),
            (SPR_BAL1, &[(2, 6, None), (3, 6, None), (4, 6, None)], null),
            (SPR_MISL, &[(0, 1, None)], Loop),
            (SPR_MISL, &[(1, 8, None), (2, 6, None), (3, 4, None)], null),
            (SPR_PUFF, &[(0, 4, None), (1, 4, None), (2, 4, None), (3, 4, None)], null),
            (SPR_BLUD, &[(2, 8, None), (1, 8, None), (0, 8, None)], null),
            (SPR_TFOG, &[(0, 6, None), (1, 6, None), (2, 6, None), (3, 6, None)], null),
            (SPR_IFOG, &[(0, 6, None), (1, 6, None), (2, 6, None), (3, 6, None)], null),
            (SPR_SKUL, &[(0, 10, None), (1, 10, None)], Loop),
            (
                SPR_SKUL,
                &[(5, 6, None), (6, 6, scream), (7, 6, None), (8, 6, fall), (9, 6, None)],
                null,
            ),
            (SPR_HEAD, &[(0, 10, None)], Loop),
            (SPR_HEAD, &[(4, 3, None), (4, 3, pain)], Goto(S_HEAD_STND)),
            (
                SPR_HEAD,
                &[
                    (6, 8, None),
                    (7, 8, scream),
                    (8, 8, None),
                    (9, 8, None),
                    (10, 8, fall),
                    (11, -1, None),
                ],
                null,
            ),
            (SPR_MEDI, &[(0, -1, None)], Loop),
            (SPR_SOUL, &[(0, 6, None), (1, 6, None)], Loop),
        ];

        for (sprite, frames, end) in sequences {
            let _ = self.add_sequence(SpriteNum::new(sprite), frames, end);
        }
    }

    fn add_stock_types(&mut self) {
        let types = [
            MobjInfo {
                see_state: S_PLAY_RUN1,
                pain_state: S_PLAY_PAIN,
                death_state: S_PLAY_DIE1,
                spawn_health: 100,
                reaction_time: 0,
                speed: Fixed::ONE,
                radius: Fixed::from_int(16),
                height: Fixed::from_int(56),
                flags: ActorFlags::SOLID
                    | ActorFlags::SHOOTABLE
                    | ActorFlags::DROPOFF
                    | ActorFlags::PICKUP
                    | ActorFlags::NOTDMATCH,
                pain_sound: Some("*pain100"),
                death_sound: Some("*death"),
                ..MobjInfo::new("DoomPlayer", S_PLAY)
            },
            MobjInfo {
                editor_number: Some(3001),
                see_state: S_TROO_RUN1,
                pain_state: S_TROO_PAIN,
                death_state: S_TROO_DIE1,
                spawn_health: 60,
                speed: Fixed::from_int(8),
                radius: Fixed::from_int(20),
                height: Fixed::from_int(56),
                flags: ActorFlags::SOLID | ActorFlags::SHOOTABLE | ActorFlags::COUNTKILL,
                see_sound: Some("imp/sight1"),
                pain_sound: Some("imp/pain"),
                death_sound: Some("imp/death1"),
                ..MobjInfo::new("DoomImp", S_TROO_STND)
            },
            MobjInfo {
                editor_number: Some(3005),
                see_state: S_HEAD_STND,
                pain_state: S_HEAD_PAIN,
                death_state: S_HEAD_DIE1,
                spawn_health: 400,
                speed: Fixed::from_int(8),
                radius: Fixed::from_int(31),
                height: Fixed::from_int(56),
                flags: ActorFlags::SOLID
                    | ActorFlags::SHOOTABLE
                    | ActorFlags::FLOAT
                    | ActorFlags::NOGRAVITY
                    | ActorFlags::COUNTKILL,
                see_sound: Some("caco/sight1"),
                pain_sound: Some("caco/pain"),
                death_sound: Some("caco/death"),
                ..MobjInfo::new("Cacodemon", S_HEAD_STND)
            },
            MobjInfo {
                editor_number: Some(3006),
                see_state: S_SKULL_STND,
                death_state: S_SKULL_DIE1,
                spawn_health: 100,
                speed: Fixed::from_int(8),
                radius: Fixed::from_int(16),
                height: Fixed::from_int(56),
                flags: ActorFlags::SOLID
                    | ActorFlags::SHOOTABLE
                    | ActorFlags::FLOAT
                    | ActorFlags::NOGRAVITY,
                pain_sound: Some("skull/pain"),
                death_sound: Some("skull/death"),
                ..MobjInfo::new("LostSoul", S_SKULL_STND)
            },
            MobjInfo {
                death_state: S_TBALLX1,
                speed: Fixed::from_int(10),
                radius: Fixed::from_int(6),
                height: Fixed::from_int(8),
                flags: missile_flags(),
                see_sound: Some("imp/attack"),
                death_sound: Some("imp/shotx"),
                ..MobjInfo::new("DoomImpBall", S_TBALL1)
            },
            MobjInfo {
                death_state: S_EXPLODE1,
                speed: Fixed::from_int(20),
                radius: Fixed::from_int(11),
                height: Fixed::from_int(8),
                flags: missile_flags(),
                see_sound: Some("weapons/rocklf"),
                death_sound: Some("weapons/rocklx"),
                ..MobjInfo::new("Rocket", S_ROCKET)
            },
            MobjInfo {
                flags: ActorFlags::NOBLOCKMAP | ActorFlags::NOGRAVITY,
                ..MobjInfo::new("BulletPuff", S_PUFF1)
            },
            MobjInfo {
                flags: ActorFlags::NOBLOCKMAP,
                ..MobjInfo::new("Blood", S_BLOOD1)
            },
            MobjInfo {
                flags: ActorFlags::NOBLOCKMAP | ActorFlags::NOGRAVITY,
                ..MobjInfo::new("TeleportFog", S_TFOG1)
            },
            MobjInfo {
                flags: ActorFlags::NOBLOCKMAP | ActorFlags::NOGRAVITY,
                ..MobjInfo::new("ItemFog", S_IFOG1)
            },
            MobjInfo {
                editor_number: Some(2012),
                flags: ActorFlags::SPECIAL,
                ..MobjInfo::new("Medikit", S_MEDI)
            },
            MobjInfo {
                editor_number: Some(2013),
                flags: ActorFlags::SPECIAL | ActorFlags::COUNTITEM,
                ..MobjInfo::new("Soulsphere", S_SOUL1)
            },
            MobjInfo {
                radius: Fixed::from_int(32),
                height: Fixed::from_int(56),
                flags: ActorFlags::NOBLOCKMAP | ActorFlags::NOGRAVITY,
                ..MobjInfo::new("Unknown", S_UNKNOWN)
            },
        ];

        for info in types {
            let _ = self.add_type(info);
        }
    }
}

fn missile_flags() -> ActorFlags {
    ActorFlags::NOBLOCKMAP | ActorFlags::MISSILE | ActorFlags::DROPOFF | ActorFlags::NOGRAVITY
}

const SPR_TNT1: u16 = 0;
const SPR_UNKN: u16 = 1;
const SPR_PLAY: u16 = 2;
const SPR_TROO: u16 = 3;
const SPR_BAL1: u16 = 4;
const SPR_MISL: u16 = 5;
const SPR_PUFF: u16 = 6;
const SPR_BLUD: u16 = 7;
const SPR_TFOG: u16 = 8;
const SPR_IFOG: u16 = 9;
const SPR_SKUL: u16 = 10;
const SPR_HEAD: u16 = 11;
const SPR_MEDI: u16 = 12;
const SPR_SOUL: u16 = 13;

/// Terminal state.
pub const S_NULL: StateNum = StateNum::NULL;
/// Placeholder type's only state.
pub const S_UNKNOWN: StateNum = StateNum::new(1);
/// Player standing.
pub const S_PLAY: StateNum = StateNum::new(2);
/// First of the four player running frames.
pub const S_PLAY_RUN1: StateNum = StateNum::new(3);
/// Player flinching.
pub const S_PLAY_PAIN: StateNum = StateNum::new(7);
/// First player death frame.
pub const S_PLAY_DIE1: StateNum = StateNum::new(8);
/// Imp standing.
pub const S_TROO_STND: StateNum = StateNum::new(12);
/// First imp chase frame.
pub const S_TROO_RUN1: StateNum = StateNum::new(14);
/// Imp flinching.
pub const S_TROO_PAIN: StateNum = StateNum::new(18);
/// First imp death frame.
pub const S_TROO_DIE1: StateNum = StateNum::new(20);
/// Imp corpse at rest.
pub const S_TROO_DIE5: StateNum = StateNum::new(24);
/// Imp fireball in flight.
pub const S_TBALL1: StateNum = StateNum::new(25);
/// Imp fireball bursting.
pub const S_TBALLX1: StateNum = StateNum::new(27);
/// Rocket in flight.
pub const S_ROCKET: StateNum = StateNum::new(30);
/// Rocket bursting.
pub const S_EXPLODE1: StateNum = StateNum::new(31);
/// Bullet puff.
pub const S_PUFF1: StateNum = StateNum::new(34);
/// Third puff frame, where melee puffs start.
pub const S_PUFF3: StateNum = StateNum::new(36);
/// Heavy blood splat.
pub const S_BLOOD1: StateNum = StateNum::new(38);
/// Medium blood splat.
pub const S_BLOOD2: StateNum = StateNum::new(39);
/// Light blood splat.
pub const S_BLOOD3: StateNum = StateNum::new(40);
/// Teleport fog.
pub const S_TFOG1: StateNum = StateNum::new(41);
/// Item respawn fog.
pub const S_IFOG1: StateNum = StateNum::new(45);
/// Lost soul idle.
pub const S_SKULL_STND: StateNum = StateNum::new(49);
/// First lost soul death frame.
pub const S_SKULL_DIE1: StateNum = StateNum::new(51);
/// Cacodemon idle.
pub const S_HEAD_STND: StateNum = StateNum::new(56);
/// Cacodemon flinching.
pub const S_HEAD_PAIN: StateNum = StateNum::new(57);
/// First cacodemon death frame.
pub const S_HEAD_DIE1: StateNum = StateNum::new(59);
/// Medikit.
pub const S_MEDI: StateNum = StateNum::new(65);
/// Soulsphere.
pub const S_SOUL1: StateNum = StateNum::new(66);

/// Player body.
pub const MT_PLAYER: MobjType = MobjType::new(0);
/// Imp.
pub const MT_TROOP: MobjType = MobjType::new(1);
/// Cacodemon.
pub const MT_HEAD: MobjType = MobjType::new(2);
/// Lost soul.
pub const MT_SKULL: MobjType = MobjType::new(3);
/// Imp fireball.
pub const MT_TROOPSHOT: MobjType = MobjType::new(4);
/// Rocket.
pub const MT_ROCKET: MobjType = MobjType::new(5);
/// Bullet puff.
pub const MT_PUFF: MobjType = MobjType::new(6);
/// Blood splat.
pub const MT_BLOOD: MobjType = MobjType::new(7);
/// Teleport fog.
pub const MT_TFOG: MobjType = MobjType::new(8);
/// Item respawn fog.
pub const MT_IFOG: MobjType = MobjType::new(9);
/// Medikit.
pub const MT_MEDIKIT: MobjType = MobjType::new(10);
/// Soulsphere.
pub const MT_SOULSPHERE: MobjType = MobjType::new(11);
/// Placeholder for unusable placements.
pub const MT_UNKNOWN: MobjType = MobjType::new(12);
