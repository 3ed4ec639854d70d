#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the actor simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Every positional quantity is a
//! [`Fixed`] so that authoritative and speculative runs stay bit-identical.

pub mod fixed;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub use fixed::{approx_distance, pitch_slope, vector_length, Angle, Fixed, FRACUNIT};

/// Nominal simulation rate, in tics per second of game time.
pub const TICRATE: u32 = 35;

/// Distinguishes the authoritative simulation from client-side prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimMode {
    /// Full simulation that owns every world-visible side effect.
    Authoritative,
    /// Re-simulation of recent tics that must not cause irreversible effects.
    Speculative,
}

impl SimMode {
    /// Reports whether world-visible side effects are permitted.
    #[must_use]
    pub const fn is_authoritative(self) -> bool {
        matches!(self, Self::Authoritative)
    }
}

/// Generation-checked handle to an actor slot.
///
/// A handle keeps resolving to "no actor" once the actor it named is
/// destroyed, even after the slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId {
    index: u32,
    generation: u32,
}

impl ActorId {
    /// Creates a handle from its slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the actor arena.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Scripting tag used to find actors; zero means untagged.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ThingId(u16);

impl ThingId {
    /// The untagged value.
    pub const NONE: Self = Self(0);

    /// Creates a thing identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Numeric value of the tag.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Reports whether the actor carries no tag.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

/// Stable network identity used to encode references across snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetId(u32);

impl NetId {
    /// Creates a network identity.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Numeric value of the identity.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index into the static actor type table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MobjType(u16);

impl MobjType {
    /// Creates a type index.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Position of the type within the table.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Index into the static state table.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StateNum(u16);

impl StateNum {
    /// Terminal marker: entering it removes the actor.
    pub const NULL: Self = Self(0);

    /// Creates a state index.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Position of the state within the table.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Reports whether this is the terminal marker.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// The state `offset` entries further along the table.
    #[must_use]
    pub const fn offset(&self, offset: u16) -> Self {
        Self(self.0 + offset)
    }
}

/// Index into the sprite table.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SpriteNum(u16);

impl SpriteNum {
    /// Creates a sprite index.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Position of the sprite within the table.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Seat of a participating player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerSlot(u8);

impl PlayerSlot {
    /// Creates a player slot.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Zero-based seat number.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// Capability and category bits carried by every actor.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ActorFlags: u64 {
        /// Pickup that triggers when touched.
        const SPECIAL      = 1 << 0;
        /// Blocks other solid actors.
        const SOLID        = 1 << 1;
        /// Can take damage and be aimed at.
        const SHOOTABLE    = 1 << 2;
        /// Not linked into sector lists (invisible but touchable).
        const NOSECTOR     = 1 << 3;
        /// Not linked into the blockmap.
        const NOBLOCKMAP   = 1 << 4;
        /// Waits for a sound before waking.
        const AMBUSH       = 1 << 5;
        /// Hangs from the ceiling when placed.
        const SPAWNCEILING = 1 << 8;
        /// Unaffected by gravity.
        const NOGRAVITY    = 1 << 9;
        /// May step off ledges.
        const DROPOFF      = 1 << 10;
        /// Collects pickups.
        const PICKUP       = 1 << 11;
        /// Ignores collision.
        const NOCLIP       = 1 << 12;
        /// Slides along walls.
        const SLIDE        = 1 << 13;
        /// Can change altitude at will.
        const FLOAT        = 1 << 14;
        /// Projectile.
        const MISSILE      = 1 << 16;
        /// Dropped by a dying monster rather than placed.
        const DROPPED      = 1 << 17;
        /// Partially invisible; spoils aim.
        const SHADOW       = 1 << 18;
        /// Does not bleed.
        const NOBLOOD      = 1 << 19;
        /// Dead body.
        const CORPSE       = 1 << 20;
        /// Currently floating toward a comfort height.
        const INFLOAT      = 1 << 21;
        /// Counts toward the kill total.
        const COUNTKILL    = 1 << 22;
        /// Counts toward the item total.
        const COUNTITEM    = 1 << 23;
        /// Charging skull in flight.
        const SKULLFLY     = 1 << 24;
        /// Excluded from deathmatch placement.
        const NOTDMATCH    = 1 << 25;
        /// Player flying.
        const FLY          = 1 << 32;
        /// Experiences reduced gravity.
        const LOGRAV       = 1 << 33;
        /// Counts toward the secret total.
        const COUNTSECRET  = 1 << 34;
        /// Placed dormant.
        const DORMANT      = 1 << 35;
    }
}

bitflags! {
    /// Placement filter and behavior bits stored in a [`MapSpawnRecord`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MapThingFlags: u16 {
        /// Present on the two easiest skills.
        const EASY        = 0x0001;
        /// Present on medium skill.
        const NORMAL      = 0x0002;
        /// Present on the two hardest skills.
        const HARD        = 0x0004;
        /// Starts deaf.
        const AMBUSH      = 0x0008;
        /// Starts dormant.
        const DORMANT     = 0x0010;
        /// Present in single player.
        const SINGLE      = 0x0100;
        /// Present in cooperative games.
        const COOPERATIVE = 0x0200;
        /// Present in deathmatch.
        const DEATHMATCH  = 0x0400;
    }
}

/// Serializable record of how and where an actor was placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSpawnRecord {
    /// Horizontal placement in whole map units.
    pub x: i16,
    /// Vertical (north/south) placement in whole map units.
    pub y: i16,
    /// Height above the floor in whole map units.
    pub z: i16,
    /// Facing in degrees.
    pub angle: i16,
    /// Editor number identifying the placed type.
    pub kind: u16,
    /// Placement filter and behavior flags.
    pub flags: MapThingFlags,
    /// Scripting tag assigned to the actor.
    pub tid: ThingId,
    /// Line special carried by the actor.
    pub special: u8,
    /// Arguments of the special.
    pub args: [u8; 5],
}

/// Vertical placement request for a new actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnHeight {
    /// Rest on the floor below the spawn point.
    OnFloor,
    /// Hang from the ceiling above the spawn point.
    OnCeiling,
    /// Use the provided absolute height.
    At(Fixed),
}

/// Direction in which an actor's translucency is changing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fade {
    /// Translucency is constant.
    #[default]
    Steady,
    /// Becoming more opaque.
    In,
    /// Becoming more transparent.
    Out,
}

/// Weak association slots an actor can hold toward another actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefSlot {
    /// Current enemy, or the shooter for projectiles.
    Target,
    /// Previous enemy to return to.
    LastEnemy,
    /// Homing or tracking target.
    Tracer,
    /// Patrol point being walked toward.
    Goal,
}

/// Sound channel an emission occupies on its origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundChannel {
    /// Any free channel.
    Auto,
    /// Weapon channel.
    Weapon,
    /// Voice channel.
    Voice,
    /// Pickup channel.
    Item,
    /// Body channel.
    Body,
}

/// Distance falloff applied to an emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attenuation {
    /// Heard everywhere.
    None,
    /// Regular falloff.
    Normal,
    /// Quiet idle falloff.
    Idle,
    /// Very short range.
    Static,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Runs one tic over the whole population.
    Tick {
        /// Whether this tic is authoritative or a prediction.
        mode: SimMode,
    },
    /// Places an actor from level data.
    SpawnThing {
        /// Placement being realized.
        spawn: MapSpawnRecord,
    },
    /// Creates an actor of a type at a position.
    SpawnActor {
        /// Type to construct.
        kind: MobjType,
        /// Horizontal position.
        x: Fixed,
        /// Vertical (north/south) position.
        y: Fixed,
        /// Height placement.
        height: SpawnHeight,
    },
    /// Spawns a body for a player at its recorded start.
    SpawnPlayer {
        /// Seat of the player.
        player: PlayerSlot,
    },
    /// Records a player's movement intent for the coming tics.
    SetPlayerInput {
        /// Seat of the player.
        player: PlayerSlot,
        /// Forward intent, negative for backward.
        forward_move: i8,
        /// Strafe intent, negative for left.
        side_move: i8,
    },
    /// Changes per-player movement options.
    ConfigurePlayer {
        /// Seat of the player.
        player: PlayerSlot,
        /// Drops all horizontal momentum after every move.
        no_momentum: bool,
        /// Largest slope difference aim assistance may correct.
        aim_distance: Fixed,
    },
    /// Adds momentum to an actor.
    Thrust {
        /// Actor being pushed.
        actor: ActorId,
        /// Added horizontal momentum.
        momx: Fixed,
        /// Added north/south momentum.
        momy: Fixed,
        /// Added vertical momentum.
        momz: Fixed,
    },
    /// Changes an actor's yaw and pitch.
    SetAngles {
        /// Actor being turned.
        actor: ActorId,
        /// New yaw.
        angle: Angle,
        /// New pitch, positive looks down.
        pitch: Angle,
    },
    /// Starts an actor fading in or out of view, or holds its translucency.
    SetFade {
        /// Actor being faded.
        actor: ActorId,
        /// Direction of the fade.
        fade: Fade,
    },
    /// Changes an actor's scripting tag and re-indexes it.
    SetThingId {
        /// Actor being tagged.
        actor: ActorId,
        /// New tag.
        tid: ThingId,
    },
    /// Points one of an actor's weak associations at another actor.
    SetReference {
        /// Actor holding the association.
        holder: ActorId,
        /// Association being changed.
        slot: RefSlot,
        /// New referent, or `None` to clear.
        target: Option<ActorId>,
    },
    /// Forces an actor into a state.
    SetState {
        /// Actor being changed.
        actor: ActorId,
        /// State to enter.
        state: StateNum,
        /// Execution mode of the request.
        mode: SimMode,
    },
    /// Turns a living actor into a corpse.
    Kill {
        /// Actor that died.
        actor: ActorId,
    },
    /// Removes a pickup that was collected.
    ConsumePickup {
        /// Pickup being collected.
        actor: ActorId,
    },
    /// Re-creates a previously consumed pickup.
    RespawnItem {
        /// Placement of the pickup.
        spawn: MapSpawnRecord,
    },
    /// Tears an actor down.
    Destroy {
        /// Actor being removed.
        actor: ActorId,
    },
    /// Launches a projectile from one actor toward another.
    FireMissile {
        /// Shooter.
        source: ActorId,
        /// Actor aimed at.
        target: ActorId,
        /// Projectile type.
        kind: MobjType,
        /// Execution mode of the request.
        mode: SimMode,
    },
    /// Launches a player projectile with aim assistance.
    FirePlayerMissile {
        /// Shooter.
        source: ActorId,
        /// Projectile type.
        kind: MobjType,
        /// Execution mode of the request.
        mode: SimMode,
    },
    /// Creates a bullet puff.
    SpawnPuff {
        /// Horizontal position.
        x: Fixed,
        /// Vertical (north/south) position.
        y: Fixed,
        /// Height.
        z: Fixed,
        /// Whether the hit came from a melee attack.
        melee: bool,
    },
    /// Creates a blood splat.
    SpawnBlood {
        /// Horizontal position.
        x: Fixed,
        /// Vertical (north/south) position.
        y: Fixed,
        /// Height.
        z: Fixed,
        /// Damage that caused the bleeding.
        damage: i32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that a tic was simulated.
    TimeAdvanced {
        /// Level time after the tic.
        tic: u32,
        /// Mode the tic ran in.
        mode: SimMode,
    },
    /// Confirms that an actor was constructed.
    ActorSpawned {
        /// Handle of the new actor.
        actor: ActorId,
        /// Type of the new actor.
        kind: MobjType,
    },
    /// Confirms that an actor was torn down.
    ActorDestroyed {
        /// Handle of the removed actor.
        actor: ActorId,
        /// Type of the removed actor.
        kind: MobjType,
    },
    /// Reports that a projectile detonated.
    MissileExploded {
        /// Projectile that detonated.
        actor: ActorId,
    },
    /// Requests playback of a sound.
    SoundStarted {
        /// Actor the sound is attached to.
        origin: ActorId,
        /// Channel occupied on the origin.
        channel: SoundChannel,
        /// Logical sound name.
        sound: &'static str,
        /// Playback volume where [`Fixed::ONE`] is full volume.
        volume: Fixed,
        /// Distance falloff.
        attenuation: Attenuation,
    },
    /// Requests that sounds attached to an actor stop following it.
    SoundDetached {
        /// Actor being removed.
        actor: ActorId,
    },
    /// Reports that a respawnable pickup was collected.
    PickupConsumed {
        /// Placement of the pickup.
        spawn: MapSpawnRecord,
        /// Level time of the collection.
        tic: u32,
    },
    /// Reports that a corpse was replaced by a fresh monster.
    MonsterRespawned {
        /// Corpse that was removed.
        corpse: ActorId,
        /// Newly created monster.
        actor: ActorId,
    },
    /// Reports that a pickup reappeared.
    ItemRespawned {
        /// Newly created pickup.
        actor: ActorId,
    },
    /// Reports that a placement used the placeholder type.
    ThingSubstituted {
        /// Editor number that could not be used.
        editor_number: u16,
        /// Horizontal placement.
        x: i16,
        /// Vertical (north/south) placement.
        y: i16,
    },
}

/// Field-by-field snapshot of an actor for save games and prediction.
///
/// Weak associations are encoded through [`NetId`] so the snapshot stays valid
/// after actors are reallocated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    /// Network identity of the actor.
    pub net_id: NetId,
    /// Type of the actor.
    pub kind: MobjType,
    /// Horizontal position.
    pub x: Fixed,
    /// Vertical (north/south) position.
    pub y: Fixed,
    /// Height.
    pub z: Fixed,
    /// Yaw.
    pub angle: Angle,
    /// Pitch.
    pub pitch: Angle,
    /// Roll.
    pub roll: Angle,
    /// Horizontal momentum.
    pub momx: Fixed,
    /// North/south momentum.
    pub momy: Fixed,
    /// Vertical momentum.
    pub momz: Fixed,
    /// Collision radius.
    pub radius: Fixed,
    /// Collision height.
    pub height: Fixed,
    /// Floor bound below the actor.
    pub floor_z: Fixed,
    /// Ceiling bound above the actor.
    pub ceiling_z: Fixed,
    /// Floor height of the sector the actor's center is in.
    pub sector_floor: Fixed,
    /// Sprite being displayed.
    pub sprite: SpriteNum,
    /// Frame of the sprite.
    pub frame: u8,
    /// Opacity where [`Fixed::ONE`] is fully opaque.
    pub translucency: Fixed,
    /// Direction of translucency change.
    pub fade: Fade,
    /// Current state.
    pub state: StateNum,
    /// Tics remaining in the current state.
    pub tics: i32,
    /// Capability bits.
    pub flags: ActorFlags,
    /// Remaining health.
    pub health: i32,
    /// Tics before the next reaction.
    pub reaction_time: i32,
    /// Tics of commitment to the current target.
    pub threshold: i32,
    /// Movement counter, also the nightmare respawn timer.
    pub move_count: i32,
    /// Scripting tag.
    pub tid: ThingId,
    /// Current enemy or projectile owner.
    pub target: Option<NetId>,
    /// Previous enemy.
    pub last_enemy: Option<NetId>,
    /// Tracking target.
    pub tracer: Option<NetId>,
    /// Patrol goal.
    pub goal: Option<NetId>,
    /// Player controlling this body.
    pub player: Option<PlayerSlot>,
    /// Placement the actor was created from.
    pub spawn_point: MapSpawnRecord,
    /// Submersion depth from 0 (dry) to 3 (fully submerged).
    pub water_level: u8,
}
