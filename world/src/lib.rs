#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative actor population for the simulation.
//!
//! The world owns every actor together with the indices that keep them
//! cross-referenced: the thing-id hash, the weak reference registry and the
//! network identity pool. Adapters and systems mutate it exclusively through
//! [`apply`] and read it through [`query`].

mod actor;
mod arena;
mod config;
mod error;
mod geometry;
pub mod info;
mod net_id;
mod nightmare;
mod physics;
mod rng;
mod sim;
mod snapshot;
mod spawn;
mod states;
mod tid_hash;
mod weak_refs;

#[cfg(test)]
mod testing;

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use actorsim_core::{
    ActorId, Command, Event, Fixed, MapSpawnRecord, NetId, PlayerSlot, RefSlot, SimMode, ThingId,
};

use actor::{Actor, Player};
use arena::Arena;
use net_id::NetIdPool;
use rng::Random;
use tid_hash::TidHash;
use weak_refs::WeakRefs;

pub use config::{GameMode, LevelConfig, Skill};
pub use error::SimError;
pub use geometry::{
    AimHit, Body, Bounds, Geometry, Linkage, MoveOutcome, OpenArena, Slide, TouchList,
};
pub use info::{
    Action, ActionFn, ActorTables, MobjInfo, SequenceEnd, SpriteInfo, StateInfo, TypeRoles,
};
pub use sim::Sim;
pub use snapshot::{capture, restore};
pub use states::{a_fall, a_pain, a_scream, STATE_RECURSION_LIMIT};

/// Number of player seats.
const MAX_PLAYERS: usize = 4;

/// Level-wide totals of countable placements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Monsters that count toward the kill percentage.
    pub total_kills: u32,
    /// Pickups that count toward the item percentage.
    pub total_items: u32,
    /// Secrets placed in the level.
    pub total_secrets: u32,
}

/// Read-only view of a player seat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerView {
    /// Body currently controlled by the player.
    pub body: Option<ActorId>,
    /// Forward intent recorded for the coming tics.
    pub forward_move: i8,
    /// Strafe intent recorded for the coming tics.
    pub side_move: i8,
    /// Eye height above the body's feet.
    pub view_height: Fixed,
    /// Per-tic change of the eye height while recovering from a landing.
    pub delta_view_height: Fixed,
    /// Whether horizontal momentum is dropped after every move.
    pub no_momentum: bool,
    /// Largest slope difference aim assistance may correct.
    pub aim_distance: Fixed,
}

/// Represents the authoritative state of the actor population.
#[derive(Debug)]
pub struct World {
    pub(crate) config: LevelConfig,
    pub(crate) tables: Arc<ActorTables>,
    pub(crate) geometry: Box<dyn Geometry>,
    pub(crate) actors: Arena<Actor>,
    pub(crate) population: Vec<ActorId>,
    pub(crate) tids: TidHash,
    pub(crate) refs: WeakRefs,
    pub(crate) net_ids: NetIdPool,
    pub(crate) net_lookup: HashMap<NetId, ActorId>,
    pub(crate) players: [Player; MAX_PLAYERS],
    pub(crate) player_starts: [Option<MapSpawnRecord>; MAX_PLAYERS],
    pub(crate) deathmatch_starts: Vec<MapSpawnRecord>,
    pub(crate) counters: Counters,
    pub(crate) level_time: u32,
    pub(crate) rng: Random,
    pub(crate) prediction_rng: Random,
    pub(crate) predicted_gone: HashSet<ActorId>,
}

impl World {
    /// Creates an empty level over the provided geometry.
    #[must_use]
    pub fn new(config: LevelConfig, tables: Arc<ActorTables>, geometry: Box<dyn Geometry>) -> Self {
        let rng = Random::new(config.seed);
        Self {
            config,
            tables,
            geometry,
            actors: Arena::new(),
            population: Vec::new(),
            tids: TidHash::new(),
            refs: WeakRefs::default(),
            net_ids: NetIdPool::default(),
            net_lookup: HashMap::new(),
            players: std::array::from_fn(|_| Player::new()),
            player_starts: [None; MAX_PLAYERS],
            deathmatch_starts: Vec::new(),
            counters: Counters::default(),
            level_time: 0,
            prediction_rng: rng.clone(),
            rng,
            predicted_gone: HashSet::new(),
        }
    }

    /// Discards the effects of speculative runs that only live in the world's
    /// bookkeeping. Hidden actors reappear and are linked back into the
    /// geometry, and the prediction random stream is resynchronized with the
    /// authoritative one.
    pub fn clear_prediction(&mut self) {
        let mut hidden: Vec<ActorId> = self.predicted_gone.drain().collect();
        hidden.sort_unstable();
        for id in hidden {
            let Some(body) = self.actors.get(id).map(|actor| actor.body(id)) else {
                continue;
            };
            let linkage = self.geometry.link(&body);
            if let Some(actor) = self.actors.get_mut(id) {
                actor.touch = linkage.touch;
            }
        }
        self.prediction_rng = self.rng.clone();
    }

    pub(crate) fn actor(&self, id: ActorId) -> Option<&Actor> {
        if self.predicted_gone.contains(&id) {
            return None;
        }
        self.actors.get(id)
    }

    pub(crate) fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        if self.predicted_gone.contains(&id) {
            return None;
        }
        self.actors.get_mut(id)
    }

    pub(crate) fn is_live(&self, id: ActorId) -> bool {
        self.actor(id).is_some()
    }

    /// Player seat whose body is `id`.
    pub(crate) fn active_player(&self, id: ActorId) -> Option<&Player> {
        let slot = self.actor(id)?.player?;
        self.players
            .get(slot.index())
            .filter(|player| player.body == Some(id))
    }

    pub(crate) fn active_player_mut(&mut self, id: ActorId) -> Option<&mut Player> {
        let slot = self.actor(id)?.player?;
        self.players
            .get_mut(slot.index())
            .filter(|player| player.body == Some(id))
    }

    /// Points a weak association of `holder` at `target`, keeping the
    /// registry in step. Dead targets are stored as `None`.
    pub(crate) fn set_ref(&mut self, holder: ActorId, slot: RefSlot, target: Option<ActorId>) {
        let target = target.filter(|target| self.is_live(*target));
        let Some(actor) = self.actor_mut(holder) else {
            return;
        };
        let previous = std::mem::replace(actor.reference_mut(slot), target);

        if let Some(previous) = previous {
            self.refs.unregister(holder, slot, previous);
        }
        if let Some(target) = target {
            self.refs.register(holder, slot, target);
        }
    }

    pub(crate) fn reference(&self, holder: ActorId, slot: RefSlot) -> Option<ActorId> {
        self.actor(holder)?
            .reference(slot)
            .filter(|target| self.is_live(*target))
    }

    pub(crate) fn set_thing_id(&mut self, id: ActorId, tid: ThingId) {
        let Some(actor) = self.actor_mut(id) else {
            return;
        };
        actor.tid = tid;
        self.tids.remove(id);
        self.tids.insert(id, tid);
    }

    /// Hands control of `id` to `slot`, releasing the seat it had before.
    pub(crate) fn bind_player(&mut self, id: ActorId, slot: Option<PlayerSlot>) {
        let Some(actor) = self.actor_mut(id) else {
            return;
        };
        let previous = std::mem::replace(&mut actor.player, slot);

        if let Some(previous) = previous.filter(|previous| Some(*previous) != slot) {
            if let Some(player) = self.players.get_mut(previous.index()) {
                if player.body == Some(id) {
                    player.body = None;
                }
            }
        }
        if let Some(slot) = slot {
            if let Some(player) = self.players.get_mut(slot.index()) {
                player.body = Some(id);
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands addressing actors that no longer exist are ignored.
///
/// # Errors
///
/// Returns the fatal [`SimError`] raised while executing the command. The
/// world must not be simulated further afterwards.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), SimError> {
    const AUTHORITATIVE: SimMode = SimMode::Authoritative;

    match command {
        Command::Tick { mode } => Sim::new(world, mode, out_events).tick()?,
        Command::SpawnThing { spawn } => {
            let _ = Sim::new(world, AUTHORITATIVE, out_events).spawn_map_thing(spawn)?;
        }
        Command::SpawnActor { kind, x, y, height } => {
            let _ = Sim::new(world, AUTHORITATIVE, out_events).spawn(kind, x, y, height)?;
        }
        Command::SpawnPlayer { player } => {
            let _ = Sim::new(world, AUTHORITATIVE, out_events).spawn_player(player)?;
        }
        Command::SetPlayerInput {
            player,
            forward_move,
            side_move,
        } => {
            if let Some(player) = world.players.get_mut(player.index()) {
                player.forward_move = forward_move;
                player.side_move = side_move;
            }
        }
        Command::ConfigurePlayer {
            player,
            no_momentum,
            aim_distance,
        } => {
            if let Some(player) = world.players.get_mut(player.index()) {
                player.no_momentum = no_momentum;
                player.aim_distance = aim_distance;
            }
        }
        Command::Thrust {
            actor,
            momx,
            momy,
            momz,
        } => {
            if let Some(actor) = world.actor_mut(actor) {
                actor.momx += momx;
                actor.momy += momy;
                actor.momz += momz;
            }
        }
        Command::SetAngles {
            actor,
            angle,
            pitch,
        } => {
            if let Some(actor) = world.actor_mut(actor) {
                actor.angle = angle;
                actor.pitch = pitch;
            }
        }
        Command::SetFade { actor, fade } => {
            if let Some(actor) = world.actor_mut(actor) {
                actor.fade = fade;
            }
        }
        Command::SetThingId { actor, tid } => world.set_thing_id(actor, tid),
        Command::SetReference {
            holder,
            slot,
            target,
        } => world.set_ref(holder, slot, target),
        Command::SetState { actor, state, mode } => {
            let _ = Sim::new(world, mode, out_events).set_state(actor, state)?;
        }
        Command::Kill { actor } => Sim::new(world, AUTHORITATIVE, out_events).kill(actor)?,
        Command::ConsumePickup { actor } => {
            Sim::new(world, AUTHORITATIVE, out_events).consume_pickup(actor);
        }
        Command::RespawnItem { spawn } => {
            let _ = Sim::new(world, AUTHORITATIVE, out_events).respawn_item(spawn)?;
        }
        Command::Destroy { actor } => Sim::new(world, AUTHORITATIVE, out_events).destroy(actor),
        Command::FireMissile {
            source,
            target,
            kind,
            mode,
        } => {
            let _ = Sim::new(world, mode, out_events).spawn_missile(source, target, kind)?;
        }
        Command::FirePlayerMissile { source, kind, mode } => {
            let _ = Sim::new(world, mode, out_events).spawn_player_missile(source, kind)?;
        }
        Command::SpawnPuff { x, y, z, melee } => {
            let _ = Sim::new(world, AUTHORITATIVE, out_events).spawn_puff(x, y, z, melee)?;
        }
        Command::SpawnBlood { x, y, z, damage } => {
            let _ = Sim::new(world, AUTHORITATIVE, out_events).spawn_blood(x, y, z, damage)?;
        }
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use actorsim_core::{
        ActorId, ActorSnapshot, MapSpawnRecord, MobjType, NetId, PlayerSlot, RefSlot, ThingId,
    };

    use super::{ActorTables, Counters, LevelConfig, PlayerView, World};

    /// Captures the current attributes of a live actor.
    #[must_use]
    pub fn snapshot(world: &World, actor: ActorId) -> Option<ActorSnapshot> {
        super::capture(world, actor)
    }

    /// Live actors in the order they think.
    #[must_use]
    pub fn population(world: &World) -> Vec<ActorId> {
        world
            .population
            .iter()
            .copied()
            .filter(|id| world.is_live(*id))
            .collect()
    }

    /// Reports whether the handle still names an actor.
    #[must_use]
    pub fn is_live(world: &World, actor: ActorId) -> bool {
        world.is_live(actor)
    }

    /// Number of actors occupying storage, including ones a prediction hid.
    #[must_use]
    pub fn actor_count(world: &World) -> usize {
        world.actors.len()
    }

    /// Next actor carrying `tid` after `after`, or the first one when `after`
    /// is `None`.
    #[must_use]
    pub fn find_by_tid(world: &World, after: Option<ActorId>, tid: ThingId) -> Option<ActorId> {
        let mut cursor = after;
        loop {
            let found = world.tids.find_next(cursor, tid)?;
            if world.is_live(found) {
                return Some(found);
            }
            cursor = Some(found);
        }
    }

    /// Every live actor carrying `tid` in chain order.
    #[must_use]
    pub fn actors_with_tid(world: &World, tid: ThingId) -> Vec<ActorId> {
        std::iter::successors(find_by_tid(world, None, tid), |previous| {
            find_by_tid(world, Some(*previous), tid)
        })
        .collect()
    }

    /// Next actor after `after` that carries `tid` and is of type `kind`.
    #[must_use]
    pub fn find_goal(
        world: &World,
        after: Option<ActorId>,
        tid: ThingId,
        kind: MobjType,
    ) -> Option<ActorId> {
        let mut cursor = after;
        loop {
            let found = find_by_tid(world, cursor, tid)?;
            if world.actor(found).is_some_and(|actor| actor.kind == kind) {
                return Some(found);
            }
            cursor = Some(found);
        }
    }

    /// Resolves a weak association of `holder`.
    #[must_use]
    pub fn reference(world: &World, holder: ActorId, slot: RefSlot) -> Option<ActorId> {
        world.reference(holder, slot)
    }

    /// Actor currently holding a network identity.
    #[must_use]
    pub fn actor_by_net_id(world: &World, net_id: NetId) -> Option<ActorId> {
        world
            .net_lookup
            .get(&net_id)
            .copied()
            .filter(|id| world.is_live(*id))
    }

    /// Level-wide totals of countable placements.
    #[must_use]
    pub fn counters(world: &World) -> Counters {
        world.counters
    }

    /// Authoritative tics elapsed in the level.
    #[must_use]
    pub fn level_time(world: &World) -> u32 {
        world.level_time
    }

    /// Read-only view of a player seat.
    #[must_use]
    pub fn player(world: &World, slot: PlayerSlot) -> Option<PlayerView> {
        world.players.get(slot.index()).map(|player| PlayerView {
            body: player.body.filter(|body| world.is_live(*body)),
            forward_move: player.forward_move,
            side_move: player.side_move,
            view_height: player.view_height,
            delta_view_height: player.delta_view_height,
            no_momentum: player.no_momentum,
            aim_distance: player.aim_distance,
        })
    }

    /// Deathmatch starts recorded from level placements.
    #[must_use]
    pub fn deathmatch_starts(world: &World) -> &[MapSpawnRecord] {
        &world.deathmatch_starts
    }

    /// Static actor tables shared by the level.
    #[must_use]
    pub fn tables(world: &World) -> &ActorTables {
        &world.tables
    }

    /// Configuration the level runs under.
    #[must_use]
    pub fn config(world: &World) -> &LevelConfig {
        &world.config
    }
}
