//! One invocation's handle on the world.

use actorsim_core::{
    ActorId, Attenuation, Event, Fixed, MobjType, SimMode, SoundChannel, StateNum,
};

use crate::{
    info::{MobjInfo, StateInfo},
    SimError, World,
};

/// The world together with the mode an invocation runs in and the sink its
/// events go to.
///
/// Every operation with a world-visible side effect consults [`Sim::mode`], so
/// authoritative and speculative runs share the same code path.
#[derive(Debug)]
pub struct Sim<'a> {
    pub(crate) world: &'a mut World,
    mode: SimMode,
    events: &'a mut Vec<Event>,
    pub(crate) entered: u32,
    pub(crate) nesting: u32,
}

impl<'a> Sim<'a> {
    pub(crate) fn new(world: &'a mut World, mode: SimMode, events: &'a mut Vec<Event>) -> Self {
        Self {
            world,
            mode,
            events,
            entered: 0,
            nesting: 0,
        }
    }

    /// Mode the invocation runs in.
    #[must_use]
    pub const fn mode(&self) -> SimMode {
        self.mode
    }

    /// Read access to the world being simulated.
    #[must_use]
    pub fn world(&self) -> &World {
        &*self.world
    }

    /// Tics elapsed in the level.
    #[must_use]
    pub fn level_time(&self) -> u32 {
        self.world.level_time
    }

    /// Requests a sound at full volume; only authoritative runs are heard.
    pub fn start_sound(
        &mut self,
        origin: ActorId,
        channel: SoundChannel,
        sound: &'static str,
        attenuation: Attenuation,
    ) {
        if !self.mode.is_authoritative() {
            return;
        }
        self.emit(Event::SoundStarted {
            origin,
            channel,
            sound,
            volume: Fixed::ONE,
            attenuation,
        });
    }

    pub(crate) fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Next value in `0..=255` from the stream belonging to the current mode.
    pub(crate) fn random(&mut self) -> i32 {
        if self.mode.is_authoritative() {
            self.world.rng.next_byte()
        } else {
            self.world.prediction_rng.next_byte()
        }
    }

    pub(crate) fn random_diff(&mut self) -> i32 {
        if self.mode.is_authoritative() {
            self.world.rng.diff()
        } else {
            self.world.prediction_rng.diff()
        }
    }

    pub(crate) fn mobj_info(&self, kind: MobjType) -> Result<&MobjInfo, SimError> {
        self.world
            .tables
            .mobj(kind)
            .ok_or(SimError::UnknownActorType {
                kind: kind.index() as u16,
                count: self.world.tables.type_count(),
            })
    }

    pub(crate) fn state_info(
        &self,
        kind: MobjType,
        state: StateNum,
    ) -> Result<StateInfo, SimError> {
        self.world
            .tables
            .state(state)
            .copied()
            .ok_or(SimError::UnknownState {
                kind: kind.index() as u16,
                state: state.index() as u16,
            })
    }

    /// Pushes an actor's current flags and dimensions to the geometry.
    pub(crate) fn sync_geometry(&mut self, id: ActorId) {
        let Some(body) = self.world.actor(id).map(|actor| actor.body(id)) else {
            return;
        };
        self.world.geometry.update(&body);
    }

    pub(crate) fn refresh_water_level(&mut self, id: ActorId) {
        let Some(body) = self.world.actor(id).map(|actor| actor.body(id)) else {
            return;
        };
        let level = self.world.geometry.water_level(&body);
        if let Some(actor) = self.world.actor_mut(id) {
            actor.water_level = level;
        }
    }

    /// Runs every actor present at the start of the tic in population order.
    pub(crate) fn tick(&mut self) -> Result<(), SimError> {
        let count = self.world.population.len();
        for index in 0..count {
            let id = self.world.population[index];
            if self.world.is_live(id) {
                self.run_think(id)?;
            }
        }

        let World {
            population, actors, ..
        } = &mut *self.world;
        population.retain(|id| actors.contains(*id));

        if self.mode.is_authoritative() {
            self.world.level_time += 1;
        }
        let tic = self.world.level_time;
        self.emit(Event::TimeAdvanced {
            tic,
            mode: self.mode,
        });
        Ok(())
    }
}
