//! Animation and behavior state machine driver.

use actorsim_core::{
    ActorFlags, ActorId, Attenuation, Fade, Fixed, SoundChannel, StateNum, FRACUNIT, TICRATE,
};

use crate::{actor::Actor, Sim, SimError};

/// Most states one outermost advance may enter.
pub const STATE_RECURSION_LIMIT: u32 = 16;
/// Opacity gained per tic while fading in.
const FADE_IN_STEP: Fixed = Fixed::from_raw(2 * FRACUNIT / TICRATE as i32);
/// Opacity lost per tic while fading out.
const FADE_OUT_STEP: Fixed = Fixed::from_raw(3 * FRACUNIT / TICRATE as i32 / 2);

impl Sim<'_> {
    /// Moves an actor into `state`, running entry actions and following
    /// zero-duration states.
    ///
    /// Returns `Ok(false)` when the actor no longer exists afterwards, either
    /// because the chain reached the null state or because an action removed
    /// it. Nested calls made from actions share one transition budget.
    ///
    /// # Errors
    ///
    /// [`SimError::StateRecursion`] when the chain does not settle within
    /// [`STATE_RECURSION_LIMIT`] states, and [`SimError::UnknownState`] for a
    /// state outside the table.
    pub fn set_state(&mut self, actor: ActorId, state: StateNum) -> Result<bool, SimError> {
        self.nesting += 1;
        let result = self.advance(actor, state);
        self.nesting -= 1;
        if self.nesting == 0 {
            self.entered = 0;
        }
        result
    }

    fn advance(&mut self, id: ActorId, mut state: StateNum) -> Result<bool, SimError> {
        loop {
            let Some(kind) = self.world.actor(id).map(|actor| actor.kind) else {
                return Ok(false);
            };
            if state.is_null() {
                self.destroy(id);
                return Ok(false);
            }
            if self.entered >= STATE_RECURSION_LIMIT {
                return Err(SimError::StateRecursion {
                    kind: kind.index() as u16,
                    state: state.index() as u16,
                    limit: STATE_RECURSION_LIMIT,
                });
            }
            self.entered += 1;

            let info = self.state_info(kind, state)?;
            if let Some(actor) = self.world.actor_mut(id) {
                actor.state = state;
                actor.tics = info.tics;
                actor.sprite = info.sprite;
                actor.frame = info.frame;
            }

            if let Some(action) = info.action {
                action.invoke(self, id)?;
            }
            match self.world.actor(id) {
                None => return Ok(false),
                Some(actor) if actor.tics != 0 => return Ok(true),
                Some(_) => state = info.next,
            }
        }
    }

    /// Runs one tic of an actor: fading, movement, then the state countdown.
    pub(crate) fn run_think(&mut self, id: ActorId) -> Result<(), SimError> {
        let Some(actor) = self.world.actor_mut(id) else {
            return Ok(());
        };
        step_fade(actor);
        if !actor.momx.is_zero()
            || !actor.momy.is_zero()
            || actor.flags.contains(ActorFlags::SKULLFLY)
        {
            self.xy_movement(id)?;
        }

        let Some(actor) = self.world.actor(id) else {
            return Ok(());
        };
        if actor.z != actor.floor_z || !actor.momz.is_zero() {
            self.z_movement(id)?;
        }

        self.refresh_water_level(id);
        let Some(actor) = self.world.actor_mut(id) else {
            return Ok(());
        };
        if actor.tics == -1 {
            if self.mode().is_authoritative() {
                self.nightmare_poll(id)?;
            }
            return Ok(());
        }

        actor.tics -= 1;
        if actor.tics == 0 {
            let (kind, state) = (actor.kind, actor.state);
            let next = self.state_info(kind, state)?.next;
            let _ = self.set_state(id, next)?;
        }
        Ok(())
    }
}

/// Moves translucency one tic along the actor's fade, settling at either
/// limit.
fn step_fade(actor: &mut Actor) {
    match actor.fade {
        Fade::Steady => {}
        Fade::In => {
            actor.translucency += FADE_IN_STEP;
            if actor.translucency > Fixed::ONE {
                actor.translucency = Fixed::ONE;
                actor.fade = Fade::Steady;
            }
        }
        Fade::Out => {
            actor.translucency -= FADE_OUT_STEP;
            if actor.translucency < Fixed::ZERO {
                actor.translucency = Fixed::ZERO;
                actor.fade = Fade::Steady;
            }
        }
    }
}

/// Plays the death sound of the actor's type.
///
/// # Errors
///
/// Fails when the actor's type is outside the table.
pub fn a_scream(sim: &mut Sim<'_>, actor: ActorId) -> Result<(), SimError> {
    let Some(kind) = sim.world.actor(actor).map(|body| body.kind) else {
        return Ok(());
    };
    if let Some(sound) = sim.mobj_info(kind)?.death_sound {
        sim.start_sound(actor, SoundChannel::Voice, sound, Attenuation::Normal);
    }
    Ok(())
}

/// Lets other actors walk over the body.
///
/// # Errors
///
/// Never fails; the signature matches [`crate::ActionFn`].
pub fn a_fall(sim: &mut Sim<'_>, actor: ActorId) -> Result<(), SimError> {
    if let Some(body) = sim.world.actor_mut(actor) {
        body.flags.remove(ActorFlags::SOLID);
        sim.sync_geometry(actor);
    }
    Ok(())
}

/// Plays the pain sound of the actor's type.
///
/// # Errors
///
/// Fails when the actor's type is outside the table.
pub fn a_pain(sim: &mut Sim<'_>, actor: ActorId) -> Result<(), SimError> {
    let Some(kind) = sim.world.actor(actor).map(|body| body.kind) else {
        return Ok(());
    };
    if let Some(sound) = sim.mobj_info(kind)?.pain_sound {
        sim.start_sound(actor, SoundChannel::Voice, sound, Attenuation::Normal);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use actorsim_core::{Event, SimMode, SpawnHeight};

    use crate::{
        info::{MT_TROOP, S_TROO_DIE1, S_TROO_DIE5},
        testing::{arena_world, sounds},
        Sim,
    };

    use super::*;

    #[test]
    fn entering_a_state_binds_its_frame_and_runs_the_action() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = sim
            .spawn(MT_TROOP, Fixed::ZERO, Fixed::ZERO, SpawnHeight::OnFloor)
            .expect("spawn");

        assert!(sim.set_state(imp, S_TROO_DIE1.offset(1)).expect("advance"));
        let actor = sim.world.actor(imp).expect("live");
        assert_eq!(actor.state, S_TROO_DIE1.offset(1));
        assert_eq!(actor.tics, 8);
        assert_eq!(actor.frame, 9);
        assert_eq!(sounds(&events), vec!["imp/death1"]);
    }

    #[test]
    fn countdown_advances_through_the_death_sequence_and_rests() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = sim
            .spawn(MT_TROOP, Fixed::ZERO, Fixed::ZERO, SpawnHeight::OnFloor)
            .expect("spawn");
        assert!(sim.set_state(imp, S_TROO_DIE1).expect("advance"));

        for _ in 0..200 {
            sim.run_think(imp).expect("think");
        }
        let actor = sim.world.actor(imp).expect("corpse stays");
        assert_eq!(actor.state, S_TROO_DIE5);
        assert_eq!(actor.tics, -1);
        assert!(!actor.flags.contains(ActorFlags::SOLID));
    }

    #[test]
    fn null_state_destroys_the_actor() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = sim
            .spawn(MT_TROOP, Fixed::ZERO, Fixed::ZERO, SpawnHeight::OnFloor)
            .expect("spawn");

        assert!(!sim.set_state(imp, StateNum::NULL).expect("advance"));
        assert!(!sim.world.is_live(imp));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ActorDestroyed { actor, .. } if *actor == imp)));
    }

    #[test]
    fn unknown_state_is_fatal() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = sim
            .spawn(MT_TROOP, Fixed::ZERO, Fixed::ZERO, SpawnHeight::OnFloor)
            .expect("spawn");

        let error = sim
            .set_state(imp, StateNum::new(9_000))
            .expect_err("state outside the table");
        assert_eq!(
            error,
            SimError::UnknownState {
                kind: MT_TROOP.index() as u16,
                state: 9_000,
            }
        );
    }

    #[test]
    fn fading_out_bottoms_out_at_invisible() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = sim
            .spawn(MT_TROOP, Fixed::ZERO, Fixed::ZERO, SpawnHeight::OnFloor)
            .expect("spawn");
        if let Some(actor) = sim.world.actor_mut(imp) {
            actor.translucency = Fixed::from_raw(2_000);
            actor.fade = Fade::Out;
        }

        sim.run_think(imp).expect("think");
        let actor = sim.world.actor(imp).expect("live");
        assert_eq!(actor.translucency, Fixed::ZERO);
        assert_eq!(actor.fade, Fade::Steady);

        sim.run_think(imp).expect("think");
        assert_eq!(
            sim.world.actor(imp).map(|actor| actor.translucency),
            Some(Fixed::ZERO)
        );
    }

    #[test]
    fn speculative_actions_stay_silent() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let imp = Sim::new(&mut world, SimMode::Authoritative, &mut events)
            .spawn(MT_TROOP, Fixed::ZERO, Fixed::ZERO, SpawnHeight::OnFloor)
            .expect("spawn");
        events.clear();

        let mut sim = Sim::new(&mut world, SimMode::Speculative, &mut events);
        assert!(sim.set_state(imp, S_TROO_DIE1.offset(1)).expect("advance"));
        assert!(sounds(&events).is_empty());
        assert_eq!(
            world.actor(imp).map(|actor| actor.state),
            Some(S_TROO_DIE1.offset(1))
        );
    }
}
