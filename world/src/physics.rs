//! Fixed-point momentum integration.

use actorsim_core::{
    approx_distance, ActorFlags, ActorId, Attenuation, Event, Fixed, SoundChannel, FRACUNIT,
};

use crate::{actor::VIEW_HEIGHT, geometry::MoveOutcome, Sim, SimError};

/// Largest horizontal speed per tic.
const MAXMOVE: Fixed = Fixed::from_int(30);
/// Horizontal speed below which a grounded actor stops.
const STOPSPEED: Fixed = Fixed::from_raw(0x1000);
/// Corpses sliding faster than this off a ledge keep their momentum.
const CORPSE_SLIDE: Fixed = Fixed::from_raw(FRACUNIT / 4);
/// Vertical step of a floating monster closing in on its target.
const FLOATSPEED: Fixed = Fixed::from_int(4);
/// Running frames of a player body, counted from its see state.
const PLAYER_RUN_FRAMES: u16 = 4;

impl Sim<'_> {
    /// Horizontal movement, obstruction handling, and friction for one tic.
    pub(crate) fn xy_movement(&mut self, id: ActorId) -> Result<(), SimError> {
        let Some(actor) = self.world.actor(id) else {
            return Ok(());
        };
        let kind = actor.kind;

        if actor.momx.is_zero() && actor.momy.is_zero() {
            if actor.flags.contains(ActorFlags::SKULLFLY) {
                let spawn_state = self.mobj_info(kind)?.spawn_state;
                if let Some(actor) = self.world.actor_mut(id) {
                    actor.flags.remove(ActorFlags::SKULLFLY);
                    actor.momx = Fixed::ZERO;
                    actor.momy = Fixed::ZERO;
                    actor.momz = Fixed::ZERO;
                }
                let _ = self.set_state(id, spawn_state)?;
            }
            return Ok(());
        }

        let missile = actor.flags.contains(ActorFlags::MISSILE);
        let max = if actor.water_level >= 2 && !missile {
            MAXMOVE / 4
        } else {
            MAXMOVE
        };
        let step = max.shr(1);

        let Some(actor) = self.world.actor_mut(id) else {
            return Ok(());
        };
        actor.momx = actor.momx.clamp_magnitude(max);
        actor.momy = actor.momy.clamp_magnitude(max);
        let mut xmove = actor.momx;
        let mut ymove = actor.momy;

        while !xmove.is_zero() || !ymove.is_zero() {
            let Some(actor) = self.world.actor(id) else {
                return Ok(());
            };
            let body = actor.body(id);
            let is_player = actor.player.is_some();
            let (momx, momy) = (actor.momx, actor.momy);

            let (ptryx, ptryy) = if xmove.abs() > step || ymove.abs() > step {
                let target = (body.x + xmove.shr(1), body.y + ymove.shr(1));
                xmove = xmove.shr(1);
                ymove = ymove.shr(1);
                target
            } else {
                let target = (body.x + xmove, body.y + ymove);
                xmove = Fixed::ZERO;
                ymove = Fixed::ZERO;
                target
            };

            match self.world.geometry.try_move(&body, ptryx, ptryy) {
                MoveOutcome::Moved(bounds) => {
                    if let Some(actor) = self.world.actor_mut(id) {
                        actor.x = ptryx;
                        actor.y = ptryy;
                        actor.apply_bounds(bounds);
                    }
                }
                MoveOutcome::Blocked { .. } if is_player => {
                    let slide = self.world.geometry.slide_move(&body, momx, momy);
                    if let Some(actor) = self.world.actor_mut(id) {
                        match slide {
                            Some(slide) => {
                                actor.x = slide.x;
                                actor.y = slide.y;
                                actor.momx = slide.momx;
                                actor.momy = slide.momy;
                                actor.apply_bounds(slide.bounds);
                            }
                            None => {
                                actor.momx = Fixed::ZERO;
                                actor.momy = Fixed::ZERO;
                            }
                        }
                    }
                    break;
                }
                MoveOutcome::Blocked { against_sky } if missile => {
                    if against_sky {
                        log::trace!("{id:?} flew into the sky");
                        self.destroy(id);
                    } else {
                        self.explode_missile(id)?;
                    }
                    return Ok(());
                }
                MoveOutcome::Blocked { .. } => {
                    if let Some(actor) = self.world.actor_mut(id) {
                        actor.momx = Fixed::ZERO;
                        actor.momy = Fixed::ZERO;
                    }
                    break;
                }
            }
        }

        let no_momentum = self
            .world
            .active_player(id)
            .is_some_and(|player| player.no_momentum);
        if no_momentum {
            if let Some(actor) = self.world.actor_mut(id) {
                actor.momx = Fixed::ZERO;
                actor.momy = Fixed::ZERO;
            }
        }

        self.apply_friction(id)
    }

    fn apply_friction(&mut self, id: ActorId) -> Result<(), SimError> {
        let Some(actor) = self.world.actor(id) else {
            return Ok(());
        };
        if actor.flags.intersects(ActorFlags::MISSILE | ActorFlags::SKULLFLY) {
            return Ok(());
        }

        if actor.z > actor.floor_z
            && !actor.flags.contains(ActorFlags::FLY)
            && actor.water_level == 0
        {
            let air = self.world.config.air_friction();
            if actor.player.is_some() && air != Fixed::ONE {
                if let Some(actor) = self.world.actor_mut(id) {
                    actor.momx = actor.momx.fixed_mul(air);
                    actor.momy = actor.momy.fixed_mul(air);
                }
            }
            return Ok(());
        }

        if actor.flags.contains(ActorFlags::CORPSE)
            && (actor.momx.abs() > CORPSE_SLIDE || actor.momy.abs() > CORPSE_SLIDE)
            && actor.floor_z != actor.sector_floor
        {
            return Ok(());
        }

        let active = self.world.active_player(id);
        let has_input = active.is_some_and(|player| player.has_input());
        if actor.momx.abs() < STOPSPEED && actor.momy.abs() < STOPSPEED && !has_input {
            if active.is_some() {
                let info = self.mobj_info(actor.kind)?;
                let run = info.see_state;
                let spawn_state = info.spawn_state;
                let state = actor.state;
                if state >= run && state < run.offset(PLAYER_RUN_FRAMES) {
                    let _ = self.set_state(id, spawn_state)?;
                }
            }
            if let Some(actor) = self.world.actor_mut(id) {
                actor.momx = Fixed::ZERO;
                actor.momy = Fixed::ZERO;
            }
            return Ok(());
        }

        let body = actor.body(id);
        let friction = self
            .world
            .geometry
            .friction(&body)
            .unwrap_or(self.world.config.friction);
        if let Some(actor) = self.world.actor_mut(id) {
            actor.momx = actor.momx.fixed_mul(friction);
            actor.momy = actor.momy.fixed_mul(friction);
        }
        Ok(())
    }

    /// Vertical movement, gravity, and floor and ceiling impacts for one tic.
    pub(crate) fn z_movement(&mut self, id: ActorId) -> Result<(), SimError> {
        let Some(actor) = self.world.actor(id) else {
            return Ok(());
        };
        let flags = actor.flags;
        let mut gravity = self.world.config.gravity_per_tic();
        if flags.contains(ActorFlags::LOGRAV) {
            gravity = gravity.shr(1);
        }

        let (z, floor_z) = (actor.z, actor.floor_z);
        if let Some(player) = self.world.active_player_mut(id) {
            if z < floor_z {
                player.view_height -= floor_z - z;
                player.delta_view_height = (VIEW_HEIGHT - player.view_height).shr(3);
            }
        }

        let target = self
            .world
            .actor(id)
            .and_then(|actor| actor.target)
            .and_then(|target| self.world.actor(target))
            .map(|target| (target.x, target.y, target.z));
        let Some(actor) = self.world.actor_mut(id) else {
            return Ok(());
        };
        actor.z += actor.momz;

        if flags.contains(ActorFlags::FLOAT)
            && !flags.intersects(ActorFlags::SKULLFLY | ActorFlags::INFLOAT)
        {
            if let Some((tx, ty, tz)) = target {
                let dist = approx_distance(actor.x - tx, actor.y - ty);
                let delta = (tz + actor.height.shr(1)) - actor.z;
                if delta < Fixed::ZERO && dist < -(delta * 3) {
                    actor.z -= FLOATSPEED;
                } else if delta > Fixed::ZERO && dist < delta * 3 {
                    actor.z += FLOATSPEED;
                }
            }
        }

        let mut landed_hard = None;
        if actor.z <= actor.floor_z {
            if flags.contains(ActorFlags::SKULLFLY) {
                actor.momz = -actor.momz;
            }
            if actor.momz < Fixed::ZERO {
                if actor.player.is_some() && actor.momz < -(gravity * 8) {
                    landed_hard = Some(actor.momz);
                }
                actor.momz = Fixed::ZERO;
            }
            actor.z = actor.floor_z;

            if flags.contains(ActorFlags::MISSILE) && !flags.contains(ActorFlags::NOCLIP) {
                self.sync_geometry(id);
                self.explode_missile(id)?;
                return Ok(());
            }
        } else if !flags.contains(ActorFlags::NOGRAVITY) {
            if actor.momz.is_zero() {
                actor.momz = -(gravity * 2);
            } else {
                actor.momz -= gravity;
            }
        }

        if actor.z + actor.height > actor.ceiling_z {
            if actor.momz > Fixed::ZERO {
                actor.momz = Fixed::ZERO;
            }
            actor.z = actor.ceiling_z - actor.height;
            if flags.contains(ActorFlags::SKULLFLY) {
                actor.momz = -actor.momz;
            }
            if flags.contains(ActorFlags::MISSILE) && !flags.contains(ActorFlags::NOCLIP) {
                self.sync_geometry(id);
                self.explode_missile(id)?;
                return Ok(());
            }
        }

        self.sync_geometry(id);
        if let Some(momz) = landed_hard {
            if let Some(player) = self.world.active_player_mut(id) {
                player.delta_view_height = momz.shr(3);
            }
            self.start_sound(id, SoundChannel::Auto, "*land1", Attenuation::Normal);
        }
        Ok(())
    }

    /// Stops a projectile and plays out its detonation.
    pub(crate) fn explode_missile(&mut self, id: ActorId) -> Result<(), SimError> {
        let Some(actor) = self.world.actor_mut(id) else {
            return Ok(());
        };
        actor.momx = Fixed::ZERO;
        actor.momy = Fixed::ZERO;
        actor.momz = Fixed::ZERO;
        let kind = actor.kind;

        let info = self.mobj_info(kind)?;
        let (death_state, death_sound) = (info.death_state, info.death_sound);
        if !self.set_state(id, death_state)? {
            return Ok(());
        }

        let jitter = self.random() & 3;
        if let Some(actor) = self.world.actor_mut(id) {
            actor.translucency = Fixed::ONE;
            actor.tics = (actor.tics - jitter).max(1);
            actor.flags.remove(ActorFlags::MISSILE);
        }
        log::trace!("{id:?} exploded");

        if self.mode().is_authoritative() {
            self.emit(Event::MissileExploded { actor: id });
        }
        if let Some(sound) = death_sound {
            self.start_sound(id, SoundChannel::Voice, sound, Attenuation::Normal);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actorsim_core::{MobjType, PlayerSlot, RefSlot, SimMode, SpawnHeight, SpriteNum, StateNum};

    use crate::{
        geometry::OpenArena,
        info::{
            ActorTables, MobjInfo, StateInfo, MT_HEAD, MT_PLAYER, MT_ROCKET, MT_SKULL, MT_TROOP,
            S_EXPLODE1, S_PLAY, S_PLAY_RUN1, S_ROCKET, S_SKULL_STND,
        },
        testing::{arena_world, sounds, world_with},
        LevelConfig, World,
    };

    use super::*;

    fn spawn(sim: &mut Sim<'_>, kind: MobjType, x: i32, height: SpawnHeight) -> ActorId {
        sim.spawn(kind, Fixed::from_int(x), Fixed::ZERO, height)
            .expect("spawn")
    }

    #[test]
    fn momentum_below_stop_speed_vanishes_in_one_tic() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = spawn(&mut sim, MT_TROOP, 0, SpawnHeight::OnFloor);
        if let Some(actor) = sim.world.actor_mut(imp) {
            actor.momx = Fixed::from_raw(0x0fff);
            actor.momy = Fixed::from_raw(-0x0800);
        }

        sim.run_think(imp).expect("think");
        let actor = sim.world.actor(imp).expect("live");
        assert_eq!((actor.momx, actor.momy), (Fixed::ZERO, Fixed::ZERO));
        assert_eq!(actor.x, Fixed::from_raw(0x0fff));
    }

    #[test]
    fn ground_friction_scales_momentum() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = spawn(&mut sim, MT_TROOP, 0, SpawnHeight::OnFloor);
        if let Some(actor) = sim.world.actor_mut(imp) {
            actor.momx = Fixed::from_int(8);
        }

        sim.run_think(imp).expect("think");
        let actor = sim.world.actor(imp).expect("live");
        assert_eq!(actor.x, Fixed::from_int(8));
        assert_eq!(
            actor.momx,
            Fixed::from_int(8).fixed_mul(LevelConfig::default().friction)
        );
    }

    #[test]
    fn fast_movers_are_clamped_and_sub_stepped() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = spawn(&mut sim, MT_TROOP, 0, SpawnHeight::OnFloor);
        if let Some(actor) = sim.world.actor_mut(imp) {
            actor.momx = Fixed::from_int(100);
        }

        sim.xy_movement(imp).expect("move");
        let actor = sim.world.actor(imp).expect("live");
        assert_eq!(actor.x, MAXMOVE);
    }

    #[test]
    fn water_slows_walkers() {
        let mut world = world_with(
            LevelConfig::default(),
            OpenArena::new(1024, 0, 256).with_water(40),
        );
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = spawn(&mut sim, MT_TROOP, 0, SpawnHeight::OnFloor);
        assert_eq!(sim.world.actor(imp).map(|actor| actor.water_level), Some(2));
        if let Some(actor) = sim.world.actor_mut(imp) {
            actor.momx = Fixed::from_int(20);
        }

        sim.xy_movement(imp).expect("move");
        assert_eq!(sim.world.actor(imp).map(|actor| actor.x), Some(MAXMOVE / 4));
    }

    #[test]
    fn ankle_deep_water_leaves_walkers_at_full_speed() {
        let mut world = world_with(
            LevelConfig::default(),
            OpenArena::new(1024, 0, 256).with_water(8),
        );
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = spawn(&mut sim, MT_TROOP, 0, SpawnHeight::OnFloor);
        assert_eq!(sim.world.actor(imp).map(|actor| actor.water_level), Some(1));
        if let Some(actor) = sim.world.actor_mut(imp) {
            actor.momx = Fixed::from_int(20);
        }

        sim.xy_movement(imp).expect("move");
        assert_eq!(
            sim.world.actor(imp).map(|actor| actor.x),
            Some(Fixed::from_int(20))
        );
    }

    #[test]
    fn landed_actors_block_at_their_new_height() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let faller = spawn(&mut sim, MT_TROOP, 0, SpawnHeight::At(Fixed::from_int(200)));
        for _ in 0..60 {
            sim.run_think(faller).expect("fall");
        }
        let landed = sim.world.actor(faller).expect("live");
        assert_eq!(landed.z, landed.floor_z);

        let walker = spawn(&mut sim, MT_TROOP, -60, SpawnHeight::OnFloor);
        if let Some(actor) = sim.world.actor_mut(walker) {
            actor.momx = MAXMOVE;
        }
        sim.xy_movement(walker).expect("move");
        let actor = sim.world.actor(walker).expect("live");
        assert_eq!(actor.x, Fixed::from_int(-45));
        assert_eq!(actor.momx, Fixed::ZERO);
    }

    #[test]
    fn walls_stop_walkers() {
        let mut world = world_with(LevelConfig::default(), OpenArena::new(64, 0, 256));
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = spawn(&mut sim, MT_TROOP, 30, SpawnHeight::OnFloor);
        if let Some(actor) = sim.world.actor_mut(imp) {
            actor.momx = Fixed::from_int(20);
        }

        sim.xy_movement(imp).expect("move");
        let actor = sim.world.actor(imp).expect("live");
        assert_eq!(actor.momx, Fixed::ZERO);
        assert!(actor.x <= Fixed::from_int(44));
    }

    #[test]
    fn missile_hitting_the_floor_explodes_in_the_same_tic() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let rocket = spawn(&mut sim, MT_ROCKET, 0, SpawnHeight::At(Fixed::from_int(2)));
        if let Some(actor) = sim.world.actor_mut(rocket) {
            actor.momz = Fixed::from_int(-10);
        }

        sim.run_think(rocket).expect("think");
        let actor = sim.world.actor(rocket).expect("exploding");
        assert_eq!(actor.state, S_EXPLODE1);
        assert!(!actor.flags.contains(ActorFlags::MISSILE));
        assert_eq!(actor.momz, Fixed::ZERO);
        assert!(events
            .iter()
            .any(|event| *event == Event::MissileExploded { actor: rocket }));
        assert_eq!(sounds(&events), vec!["weapons/rocklx"]);
    }

    #[test]
    fn explosions_turn_opaque_and_always_expire() {
        let mut tables = ActorTables::stock();
        let smoulder = tables.add_state(StateInfo {
            sprite: SpriteNum::new(5),
            frame: 0,
            tics: -1,
            action: None,
            next: StateNum::NULL,
        });
        let dud = tables.add_type(MobjInfo {
            death_state: smoulder,
            flags: ActorFlags::MISSILE | ActorFlags::NOGRAVITY | ActorFlags::NOBLOCKMAP,
            translucency: Fixed::ONE.shr(1),
            ..MobjInfo::new("Dud", S_ROCKET)
        });
        let mut world = World::new(
            LevelConfig::default(),
            Arc::new(tables),
            Box::new(OpenArena::new(1024, 0, 256)),
        );
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let shell = spawn(&mut sim, dud, 0, SpawnHeight::At(Fixed::from_int(64)));
        let rocket = spawn(&mut sim, MT_ROCKET, 100, SpawnHeight::At(Fixed::from_int(64)));
        if let Some(actor) = sim.world.actor_mut(rocket) {
            actor.translucency = Fixed::ONE.shr(2);
        }

        sim.explode_missile(shell).expect("explode");
        sim.explode_missile(rocket).expect("explode");
        let shell = sim.world.actor(shell).expect("smouldering");
        assert_eq!(shell.state, smoulder);
        assert_eq!(shell.tics, 1);
        assert_eq!(shell.translucency, Fixed::ONE);
        let rocket = sim.world.actor(rocket).expect("exploding");
        assert_eq!(rocket.translucency, Fixed::ONE);
        assert!(rocket.tics >= 1);
    }

    #[test]
    fn missile_flying_into_the_sky_vanishes_silently() {
        let mut world = world_with(
            LevelConfig::default(),
            OpenArena::new(64, 0, 256).with_sky(),
        );
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let rocket = spawn(&mut sim, MT_ROCKET, 40, SpawnHeight::At(Fixed::from_int(100)));
        if let Some(actor) = sim.world.actor_mut(rocket) {
            actor.momx = Fixed::from_int(20);
        }

        sim.run_think(rocket).expect("think");
        assert!(!sim.world.is_live(rocket));
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::MissileExploded { .. })));
        assert!(sounds(&events).is_empty());
    }

    #[test]
    fn missile_hitting_a_wall_explodes() {
        let mut world = world_with(LevelConfig::default(), OpenArena::new(64, 0, 256));
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let rocket = spawn(&mut sim, MT_ROCKET, 40, SpawnHeight::At(Fixed::from_int(100)));
        if let Some(actor) = sim.world.actor_mut(rocket) {
            actor.momx = Fixed::from_int(20);
        }

        sim.run_think(rocket).expect("think");
        assert_eq!(
            sim.world.actor(rocket).map(|actor| actor.state),
            Some(S_EXPLODE1)
        );
    }

    #[test]
    fn gravity_pulls_and_floor_stops() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let imp = spawn(&mut sim, MT_TROOP, 0, SpawnHeight::At(Fixed::from_int(20)));
        let gravity = sim.world.config.gravity_per_tic();

        sim.z_movement(imp).expect("fall");
        let actor = sim.world.actor(imp).expect("live");
        assert_eq!(actor.momz, -(gravity * 2));

        for _ in 0..20 {
            sim.z_movement(imp).expect("fall");
        }
        let actor = sim.world.actor(imp).expect("live");
        assert_eq!(actor.z, actor.floor_z);
        assert_eq!(actor.momz, Fixed::ZERO);
    }

    #[test]
    fn hard_player_landing_jolts_the_view_and_makes_noise() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let body = spawn(&mut sim, MT_PLAYER, 0, SpawnHeight::At(Fixed::from_int(4)));
        let slot = PlayerSlot::new(0);
        sim.world.players[0].body = Some(body);
        if let Some(actor) = sim.world.actor_mut(body) {
            actor.player = Some(slot);
            actor.momz = Fixed::from_int(-12);
        }

        sim.z_movement(body).expect("land");
        assert_eq!(sounds(&events), vec!["*land1"]);
        assert_eq!(
            world.players[0].delta_view_height,
            Fixed::from_int(-12).shr(3)
        );
    }

    #[test]
    fn skull_stops_flying_when_momentum_runs_out() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let skull = spawn(&mut sim, MT_SKULL, 0, SpawnHeight::At(Fixed::from_int(40)));
        if let Some(actor) = sim.world.actor_mut(skull) {
            actor.flags.insert(ActorFlags::SKULLFLY);
            actor.momz = Fixed::from_int(3);
            actor.state = actor.state.offset(1);
        }

        sim.xy_movement(skull).expect("stop");
        let actor = sim.world.actor(skull).expect("live");
        assert!(!actor.flags.contains(ActorFlags::SKULLFLY));
        assert_eq!(actor.momz, Fixed::ZERO);
        assert_eq!(actor.state, S_SKULL_STND);
    }

    #[test]
    fn floaters_close_in_on_their_target_height() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let caco = spawn(&mut sim, MT_HEAD, 0, SpawnHeight::At(Fixed::from_int(100)));
        let prey = spawn(&mut sim, MT_TROOP, 40, SpawnHeight::OnFloor);
        sim.world.set_ref(caco, RefSlot::Target, Some(prey));

        sim.z_movement(caco).expect("float");
        assert_eq!(
            sim.world.actor(caco).map(|actor| actor.z),
            Some(Fixed::from_int(96))
        );
    }

    #[test]
    fn idle_player_returns_to_standing_frame() {
        let mut world = arena_world();
        let mut events = Vec::new();
        let mut sim = Sim::new(&mut world, SimMode::Authoritative, &mut events);
        let body = spawn(&mut sim, MT_PLAYER, 0, SpawnHeight::OnFloor);
        sim.world.players[0].body = Some(body);
        if let Some(actor) = sim.world.actor_mut(body) {
            actor.player = Some(PlayerSlot::new(0));
            actor.momx = Fixed::from_raw(0x0800);
        }
        assert!(sim.set_state(body, S_PLAY_RUN1.offset(2)).expect("run"));

        sim.xy_movement(body).expect("move");
        assert_eq!(sim.world.actor(body).map(|actor| actor.state), Some(S_PLAY));
    }
}
