//! Actor construction, teardown, and the spawns gameplay reacts with.

use std::sync::Arc;

use actorsim_core::{
    pitch_slope, vector_length, ActorFlags, ActorId, Angle, Attenuation, Event, Fade, Fixed,
    MapSpawnRecord, MapThingFlags, MobjType, NetId, PlayerSlot, RefSlot, SoundChannel, SpawnHeight,
    ThingId,
};

use crate::{
    actor::{Actor, DEFAULT_AIM_DISTANCE, REF_SLOTS, VIEW_HEIGHT},
    config::{GameMode, Skill},
    geometry::MoveOutcome,
    Sim, SimError,
};

/// Editor number of a deathmatch start.
const DEATHMATCH_START: u16 = 11;
/// Editor numbers of the cooperative player starts.
const PLAYER_STARTS: std::ops::RangeInclusive<u16> = 1..=4;
/// Height above the shooter's feet at which projectiles leave.
const MISSILE_HEIGHT: Fixed = Fixed::from_int(32);
/// Reach of the player's aim assistance.
const AIM_RANGE: Fixed = Fixed::from_int(1024);
/// Angular offset of the side aim probes.
const AIM_SPREAD: Angle = Angle::from_raw(1 << 26);

impl Sim<'_> {
    /// Constructs an actor of `kind` and links it into the world.
    ///
    /// The spawn state is bound without running its action.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownActorType`] when `kind` is outside the type table and
    /// [`SimError::UnknownState`] when its spawn state is.
    pub fn spawn(
        &mut self,
        kind: MobjType,
        x: Fixed,
        y: Fixed,
        height: SpawnHeight,
    ) -> Result<ActorId, SimError> {
        let tables = Arc::clone(&self.world.tables);
        let info = tables.mobj(kind).ok_or(SimError::UnknownActorType {
            kind: kind.index() as u16,
            count: tables.type_count(),
        })?;
        let state = self.state_info(kind, info.spawn_state)?;
        let reaction_time = if self.world.config.skill == Skill::Nightmare {
            0
        } else {
            info.reaction_time
        };

        let id = self.world.actors.insert(Actor {
            kind,
            x,
            y,
            z: Fixed::ZERO,
            angle: Angle::ZERO,
            pitch: Angle::ZERO,
            roll: Angle::ZERO,
            momx: Fixed::ZERO,
            momy: Fixed::ZERO,
            momz: Fixed::ZERO,
            radius: info.radius,
            height: info.height,
            floor_z: Fixed::ZERO,
            ceiling_z: Fixed::ZERO,
            sector_floor: Fixed::ZERO,
            sprite: state.sprite,
            frame: state.frame,
            translucency: info.translucency,
            fade: Fade::Steady,
            state: info.spawn_state,
            tics: state.tics,
            flags: info.flags,
            health: info.spawn_health,
            reaction_time,
            threshold: 0,
            move_count: 0,
            tid: ThingId::NONE,
            net_id: NetId::new(0),
            target: None,
            last_enemy: None,
            tracer: None,
            goal: None,
            player: None,
            spawn_point: MapSpawnRecord::default(),
            water_level: 0,
            touch: None,
        });

        let net_id = self.world.net_ids.allocate();
        if let Some(body) = self.world.actor(id).map(|actor| actor.body(id)) {
            let linkage = self.world.geometry.link(&body);
            if let Some(actor) = self.world.actor_mut(id) {
                actor.apply_bounds(linkage.bounds);
                actor.touch = linkage.touch;
                actor.z = match height {
                    SpawnHeight::OnFloor => linkage.bounds.floor_z,
                    SpawnHeight::OnCeiling => linkage.bounds.ceiling_z - actor.height,
                    SpawnHeight::At(z) => z,
                };
                actor.net_id = net_id;
            }
        }
        self.sync_geometry(id);
        self.refresh_water_level(id);

        self.world.population.push(id);
        let _ = self.world.net_lookup.insert(net_id, id);
        self.emit(Event::ActorSpawned { actor: id, kind });
        log::debug!("spawned {} as {id:?}", info.name);
        Ok(id)
    }

    /// Realizes one placement from level data.
    ///
    /// Player and deathmatch starts are recorded instead of spawned, and
    /// placements filtered out by skill or game mode produce nothing.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`Sim::spawn`].
    pub fn spawn_map_thing(
        &mut self,
        record: MapSpawnRecord,
    ) -> Result<Option<ActorId>, SimError> {
        match record.kind {
            0 => return Ok(None),
            DEATHMATCH_START => {
                self.world.deathmatch_starts.push(record);
                return Ok(None);
            }
            kind if PLAYER_STARTS.contains(&kind) => {
                self.world.player_starts[usize::from(kind - 1)] = Some(record);
                return Ok(None);
            }
            _ => {}
        }

        let config = &self.world.config;
        if !record.flags.contains(config.game_mode.spawn_filter())
            || !record.flags.contains(config.skill.spawn_filter())
        {
            return Ok(None);
        }

        let tables = Arc::clone(&self.world.tables);
        let usable = tables.by_editor_number(record.kind).filter(|kind| {
            tables
                .mobj(*kind)
                .and_then(|info| tables.state(info.spawn_state))
                .and_then(|state| tables.sprite(state.sprite))
                .is_some_and(|sprite| sprite.frames > 0)
        });
        let kind = match usable {
            Some(kind) => kind,
            None => {
                log::warn!(
                    "unknown type {} at ({}, {})",
                    record.kind,
                    record.x,
                    record.y
                );
                self.emit(Event::ThingSubstituted {
                    editor_number: record.kind,
                    x: record.x,
                    y: record.y,
                });
                tables.roles().unknown
            }
        };
        let info = self.mobj_info(kind)?;
        let flags = info.flags;

        if self.world.config.game_mode == GameMode::Deathmatch
            && flags.contains(ActorFlags::NOTDMATCH)
        {
            return Ok(None);
        }

        let on_ceiling = flags.contains(ActorFlags::SPAWNCEILING);
        let height = if on_ceiling {
            SpawnHeight::OnCeiling
        } else {
            SpawnHeight::OnFloor
        };
        let id = self.spawn(
            kind,
            Fixed::from_int(record.x.into()),
            Fixed::from_int(record.y.into()),
            height,
        )?;

        let jitter = self.random();
        let authoritative = self.mode().is_authoritative();
        if let Some(actor) = self.world.actor_mut(id) {
            let offset = Fixed::from_int(record.z.into());
            if on_ceiling {
                actor.z -= offset;
            } else {
                actor.z += offset;
            }
            if actor.tics > 0 {
                actor.tics = 1 + jitter % actor.tics;
            }
            actor.angle = Angle::from_map_degrees(record.angle);
            if record.flags.contains(MapThingFlags::AMBUSH) {
                actor.flags.insert(ActorFlags::AMBUSH);
            }
            if record.flags.contains(MapThingFlags::DORMANT) {
                actor.flags.insert(ActorFlags::DORMANT);
            }
            actor.spawn_point = record;
        }
        if authoritative {
            let counters = &mut self.world.counters;
            if flags.contains(ActorFlags::COUNTKILL) {
                counters.total_kills += 1;
            }
            if flags.contains(ActorFlags::COUNTITEM) {
                counters.total_items += 1;
            }
            if flags.contains(ActorFlags::COUNTSECRET) {
                counters.total_secrets += 1;
            }
        }
        self.world.set_thing_id(id, record.tid);
        self.sync_geometry(id);
        Ok(Some(id))
    }

    /// Spawns a body for `slot` at its recorded start and binds it.
    ///
    /// A previous body stays in the world as an unowned actor.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`Sim::spawn`].
    pub fn spawn_player(&mut self, slot: PlayerSlot) -> Result<Option<ActorId>, SimError> {
        let Some(start) = self.world.player_starts.get(slot.index()).copied().flatten() else {
            log::warn!("no start for player {}", slot.index() + 1);
            return Ok(None);
        };

        if let Some(old) = self.world.players[slot.index()].body {
            if let Some(actor) = self.world.actor_mut(old) {
                actor.player = None;
            }
        }

        let kind = self.world.tables.roles().player;
        let id = self.spawn(
            kind,
            Fixed::from_int(start.x.into()),
            Fixed::from_int(start.y.into()),
            SpawnHeight::OnFloor,
        )?;
        if let Some(actor) = self.world.actor_mut(id) {
            actor.angle = Angle::from_map_degrees(start.angle);
            actor.player = Some(slot);
            actor.spawn_point = start;
        }
        let player = &mut self.world.players[slot.index()];
        player.body = Some(id);
        player.view_height = VIEW_HEIGHT;
        player.delta_view_height = Fixed::ZERO;
        Ok(Some(id))
    }

    /// Tears an actor down along the single removal path.
    ///
    /// Stale handles are ignored. A speculative run only hides the actor from
    /// the rest of the prediction and takes it out of collision until
    /// [`crate::World::clear_prediction`].
    pub fn destroy(&mut self, id: ActorId) {
        let Some(touch) = self.world.actor(id).map(|actor| actor.touch) else {
            return;
        };
        if !self.mode().is_authoritative() {
            self.world.geometry.unlink(id, touch);
            if let Some(actor) = self.world.actor_mut(id) {
                actor.touch = None;
            }
            let _ = self.world.predicted_gone.insert(id);
            log::trace!("{id:?} hidden from prediction");
            return;
        }

        self.world.tids.remove(id);
        self.world.geometry.unlink(id, touch);
        self.emit(Event::SoundDetached { actor: id });

        for (holder, slot) in self.world.refs.take_holders(id) {
            if let Some(holder) = self.world.actors.get_mut(holder) {
                let field = holder.reference_mut(slot);
                if *field == Some(id) {
                    *field = None;
                }
            }
        }

        let Some(actor) = self.world.actors.remove(id) else {
            return;
        };
        for slot in REF_SLOTS {
            if let Some(target) = actor.reference(slot) {
                self.world.refs.unregister(id, slot, target);
            }
        }
        self.world.net_ids.release(actor.net_id);
        let _ = self.world.net_lookup.remove(&actor.net_id);
        if let Some(slot) = actor.player {
            if let Some(player) = self.world.players.get_mut(slot.index()) {
                if player.body == Some(id) {
                    player.body = None;
                }
            }
        }

        self.emit(Event::ActorDestroyed {
            actor: id,
            kind: actor.kind,
        });
        log::debug!("destroyed {id:?}");
    }

    /// Turns a living actor into a corpse and starts its death sequence.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`Sim::set_state`].
    pub fn kill(&mut self, id: ActorId) -> Result<(), SimError> {
        let Some(actor) = self.world.actor_mut(id) else {
            return Ok(());
        };
        actor
            .flags
            .remove(ActorFlags::SHOOTABLE | ActorFlags::FLOAT | ActorFlags::SKULLFLY);
        actor.flags.insert(ActorFlags::CORPSE | ActorFlags::DROPOFF);
        actor.height = actor.height.shr(2);
        let kind = actor.kind;
        self.sync_geometry(id);

        let death_state = self.mobj_info(kind)?.death_state;
        if self.set_state(id, death_state)? {
            let jitter = self.random() & 3;
            if let Some(actor) = self.world.actor_mut(id) {
                if actor.tics > 0 {
                    actor.tics = (actor.tics - jitter).max(1);
                }
            }
        }
        Ok(())
    }

    /// Removes a collected pickup, queueing it for respawn where the rules
    /// bring pickups back.
    pub fn consume_pickup(&mut self, id: ActorId) {
        let Some(actor) = self.world.actor(id) else {
            return;
        };
        if self.mode().is_authoritative()
            && self.world.config.respawn_items()
            && actor.flags.contains(ActorFlags::SPECIAL)
            && !actor.flags.contains(ActorFlags::DROPPED)
        {
            let spawn = actor.spawn_point;
            let tic = self.world.level_time;
            self.emit(Event::PickupConsumed { spawn, tic });
        }
        self.destroy(id);
    }

    /// Brings a consumed pickup back at its placement behind an item fog.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`Sim::spawn`].
    pub fn respawn_item(&mut self, record: MapSpawnRecord) -> Result<Option<ActorId>, SimError> {
        if !self.mode().is_authoritative() {
            return Ok(None);
        }
        let Some(kind) = self.world.tables.by_editor_number(record.kind) else {
            log::warn!("cannot respawn unknown type {}", record.kind);
            return Ok(None);
        };

        let x = Fixed::from_int(record.x.into());
        let y = Fixed::from_int(record.y.into());
        let bounds = self.world.geometry.bounds_at(x, y);
        let info = self.mobj_info(kind)?;
        let offset = Fixed::from_int(record.z.into());
        let z = if info.flags.contains(ActorFlags::SPAWNCEILING) {
            bounds.ceiling_z - info.height - offset
        } else {
            bounds.floor_z + offset
        };
        let fog = self.world.tables.roles().item_fog;
        let _ = self.spawn_fog(fog, x, y, z, "misc/spawn", Attenuation::Idle)?;

        let id = self.spawn(kind, x, y, SpawnHeight::At(z))?;
        if let Some(actor) = self.world.actor_mut(id) {
            actor.spawn_point = record;
            actor.angle = Angle::from_map_degrees(record.angle);
        }
        self.world.set_thing_id(id, record.tid);
        self.emit(Event::ItemRespawned { actor: id });
        log::debug!("respawned item {} as {id:?}", record.kind);
        Ok(Some(id))
    }

    /// Spawns a cosmetic fog with its sound.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`Sim::spawn`].
    pub fn spawn_fog(
        &mut self,
        kind: MobjType,
        x: Fixed,
        y: Fixed,
        z: Fixed,
        sound: &'static str,
        attenuation: Attenuation,
    ) -> Result<Option<ActorId>, SimError> {
        if !self.mode().is_authoritative() {
            return Ok(None);
        }
        let id = self.spawn(kind, x, y, SpawnHeight::At(z))?;
        self.start_sound(id, SoundChannel::Voice, sound, attenuation);
        Ok(Some(id))
    }

    /// Launches a projectile of `kind` from `source` toward `dest`.
    ///
    /// Momentum points along the full three-dimensional line to the target
    /// and has the type's speed as its magnitude. Returns `None` when nothing
    /// was launched or the projectile detonated on launch and is gone.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`Sim::spawn`].
    pub fn spawn_missile(
        &mut self,
        source: ActorId,
        dest: ActorId,
        kind: MobjType,
    ) -> Result<Option<ActorId>, SimError> {
        if !self.mode().is_authoritative() {
            return Ok(None);
        }
        let (Some(shooter), Some(target)) = (self.world.actor(source), self.world.actor(dest))
        else {
            return Ok(None);
        };
        let (sx, sy, sz) = (shooter.x, shooter.y, shooter.z + MISSILE_HEIGHT);
        let (tx, ty, tz) = (target.x, target.y, target.z);
        let shadowed = target.flags.contains(ActorFlags::SHADOW);

        let id = self.spawn(kind, sx, sy, SpawnHeight::At(sz))?;
        let info = self.mobj_info(kind)?;
        let (speed, see_sound) = (info.speed, info.see_sound);
        if let Some(sound) = see_sound {
            self.start_sound(id, SoundChannel::Voice, sound, Attenuation::Normal);
        }
        self.world.set_ref(id, RefSlot::Target, Some(source));

        let mut angle = Angle::point_to_angle(tx - sx, ty - sy);
        if shadowed {
            angle = angle + Angle::from_raw((self.random_diff() << 20) as u32);
        }

        let (dx, dy, dz) = (tx - sx, ty - sy, tz - sz);
        let horizontal = vector_length(dx, dy, Fixed::ZERO);
        let length = vector_length(dx, dy, dz);
        let (planar, vertical) = if length.is_zero() {
            (speed, Fixed::ZERO)
        } else {
            let share = |part: Fixed| {
                let raw = i64::from(speed.raw()) * i64::from(part.raw()) / i64::from(length.raw());
                Fixed::from_raw(raw as i32)
            };
            (share(horizontal), share(dz))
        };

        if let Some(actor) = self.world.actor_mut(id) {
            actor.angle = angle;
            actor.momx = planar.fixed_mul(angle.cos());
            actor.momy = planar.fixed_mul(angle.sin());
            actor.momz = vertical;
        }
        self.check_missile_spawn(id)?;
        Ok(self.world.is_live(id).then_some(id))
    }

    /// Nudges a fresh projectile forward and detonates it if it starts
    /// inside something.
    pub(crate) fn check_missile_spawn(&mut self, id: ActorId) -> Result<(), SimError> {
        let jitter = self.random() & 3;
        let Some(actor) = self.world.actor_mut(id) else {
            return Ok(());
        };
        if actor.tics > 0 {
            actor.tics = (actor.tics - jitter).max(1);
        }
        actor.z += actor.momz.shr(1);
        let body = actor.body(id);
        let x = actor.x + actor.momx.shr(1);
        let y = actor.y + actor.momy.shr(1);

        match self.world.geometry.try_move(&body, x, y) {
            MoveOutcome::Moved(bounds) => {
                if let Some(actor) = self.world.actor_mut(id) {
                    actor.x = x;
                    actor.y = y;
                    actor.apply_bounds(bounds);
                }
                Ok(())
            }
            MoveOutcome::Blocked { .. } => self.explode_missile(id),
        }
    }

    /// Launches a player projectile, letting aim assistance pick the slope.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`Sim::spawn`].
    pub fn spawn_player_missile(
        &mut self,
        source: ActorId,
        kind: MobjType,
    ) -> Result<Option<ActorId>, SimError> {
        if !self.mode().is_authoritative() {
            return Ok(None);
        }
        let Some(shooter) = self.world.actor(source) else {
            return Ok(None);
        };
        let body = shooter.body(source);
        let (facing, pitch) = (shooter.angle, shooter.pitch);
        let aim_distance = self
            .world
            .active_player(source)
            .map_or(DEFAULT_AIM_DISTANCE, |player| player.aim_distance);
        let free_aim = self.world.config.free_aim;
        let look_slope = pitch_slope(pitch);

        let geometry = &self.world.geometry;
        let found = [facing, facing + AIM_SPREAD, facing - AIM_SPREAD]
            .into_iter()
            .find_map(|probe| {
                geometry
                    .aim_line_attack(&body, probe, AIM_RANGE)
                    .map(|hit| (probe, hit.slope))
            });
        let (angle, slope) = match found {
            None if free_aim => (facing, look_slope),
            None => (facing, Fixed::ZERO),
            Some((_, slope)) if free_aim && (slope - look_slope).abs() > aim_distance => {
                (facing, look_slope)
            }
            Some(aimed) => aimed,
        };

        let id = self.spawn(kind, body.x, body.y, SpawnHeight::At(body.z + MISSILE_HEIGHT))?;
        let info = self.mobj_info(kind)?;
        let (speed, see_sound) = (info.speed, info.see_sound);
        if let Some(sound) = see_sound {
            self.start_sound(id, SoundChannel::Voice, sound, Attenuation::Normal);
        }
        self.world.set_ref(id, RefSlot::Target, Some(source));
        if let Some(actor) = self.world.actor_mut(id) {
            actor.angle = angle;
            actor.momx = speed.fixed_mul(angle.cos());
            actor.momy = speed.fixed_mul(angle.sin());
            actor.momz = speed.fixed_mul(slope);
        }
        self.check_missile_spawn(id)?;
        Ok(self.world.is_live(id).then_some(id))
    }

    /// Spawns a bullet puff; melee hits skip the spark frames.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`Sim::spawn`] and [`Sim::set_state`].
    pub fn spawn_puff(
        &mut self,
        x: Fixed,
        y: Fixed,
        z: Fixed,
        melee: bool,
    ) -> Result<Option<ActorId>, SimError> {
        if !self.mode().is_authoritative() {
            return Ok(None);
        }
        let z = z + Fixed::from_raw(self.random_diff() << 10);
        let kind = self.world.tables.roles().puff;
        let id = self.spawn(kind, x, y, SpawnHeight::At(z))?;
        self.launch_debris(id, Fixed::ONE);

        if melee {
            let spark_free = self.mobj_info(kind)?.spawn_state.offset(2);
            if !self.set_state(id, spark_free)? {
                return Ok(None);
            }
        }
        Ok(Some(id))
    }

    /// Spawns a blood splat sized by the damage that caused it.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`Sim::spawn`] and [`Sim::set_state`].
    pub fn spawn_blood(
        &mut self,
        x: Fixed,
        y: Fixed,
        z: Fixed,
        damage: i32,
    ) -> Result<Option<ActorId>, SimError> {
        if !self.mode().is_authoritative() {
            return Ok(None);
        }
        let z = z + Fixed::from_raw(self.random_diff() << 10);
        let kind = self.world.tables.roles().blood;
        let id = self.spawn(kind, x, y, SpawnHeight::At(z))?;
        self.launch_debris(id, Fixed::from_int(2));

        let lighter = match damage {
            9..=12 => Some(1),
            _ if damage < 9 => Some(2),
            _ => None,
        };
        if let Some(offset) = lighter {
            let state = self.mobj_info(kind)?.spawn_state.offset(offset);
            if !self.set_state(id, state)? {
                return Ok(None);
            }
        }
        Ok(Some(id))
    }

    fn launch_debris(&mut self, id: ActorId, momz: Fixed) {
        let jitter = self.random() & 3;
        if let Some(actor) = self.world.actor_mut(id) {
            actor.momz = momz;
            if actor.tics > 0 {
                actor.tics = (actor.tics - jitter).max(1);
            }
        }
    }
}
