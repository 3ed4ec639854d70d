//! Corpses coming back to life where monsters respawn.

use actorsim_core::{
    ActorFlags, ActorId, Angle, Attenuation, Event, Fixed, MapThingFlags, SpawnHeight,
};

use crate::{Sim, SimError};

/// Reaction delay of a monster back from the dead.
const RESPAWN_REACTION_TIME: i32 = 18;
/// Respawns are only attempted on tics that are a multiple of this.
const RESPAWN_TIC_MASK: u32 = 31;
/// Largest random draw that lets a respawn go ahead.
const RESPAWN_CHANCE: i32 = 4;

impl Sim<'_> {
    /// Ages a resting actor and occasionally brings it back.
    pub(crate) fn nightmare_poll(&mut self, id: ActorId) -> Result<(), SimError> {
        if !self.mode().is_authoritative() || !self.world.config.respawn_monsters() {
            return Ok(());
        }
        let threshold = self.world.config.nightmare_respawn_tics();
        let Some(actor) = self.world.actor_mut(id) else {
            return Ok(());
        };
        if !actor.flags.contains(ActorFlags::COUNTKILL) {
            return Ok(());
        }

        actor.move_count += 1;
        if actor.move_count < threshold {
            return Ok(());
        }
        if self.world.level_time & RESPAWN_TIC_MASK != 0 {
            return Ok(());
        }
        if self.random() > RESPAWN_CHANCE {
            return Ok(());
        }
        self.nightmare_respawn(id)
    }

    /// Replaces a corpse with a fresh monster at its original placement.
    ///
    /// Nothing happens while the placement is occupied; the corpse simply
    /// tries again on a later tic.
    ///
    /// # Errors
    ///
    /// Propagates fatal errors from [`Sim::spawn`].
    pub fn nightmare_respawn(&mut self, corpse: ActorId) -> Result<(), SimError> {
        if !self.mode().is_authoritative() {
            return Ok(());
        }
        let Some(actor) = self.world.actor(corpse) else {
            return Ok(());
        };
        let record = actor.spawn_point;
        let (kind, x, y, floor) = (actor.kind, actor.x, actor.y, actor.sector_floor);
        let body = actor.body(corpse);
        let sx = Fixed::from_int(record.x.into());
        let sy = Fixed::from_int(record.y.into());
        if !self.world.geometry.check_position(&body, sx, sy) {
            return Ok(());
        }

        let fog = self.world.tables.roles().teleport_fog;
        let _ = self.spawn_fog(fog, x, y, floor, "misc/teleport", Attenuation::Normal)?;
        let spawn_floor = self.world.geometry.bounds_at(sx, sy).floor_z;
        let _ = self.spawn_fog(fog, sx, sy, spawn_floor, "misc/teleport", Attenuation::Normal)?;

        let height = if self.mobj_info(kind)?.flags.contains(ActorFlags::SPAWNCEILING) {
            SpawnHeight::OnCeiling
        } else {
            SpawnHeight::OnFloor
        };
        let id = self.spawn(kind, sx, sy, height)?;
        if let Some(actor) = self.world.actor_mut(id) {
            actor.spawn_point = record;
            actor.angle = Angle::from_map_degrees(record.angle);
            if record.flags.contains(MapThingFlags::AMBUSH) {
                actor.flags.insert(ActorFlags::AMBUSH);
            }
            actor.reaction_time = RESPAWN_REACTION_TIME;
        }

        self.destroy(corpse);
        self.world.set_thing_id(id, record.tid);
        self.emit(Event::MonsterRespawned { corpse, actor: id });
        log::debug!("{corpse:?} respawned as {id:?}");
        Ok(())
    }
}
