//! Capture and restore of individual actors.

use actorsim_core::{ActorId, ActorSnapshot, RefSlot};

use crate::{actor::REF_SLOTS, World};

/// Captures every attribute of a live actor, encoding its weak associations
/// by network identity.
#[must_use]
pub fn capture(world: &World, id: ActorId) -> Option<ActorSnapshot> {
    let actor = world.actor(id)?;
    let net_id_of = |slot: RefSlot| {
        actor
            .reference(slot)
            .and_then(|target| world.actor(target))
            .map(|target| target.net_id)
    };

    Some(ActorSnapshot {
        net_id: actor.net_id,
        kind: actor.kind,
        x: actor.x,
        y: actor.y,
        z: actor.z,
        angle: actor.angle,
        pitch: actor.pitch,
        roll: actor.roll,
        momx: actor.momx,
        momy: actor.momy,
        momz: actor.momz,
        radius: actor.radius,
        height: actor.height,
        floor_z: actor.floor_z,
        ceiling_z: actor.ceiling_z,
        sector_floor: actor.sector_floor,
        sprite: actor.sprite,
        frame: actor.frame,
        translucency: actor.translucency,
        fade: actor.fade,
        state: actor.state,
        tics: actor.tics,
        flags: actor.flags,
        health: actor.health,
        reaction_time: actor.reaction_time,
        threshold: actor.threshold,
        move_count: actor.move_count,
        tid: actor.tid,
        target: net_id_of(RefSlot::Target),
        last_enemy: net_id_of(RefSlot::LastEnemy),
        tracer: net_id_of(RefSlot::Tracer),
        goal: net_id_of(RefSlot::Goal),
        player: actor.player,
        spawn_point: actor.spawn_point,
        water_level: actor.water_level,
    })
}

/// Writes a snapshot back onto a live actor.
///
/// The actor takes over the snapshot's network identity when it is free, is
/// relinked into the geometry at the restored position, and re-indexed under
/// the restored thing id. Weak associations resolve through the network
/// identities of actors currently in the world; unresolvable ones are cleared.
/// Returns `false` when `id` does not name a live actor.
pub fn restore(world: &mut World, id: ActorId, snapshot: &ActorSnapshot) -> bool {
    let Some(actor) = world.actor(id) else {
        return false;
    };
    let (current_net_id, touch) = (actor.net_id, actor.touch);

    if snapshot.net_id != current_net_id && world.net_ids.claim(snapshot.net_id) {
        world.net_ids.release(current_net_id);
        let _ = world.net_lookup.remove(&current_net_id);
        let _ = world.net_lookup.insert(snapshot.net_id, id);
        if let Some(actor) = world.actor_mut(id) {
            actor.net_id = snapshot.net_id;
        }
    }

    world.geometry.unlink(id, touch);
    let Some(actor) = world.actor_mut(id) else {
        return false;
    };
    actor.kind = snapshot.kind;
    actor.x = snapshot.x;
    actor.y = snapshot.y;
    actor.z = snapshot.z;
    actor.angle = snapshot.angle;
    actor.pitch = snapshot.pitch;
    actor.roll = snapshot.roll;
    actor.momx = snapshot.momx;
    actor.momy = snapshot.momy;
    actor.momz = snapshot.momz;
    actor.radius = snapshot.radius;
    actor.height = snapshot.height;
    actor.sprite = snapshot.sprite;
    actor.frame = snapshot.frame;
    actor.translucency = snapshot.translucency;
    actor.fade = snapshot.fade;
    actor.state = snapshot.state;
    actor.tics = snapshot.tics;
    actor.flags = snapshot.flags;
    actor.health = snapshot.health;
    actor.reaction_time = snapshot.reaction_time;
    actor.threshold = snapshot.threshold;
    actor.move_count = snapshot.move_count;
    actor.spawn_point = snapshot.spawn_point;
    actor.water_level = snapshot.water_level;
    let body = actor.body(id);

    let linkage = world.geometry.link(&body);
    if let Some(actor) = world.actor_mut(id) {
        actor.touch = linkage.touch;
        actor.floor_z = snapshot.floor_z;
        actor.ceiling_z = snapshot.ceiling_z;
        actor.sector_floor = snapshot.sector_floor;
    }
    world.set_thing_id(id, snapshot.tid);

    let encoded = [
        snapshot.target,
        snapshot.last_enemy,
        snapshot.tracer,
        snapshot.goal,
    ];
    for (slot, net_id) in REF_SLOTS.into_iter().zip(encoded) {
        let target = net_id.and_then(|net_id| world.net_lookup.get(&net_id).copied());
        world.set_ref(id, slot, target);
    }

    world.bind_player(id, snapshot.player);
    true
}
