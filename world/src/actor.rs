//! Per-actor record and player bookkeeping.

use actorsim_core::{
    ActorFlags, ActorId, Angle, Fade, Fixed, MapSpawnRecord, MobjType, NetId, PlayerSlot,
    RefSlot, SpriteNum, StateNum, ThingId,
};

use crate::geometry::{Body, Bounds, TouchList};

/// Eye height of a standing player.
pub(crate) const VIEW_HEIGHT: Fixed = Fixed::from_int(41);
/// Slope difference aim assistance may correct unless configured otherwise.
pub(crate) const DEFAULT_AIM_DISTANCE: Fixed = Fixed::from_raw(1 << 14);

/// Mutable state of one simulated object.
#[derive(Clone, Debug)]
pub(crate) struct Actor {
    pub(crate) kind: MobjType,
    pub(crate) x: Fixed,
    pub(crate) y: Fixed,
    pub(crate) z: Fixed,
    pub(crate) angle: Angle,
    pub(crate) pitch: Angle,
    pub(crate) roll: Angle,
    pub(crate) momx: Fixed,
    pub(crate) momy: Fixed,
    pub(crate) momz: Fixed,
    pub(crate) radius: Fixed,
    pub(crate) height: Fixed,
    pub(crate) floor_z: Fixed,
    pub(crate) ceiling_z: Fixed,
    pub(crate) sector_floor: Fixed,
    pub(crate) sprite: SpriteNum,
    pub(crate) frame: u8,
    pub(crate) translucency: Fixed,
    pub(crate) fade: Fade,
    pub(crate) state: StateNum,
    pub(crate) tics: i32,
    pub(crate) flags: ActorFlags,
    pub(crate) health: i32,
    pub(crate) reaction_time: i32,
    pub(crate) threshold: i32,
    pub(crate) move_count: i32,
    pub(crate) tid: ThingId,
    pub(crate) net_id: NetId,
    pub(crate) target: Option<ActorId>,
    pub(crate) last_enemy: Option<ActorId>,
    pub(crate) tracer: Option<ActorId>,
    pub(crate) goal: Option<ActorId>,
    pub(crate) player: Option<PlayerSlot>,
    pub(crate) spawn_point: MapSpawnRecord,
    pub(crate) water_level: u8,
    pub(crate) touch: Option<TouchList>,
}

impl Actor {
    pub(crate) fn reference(&self, slot: RefSlot) -> Option<ActorId> {
        match slot {
            RefSlot::Target => self.target,
            RefSlot::LastEnemy => self.last_enemy,
            RefSlot::Tracer => self.tracer,
            RefSlot::Goal => self.goal,
        }
    }

    pub(crate) fn reference_mut(&mut self, slot: RefSlot) -> &mut Option<ActorId> {
        match slot {
            RefSlot::Target => &mut self.target,
            RefSlot::LastEnemy => &mut self.last_enemy,
            RefSlot::Tracer => &mut self.tracer,
            RefSlot::Goal => &mut self.goal,
        }
    }

    pub(crate) fn body(&self, id: ActorId) -> Body {
        Body {
            actor: id,
            x: self.x,
            y: self.y,
            z: self.z,
            radius: self.radius,
            height: self.height,
            flags: self.flags,
            owner: if self.flags.contains(ActorFlags::MISSILE) {
                self.target
            } else {
                None
            },
        }
    }

    pub(crate) fn apply_bounds(&mut self, bounds: Bounds) {
        self.floor_z = bounds.floor_z;
        self.ceiling_z = bounds.ceiling_z;
        self.sector_floor = bounds.sector_floor;
    }
}

/// All weak association slots, in a fixed order.
pub(crate) const REF_SLOTS: [RefSlot; 4] = [
    RefSlot::Target,
    RefSlot::LastEnemy,
    RefSlot::Tracer,
    RefSlot::Goal,
];

/// Participant controlling a body.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) body: Option<ActorId>,
    pub(crate) forward_move: i8,
    pub(crate) side_move: i8,
    pub(crate) view_height: Fixed,
    pub(crate) delta_view_height: Fixed,
    pub(crate) no_momentum: bool,
    pub(crate) aim_distance: Fixed,
}

impl Player {
    pub(crate) const fn new() -> Self {
        Self {
            body: None,
            forward_move: 0,
            side_move: 0,
            view_height: VIEW_HEIGHT,
            delta_view_height: Fixed::ZERO,
            no_momentum: false,
            aim_distance: DEFAULT_AIM_DISTANCE,
        }
    }

    pub(crate) const fn has_input(&self) -> bool {
        self.forward_move != 0 || self.side_move != 0
    }
}
