//! World geometry collaborator contract and the open arena reference map.

use std::{collections::BTreeMap, fmt};

use actorsim_core::{ActorFlags, ActorId, Angle, Fixed};

/// Physical description of an actor handed to geometry queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Body {
    /// Actor the body belongs to.
    pub actor: ActorId,
    /// Horizontal position.
    pub x: Fixed,
    /// Vertical (north/south) position.
    pub y: Fixed,
    /// Height of the feet.
    pub z: Fixed,
    /// Collision radius.
    pub radius: Fixed,
    /// Collision height.
    pub height: Fixed,
    /// Capability bits at the time of the query.
    pub flags: ActorFlags,
    /// Actor a projectile must not collide with.
    pub owner: Option<ActorId>,
}

/// Vertical extent available at a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    /// Highest floor under the body.
    pub floor_z: Fixed,
    /// Lowest ceiling over the body.
    pub ceiling_z: Fixed,
    /// Floor of the sector containing the body's center.
    pub sector_floor: Fixed,
}

/// Membership token in the geometry's touching-sector lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TouchList(u32);

impl TouchList {
    /// Wraps a geometry-defined token.
    #[must_use]
    pub const fn new(token: u32) -> Self {
        Self(token)
    }
}

/// Result of linking a body into the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Linkage {
    /// Bounds at the linked position.
    pub bounds: Bounds,
    /// Touch-list membership, released again through [`Geometry::unlink`].
    pub touch: Option<TouchList>,
}

/// Result of a move attempt, owned by the caller that made it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The body now stands at the requested position.
    Moved(Bounds),
    /// The body stayed where it was.
    Blocked {
        /// Whether the obstruction borders the sky.
        against_sky: bool,
    },
}

/// Result of a sliding move along an obstruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slide {
    /// Horizontal position reached.
    pub x: Fixed,
    /// Vertical (north/south) position reached.
    pub y: Fixed,
    /// Horizontal momentum left after deflection.
    pub momx: Fixed,
    /// North/south momentum left after deflection.
    pub momy: Fixed,
    /// Bounds at the position reached.
    pub bounds: Bounds,
}

/// Target found by an aim trace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AimHit {
    /// Actor the trace settled on.
    pub target: ActorId,
    /// Vertical slope from the shooter's eyes to the target.
    pub slope: Fixed,
}

/// Collision and placement queries the simulation relies on.
pub trait Geometry: fmt::Debug {
    /// Links a new body and reports where it stands.
    fn link(&mut self, body: &Body) -> Linkage;

    /// Removes a body and releases its touch-list membership.
    fn unlink(&mut self, actor: ActorId, touch: Option<TouchList>);

    /// Refreshes a linked body after its flags or height changed.
    fn update(&mut self, _body: &Body) {}

    /// Bounds at an arbitrary point.
    fn bounds_at(&self, x: Fixed, y: Fixed) -> Bounds;

    /// Attempts to move a body to `(x, y)`, relinking it on success.
    fn try_move(&mut self, body: &Body, x: Fixed, y: Fixed) -> MoveOutcome;

    /// Deflects a blocked body along the obstruction; `None` when it cannot
    /// move at all.
    fn slide_move(&mut self, body: &Body, momx: Fixed, momy: Fixed) -> Option<Slide>;

    /// Reports whether the body would fit at `(x, y)`.
    fn check_position(&self, body: &Body, x: Fixed, y: Fixed) -> bool;

    /// Traces for a shootable actor along `angle` up to `range`.
    fn aim_line_attack(&self, shooter: &Body, angle: Angle, range: Fixed) -> Option<AimHit>;

    /// Ground friction under the body; `None` defers to the level default.
    fn friction(&self, _body: &Body) -> Option<Fixed> {
        None
    }

    /// Submersion depth of the body from 0 (dry) to 3 (under water).
    fn water_level(&self, _body: &Body) -> u8 {
        0
    }
}

/// Vertical aim window, as a slope.
const AIM_SLOPE_LIMIT: f64 = 100.0 / 160.0;

/// Square walled room with a flat floor and ceiling.
#[derive(Clone, Debug)]
pub struct OpenArena {
    half_extent: Fixed,
    floor: Fixed,
    ceiling: Fixed,
    sky: bool,
    water_surface: Option<Fixed>,
    friction: Option<Fixed>,
    bodies: BTreeMap<ActorId, Body>,
    issued_touch_lists: u32,
    live_touch_lists: usize,
}

impl OpenArena {
    /// Creates a room spanning `-half_extent..=half_extent` on both axes.
    #[must_use]
    pub fn new(half_extent: i32, floor: i32, ceiling: i32) -> Self {
        Self {
            half_extent: Fixed::from_int(half_extent),
            floor: Fixed::from_int(floor),
            ceiling: Fixed::from_int(ceiling),
            sky: false,
            water_surface: None,
            friction: None,
            bodies: BTreeMap::new(),
            issued_touch_lists: 0,
            live_touch_lists: 0,
        }
    }

    /// Opens the walls onto the sky.
    #[must_use]
    pub fn with_sky(mut self) -> Self {
        self.sky = true;
        self
    }

    /// Floods the room to `depth` map units above the floor.
    #[must_use]
    pub fn with_water(mut self, depth: i32) -> Self {
        self.water_surface = Some(self.floor + Fixed::from_int(depth));
        self
    }

    /// Overrides the level friction on the whole floor.
    #[must_use]
    pub fn with_friction(mut self, friction: Fixed) -> Self {
        self.friction = Some(friction);
        self
    }

    /// Number of bodies taking part in collision.
    #[must_use]
    pub fn linked_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Number of touch-list memberships not yet released.
    #[must_use]
    pub const fn live_touch_lists(&self) -> usize {
        self.live_touch_lists
    }

    fn bounds(&self) -> Bounds {
        Bounds {
            floor_z: self.floor,
            ceiling_z: self.ceiling,
            sector_floor: self.floor,
        }
    }

    fn inside_walls(&self, x: Fixed, y: Fixed, radius: Fixed) -> bool {
        let limit = self.half_extent - radius;
        x.abs() <= limit && y.abs() <= limit
    }

    fn blocked_by_body(&self, body: &Body, x: Fixed, y: Fixed) -> bool {
        self.bodies.values().any(|other| {
            other.actor != body.actor
                && Some(other.actor) != body.owner
                && blocks(body, other)
                && (x - other.x).abs() < body.radius + other.radius
                && (y - other.y).abs() < body.radius + other.radius
                && body.z < other.z + other.height
                && other.z < body.z + body.height
        })
    }

    fn fits(&self, body: &Body, x: Fixed, y: Fixed) -> bool {
        if body.flags.contains(ActorFlags::NOCLIP) {
            return true;
        }
        self.inside_walls(x, y, body.radius)
            && body.z + body.height <= self.ceiling
            && !self.blocked_by_body(body, x, y)
    }

    fn relocate(&mut self, body: &Body, x: Fixed, y: Fixed) {
        if let Some(stored) = self.bodies.get_mut(&body.actor) {
            *stored = Body { x, y, ..*body };
        }
    }
}

fn blocks(mover: &Body, other: &Body) -> bool {
    if mover.flags.contains(ActorFlags::MISSILE) {
        other
            .flags
            .intersects(ActorFlags::SOLID | ActorFlags::SHOOTABLE)
    } else {
        other.flags.contains(ActorFlags::SOLID)
    }
}

impl Geometry for OpenArena {
    fn link(&mut self, body: &Body) -> Linkage {
        if !body.flags.contains(ActorFlags::NOBLOCKMAP) {
            let _ = self.bodies.insert(body.actor, *body);
        }
        let touch = if body.flags.contains(ActorFlags::NOSECTOR) {
            None
        } else {
            self.issued_touch_lists += 1;
            self.live_touch_lists += 1;
            Some(TouchList::new(self.issued_touch_lists))
        };
        Linkage {
            bounds: self.bounds(),
            touch,
        }
    }

    fn unlink(&mut self, actor: ActorId, touch: Option<TouchList>) {
        let _ = self.bodies.remove(&actor);
        if touch.is_some() {
            self.live_touch_lists = self.live_touch_lists.saturating_sub(1);
        }
    }

    fn update(&mut self, body: &Body) {
        if let Some(stored) = self.bodies.get_mut(&body.actor) {
            *stored = *body;
        }
    }

    fn bounds_at(&self, _x: Fixed, _y: Fixed) -> Bounds {
        self.bounds()
    }

    fn try_move(&mut self, body: &Body, x: Fixed, y: Fixed) -> MoveOutcome {
        if !body.flags.contains(ActorFlags::NOCLIP) && !self.inside_walls(x, y, body.radius) {
            return MoveOutcome::Blocked {
                against_sky: self.sky,
            };
        }
        if !self.fits(body, x, y) {
            return MoveOutcome::Blocked { against_sky: false };
        }
        self.relocate(body, x, y);
        MoveOutcome::Moved(self.bounds())
    }

    fn slide_move(&mut self, body: &Body, momx: Fixed, momy: Fixed) -> Option<Slide> {
        let (x, y, momx, momy) = if self.fits(body, body.x + momx, body.y) {
            (body.x + momx, body.y, momx, Fixed::ZERO)
        } else if self.fits(body, body.x, body.y + momy) {
            (body.x, body.y + momy, Fixed::ZERO, momy)
        } else {
            return None;
        };
        self.relocate(body, x, y);
        Some(Slide {
            x,
            y,
            momx,
            momy,
            bounds: self.bounds(),
        })
    }

    fn check_position(&self, body: &Body, x: Fixed, y: Fixed) -> bool {
        self.fits(body, x, y)
    }

    fn aim_line_attack(&self, shooter: &Body, angle: Angle, range: Fixed) -> Option<AimHit> {
        let (sin, cos) = (angle.sin().to_f64(), angle.cos().to_f64());
        let eye = (shooter.z + shooter.height.shr(1)).to_f64() + 8.0;
        let range = range.to_f64();

        let mut best: Option<(f64, AimHit)> = None;
        for other in self.bodies.values() {
            if other.actor == shooter.actor || !other.flags.contains(ActorFlags::SHOOTABLE) {
                continue;
            }
            let dx = (other.x - shooter.x).to_f64();
            let dy = (other.y - shooter.y).to_f64();
            let forward = dx * cos + dy * sin;
            let lateral = (dy * cos - dx * sin).abs();
            if forward <= 0.0 || forward > range || lateral > other.radius.to_f64() {
                continue;
            }

            let top = ((other.z + other.height).to_f64() - eye) / forward;
            let bottom = (other.z.to_f64() - eye) / forward;
            let top = top.min(AIM_SLOPE_LIMIT);
            let bottom = bottom.max(-AIM_SLOPE_LIMIT);
            if top < bottom {
                continue;
            }

            if best.map_or(true, |(distance, _)| forward < distance) {
                best = Some((
                    forward,
                    AimHit {
                        target: other.actor,
                        slope: Fixed::from_f64((top + bottom) / 2.0),
                    },
                ));
            }
        }
        best.map(|(_, hit)| hit)
    }

    fn friction(&self, _body: &Body) -> Option<Fixed> {
        self.friction
    }

    fn water_level(&self, body: &Body) -> u8 {
        let Some(surface) = self.water_surface else {
            return 0;
        };
        if body.z >= surface {
            0
        } else if body.z + body.height.shr(1) >= surface {
            1
        } else if body.z + body.height > surface {
            2
        } else {
            3
        }
    }
}
