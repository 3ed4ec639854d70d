#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Divergence detection between authoritative and predicted actors.
//!
//! Clients re-simulate recent tics speculatively and later receive the
//! authoritative outcome. This system lines both sets of snapshots up by
//! network identity and reports the first group of attributes that disagrees
//! for every actor, so the caller knows which actors need correcting.

use std::collections::BTreeMap;

use actorsim_core::{ActorFlags, ActorSnapshot, Fixed, NetId, SpriteNum, StateNum};

/// Configuration parameters required to construct the prediction system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    position_tolerance: Fixed,
}

impl Config {
    /// Creates a configuration that forgives positional drift up to
    /// `position_tolerance` on each axis.
    #[must_use]
    pub const fn new(position_tolerance: Fixed) -> Self {
        Self { position_tolerance }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Fixed::ZERO)
    }
}

/// Position, momentum, or any other triple of fixed-point components.
pub type Vector = (Fixed, Fixed, Fixed);

/// Animation attributes compared as one group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Animation {
    /// Current state.
    pub state: StateNum,
    /// Tics remaining in the state.
    pub tics: i32,
    /// Sprite displayed.
    pub sprite: SpriteNum,
    /// Frame of the sprite.
    pub frame: u8,
}

impl Animation {
    fn of(snapshot: &ActorSnapshot) -> Self {
        Self {
            state: snapshot.state,
            tics: snapshot.tics,
            sprite: snapshot.sprite,
            frame: snapshot.frame,
        }
    }
}

/// Disagreement between the authoritative and the predicted view of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Divergence {
    /// The prediction lost an actor the authority still has.
    Missing {
        /// Identity of the actor.
        net_id: NetId,
    },
    /// The prediction has an actor the authority does not.
    Unexpected {
        /// Identity of the actor.
        net_id: NetId,
    },
    /// The actor is somewhere else.
    Position {
        /// Identity of the actor.
        net_id: NetId,
        /// Authoritative position.
        authoritative: Vector,
        /// Predicted position.
        predicted: Vector,
    },
    /// The actor moves differently.
    Momentum {
        /// Identity of the actor.
        net_id: NetId,
        /// Authoritative momentum.
        authoritative: Vector,
        /// Predicted momentum.
        predicted: Vector,
    },
    /// The actor shows a different frame or is in a different state.
    Animation {
        /// Identity of the actor.
        net_id: NetId,
        /// Authoritative animation.
        authoritative: Animation,
        /// Predicted animation.
        predicted: Animation,
    },
    /// The actor carries different capability bits.
    Flags {
        /// Identity of the actor.
        net_id: NetId,
        /// Authoritative flags.
        authoritative: ActorFlags,
        /// Predicted flags.
        predicted: ActorFlags,
    },
}

impl Divergence {
    /// Identity of the actor the divergence concerns.
    #[must_use]
    pub const fn net_id(&self) -> NetId {
        match *self {
            Self::Missing { net_id }
            | Self::Unexpected { net_id }
            | Self::Position { net_id, .. }
            | Self::Momentum { net_id, .. }
            | Self::Animation { net_id, .. }
            | Self::Flags { net_id, .. } => net_id,
        }
    }
}

/// Pure system comparing snapshot sets.
#[derive(Debug, Default)]
pub struct Prediction {
    position_tolerance: Fixed,
}

impl Prediction {
    /// Creates the system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            position_tolerance: config.position_tolerance,
        }
    }

    /// Reports every actor whose prediction disagrees with the authority,
    /// ordered by network identity.
    #[must_use]
    pub fn compare(
        &self,
        authoritative: &[ActorSnapshot],
        predicted: &[ActorSnapshot],
    ) -> Vec<Divergence> {
        let mut paired: BTreeMap<NetId, (Option<&ActorSnapshot>, Option<&ActorSnapshot>)> =
            BTreeMap::new();
        for snapshot in authoritative {
            paired.entry(snapshot.net_id).or_default().0 = Some(snapshot);
        }
        for snapshot in predicted {
            paired.entry(snapshot.net_id).or_default().1 = Some(snapshot);
        }

        let divergences: Vec<Divergence> = paired
            .into_iter()
            .filter_map(|(net_id, pair)| match pair {
                (Some(truth), Some(guess)) => self.first_difference(truth, guess),
                (Some(_), None) => Some(Divergence::Missing { net_id }),
                (None, Some(_)) => Some(Divergence::Unexpected { net_id }),
                (None, None) => None,
            })
            .collect();
        if !divergences.is_empty() {
            log::debug!("{} predicted actors diverged", divergences.len());
        }
        divergences
    }

    fn first_difference(
        &self,
        truth: &ActorSnapshot,
        guess: &ActorSnapshot,
    ) -> Option<Divergence> {
        let net_id = truth.net_id;
        let position = |snapshot: &ActorSnapshot| (snapshot.x, snapshot.y, snapshot.z);
        let momentum = |snapshot: &ActorSnapshot| (snapshot.momx, snapshot.momy, snapshot.momz);

        if !self.close(position(truth), position(guess)) {
            return Some(Divergence::Position {
                net_id,
                authoritative: position(truth),
                predicted: position(guess),
            });
        }
        if momentum(truth) != momentum(guess) {
            return Some(Divergence::Momentum {
                net_id,
                authoritative: momentum(truth),
                predicted: momentum(guess),
            });
        }
        let (expected, actual) = (Animation::of(truth), Animation::of(guess));
        if expected != actual {
            return Some(Divergence::Animation {
                net_id,
                authoritative: expected,
                predicted: actual,
            });
        }
        (truth.flags != guess.flags).then_some(Divergence::Flags {
            net_id,
            authoritative: truth.flags,
            predicted: guess.flags,
        })
    }

    fn close(&self, a: Vector, b: Vector) -> bool {
        let tolerance = self.position_tolerance;
        [(a.0, b.0), (a.1, b.1), (a.2, b.2)]
            .into_iter()
            .all(|(left, right)| (left - right).abs() <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use actorsim_core::{Angle, Fade, MapSpawnRecord, MobjType, ThingId};

    use super::*;

    fn snapshot(net_id: u32) -> ActorSnapshot {
        ActorSnapshot {
            net_id: NetId::new(net_id),
            kind: MobjType::new(1),
            x: Fixed::from_int(10),
            y: Fixed::from_int(20),
            z: Fixed::ZERO,
            angle: Angle::ZERO,
            pitch: Angle::ZERO,
            roll: Angle::ZERO,
            momx: Fixed::ZERO,
            momy: Fixed::ZERO,
            momz: Fixed::ZERO,
            radius: Fixed::from_int(20),
            height: Fixed::from_int(56),
            floor_z: Fixed::ZERO,
            ceiling_z: Fixed::from_int(128),
            sector_floor: Fixed::ZERO,
            sprite: SpriteNum::new(3),
            frame: 0,
            translucency: Fixed::ONE,
            fade: Fade::Steady,
            state: StateNum::new(12),
            tics: 10,
            flags: ActorFlags::SOLID | ActorFlags::SHOOTABLE,
            health: 60,
            reaction_time: 8,
            threshold: 0,
            move_count: 0,
            tid: ThingId::NONE,
            target: None,
            last_enemy: None,
            tracer: None,
            goal: None,
            player: None,
            spawn_point: MapSpawnRecord::default(),
            water_level: 0,
        }
    }

    #[test]
    fn identical_sets_agree() {
        let actors = vec![snapshot(1), snapshot(2)];
        assert!(Prediction::default().compare(&actors, &actors).is_empty());
    }

    #[test]
    fn only_the_first_differing_group_is_reported() {
        let truth = snapshot(1);
        let mut guess = snapshot(1);
        guess.x += Fixed::ONE;
        guess.momx = Fixed::ONE;
        guess.tics = 3;

        let divergences = Prediction::default().compare(&[truth], &[guess]);
        assert_eq!(divergences.len(), 1);
        assert!(matches!(divergences[0], Divergence::Position { .. }));
    }

    #[test]
    fn tolerance_forgives_small_drift() {
        let truth = snapshot(1);
        let mut guess = snapshot(1);
        guess.y += Fixed::from_raw(0x800);
        guess.flags.remove(ActorFlags::SOLID);

        let prediction = Prediction::new(Config::new(Fixed::from_raw(0x1000)));
        assert_eq!(
            prediction.compare(&[truth.clone()], &[guess]),
            vec![Divergence::Flags {
                net_id: NetId::new(1),
                authoritative: truth.flags,
                predicted: ActorFlags::SHOOTABLE,
            }]
        );
    }

    #[test]
    fn unmatched_identities_are_missing_or_unexpected() {
        let authoritative = [snapshot(1), snapshot(3)];
        let predicted = [snapshot(2), snapshot(3)];
        let divergences = Prediction::default().compare(&authoritative, &predicted);
        assert_eq!(
            divergences,
            vec![
                Divergence::Missing {
                    net_id: NetId::new(1)
                },
                Divergence::Unexpected {
                    net_id: NetId::new(2)
                },
            ]
        );
        assert_eq!(divergences[1].net_id(), NetId::new(2));
    }
}
