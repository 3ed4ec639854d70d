#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic system that brings consumed pickups back after a delay.
//!
//! The world reports every pickup that should return through
//! [`Event::PickupConsumed`]. This system remembers those placements in a
//! fixed-size ring and, on authoritative tics, emits [`Command::RespawnItem`]
//! for the oldest one once it has been gone long enough.

use actorsim_core::{Command, Event, MapSpawnRecord, SimMode};

/// Number of consumed pickups remembered at once.
pub const QUEUE_CAPACITY: usize = 128;

/// Configuration parameters required to construct the respawn system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    delay_tics: u32,
}

impl Config {
    /// Creates a configuration that keeps pickups away for `delay_tics`.
    #[must_use]
    pub const fn new(delay_tics: u32) -> Self {
        Self { delay_tics }
    }
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    spawn: MapSpawnRecord,
    tic: u32,
}

/// Pure system that schedules pickup respawns.
#[derive(Debug)]
pub struct ItemRespawn {
    delay_tics: u32,
    slots: [Option<Pending>; QUEUE_CAPACITY],
    head: usize,
    tail: usize,
}

impl ItemRespawn {
    /// Creates an empty respawn queue using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            delay_tics: config.delay_tics,
            slots: [None; QUEUE_CAPACITY],
            head: 0,
            tail: 0,
        }
    }

    /// Number of pickups waiting to return.
    #[must_use]
    pub fn pending(&self) -> usize {
        (self.head + QUEUE_CAPACITY - self.tail) % QUEUE_CAPACITY
    }

    /// Consumes events and emits at most one respawn per authoritative tic.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::PickupConsumed { spawn, tic } => self.push(*spawn, *tic),
                Event::TimeAdvanced {
                    tic,
                    mode: SimMode::Authoritative,
                } => {
                    if let Some(spawn) = self.pop_due(*tic) {
                        out.push(Command::RespawnItem { spawn });
                    }
                }
                _ => {}
            }
        }
    }

    fn push(&mut self, spawn: MapSpawnRecord, tic: u32) {
        self.slots[self.head] = Some(Pending { spawn, tic });
        self.head = (self.head + 1) % QUEUE_CAPACITY;
        if self.head == self.tail {
            log::debug!("item respawn queue full, dropping the oldest entry");
            self.slots[self.tail] = None;
            self.tail = (self.tail + 1) % QUEUE_CAPACITY;
        }
    }

    fn pop_due(&mut self, now: u32) -> Option<MapSpawnRecord> {
        if self.head == self.tail {
            return None;
        }
        let pending = self.slots[self.tail]?;
        if now.saturating_sub(pending.tic) < self.delay_tics {
            return None;
        }
        self.slots[self.tail] = None;
        self.tail = (self.tail + 1) % QUEUE_CAPACITY;
        Some(pending.spawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consumed(kind: u16, tic: u32) -> Event {
        Event::PickupConsumed {
            spawn: MapSpawnRecord {
                kind,
                ..MapSpawnRecord::default()
            },
            tic,
        }
    }

    #[test]
    fn overflow_drops_the_oldest_entry() {
        let mut respawn = ItemRespawn::new(Config::new(0));
        let events: Vec<Event> = (0..QUEUE_CAPACITY as u32)
            .map(|tic| consumed(tic as u16, tic))
            .collect();
        respawn.handle(&events, &mut Vec::new());

        // One slot always stays free to tell a full ring from an empty one.
        assert_eq!(respawn.pending(), QUEUE_CAPACITY - 1);
        let pending = respawn.slots[respawn.tail].expect("oldest entry");
        assert_eq!(pending.spawn.kind, 1);
    }

    #[test]
    fn empty_queue_emits_nothing() {
        let mut respawn = ItemRespawn::new(Config::new(0));
        let mut commands = Vec::new();
        respawn.handle(
            &[Event::TimeAdvanced {
                tic: 1_000,
                mode: SimMode::Authoritative,
            }],
            &mut commands,
        );
        assert!(commands.is_empty());
    }
}
