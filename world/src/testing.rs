//! Fixtures shared by the unit tests.

use std::sync::Arc;

use actorsim_core::{Event, MapSpawnRecord, MapThingFlags};

use crate::{ActorTables, LevelConfig, OpenArena, World};

/// Default level inside a flat 2048 unit square room.
pub(crate) fn arena_world() -> World {
    world_with(LevelConfig::default(), OpenArena::new(1024, 0, 256))
}

pub(crate) fn world_with(config: LevelConfig, arena: OpenArena) -> World {
    World::new(config, Arc::new(ActorTables::stock()), Box::new(arena))
}

/// Names of the sounds started, in order.
pub(crate) fn sounds(events: &[Event]) -> Vec<&'static str> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::SoundStarted { sound, .. } => Some(*sound),
            _ => None,
        })
        .collect()
}

/// Placement present on every skill and in every game mode.
pub(crate) fn placement(kind: u16, x: i16, y: i16) -> MapSpawnRecord {
    MapSpawnRecord {
        x,
        y,
        kind,
        flags: MapThingFlags::EASY
            | MapThingFlags::NORMAL
            | MapThingFlags::HARD
            | MapThingFlags::SINGLE
            | MapThingFlags::COOPERATIVE
            | MapThingFlags::DEATHMATCH,
        ..MapSpawnRecord::default()
    }
}
