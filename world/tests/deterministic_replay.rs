use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
};

use actorsim_core::{
    ActorId, ActorSnapshot, Command, Event, Fixed, MapSpawnRecord, MapThingFlags, MobjType,
    PlayerSlot, SimMode,
};
use actorsim_world::{
    self as world,
    info::{MT_MEDIKIT, MT_ROCKET, MT_TROOP, MT_TROOPSHOT},
    query, ActorTables, GameMode, LevelConfig, OpenArena, World,
};

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(first.level_time > 0);
    assert!(!first.actors.is_empty());
}

#[test]
fn different_seeds_diverge() {
    let mut config = LevelConfig {
        game_mode: GameMode::Deathmatch,
        ..LevelConfig::default()
    };
    let baseline = replay_with(config.clone());
    config.seed ^= 0xdead_beef;
    let reseeded = replay_with(config);

    assert_ne!(baseline.fingerprint(), reseeded.fingerprint());
}

fn replay() -> ReplayOutcome {
    replay_with(LevelConfig {
        game_mode: GameMode::Deathmatch,
        ..LevelConfig::default()
    })
}

fn replay_with(config: LevelConfig) -> ReplayOutcome {
    let mut world = World::new(
        config,
        Arc::new(ActorTables::stock()),
        Box::new(OpenArena::new(1024, 0, 256)),
    );
    let mut log = Vec::new();

    for (kind, x, y) in [
        (1, 0, 0),
        (3001, 400, 0),
        (3001, 400, 200),
        (3001, -300, -300),
        (2012, -200, 0),
    ] {
        let spawn = MapSpawnRecord {
            x,
            y,
            kind,
            flags: MapThingFlags::EASY
                | MapThingFlags::NORMAL
                | MapThingFlags::HARD
                | MapThingFlags::DEATHMATCH,
            ..MapSpawnRecord::default()
        };
        step(&mut world, Command::SpawnThing { spawn }, &mut log);
    }
    step(
        &mut world,
        Command::SpawnPlayer {
            player: PlayerSlot::new(0),
        },
        &mut log,
    );

    let body = query::player(&world, PlayerSlot::new(0))
        .and_then(|player| player.body)
        .expect("player body");
    let imps = of_kind(&world, MT_TROOP);
    let medikit = of_kind(&world, MT_MEDIKIT)[0];

    step(
        &mut world,
        Command::SetPlayerInput {
            player: PlayerSlot::new(0),
            forward_move: 25,
            side_move: 0,
        },
        &mut log,
    );
    step(
        &mut world,
        Command::Thrust {
            actor: body,
            momx: Fixed::from_int(12),
            momy: Fixed::ZERO,
            momz: Fixed::from_int(4),
        },
        &mut log,
    );
    step(
        &mut world,
        Command::FirePlayerMissile {
            source: body,
            kind: MT_ROCKET,
            mode: SimMode::Authoritative,
        },
        &mut log,
    );

    for tic in 0..70 {
        step(
            &mut world,
            Command::Tick {
                mode: SimMode::Authoritative,
            },
            &mut log,
        );
        match tic {
            10 => step(&mut world, Command::Kill { actor: imps[0] }, &mut log),
            20 => step(
                &mut world,
                Command::FireMissile {
                    source: imps[1],
                    target: body,
                    kind: MT_TROOPSHOT,
                    mode: SimMode::Authoritative,
                },
                &mut log,
            ),
            30 => step(&mut world, Command::ConsumePickup { actor: medikit }, &mut log),
            _ => {}
        }
    }

    let actors = query::population(&world)
        .into_iter()
        .filter_map(|actor| query::snapshot(&world, actor))
        .collect();
    ReplayOutcome {
        actors,
        events: log,
        level_time: query::level_time(&world),
    }
}

fn step(world: &mut World, command: Command, log: &mut Vec<Event>) {
    world::apply(world, command, log).expect("replay step");
}

fn of_kind(world: &World, kind: MobjType) -> Vec<ActorId> {
    query::population(world)
        .into_iter()
        .filter(|actor| {
            query::snapshot(world, *actor).is_some_and(|snapshot| snapshot.kind == kind)
        })
        .collect()
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    actors: Vec<ActorSnapshot>,
    events: Vec<Event>,
    level_time: u32,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        format!("{self:?}").hash(&mut hasher);
        hasher.finish()
    }
}
