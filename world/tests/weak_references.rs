use std::sync::Arc;

use actorsim_core::{ActorId, Command, Event, Fixed, RefSlot, SimMode, SpawnHeight};
use actorsim_world::{
    self as world,
    info::{MT_TROOP, MT_TROOPSHOT},
    query, ActorTables, LevelConfig, OpenArena, World,
};

fn new_world() -> World {
    World::new(
        LevelConfig::default(),
        Arc::new(ActorTables::stock()),
        Box::new(OpenArena::new(2048, 0, 256)),
    )
}

fn imp(world: &mut World, x: i32) -> ActorId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnActor {
            kind: MT_TROOP,
            x: Fixed::from_int(x),
            y: Fixed::ZERO,
            height: SpawnHeight::OnFloor,
        },
        &mut events,
    )
    .expect("spawn");
    match events.first() {
        Some(Event::ActorSpawned { actor, .. }) => *actor,
        other => panic!("unexpected event {other:?}"),
    }
}

fn point(world: &mut World, holder: ActorId, slot: RefSlot, target: Option<ActorId>) {
    world::apply(
        world,
        Command::SetReference {
            holder,
            slot,
            target,
        },
        &mut Vec::new(),
    )
    .expect("reference");
}

#[test]
fn destroying_a_target_clears_every_holder() {
    let mut world = new_world();
    let prey = imp(&mut world, 0);
    let hunters: Vec<ActorId> = (1..=4).map(|n| imp(&mut world, n * 100)).collect();
    let slots = [
        RefSlot::Target,
        RefSlot::LastEnemy,
        RefSlot::Tracer,
        RefSlot::Goal,
    ];
    for (hunter, slot) in hunters.iter().zip(slots) {
        point(&mut world, *hunter, slot, Some(prey));
    }
    point(&mut world, hunters[0], RefSlot::Tracer, Some(hunters[1]));

    world::apply(&mut world, Command::Destroy { actor: prey }, &mut Vec::new())
        .expect("destroy");

    for (hunter, slot) in hunters.iter().zip(slots) {
        assert_eq!(query::reference(&world, *hunter, slot), None);
    }
    assert_eq!(
        query::reference(&world, hunters[0], RefSlot::Tracer),
        Some(hunters[1])
    );
}

#[test]
fn repointing_forgets_the_previous_target() {
    let mut world = new_world();
    let hunter = imp(&mut world, 0);
    let first = imp(&mut world, 200);
    let second = imp(&mut world, -200);
    point(&mut world, hunter, RefSlot::Target, Some(first));
    point(&mut world, hunter, RefSlot::Target, Some(second));

    world::apply(&mut world, Command::Destroy { actor: first }, &mut Vec::new())
        .expect("destroy");
    assert_eq!(
        query::reference(&world, hunter, RefSlot::Target),
        Some(second)
    );
}

#[test]
fn references_to_dead_actors_are_refused() {
    let mut world = new_world();
    let hunter = imp(&mut world, 0);
    let ghost = imp(&mut world, 200);
    world::apply(&mut world, Command::Destroy { actor: ghost }, &mut Vec::new())
        .expect("destroy");

    point(&mut world, hunter, RefSlot::Target, Some(ghost));
    assert_eq!(query::reference(&world, hunter, RefSlot::Target), None);
}

#[test]
fn projectiles_outlive_their_owner() {
    let mut world = new_world();
    let shooter = imp(&mut world, 0);
    let target = imp(&mut world, 600);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::FireMissile {
            source: shooter,
            target,
            kind: MT_TROOPSHOT,
            mode: SimMode::Authoritative,
        },
        &mut events,
    )
    .expect("fire");
    let missile = events
        .iter()
        .find_map(|event| match event {
            Event::ActorSpawned { actor, kind } if *kind == MT_TROOPSHOT => Some(*actor),
            _ => None,
        })
        .expect("missile");
    assert_eq!(
        query::reference(&world, missile, RefSlot::Target),
        Some(shooter)
    );

    world::apply(&mut world, Command::Destroy { actor: shooter }, &mut Vec::new())
        .expect("destroy");
    world::apply(
        &mut world,
        Command::Tick {
            mode: SimMode::Authoritative,
        },
        &mut Vec::new(),
    )
    .expect("tick");

    assert!(query::is_live(&world, missile));
    assert_eq!(query::reference(&world, missile, RefSlot::Target), None);
}
