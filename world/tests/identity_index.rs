use std::sync::Arc;

use actorsim_core::{ActorId, Command, Event, Fixed, SpawnHeight, ThingId};
use actorsim_world::{
    self as world,
    info::{MT_MEDIKIT, MT_TROOP},
    query, ActorTables, LevelConfig, OpenArena, World,
};

fn new_world() -> World {
    World::new(
        LevelConfig::default(),
        Arc::new(ActorTables::stock()),
        Box::new(OpenArena::new(2048, 0, 256)),
    )
}

fn tagged(world: &mut World, x: i32, tid: u16) -> ActorId {
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
    let Some(Event::ActorSpawned { actor, .. }) = events.first().cloned() else {
        panic!("spawn produced {events:?}");
    };
    world::apply(
        world,
        Command::SetThingId {
            actor,
            tid: ThingId::new(tid),
        },
        &mut events,
    )
    .expect("tag");
    actor
}

fn destroy(world: &mut World, actor: ActorId) {
    world::apply(world, Command::Destroy { actor }, &mut Vec::new()).expect("destroy");
}

#[test]
fn chains_list_the_newest_actor_first() {
    let mut world = new_world();
    let first = tagged(&mut world, -300, 7);
    let second = tagged(&mut world, 0, 7);
    let third = tagged(&mut world, 300, 7);

    assert_eq!(
        query::actors_with_tid(&world, ThingId::new(7)),
        vec![third, second, first]
    );
}

#[test]
fn destroying_relinks_middle_and_head() {
    let mut world = new_world();
    let first = tagged(&mut world, -300, 7);
    let second = tagged(&mut world, 0, 7);
    let third = tagged(&mut world, 300, 7);

    destroy(&mut world, second);
    assert_eq!(
        query::actors_with_tid(&world, ThingId::new(7)),
        vec![third, first]
    );

    destroy(&mut world, third);
    assert_eq!(query::actors_with_tid(&world, ThingId::new(7)), vec![first]);
    assert_eq!(query::find_by_tid(&world, Some(first), ThingId::new(7)), None);
}

#[test]
fn colliding_tags_share_a_bucket_but_not_a_result() {
    let mut world = new_world();
    let low = tagged(&mut world, -300, 7);
    let high = tagged(&mut world, 300, 7 + 128);

    assert_eq!(query::actors_with_tid(&world, ThingId::new(7)), vec![low]);
    assert_eq!(query::actors_with_tid(&world, ThingId::new(135)), vec![high]);
}

#[test]
fn retagging_moves_the_actor_between_chains() {
    let mut world = new_world();
    let imp = tagged(&mut world, 0, 3);
    world::apply(
        &mut world,
        Command::SetThingId {
            actor: imp,
            tid: ThingId::new(4),
        },
        &mut Vec::new(),
    )
    .expect("retag");

    assert!(query::actors_with_tid(&world, ThingId::new(3)).is_empty());
    assert_eq!(query::actors_with_tid(&world, ThingId::new(4)), vec![imp]);
}

#[test]
fn untagging_removes_the_actor_from_the_index() {
    let mut world = new_world();
    let imp = tagged(&mut world, 0, 3);
    world::apply(
        &mut world,
        Command::SetThingId {
            actor: imp,
            tid: ThingId::NONE,
        },
        &mut Vec::new(),
    )
    .expect("untag");

    assert!(query::actors_with_tid(&world, ThingId::new(3)).is_empty());
    assert_eq!(query::find_by_tid(&world, None, ThingId::NONE), None);
}

#[test]
fn goals_match_both_tag_and_type() {
    let mut world = new_world();
    let imp = tagged(&mut world, 0, 20);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnActor {
            kind: MT_MEDIKIT,
            x: Fixed::from_int(500),
            y: Fixed::ZERO,
            height: SpawnHeight::OnFloor,
        },
        &mut events,
    )
    .expect("spawn");
    let Some(Event::ActorSpawned { actor: medikit, .. }) = events.first().cloned() else {
        panic!("spawn produced {events:?}");
    };
    world::apply(
        &mut world,
        Command::SetThingId {
            actor: medikit,
            tid: ThingId::new(20),
        },
        &mut events,
    )
    .expect("tag");

    assert_eq!(
        query::find_goal(&world, None, ThingId::new(20), MT_TROOP),
        Some(imp)
    );
    assert_eq!(
        query::find_goal(&world, None, ThingId::new(20), MT_MEDIKIT),
        Some(medikit)
    );
}
