#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless runner that populates a level and simulates it for a number of
//! tics.

mod scenario;

use std::{collections::BTreeMap, fmt, path::PathBuf, sync::Arc};

use actorsim_core::{ActorSnapshot, Command, Event, Fixed, PlayerSlot, SimMode};
use actorsim_system_item_respawn::{Config as ItemRespawnConfig, ItemRespawn};
use actorsim_system_prediction::Prediction;
use actorsim_world::{self as world, query, ActorTables, Counters, World};
use anyhow::{Context, Result};
use clap::Parser;

use crate::scenario::Scenario;

/// Tics between progress reports.
const REPORT_INTERVAL: u32 = 35;
/// Momentum gained per tic for each unit of forward intent.
const THRUST_PER_MOVE: i32 = 2048;

#[derive(Parser, Debug)]
#[command(
    name = "actorsim",
    author,
    version,
    about = "Runs an actor simulation level headlessly"
)]
struct Cli {
    /// Scenario file describing the level; the built-in level is used when
    /// absent.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Number of tics to simulate.
    #[arg(long, default_value_t = 350)]
    tics: u32,
    /// Overrides the level's random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Forward intent held by every player for the whole run.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    walk: i8,
    /// Replays the run speculatively and reports where it diverges.
    #[arg(long)]
    check_prediction: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut scenario = match &cli.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    if let Some(seed) = cli.seed {
        scenario.level.seed = seed;
    }

    let mut session = Session::new(&scenario, cli.walk)?;
    session.run(cli.tics, SimMode::Authoritative)?;

    if cli.check_prediction {
        let mut shadow = Session::new(&scenario, cli.walk)?;
        shadow.run(cli.tics, SimMode::Speculative)?;
        let divergences =
            Prediction::default().compare(&session.snapshots(), &shadow.snapshots());
        if divergences.is_empty() {
            log::info!("prediction matched the authoritative run");
        }
        for divergence in &divergences {
            log::warn!("prediction diverged: {divergence:?}");
        }
    }

    print!("{}", Summary::of(&session.world));
    Ok(())
}

/// A populated world together with the systems that run beside it.
struct Session {
    world: World,
    item_respawn: ItemRespawn,
    players: u8,
}

impl Session {
    fn new(scenario: &Scenario, walk: i8) -> Result<Self> {
        let delay = scenario.level.item_respawn_tics();
        let mut world = World::new(
            scenario.level.clone(),
            Arc::new(ActorTables::stock()),
            Box::new(scenario.arena.build()),
        );

        let mut events = Vec::new();
        for spawn in scenario.placements() {
            world::apply(&mut world, Command::SpawnThing { spawn }, &mut events)
                .with_context(|| format!("failed to place thing {}", spawn.kind))?;
        }
        for seat in 0..scenario.players {
            let player = PlayerSlot::new(seat);
            world::apply(&mut world, Command::SpawnPlayer { player }, &mut events)
                .with_context(|| format!("failed to spawn player {seat}"))?;
            world::apply(
                &mut world,
                Command::SetPlayerInput {
                    player,
                    forward_move: walk,
                    side_move: 0,
                },
                &mut events,
            )?;
        }
        // Predictions start from the populated level's random state.
        world.clear_prediction();
        log::info!(
            "level populated with {} actors",
            query::population(&world).len()
        );

        Ok(Self {
            world,
            item_respawn: ItemRespawn::new(ItemRespawnConfig::new(delay)),
            players: scenario.players,
        })
    }

    fn run(&mut self, tics: u32, mode: SimMode) -> Result<()> {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        for tic in 0..tics {
            events.clear();
            for command in self.player_thrusts() {
                world::apply(&mut self.world, command, &mut events)?;
            }
            world::apply(&mut self.world, Command::Tick { mode }, &mut events)
                .with_context(|| format!("simulation failed on tic {tic}"))?;
            for event in &events {
                log_event(event);
            }

            commands.clear();
            self.item_respawn.handle(&events, &mut commands);
            for command in commands.drain(..) {
                events.clear();
                world::apply(&mut self.world, command, &mut events)
                    .with_context(|| format!("respawn failed on tic {tic}"))?;
            }

            if (tic + 1) % REPORT_INTERVAL == 0 {
                log::info!(
                    "tic {}: {} actors, {} pickups pending",
                    tic + 1,
                    query::population(&self.world).len(),
                    self.item_respawn.pending()
                );
            }
        }
        Ok(())
    }

    /// Pushes every player body along its facing by its forward intent.
    fn player_thrusts(&self) -> Vec<Command> {
        (0..self.players)
            .filter_map(|seat| query::player(&self.world, PlayerSlot::new(seat)))
            .filter(|view| view.forward_move != 0)
            .filter_map(|view| {
                let body = view.body?;
                let angle = query::snapshot(&self.world, body)?.angle;
                let thrust = Fixed::from_raw(i32::from(view.forward_move) * THRUST_PER_MOVE);
                Some(Command::Thrust {
                    actor: body,
                    momx: thrust.fixed_mul(angle.cos()),
                    momy: thrust.fixed_mul(angle.sin()),
                    momz: Fixed::ZERO,
                })
            })
            .collect()
    }

    fn snapshots(&self) -> Vec<ActorSnapshot> {
        query::population(&self.world)
            .into_iter()
            .filter_map(|id| query::snapshot(&self.world, id))
            .collect()
    }
}

fn log_event(event: &Event) {
    match event {
        Event::SoundStarted { sound, .. } => log::trace!("sound {sound}"),
        Event::TimeAdvanced { .. } => {}
        other => log::debug!("{other:?}"),
    }
}

/// End-of-run report of who is still around.
#[derive(Debug)]
struct Summary {
    level_time: u32,
    counters: Counters,
    population: BTreeMap<&'static str, usize>,
}

impl Summary {
    fn of(world: &World) -> Self {
        let tables = query::tables(world);
        let mut population = BTreeMap::new();
        for id in query::population(world) {
            let name = query::snapshot(world, id)
                .and_then(|snapshot| tables.mobj(snapshot.kind))
                .map_or("unknown", |info| info.name);
            *population.entry(name).or_insert(0) += 1;
        }
        Self {
            level_time: query::level_time(world),
            counters: query::counters(world),
            population,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "level time: {} tics", self.level_time)?;
        writeln!(
            f,
            "totals: {} kills, {} items, {} secrets",
            self.counters.total_kills, self.counters.total_items, self.counters.total_secrets
        )?;
        for (name, count) in &self.population {
            writeln!(f, "{count:>5}  {name}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_level_runs_and_reports() {
        let scenario = Scenario::default();
        let mut session = Session::new(&scenario, 25).expect("populate");
        session.run(70, SimMode::Authoritative).expect("run");

        let summary = Summary::of(&session.world);
        assert_eq!(summary.level_time, 70);
        assert_eq!(summary.population.get("DoomImp"), Some(&3));
        assert_eq!(summary.population.get("DoomPlayer"), Some(&1));
        assert!(summary.to_string().starts_with("level time: 70 tics"));

        let body = query::player(&session.world, PlayerSlot::new(0))
            .and_then(|view| view.body)
            .expect("player body");
        let x = query::snapshot(&session.world, body).expect("live").x;
        assert!(x > Fixed::from_int(-256), "player stayed at {x:?}");
    }

    #[test]
    fn quiet_level_predicts_without_divergence() {
        let scenario = Scenario::default();
        let mut authority = Session::new(&scenario, 0).expect("populate");
        let mut shadow = Session::new(&scenario, 0).expect("populate");
        authority.run(20, SimMode::Authoritative).expect("run");
        shadow.run(20, SimMode::Speculative).expect("run");

        let divergences =
            Prediction::default().compare(&authority.snapshots(), &shadow.snapshots());
        assert!(divergences.is_empty(), "{divergences:?}");
    }
}
