#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Grid Defence simulations.

use std::time::Duration;

use anyhow::{ensure, Result};
use clap::Parser;
use grid_defence_core::{BoardSize, Command, Event, GridCoord, TileContentKind};
use grid_defence_system_spawning::{Config, Spawning};
use grid_defence_system_tower_targeting::TowerTargeting;
use grid_defence_world::{self as world, query, World};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Headless Grid Defence simulation driver.
#[derive(Debug, Parser)]
#[command(name = "grid-defence", version, about)]
struct Args {
    /// Board width in tiles.
    #[arg(long, default_value_t = 11)]
    width: u32,

    /// Board height in tiles.
    #[arg(long, default_value_t = 11)]
    height: u32,

    /// Number of fixed simulation steps to run.
    #[arg(long, default_value_t = 120)]
    ticks: u32,

    /// Simulated milliseconds advanced per step.
    #[arg(long, default_value_t = 250)]
    tick_millis: u64,

    /// Milliseconds between enemy spawns.
    #[arg(long, default_value_t = 2_000)]
    spawn_interval_millis: u64,

    /// Number of random wall placements attempted before the run.
    #[arg(long, default_value_t = 12)]
    walls: u32,

    /// Number of random tower placements attempted before the run.
    #[arg(long, default_value_t = 3)]
    towers: u32,

    /// Seed shared by the scatter pass and the spawning system.
    #[arg(long)]
    seed: Option<u64>,
}

/// Counters accumulated over a run, printed as the final report.
#[derive(Debug, Default)]
struct RunStats {
    spawned: u32,
    exited: u32,
    rejected_edits: u32,
    lock_frames: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    ensure!(args.tick_millis > 0, "--tick-millis must be positive");
    ensure!(
        args.spawn_interval_millis > 0,
        "--spawn-interval-millis must be positive"
    );

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut world = World::new();
    let mut stats = RunStats::default();

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureBoard {
            size: BoardSize::new(args.width, args.height),
        },
        &mut events,
    );

    scatter_obstacles(&mut world, &args, seed, &mut stats);

    let mut spawning = Spawning::new(Config::new(
        Duration::from_millis(args.spawn_interval_millis),
        seed,
    ));
    let mut targeting = TowerTargeting::new();
    let mut targets = Vec::new();
    let dt = Duration::from_millis(args.tick_millis);

    for _ in 0..args.ticks {
        let mut events = Vec::new();
        world::apply(&mut world, Command::Tick { dt }, &mut events);

        let spawn_points = query::spawn_points(&world).to_vec();
        let mut commands = Vec::new();
        spawning.handle(&events, &spawn_points, &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        record_events(&events, &mut stats);

        targeting.handle(
            &query::tower_view(&world),
            &query::enemy_view(&world),
            &mut targets,
        );
        stats.lock_frames += targets.len() as u32;
    }

    println!("{}", render_board(&world));
    print_report(&world, &stats, seed);
    Ok(())
}

/// Toggles walls and towers onto random tiles. Placements that would sever
/// the path roll back inside the world and surface as rejected edits.
fn scatter_obstacles(world: &mut World, args: &Args, seed: u64, stats: &mut RunStats) {
    let size = query::board_size(world);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut events = Vec::new();

    for index in 0..args.walls + args.towers {
        let tile = GridCoord::new(
            rng.gen_range(0..size.width()),
            rng.gen_range(0..size.height()),
        );
        let command = if index < args.walls {
            Command::ToggleWall { tile }
        } else {
            Command::ToggleTower { tile }
        };
        world::apply(world, command, &mut events);
    }

    record_events(&events, stats);
}

fn record_events(events: &[Event], stats: &mut RunStats) {
    for event in events {
        match event {
            Event::EnemySpawned { .. } => stats.spawned += 1,
            Event::EnemyExited { .. } => stats.exited += 1,
            Event::EditRejected { .. } => stats.rejected_edits += 1,
            _ => {}
        }
    }
}

fn render_board(world: &World) -> String {
    let size = query::board_size(world);
    let view = query::tile_view(world);
    let enemies = query::enemy_view(world);

    let mut occupied = vec![false; size.area() as usize];
    for enemy in enemies.iter() {
        if let Some(tile) = query::tile_at(world, enemy.position) {
            occupied[(tile.y() * size.width() + tile.x()) as usize] = true;
        }
    }

    let mut output = String::new();
    for y in (0..size.height()).rev() {
        for x in 0..size.width() {
            let tile = GridCoord::new(x, y);
            let glyph = if occupied[(y * size.width() + x) as usize] {
                'e'
            } else {
                match view.tile(tile).map(|snapshot| snapshot.content) {
                    Some(TileContentKind::Wall) => '#',
                    Some(TileContentKind::Tower) => 'T',
                    Some(TileContentKind::Destination) => 'D',
                    Some(TileContentKind::SpawnPoint) => 'S',
                    _ => '.',
                }
            };
            output.push(glyph);
        }
        output.push('\n');
    }
    output
}

fn print_report(world: &World, stats: &RunStats, seed: u64) {
    println!("seed: {seed}");
    println!("spawned: {}", stats.spawned);
    println!("exited: {}", stats.exited);
    println!("still walking: {}", query::enemy_view(world).len());
    println!("rejected edits: {}", stats.rejected_edits);
    println!("tower lock frames: {}", stats.lock_frames);
}
