use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use rush_city::simulation::{
    CityMapCreator, DefaultCityMapCreator, LightColor, LightPattern, SimWorld,
    DEFAULT_PEDESTRIAN_PHASE, DEFAULT_VEHICLE_PHASE,
};

#[derive(Parser)]
#[command(name = "rush_city")]
#[command(about = "Headless grid traffic simulation")]
struct Cli {
    /// Number of map rows
    #[arg(long, default_value = "15")]
    rows: i32,

    /// Number of map columns
    #[arg(long, default_value = "20")]
    cols: i32,

    /// Number of simulation ticks to run
    #[arg(long, default_value = "200")]
    ticks: u32,

    /// Time delta per tick
    #[arg(long, default_value = "0.5")]
    delta: f64,

    /// Spawn a new car every N ticks
    #[arg(long, default_value = "2")]
    spawn_every: u32,

    /// Time a single traffic light stays green
    #[arg(long, default_value_t = DEFAULT_VEHICLE_PHASE)]
    vehicle_phase: f64,

    /// Time all traffic lights stay red after a green phase
    #[arg(long, default_value_t = DEFAULT_PEDESTRIAN_PHASE)]
    pedestrian_phase: f64,

    /// Seed for reproducible car spawning
    #[arg(long)]
    seed: Option<u64>,

    /// Print the map every N ticks, never if 0
    #[arg(long, default_value = "0")]
    print_every: u32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(cli: &Cli) -> Result<()> {
    info!(
        "Running {}x{} map for {} ticks of {}",
        cli.cols, cli.rows, cli.ticks, cli.delta
    );

    let map = DefaultCityMapCreator::with_traffic_lights(LightColor::Red)
        .create(cli.rows, cli.cols)
        .context("Failed to create city map")?;
    let pattern = LightPattern::new(cli.vehicle_phase, cli.pedestrian_phase)?;

    let mut world = match cli.seed {
        Some(seed) => SimWorld::new_with_seed(map, pattern, seed),
        None => SimWorld::new(map, pattern),
    };

    info!("SPAWNING CARS every {} ticks", cli.spawn_every);
    world.draw_map();

    for tick in 1..=cli.ticks {
        if cli.spawn_every > 0 && tick % cli.spawn_every == 0 {
            match world.spawn_random_car() {
                Ok(Some(_)) => {}
                Ok(None) => warn!("No free parking lot to spawn a car at tick {}", tick),
                Err(e) => warn!("{:#}", e),
            }
        }

        world.tick(cli.delta);

        if cli.print_every > 0 && tick % cli.print_every == 0 {
            println!("--- After tick {} ({:.1} simulated time) ---", tick, world.time);
            world.print_summary();
            world.draw_map();
        }
    }

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();

    let total_traffic_lights = world.map().traffic_light_lanes().len();
    world
        .stats
        .log_summary(world.map().street_count(), total_traffic_lights);
    Ok(())
}
