use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use wireless_sim::simulation::{
    Model, SimulationConfig, DEFAULT_BASE_STATIONS, DEFAULT_COVERAGE_RADIUS, DEFAULT_HEIGHT,
    DEFAULT_MAX_MOVE, DEFAULT_MAX_SIGNAL_DEMAND, DEFAULT_USERS, DEFAULT_WIDTH,
};

#[derive(Parser)]
#[command(name = "wireless_sim")]
#[command(about = "Headless wireless network simulation")]
struct Cli {
    /// Number of base stations to place
    #[arg(long, default_value_t = DEFAULT_BASE_STATIONS)]
    stations: usize,

    /// Number of users to place
    #[arg(long, default_value_t = DEFAULT_USERS)]
    users: usize,

    /// Map width in world units
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: i32,

    /// Map height in world units
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: i32,

    /// Seed for reproducible placement and movement
    #[arg(long)]
    seed: Option<u64>,

    /// Largest per-axis move of a user in one step
    #[arg(long, default_value_t = DEFAULT_MAX_MOVE)]
    max_move: i32,

    /// Distance within which a station can serve a user
    #[arg(long, default_value_t = DEFAULT_COVERAGE_RADIUS)]
    coverage_radius: i32,

    /// Upper bound of a generated user's signal demand
    #[arg(long, default_value_t = DEFAULT_MAX_SIGNAL_DEMAND)]
    max_demand: u32,

    /// Pause between simulation steps in milliseconds
    #[arg(long, default_value = "50")]
    interval_ms: u64,

    /// How long to run the simulation in milliseconds
    #[arg(long, default_value = "500")]
    duration_ms: u64,

    /// Load the initial map from a model file instead of generating one
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save the final map to a model file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Draw the map in the terminal
    #[arg(long)]
    map: bool,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        SimulationConfig {
            width: self.width,
            height: self.height,
            seed: self.seed,
            max_move: self.max_move,
            coverage_radius: self.coverage_radius,
            max_signal_demand: self.max_demand,
            step_interval: Duration::from_millis(self.interval_ms),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation without any graphics
fn run_headless(cli: &Cli) -> Result<()> {
    let model = Model::new(cli.config());

    let map = match &cli.load {
        Some(path) => model
            .load_model_file(path)
            .with_context(|| format!("Failed to load model file {}", path.display()))?,
        None => model
            .create_simulation_map(cli.stations, cli.users)
            .context("Failed to create simulation map")?,
    };

    println!("Initial state:");
    map.read().print_summary();
    if cli.map {
        map.read().draw_map();
    }
    println!();

    model
        .start_simulation()
        .context("Failed to start simulation")?;
    std::thread::sleep(Duration::from_millis(cli.duration_ms));
    model.stop_simulation();
    model.join_simulation()?;
    info!("Simulation finished after {} steps", map.read().steps());

    println!("=== Final State ===");
    map.read().print_summary();
    if cli.map {
        map.read().draw_map();
    }

    if let Some(path) = &cli.save {
        model.save_model_file(path);
    }

    Ok(())
}
