#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads Pistonworks scenarios and replays them.

mod report;
mod scenario;

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glam::IVec2;
use log::LevelFilter;
use pistonworks_world::query;

use scenario::{Scenario, Simulation};

#[derive(Debug, Parser)]
#[command(name = "pistonworks")]
#[command(version)]
#[command(about = "Replay piston-driven ship scenarios")]
struct Cli {
    /// Enable debug logging unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the scenario, replay every step and print the final state
    Run {
        /// Scenario file in TOML format
        scenario: PathBuf,
    },
    /// Build the scenario and print the decomposed ships without replaying
    Inspect {
        /// Scenario file in TOML format
        scenario: PathBuf,
    },
    /// Report the actuator nearest to a pixel position
    Pick {
        /// Scenario file in TOML format
        scenario: PathBuf,
        /// Pixel x coordinate
        #[arg(long, allow_hyphen_values = true)]
        x: i32,
        /// Pixel y coordinate
        #[arg(long, allow_hyphen_values = true)]
        y: i32,
        /// Largest accepted distance in pixels
        #[arg(long, default_value = "8")]
        max_distance: i32,
    },
}

/// Entry point for the Pistonworks command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    match cli.command {
        Commands::Run { scenario } => run(&scenario),
        Commands::Inspect { scenario } => inspect(&scenario),
        Commands::Pick {
            scenario,
            x,
            y,
            max_distance,
        } => pick(&scenario, IVec2::new(x, y), max_distance),
    }
}

fn load(path: &Path) -> Result<(Scenario, Simulation)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario at {}", path.display()))?;
    let scenario = Scenario::from_toml(&contents)
        .with_context(|| format!("failed to parse scenario {}", path.display()))?;
    let simulation = Simulation::build(&scenario)
        .with_context(|| format!("failed to build scenario {}", path.display()))?;
    Ok((scenario, simulation))
}

fn run(path: &Path) -> Result<()> {
    let (scenario, mut simulation) = load(path)?;

    for (index, step) in scenario.steps.iter().enumerate() {
        let reports = simulation
            .step(step)
            .with_context(|| format!("step {index} failed"))?;
        for report in reports {
            println!(
                "step {index}: actuator {} {:?} -> {:?}",
                report.actuator.get(),
                report.stroke,
                report.outcome
            );
        }
    }

    print!("{}", report::describe(simulation.world()));
    Ok(())
}

fn inspect(path: &Path) -> Result<()> {
    let (_, simulation) = load(path)?;
    print!("{}", report::describe(simulation.world()));
    Ok(())
}

fn pick(path: &Path, point: IVec2, max_distance: i32) -> Result<()> {
    let (_, simulation) = load(path)?;
    let world = simulation.world();

    match query::nearest_actuator(world, point, max_distance) {
        Some(actuator) => {
            let distance =
                query::actuator_distance_to_point(world, actuator, point).unwrap_or_default();
            println!("actuator {} at distance {distance} px", actuator.get());
        }
        None => println!("no actuator within {max_distance} px of {point}"),
    }
    Ok(())
}
