use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use std::path::PathBuf;

use signal_sim::simulation::{
    read_input, run_commands, write_output, AdaptiveController, ControllerConfig, Intersection,
    IntersectionLayout, RandomLaneSelector, SignalGroupId, DEFAULT_MAX_GREEN, DEFAULT_MIN_GREEN,
};

#[derive(Parser)]
#[command(name = "signal_sim")]
#[command(about = "Signalized intersection simulation driven by a JSON command file")]
struct Cli {
    /// Input JSON file with the command list
    input: PathBuf,

    /// Output JSON file for the step statuses
    output: PathBuf,

    /// Minimum green interval in ticks
    #[arg(long, default_value_t = DEFAULT_MIN_GREEN)]
    min_green: u32,

    /// Maximum green interval in ticks
    #[arg(long, default_value_t = DEFAULT_MAX_GREEN)]
    max_green: u32,

    /// Explicit phase as comma separated signal group ids; repeat for each phase.
    /// Defaults to north+south then east+west.
    #[arg(long = "phase")]
    phases: Vec<String>,

    /// Compute phases from movement conflicts instead of using the default pairs
    #[arg(long, conflicts_with = "phases")]
    auto_phases: bool,

    /// Seed for lane selection
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let input = read_input(&cli.input)
        .with_context(|| format!("failed to read commands from {}", cli.input.display()))?;
    info!("Loaded {} commands from {}", input.commands.len(), cli.input.display());

    let config = ControllerConfig {
        min_green: cli.min_green,
        max_green: cli.max_green,
        phases: phase_config(&cli),
    };
    let controller = AdaptiveController::new(config).context("invalid controller configuration")?;
    let selector = match cli.seed {
        Some(seed) => RandomLaneSelector::with_seed(seed),
        None => RandomLaneSelector::new(),
    };
    let layout = IntersectionLayout::four_way().context("failed to build intersection layout")?;

    let mut intersection =
        Intersection::new(layout, controller, selector).context("failed to set up intersection")?;
    let output = run_commands(&mut intersection, &input.commands).context("simulation failed")?;

    write_output(&cli.output, &output)
        .with_context(|| format!("failed to write results to {}", cli.output.display()))?;
    info!("Wrote {} step statuses to {}", output.step_statuses.len(), cli.output.display());

    intersection.stats().log_summary();
    Ok(())
}

/// Phases used when neither `--phase` nor `--auto-phases` is given
const DEFAULT_PHASES: [&str; 2] = ["sg-north,sg-south", "sg-east,sg-west"];

/// `None` lets the controller compute phases itself
fn phase_config(cli: &Cli) -> Option<Vec<Vec<SignalGroupId>>> {
    if cli.auto_phases {
        return None;
    }
    if cli.phases.is_empty() {
        return Some(DEFAULT_PHASES.iter().map(|phase| parse_phase(phase)).collect());
    }
    Some(cli.phases.iter().map(|phase| parse_phase(phase)).collect())
}

/// Each `--phase` value is a comma separated list of group ids
fn parse_phase(raw: &str) -> Vec<SignalGroupId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(SignalGroupId::from)
        .collect()
}
