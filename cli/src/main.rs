//! `fogsim`: run an edge/fog/cloud offloading scenario and print the
//! per-entity report.
//!
//! ```bash
//! fogsim healthcare
//! fogsim parking --seed 42 --json
//! fogsim --topology my-site.json --policy round-robin
//! ```

mod render;

use clap::{Parser, ValueEnum};
use fogsim_core::{PolicyKind, SimResult, SimulationReport, Topology, VirtualTime};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Patient sensors, three fog nodes, least-load balancer
    Healthcare,
    /// Parking cameras, two fog nodes, random proxy
    Parking,
}

#[derive(Parser, Debug)]
#[command(name = "fogsim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Built-in scenario to run (ignored when --topology is given)
    #[arg(value_enum, default_value_t = Preset::Healthcare)]
    preset: Preset,

    /// Load the entity graph from a JSON topology file
    #[arg(short, long)]
    topology: Option<PathBuf>,

    /// Override every dispatcher's policy: random, least-load, round-robin
    #[arg(short, long)]
    policy: Option<PolicyKind>,

    /// Seed for random dispatchers. When omitted, random runs are not reproducible.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this much simulated time (seconds) instead of draining the queue
    #[arg(long)]
    until: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Print the resolved topology as JSON and exit
    #[arg(long)]
    dump_topology: bool,

    /// Log every dispatch decision
    #[arg(short, long)]
    verbose: bool,
}

fn resolve_topology(args: &Args) -> SimResult<Topology> {
    let mut topology = match &args.topology {
        Some(path) => Topology::load(path)?,
        None => match args.preset {
            Preset::Healthcare => Topology::smart_healthcare()?,
            Preset::Parking => Topology::smart_parking()?,
        },
    };
    if let Some(policy) = args.policy {
        topology = topology.with_policy(policy)?;
    }
    if let Some(seed) = args.seed {
        topology = topology.with_seed(seed);
    }
    Ok(topology)
}

fn simulate(args: &Args, topology: &Topology) -> SimResult<SimulationReport> {
    let mut sim = topology.build()?;
    match args.until {
        Some(until) => {
            sim.run_until(VirtualTime::new(until)?)?;
            sim.shutdown();
        }
        None => sim.run()?,
    }
    Ok(sim.report())
}

fn run(args: &Args) -> SimResult<()> {
    let topology = resolve_topology(args)?;
    if args.dump_topology {
        println!("{}", topology.to_json_pretty()?);
        return Ok(());
    }

    info!(topology = %topology.name, "starting simulation");
    let report = simulate(args, &topology)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::text_report(&topology.name, &report));
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "warn,fogsim_core=debug"
    } else {
        "warn,fogsim_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "simulation failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
