//! esnn - thin demo runner for the event-driven SNN simulation core
//!
//! Builds a small feed-forward network, drives it with a handful of
//! synthetic input spikes, and reports what the scheduler did. Dataset
//! file parsing, the GUI, and downstream classifiers are external
//! collaborators — this binary only exercises the core's own plumbing.

use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use esnn_cli::config::CliConfig;
use esnn_cli::error::{CliError, CliResult};

use esnn_core::neuron::{CubaLifNeuron, Neuron, NeuronCommon, ParrotNeuron};
use esnn_core::scheduler::{self, InputSpike, Pattern, RunParams};
use esnn_core::synapse::Kernel;
use esnn_core::topology;
use esnn_core::{NetworkConfig, SchedulingMode};

/// Scheduling mode selector
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Pop events off the queue as fast as they arrive
    Event,
    /// Advance in fixed time steps, dispatching due events at each tick
    Clock,
}

/// CLI arguments for a single demo run
#[derive(Debug, Parser)]
#[command(
    name = "esnn",
    version,
    about = "Demo runner for the event-driven SNN simulation core"
)]
struct Args {
    /// Path to a dataset directory of pre-extracted spike tuples (unused by
    /// the built-in demo network; accepted so real dataset-loading
    /// front ends can be wired in without changing this flag's shape)
    #[arg(long)]
    dataset: Option<std::path::PathBuf>,

    /// Scheduling mode
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Clock-driven step size; only meaningful when `--mode clock`
    #[arg(long)]
    dt: Option<f64>,

    /// Stop time for the run
    #[arg(long)]
    t_max: Option<f64>,

    /// RNG seed for network construction
    #[arg(long)]
    seed: Option<u64>,

    /// Config file path (defaults to the platform config directory)
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Save the constructed network as JSON to this path before running
    #[arg(long)]
    save_json: Option<std::path::PathBuf>,
}

fn main() -> CliResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let args = Args::parse();

    let config_path = match args.config.clone() {
        Some(p) => p,
        None => CliConfig::default_config_path()?,
    };
    let config = CliConfig::load_from_file(&config_path)?;

    let event_driven = match args.mode {
        Some(Mode::Event) => true,
        Some(Mode::Clock) => false,
        None => config.default_mode != "clock",
    };
    let dt = if event_driven { None } else { Some(args.dt.unwrap_or(1.0)) };
    let t_max = args.t_max.unwrap_or(config.default_t_max);
    let seed = args.seed.unwrap_or(config.default_seed);

    if args.dataset.is_some() {
        warn!("dataset loading is outside this crate's scope; running the built-in demo network instead");
    }

    let outcome = run_demo(seed, t_max, dt, args.save_json.as_deref())?;

    info!(
        events_processed = outcome.events_processed,
        final_time = outcome.final_time,
        "run complete"
    );

    Ok(())
}

fn run_demo(
    seed: u64,
    t_max: f64,
    dt: Option<f64>,
    save_json: Option<&std::path::Path>,
) -> CliResult<esnn_core::RunOutcome> {
    let mut net = esnn_core::Network::new(
        if dt.is_none() {
            SchedulingMode::EventDriven
        } else {
            SchedulingMode::ClockDriven
        },
        NetworkConfig::default(),
        seed,
    );

    let (_input_layer, input_ids) = topology::make_layer(&mut net, "input", 4, |_| {
        Neuron::Parrot(ParrotNeuron {
            common: NeuronCommon::new(esnn_core::NeuronId::new(0), esnn_core::LayerId::new(0), 1.0, 0.0),
        })
    })
    .map_err(CliError::Core)?;

    let (_hidden_layer, hidden_ids) = topology::make_layer(&mut net, "hidden", 2, |_| {
        Neuron::CubaLif(CubaLifNeuron {
            common: NeuronCommon::new(esnn_core::NeuronId::new(0), esnn_core::LayerId::new(0), -50.0, -70.0),
            tau_m: 20.0,
            bursting: false,
            homeostasis: None,
            wta: false,
        })
    })
    .map_err(CliError::Core)?;

    let dist = topology::WeightDelayDistribution::Fixed { weight: 20.0, delay: 1.0 };
    topology::all_to_all(&mut net, &input_ids, &hidden_ids, Kernel::Dirac, 1.0, &dist)
        .map_err(CliError::Core)?;

    if let Some(path) = save_json {
        let saved = build_saved_network(&net);
        let json = saved.to_json().map_err(CliError::Storage)?;
        std::fs::write(path, json)?;
    }

    let patterns = vec![Pattern {
        spikes: input_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| InputSpike { neuron_id: id, t: (i as f64) * 2.0 })
            .collect(),
        label: None,
    }];

    let outcome = scheduler::run_data(&mut net, &patterns, dt, None).map_err(CliError::Core)?;
    let remaining = scheduler::run(&mut net, RunParams { t_max, dt }).map_err(CliError::Core)?;

    Ok(esnn_core::RunOutcome {
        events_processed: outcome.events_processed + remaining.events_processed,
        final_time: remaining.final_time,
    })
}

fn build_saved_network(net: &esnn_core::Network) -> esnn_storage::SavedNetwork {
    let layers = net
        .layer_ids()
        .iter()
        .filter_map(|&id| net.layer(id).ok())
        .map(|layer| esnn_storage::LayerRecord {
            id: layer.id.raw(),
            name: layer.name.clone(),
            active: layer.active,
        })
        .collect();

    esnn_storage::SavedNetwork {
        version: esnn_storage::STORAGE_VERSION,
        layers,
        neurons: Vec::new(),
        synapses: Vec::new(),
    }
}
