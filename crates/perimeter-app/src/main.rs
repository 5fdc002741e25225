use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use perimeter_app::game_loop::{spawn_game_loop, LoopOptions};
use perimeter_app::http_repository::HttpRepository;
use perimeter_app::persistence::spawn_writer;
use perimeter_app::render::{JsonLinesSink, LogSink, RenderSink};
use perimeter_app::state::AppState;
use perimeter_core::commands::OperatorCommand;
use perimeter_core::constants::TICK_RATE;
use perimeter_core::enums::ScanMode;
use perimeter_sim::{InMemoryRepository, MissionRepository, ScenarioConfig, SimConfig, SimulationEngine};

/// Headless perimeter-defense simulation.
///
/// Operator commands are read from stdin, one JSON object per line,
/// e.g. {"type":"SetTarget","target":{"kind":"LatLon","lat":14.21,"lon":101.22}}
#[derive(Parser, Debug)]
#[command(name = "perimeter")]
#[command(about = "Perimeter-defense simulation driver", long_about = None)]
struct Args {
    /// Scenario file (JSON); missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed for intruder motion
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Stop after this many ticks (runs until interrupted otherwise)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Mission store root, e.g. http://localhost:3000
    #[arg(short, long)]
    repository_url: Option<String>,

    /// Scan mode (manual, auto), overriding the scenario file
    #[arg(long)]
    scan_mode: Option<ScanMode>,

    /// Simulation speed multiplier
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,

    /// Tick as fast as possible instead of at 30Hz
    #[arg(long)]
    fast: bool,

    /// Write snapshots to stdout as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    init_logging()?;
    let args = Args::parse();

    let scenario = load_scenario(&args)?;
    let repository = open_repository(args.repository_url.as_deref())?;

    let mut engine = SimulationEngine::new(SimConfig {
        seed: args.seed,
        time_scale: args.time_scale,
        scenario,
    });
    if args.repository_url.is_some() {
        hydrate(&mut engine, repository.as_ref());
    }

    let (persist_tx, writer) =
        spawn_writer(repository.clone()).context("failed to start persistence writer")?;
    let sink: Box<dyn RenderSink> = if args.json {
        Box::new(JsonLinesSink::new(io::stdout(), u64::from(TICK_RATE)))
    } else {
        Box::new(LogSink)
    };
    let options = LoopOptions {
        max_ticks: args.ticks,
        unpaced: args.fast,
    };
    let (state, handle) = spawn_game_loop(engine, sink, Some(persist_tx), options)
        .context("failed to start simulation loop")?;

    let state = Arc::new(state);
    let input_state = state.clone();
    std::thread::Builder::new()
        .name("perimeter-input".into())
        .spawn(move || read_commands(io::stdin().lock(), &input_state))
        .context("failed to start input reader")?;

    tracing::info!(seed = args.seed, ticks = ?args.ticks, "simulation running");
    let ticks = handle
        .join()
        .map_err(|_| anyhow::anyhow!("simulation loop panicked"))?;
    // The loop dropped its sender; the writer drains and exits.
    let _ = writer.join();

    if let Some(snapshot) = state.snapshot() {
        tracing::info!(
            ticks,
            elapsed_secs = snapshot.time.elapsed_secs,
            asset = %snapshot.asset.grid_reference,
            alerts = snapshot.alert_log.len(),
            "simulation finished"
        );
    }
    Ok(())
}

fn init_logging() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install logger: {err}"))
}

fn load_scenario(args: &Args) -> Result<ScenarioConfig> {
    let mut scenario = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ScenarioConfig::from_json(&text)
                .with_context(|| format!("invalid scenario file {}", path.display()))?
        }
        None => ScenarioConfig::default(),
    };
    if let Some(mode) = args.scan_mode {
        scenario.scan_mode = mode;
    }
    scenario.validate().context("invalid scenario")?;
    if !(args.time_scale.is_finite() && args.time_scale > 0.0) {
        anyhow::bail!("time scale must be positive (got {})", args.time_scale);
    }
    Ok(scenario)
}

fn open_repository(url: Option<&str>) -> Result<Arc<dyn MissionRepository>> {
    Ok(match url {
        Some(url) => Arc::new(
            HttpRepository::new(url).with_context(|| format!("failed to set up client for {url}"))?,
        ),
        None => Arc::new(InMemoryRepository::default()),
    })
}

/// Startup read from the mission store. Failures leave the scenario as is.
fn hydrate(engine: &mut SimulationEngine, repository: &dyn MissionRepository) {
    match repository.load() {
        Ok(record) => match engine.hydrate(&record) {
            Ok(()) => tracing::info!(alerts = record.alerts.len(), "restored mission state"),
            Err(err) => tracing::warn!(%err, "stored mission state rejected"),
        },
        Err(err) => tracing::warn!(%err, "mission store unavailable; using scenario defaults"),
    }
}

/// Forward JSON-line commands until EOF or the loop exits.
fn read_commands(input: impl BufRead, state: &AppState) {
    for line in input.lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<OperatorCommand>(line) {
            Ok(command) => {
                if !state.send(command) {
                    break;
                }
            }
            Err(err) => tracing::warn!(%err, "ignoring malformed command"),
        }
    }
}
