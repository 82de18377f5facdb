use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use track_sim_core::config::SimConfig;
use track_sim_core::episode::{Episode, SnapshotRecorder};
use track_sim_core::metrics::EpisodeSummary;
use track_sim_core::nn::NeuralNet;
use track_sim_core::policy::{Policy, SteeringHeuristic};
use track_sim_core::rng::derive_member_rng;
use track_sim_core::track::TrackMap;

const BENCHMARK_POPULATIONS: [usize; 4] = [10, 30, 100, 300];
const BENCHMARK_MAX_TICKS: usize = 600;
const RANKING_ROWS: usize = 5;

#[derive(Parser)]
#[command(name = "track-sim")]
#[command(about = "Multi-car track simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyKind {
    /// Seeded random neural networks, one per car
    Nn,
    /// Scripted steering heuristic
    Heuristic,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one episode
    Run {
        /// Path to config file (JSON). Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Track image. A procedural oval is generated when omitted.
        #[arg(long)]
        track: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = PolicyKind::Nn)]
        policy: PolicyKind,

        #[arg(long, default_value_t = 0)]
        generation: u64,

        /// Output directory for results (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Record every n-th tick into snapshots.json (requires --out)
        #[arg(long)]
        snapshot_every: Option<usize>,
    },
    /// Run the performance benchmark suite
    Benchmark,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let config = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open config file {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file)).context("failed to parse config")?
        }
        None => SimConfig::default(),
    };
    config.validate().context("Config validation error")?;
    Ok(config)
}

/// Oval circuit scaled to the configured frame; the default spawn point sits on its road.
fn procedural_track(config: &SimConfig) -> Result<TrackMap> {
    let (w, h) = (config.track_width as f64, config.track_height as f64);
    TrackMap::ellipse_ring(
        config.track_width,
        config.track_height,
        [w * 0.475, h * 0.47],
        [w * 0.275, h * 0.23],
    )
    .context("failed to build procedural track")
}

fn load_track(config: &SimConfig, path: Option<&Path>) -> Result<TrackMap> {
    match path {
        Some(path) => TrackMap::load(
            path,
            config.track_width,
            config.track_height,
            config.border_color,
        )
        .with_context(|| format!("failed to load track {}", path.display())),
        None => procedural_track(config),
    }
}

fn build_policies(config: &SimConfig, kind: PolicyKind) -> Vec<Box<dyn Policy>> {
    (0..config.population_size)
        .map(|member| -> Box<dyn Policy> {
            match kind {
                PolicyKind::Nn => Box::new(NeuralNet::random(&mut derive_member_rng(
                    config.seed,
                    member,
                ))),
                PolicyKind::Heuristic => Box::new(SteeringHeuristic::default()),
            }
        })
        .collect()
}

/// Member indices ordered by fitness, best first. Ties keep population order.
fn ranking(summary: &EpisodeSummary) -> Vec<usize> {
    let mut order: Vec<usize> = (0..summary.fitness.len()).collect();
    order.sort_by(|&a, &b| summary.fitness[b].total_cmp(&summary.fitness[a]));
    order
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn run_benchmark(population_size: usize) -> Result<()> {
    let config = SimConfig {
        population_size,
        max_ticks: BENCHMARK_MAX_TICKS,
        ..SimConfig::default()
    };
    config
        .validate()
        .context("Benchmark config validation error")?;
    let track = procedural_track(&config)?;
    let policies = build_policies(&config, PolicyKind::Nn);
    let mut episode = Episode::new(&track, policies, config, 0)?;

    let start = Instant::now();
    let mut ticks = 0usize;
    let mut car_updates = 0usize;
    while !episode.is_finished() {
        let report = episode.step()?;
        ticks += 1;
        car_updates += report.alive_at_start;
    }
    let elapsed = start.elapsed().as_secs_f64().max(f64::EPSILON);

    println!("--- {population_size} cars ---");
    println!(
        "  Ticks:         {ticks} ({:.0} ticks/sec)",
        ticks as f64 / elapsed
    );
    println!(
        "  Car updates:   {car_updates} ({:.0} updates/sec)",
        car_updates as f64 / elapsed
    );
    println!("  Final alive:   {}/{population_size}", episode.alive_count());
    println!();
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = SimConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p track-sim-cli --release -- benchmark");
                eprintln!();
            }
            println!("=== Track Simulation Benchmark ===");
            println!("Tick budget: {BENCHMARK_MAX_TICKS}");
            println!();
            for population_size in BENCHMARK_POPULATIONS {
                run_benchmark(population_size)?;
            }
        }
        Commands::Run {
            config,
            track,
            policy,
            generation,
            out,
            snapshot_every,
        } => {
            let sim_config = load_config(config.as_deref())?;
            let track_map = load_track(&sim_config, track.as_deref())?;
            log::info!(
                "track {}x{} with {} boundary pixels",
                track_map.width(),
                track_map.height(),
                track_map.boundary_count()
            );

            let policies = build_policies(&sim_config, policy);
            println!(
                "Running generation {generation} with {} cars ({policy:?})...",
                sim_config.population_size
            );
            let mut episode = Episode::new(&track_map, policies, sim_config, generation)?;

            let mut recorder = snapshot_every.map(SnapshotRecorder::new);
            let summary = match recorder.as_mut() {
                Some(recorder) => episode.run_with_observer(recorder)?,
                None => episode.run()?,
            };

            println!(
                "Episode ended after {} ticks ({:?}), {} alive, mean fitness {:.2}",
                summary.ticks,
                summary.termination,
                summary.final_alive_count,
                summary.mean_fitness()
            );
            for (rank, member) in ranking(&summary).into_iter().take(RANKING_ROWS).enumerate() {
                println!(
                    "  #{:<2} car {member:>4}  fitness {:>10.2}  distance {:>8.1}",
                    rank + 1,
                    summary.fitness[member],
                    summary.distances[member]
                );
            }

            if let Some(out_dir) = out {
                std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
                write_json(&out_dir.join("summary.json"), &summary)?;
                if let Some(recorder) = recorder {
                    write_json(&out_dir.join("snapshots.json"), &recorder.into_frames())?;
                }
                println!("Results saved to {:?}", out_dir);
            } else if recorder.is_some() {
                eprintln!("--snapshot-every has no effect without --out");
            }
        }
    }
    Ok(())
}
