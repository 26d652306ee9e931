use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sat_track::clock::SystemClock;
use sat_track::config::{parse_duration, Config};
use sat_track::elements::parse_all;
use sat_track::propagate::Sgp4Propagator;
use sat_track::sampler::Sampler;
use sat_track::source::{ElementSource, MemorySource, TleLoader};
use sat_track::tracker::{Tracker, TrackerContext};

#[derive(Parser)]
#[command(name = "sat-track")]
#[command(about = "Satellite position tracks and live position feeds")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a TLE file
    Validate { tle: PathBuf },
    /// Sample a satellite's track and print it as JSON
    Track {
        norad_id: u64,
        /// TLE file to read instead of the configured directory
        #[arg(long)]
        tle: Option<PathBuf>,
        /// Window start (RFC3339), defaults to now
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_duration)]
        duration: Option<chrono::Duration>,
        #[arg(long, value_parser = parse_duration)]
        step: Option<chrono::Duration>,
        #[arg(long)]
        ground_every: Option<usize>,
    },
    /// Print the live position feed as JSON lines until interrupted
    Follow {
        norad_id: u64,
        #[arg(long)]
        tle: Option<PathBuf>,
    },
    /// Run the HTTP server
    Serve,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(&path.to_string_lossy()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Commands::Validate { tle } => validate(&tle),
        Commands::Track {
            norad_id,
            tle,
            start,
            duration,
            step,
            ground_every,
        } => track(
            config,
            norad_id,
            tle.as_deref(),
            start,
            duration,
            step,
            ground_every,
        ),
        Commands::Follow { norad_id, tle } => follow(config, norad_id, tle.as_deref()).await,
        Commands::Serve => match sat_track::web::run_server(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Server error: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn validate(path: &Path) -> ExitCode {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let results = parse_all(&content);
    if results.is_empty() {
        eprintln!("No element sets found in {}", path.display());
        return ExitCode::FAILURE;
    }

    let mut failures = 0;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(set) => println!(
                "  {}: {} ({}) epoch {}",
                i + 1,
                set.name(),
                set.norad_id(),
                set.epoch()
            ),
            Err(e) => {
                failures += 1;
                println!("  {}: {}", i + 1, e);
            }
        }
    }

    if failures > 0 {
        eprintln!("{} of {} element sets are invalid", failures, results.len());
        ExitCode::FAILURE
    } else {
        println!("All {} element sets are valid", results.len());
        ExitCode::SUCCESS
    }
}

fn track(
    config: Config,
    norad_id: u64,
    tle: Option<&Path>,
    start: Option<DateTime<Utc>>,
    duration: Option<chrono::Duration>,
    step: Option<chrono::Duration>,
    ground_every: Option<usize>,
) -> ExitCode {
    let source = match open_source(&config, tle) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let Some(elements) = source.lookup(norad_id) else {
        eprintln!("No elements for satellite {}", norad_id);
        return ExitCode::FAILURE;
    };

    let propagator = Arc::new(Sgp4Propagator::new(config.propagator.validity_window));
    let sampler = Sampler::new(propagator, config.sampler.clone());
    let result = sampler.sample(
        &elements,
        start.unwrap_or_else(Utc::now),
        duration.unwrap_or(config.sampler.duration),
        step.unwrap_or(config.sampler.step),
    );

    let track = match result {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Sampling error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if track.skipped() > 0 {
        log::warn!("{} of the requested steps were skipped", track.skipped());
    }

    let every = ground_every.unwrap_or(config.sampler.ground_track_every);
    let output = serde_json::json!({
        "track": &track,
        "ground_track": track.ground_track(every),
        "skipped": track.skipped(),
    });
    match serde_json::to_string_pretty(&output) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Serialization error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn follow(config: Config, norad_id: u64, tle: Option<&Path>) -> ExitCode {
    let source = match open_source(&config, tle) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let context = TrackerContext {
        source,
        propagator: Arc::new(Sgp4Propagator::new(config.propagator.validity_window)),
        clock: Arc::new(SystemClock),
        config: config.tracker.clone(),
    };
    let tracker = match Tracker::spawn(norad_id, context) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error starting tracker: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut updates = tracker.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let feed = updates.borrow_and_update().feed();
                match serde_json::to_string(&feed) {
                    Ok(line) => println!("{}", line),
                    Err(e) => log::warn!("Failed to serialize position: {}", e),
                }
            }
        }
    }

    let last = tracker.stop().await;
    log::info!("Stopped following {} in phase {}", norad_id, last.phase);
    ExitCode::SUCCESS
}

fn open_source(config: &Config, tle: Option<&Path>) -> Result<Arc<dyn ElementSource>, String> {
    match tle {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
            let source = MemorySource::new();
            for result in parse_all(&content) {
                match result {
                    Ok(set) => {
                        source.offer(set);
                    }
                    Err(e) => log::warn!("Skipping element set in {}: {}", path.display(), e),
                }
            }
            Ok(Arc::new(source))
        }
        None => {
            let loader = TleLoader::new(config.elements.tle_folder.clone());
            loader.load_all().map_err(|e| e.to_string())?;
            Ok(Arc::new(loader))
        }
    }
}
