use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use effects::{ConfettiConfig, CounterConfig, TreeBurstConfig};
use scene::data::{DonationPoint, FundsDistribution};
use serde::de::DeserializeOwned;
use session::ContainerSize;
use session::views::{FundsMapConfig, FundsMapView, GlobeConfig, GlobeView};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod run;

use run::{SessionRun, run_confetti, run_counter, run_tree, run_view};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless runs of the donation visualizations")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct Surface {
    /// Container width in CSS pixels
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Container height in CSS pixels
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    #[arg(long, default_value_t = 1.0)]
    pixel_ratio: f64,

    /// Host frames to deliver
    #[arg(long, default_value_t = 120)]
    frames: u64,

    /// Milliseconds between host frames
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f64,

    /// Pretend the host has no WebGL, to see the fallback
    #[arg(long)]
    no_webgl: bool,

    /// Fail resource allocation after this many successes
    #[arg(long)]
    allocation_limit: Option<usize>,
}

impl Surface {
    fn session_run(&self) -> SessionRun {
        SessionRun {
            size: ContainerSize::new(self.width, self.height, self.pixel_ratio),
            frames: self.frames,
            frame_ms: self.frame_ms,
            capable: !self.no_webgl,
            allocation_limit: self.allocation_limit,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mount the donation globe and run it for a number of frames
    Globe {
        /// JSON array of donations
        donations: PathBuf,

        /// Globe config (JSON); defaults apply to missing fields
        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        surface: Surface,
    },

    /// Mount the funds bar chart and run it for a number of frames
    FundsMap {
        /// JSON array of fund distributions
        distributions: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        surface: Surface,
    },

    /// Animate the donation counter toward `current` and report the celebration
    Counter {
        #[arg(long)]
        target: f64,

        #[arg(long)]
        current: f64,

        /// Counter config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Confetti config (JSON)
        #[arg(long)]
        confetti: Option<PathBuf>,

        #[arg(long, default_value_t = 1)]
        seed: u64,
    },

    /// Run one confetti burst to completion
    Confetti {
        #[arg(long, default_value_t = 1280.0)]
        width: f64,

        #[arg(long, default_value_t = 720.0)]
        height: f64,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = 1)]
        seed: u64,
    },

    /// Run one tree burst to completion
    Tree {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = 1)]
        seed: u64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let args = Args::parse();

    let summary = match args.command {
        Command::Globe {
            donations,
            config,
            surface,
        } => {
            let donations: Vec<DonationPoint> = read_json(&donations)?;
            let config: GlobeConfig = read_json_or_default(config.as_deref())?;
            info!(donations = donations.len(), "running globe");
            run_view(GlobeView::new(config, donations), &surface.session_run(), |view| {
                serde_json::json!({
                    "markers": view.scene().map_or(0, |s| s.markers.len()),
                    "earth_texture": format!("{:?}", view.earth_origin()),
                })
            })
        }
        Command::FundsMap {
            distributions,
            config,
            surface,
        } => {
            let distributions: Vec<FundsDistribution> = read_json(&distributions)?;
            let config: FundsMapConfig = read_json_or_default(config.as_deref())?;
            info!(distributions = distributions.len(), "running funds map");
            run_view(
                FundsMapView::new(config, distributions),
                &surface.session_run(),
                |view| {
                    serde_json::json!({
                        "bars": view.scene().map_or(0, |s| s.bars.len()),
                        "heights": view.scene().map(|s| s.heights.clone()).unwrap_or_default(),
                    })
                },
            )
        }
        Command::Counter {
            target,
            current,
            config,
            confetti,
            seed,
        } => {
            let config: CounterConfig = read_json_or_default(config.as_deref())?;
            let confetti: ConfettiConfig = read_json_or_default(confetti.as_deref())?;
            run_counter(target, current, config, confetti, seed)
        }
        Command::Confetti {
            width,
            height,
            config,
            seed,
        } => {
            let config: ConfettiConfig = read_json_or_default(config.as_deref())?;
            run_confetti(&config, width, height, seed)
        }
        Command::Tree { config, seed } => {
            let config: TreeBurstConfig = read_json_or_default(config.as_deref())?;
            run_tree(&config, seed)
        }
    };

    let text = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid JSON in {}: {e}", path.display()))
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T, String> {
    match path {
        Some(path) => read_json(path),
        None => Ok(T::default()),
    }
}
