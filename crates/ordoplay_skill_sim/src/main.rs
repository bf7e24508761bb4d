// SPDX-License-Identifier: MIT OR Apache-2.0
//! `OrdoPlay` skill simulator.
//!
//! Plays a skill timeline headlessly against a logging host and prints the
//! activation trace as JSON lines on stdout. Logs go to stderr.
//!
//! ```text
//! ordoplay_skill_sim run slash.skill.ron --settings sim.ron
//! ordoplay_skill_sim sample slash.skill.ron
//! ordoplay_skill_sim validate slash.skill.ron
//! ```

mod host;
mod sample;
mod settings;
mod sim;

use clap::{Parser, Subcommand};
use ordoplay_skill_sequencer::{ConfigError, PlayMode, Timeline, TimelineError};
use settings::SimSettings;
use sim::Simulation;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(version, about = "Headless skill timeline simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a timeline and print its trace
    Run {
        /// Timeline RON file
        timeline: PathBuf,
        /// Simulation settings RON file
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// Use preview processes
        #[arg(long)]
        preview: bool,
        /// Override the tick size in seconds
        #[arg(long)]
        step: Option<f32>,
    },
    /// Write the demo timeline
    Sample {
        /// Output RON file
        path: PathBuf,
        /// Also write default simulation settings here
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Check a timeline's timing invariants
    Validate {
        /// Timeline RON file
        timeline: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum SimError {
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialization error: {0}")]
    Ron(#[from] ron::Error),
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), SimError> {
    match cli.command {
        Commands::Run {
            timeline,
            settings,
            preview,
            step,
        } => {
            let mut settings = match settings {
                Some(path) => SimSettings::load(&path)?,
                None => SimSettings::default(),
            };
            if preview {
                settings.runner.mode = PlayMode::Preview;
            }
            if let Some(step) = step {
                settings.step = step;
            }

            let timeline = Timeline::load(&timeline)?;
            if let Err(e) = timeline.validate() {
                tracing::warn!("Timeline '{}' is malformed: {e}", timeline.name);
            }

            let trace = Simulation::new(settings).run(timeline);
            let mut out = std::io::stdout().lock();
            for line in &trace {
                writeln!(out, "{}", serde_json::to_string(line)?)?;
            }
            out.flush()?;
        }
        Commands::Sample { path, settings } => {
            sample::sample_timeline().save(&path)?;
            tracing::info!("Wrote sample timeline to {}", path.display());
            if let Some(settings) = settings {
                std::fs::write(&settings, SimSettings::default().to_ron()?)?;
                tracing::info!("Wrote default settings to {}", settings.display());
            }
        }
        Commands::Validate { timeline } => {
            let timeline = Timeline::load(&timeline)?;
            timeline.validate()?;
            tracing::info!(
                "'{}' is valid: {} clips, {:.2}s",
                timeline.name,
                timeline.all_clips().count(),
                timeline.duration
            );
            for asset in timeline.asset_refs() {
                tracing::info!("  uses {asset}");
            }
        }
    }
    Ok(())
}
