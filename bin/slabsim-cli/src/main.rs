// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # slabsim
//!
//! Command-line interface for the slab allocator simulator.
//!
//! ## Usage
//! ```bash
//! # Stress the process-wide allocator for 30 seconds
//! slabsim run --duration 30 --min-size 100 --max-size 300
//!
//! # Same run, settings from a file, report as JSON
//! slabsim --config sim.toml run --json
//!
//! # Show where a handful of raw sizes land
//! slabsim inspect --sizes 8,13,512,1600
//! ```

mod commands;

use clap::{Parser, Subcommand};
use slab_driver::SimConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "slabsim",
    about = "Three-tier slab allocator simulator",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (CLI arguments override it).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Also write log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timed stress workload against the process-wide allocator.
    Run {
        /// Run duration in seconds.
        #[arg(short, long)]
        duration: Option<f64>,

        /// Smallest payload length in bytes.
        #[arg(long)]
        min_size: Option<usize>,

        /// Largest payload length in bytes.
        #[arg(long)]
        max_size: Option<usize>,

        /// Pause between allocations in milliseconds.
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Seconds between tracker samples.
        #[arg(long)]
        track_secs: Option<f64>,

        /// Chance per step of releasing a live block instead of allocating.
        #[arg(long)]
        release_probability: Option<f64>,

        /// Seed for the payload size stream.
        #[arg(long)]
        seed: Option<u64>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Allocate one object per raw size and print the resulting layout.
    Inspect {
        /// Comma-separated raw sizes in bytes (e.g., "8,13,512,1600").
        #[arg(short, long, value_delimiter = ',', required = true)]
        sizes: Vec<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };

    // Runs always keep a log file; inspect only when asked.
    let log_file = match (&cli.log_file, &cli.command) {
        (Some(path), _) => Some(path.clone()),
        (None, Commands::Run { .. }) => Some(config.log_file.clone()),
        (None, Commands::Inspect { .. }) => None,
    };
    commands::init_tracing(cli.verbose, log_file.as_deref())?;

    match cli.command {
        Commands::Run {
            duration,
            min_size,
            max_size,
            interval_ms,
            track_secs,
            release_probability,
            seed,
            json,
        } => {
            if let Some(v) = duration {
                config.duration_secs = v;
            }
            if let Some(v) = min_size {
                config.min_object_size = v;
            }
            if let Some(v) = max_size {
                config.max_object_size = v;
            }
            if let Some(v) = interval_ms {
                config.allocation_interval_ms = v;
            }
            if let Some(v) = track_secs {
                config.track_interval_secs = v;
            }
            if let Some(v) = release_probability {
                config.release_probability = v;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(path) = log_file {
                config.log_file = path;
            }
            commands::run::execute(config, json).await
        }
        Commands::Inspect { sizes } => commands::inspect::execute(&sizes),
    }
}
