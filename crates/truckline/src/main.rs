// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Truckline - a freight booking broker for a single corridor.
//!
//! This is the binary entry point: `truckline serve` runs the broker,
//! `truckline track` follows bookings from the command line.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod serve;
mod track;

/// Truckline - a freight booking broker for a single corridor.
#[derive(Parser, Debug)]
#[command(name = "truckline", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the broker: pricing, bookings, fleet matching, real-time push.
    Serve,
    /// Follow one or more bookings, printing status updates as they land.
    Track {
        /// Booking IDs to follow.
        #[arg(required = true)]
        booking_ids: Vec<String>,
        /// Gateway base URL; defaults to the configured serve address.
        #[arg(long)]
        server_url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match truckline_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            truckline_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.server.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Track {
            booking_ids,
            server_url,
        } => track::run_track(config, booking_ids, server_url).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "truckline exited with error");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("truckline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Verify jemalloc is the global allocator by advancing the epoch.
        // Only jemalloc supports this -- the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config =
            truckline_config::load_and_validate().expect("default config should be valid");
        assert_eq!(config.server.port, 8090);
    }
}
