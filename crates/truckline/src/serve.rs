// SPDX-FileCopyrightText: 2026 Truckline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `truckline serve` command implementation.
//!
//! Opens storage, optionally seeds the demo fleet, and runs the gateway
//! until a shutdown signal arrives.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use truckline_config::model::TrucklineConfig;
use truckline_core::{CapacityTier, Truck, TrucklineError};
use truckline_dispatch::Dispatcher;
use truckline_gateway::ServerConfig;
use truckline_storage::Database;

/// Runs the `truckline serve` command.
pub async fn run_serve(config: TrucklineConfig) -> Result<(), TrucklineError> {
    info!("starting truckline serve");

    let db = Database::open(&config.storage.database_path).await?;
    let dispatcher = Dispatcher::new(db.clone());

    if config.fleet.seed_demo_fleet {
        seed_demo_fleet(&dispatcher).await?;
    }

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        booking_quota: config.limits.booking_quota,
        quota_window_secs: config.limits.quota_window_secs,
    };

    let mut server = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { truckline_gateway::start_server(&server_config, dispatcher).await }
    });

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            if let Err(e) = signal {
                warn!("ctrl-c handler failed: {e}");
            }
            info!("shutdown signal received");
            server.abort();
        }
        result = &mut server => {
            match result {
                Ok(outcome) => outcome?,
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    return Err(TrucklineError::Internal(format!(
                        "gateway task panicked: {e}"
                    )));
                }
            }
        }
    }

    db.close().await?;
    info!("truckline serve shutdown complete");
    Ok(())
}

/// Seed a small fleet across all capacity tiers, once.
///
/// Stands in for the external fleet-provisioning system the broker
/// normally integrates with; a non-empty trucks table means provisioning
/// already happened and the seed is skipped.
async fn seed_demo_fleet(dispatcher: &Dispatcher) -> Result<(), TrucklineError> {
    if !dispatcher.fleet().await?.is_empty() {
        info!("fleet already provisioned, demo seed skipped");
        return Ok(());
    }

    let seeds = [
        ("MH12AB1001", CapacityTier::T5, "driver-anil"),
        ("MH12AB1002", CapacityTier::T5, "driver-bhavna"),
        ("MH14CD2001", CapacityTier::T15, "driver-chetan"),
        ("MH14CD2002", CapacityTier::T15, "driver-divya"),
        ("MH04EF5001", CapacityTier::T50, "driver-esha"),
    ];
    for (registration, capacity, driver) in seeds {
        dispatcher
            .register_truck(&Truck {
                id: Uuid::new_v4().to_string(),
                registration: registration.to_string(),
                capacity,
                is_available: true,
                driver_id: Some(driver.to_string()),
                created_at: Utc::now(),
            })
            .await?;
    }
    info!(count = seeds.len(), "demo fleet seeded");
    Ok(())
}
