// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Keeper host entry point
//!
//! Boots the durable state store the way the bot process does:
//! - Logging
//! - Snapshot store client (remote blob store + upload index)
//! - Document store, recovered from the latest valid snapshot
//! - Scheduler (periodic snapshots for the process lifetime)

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use keeper_sdk::StorageClient;
use keeper_store::{
	DocumentStore, RecoveryError, Scheduler, StoreError, SystemClock, config::KeeperConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
	// Initialize logging first
	keeper_store::logging::init_logging()?;

	let config = match std::env::var("KEEPER_CONFIG") {
		Ok(path) => KeeperConfig::from_file(&path)
			.with_context(|| format!("Failed to load configuration from {}", path))?,
		Err(_) => KeeperConfig::from_env().unwrap_or_else(|e| {
			warn!(target: "server", error = %e, "Using default configuration");
			KeeperConfig::default()
		}),
	};

	info!(target: "server", "Starting keeper");
	info!(target: "server", "Snapshot store: {}", config.storage_endpoint);
	info!(target: "server", "Snapshot interval: {}s", config.snapshot_interval_secs);

	let client = Arc::new(
		StorageClient::with_timeout(
			config.storage_endpoint.clone(),
			config.storage_token.clone(),
			config.request_timeout(),
		)
		.context("Failed to create snapshot store client")?,
	);

	match client.health_check().await {
		Ok(true) => info!(target: "server", "Snapshot store reachable"),
		Ok(false) => warn!(target: "server", "Snapshot store answered health check with an error"),
		Err(e) => warn!(target: "server", error = %e, "Snapshot store unreachable, recovery will retry"),
	}

	let clock = Arc::new(SystemClock);
	let store = Arc::new(DocumentStore::new(
		client.clone(),
		client,
		config.recovery_config(),
		clock.clone(),
	));

	info!(target: "server", "Recovering document...");
	match store.initialize().await {
		Ok(_) => {}
		Err(StoreError::Recovery(RecoveryError::AttemptsExhausted {
			attempts,
			last_error,
		})) if config.start_empty_on_exhausted => {
			warn!(
				target: "server",
				attempts = attempts,
				error = %last_error,
				"Recovery gave up, continuing with an empty document"
			);
			store.initialize_empty().await;
		}
		Err(e) => return Err(e).context("Failed to recover document"),
	}

	info!(target: "server", "Starting scheduler...");
	let scheduler = Scheduler::start(config.scheduler_config(), clock, store.clone());

	signal::ctrl_c()
		.await
		.context("Failed to listen for shutdown signal")?;

	info!(target: "server", "Shutting down...");
	scheduler.shutdown();

	if let Some(cid) = store.last_saved().await {
		info!(target: "server", cid = %cid, "Last snapshot");
	}
	info!(target: "server", "Shutdown complete");
	Ok(())
}
