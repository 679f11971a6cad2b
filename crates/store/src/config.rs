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

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{recovery::RecoveryConfig, snapshot::SchedulerConfig};

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "keeper";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

/// Environment variable prefix for keeper settings
pub const ENV_PREFIX: &str = "KEEPER";

/// Keeper configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
	/// Base URL of the snapshot store API
	pub storage_endpoint: String,
	/// Bearer token for the snapshot store; opaque to the keeper
	pub storage_token: String,
	/// HTTP request timeout (ms)
	pub request_timeout_ms: u64,
	/// Wait between recovery attempts after a transient failure (ms)
	pub retry_delay_ms: u64,
	/// Give up recovery after this many failed attempts (unset: never)
	pub max_recovery_attempts: Option<u32>,
	/// Snapshot cadence (seconds), anchored to wall-clock multiples
	pub snapshot_interval_secs: u64,
	/// Save once as soon as the scheduler starts
	pub snapshot_on_start: bool,
	/// Proceed with an empty document when recovery gives up
	pub start_empty_on_exhausted: bool,
}

impl Default for KeeperConfig {
	fn default() -> Self {
		Self {
			storage_endpoint: "http://localhost:8787".to_string(),
			storage_token: String::new(),
			request_timeout_ms: 30_000,
			retry_delay_ms: 5_000,
			max_recovery_attempts: None,
			snapshot_interval_secs: 300,
			snapshot_on_start: true,
			start_empty_on_exhausted: false,
		}
	}
}

impl KeeperConfig {
	/// Load configuration from environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		Self::build(None, Self::environment())
	}

	/// Load configuration from file
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		Self::build(Some(path), Self::environment())
	}

	fn environment() -> config::Environment {
		config::Environment::with_prefix(ENV_PREFIX).try_parsing(true)
	}

	fn build(path: Option<&str>, env: config::Environment) -> Result<Self, config::ConfigError> {
		let mut builder = config::Config::builder();
		if let Some(path) = path {
			builder = builder.add_source(config::File::with_name(path));
		}

		let cfg = builder.add_source(env).build()?;

		cfg.try_deserialize()
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_millis(self.request_timeout_ms)
	}

	pub fn recovery_config(&self) -> RecoveryConfig {
		RecoveryConfig {
			retry_delay: Duration::from_millis(self.retry_delay_ms),
			max_attempts: self.max_recovery_attempts,
		}
	}

	pub fn scheduler_config(&self) -> SchedulerConfig {
		SchedulerConfig {
			interval: Duration::from_secs(self.snapshot_interval_secs),
			run_on_start: self.snapshot_on_start,
		}
	}
}
