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

//! Logging initialization for the keeper
//!
//! This module provides logging configuration with file output and optional console output.
//!
//! # Configuration
//!
//! - `RUST_LOG`: Log level filter (default: `info`)
//!   - Can be set per target: `RUST_LOG=recovery=debug,scheduler=info`
//!
//! - `LOG_DIR`: Root directory for log files (default: `{project_root}/logs`)
//!   - Log files are created in `{LOG_DIR}/keeper/`
//!
//! - `LOG_TO_CONSOLE`: Enable console output (default: `false`)
//!   - Set to `true`, `1`, or `yes` to also log to stderr with ANSI colors
//!
//! # Log File Format
//!
//! - Rotation: one file per day (UTC), e.g. `keeper.2026-01-03.log`
//! - Format: UTC timestamp, thread ID, log level, target, message

use std::{
	env,
	path::{Path, PathBuf},
	sync::OnceLock,
};

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt,
};

use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_LOG_TO_CONSOLE, LOG_COMPONENT_NAME};

// Store log guard to prevent log loss on program exit
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

/// Find project root directory by walking up from the current directory
/// to the first `Cargo.toml` declaring a `[workspace]`
fn find_project_root() -> PathBuf {
	if let Ok(mut current) = env::current_dir() {
		loop {
			let cargo_toml = current.join("Cargo.toml");
			if let Ok(content) = std::fs::read_to_string(&cargo_toml)
				&& content.contains("[workspace]")
			{
				return current;
			}
			if !current.pop() {
				break;
			}
		}
	}

	env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Get log root directory from environment or use project root/logs
fn get_log_root() -> PathBuf {
	env::var("LOG_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|_| find_project_root().join("logs"))
}

/// Whether a `LOG_TO_CONSOLE` value enables console output
fn console_enabled(value: Option<&str>) -> bool {
	value
		.map(|v| v == "true" || v == "1" || v == "yes")
		.unwrap_or(DEFAULT_LOG_TO_CONSOLE)
}

/// Setup daily-rolling file logging layer.
fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME.to_string())
		.filename_suffix("log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// Initialize logging with file output and optional console output
///
/// See module-level documentation for environment variable configuration.
pub fn init_logging() -> Result<()> {
	dotenv::dotenv().ok();

	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

	// {LOG_DIR}/{component_name}/
	let log_dir = get_log_root().join(LOG_COMPONENT_NAME);
	std::fs::create_dir_all(&log_dir)
		.with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

	let file_writer = setup_file_logging(&log_dir)?;

	let log_to_console = console_enabled(env::var("LOG_TO_CONSOLE").ok().as_deref());

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	let subscriber = Registry::default().with(filter).with(
		fmt::layer()
			.with_writer(file_writer)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_thread_ids(true)
			.with_target(true)
			.with_thread_names(false)
			.with_ansi(false), // Disable ANSI colors for file output
	);

	if log_to_console {
		subscriber
			.with(
				fmt::layer()
					.with_writer(std::io::stderr)
					.with_timer(fmt::time::UtcTime::rfc_3339())
					.with_thread_ids(true)
					.with_target(true)
					.with_thread_names(false)
					.with_ansi(true),
			)
			.try_init()
			.context("Failed to install tracing subscriber")?;
	} else {
		subscriber
			.try_init()
			.context("Failed to install tracing subscriber")?;
	}

	info!(target: "server", "Log level: {}", log_level);
	info!(target: "server", "Log directory: {}", log_dir.display());
	info!(
		target: "server",
		"Log file base name: {}.YYYY-MM-DD.log (daily rolling)",
		LOG_COMPONENT_NAME
	);
	if log_to_console {
		info!(target: "server", "Console output: enabled");
	}

	Ok(())
}
