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

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use keeper_sdk::ContentId;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::SnapshotError;
use crate::clock::Clock;

/// Shortest cadence the scheduler accepts
const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for the Scheduler
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
	/// Cadence between snapshots, anchored to wall-clock multiples
	pub interval: Duration,
	/// Save once immediately when the scheduler starts
	pub run_on_start: bool,
}

impl Default for SchedulerConfig {
	fn default() -> Self {
		Self {
			interval: Duration::from_secs(300), // 5 minutes
			run_on_start: true,
		}
	}
}

/// Trait for the save operation the scheduler drives
///
/// The scheduler knows nothing about the document; it only asks for a
/// snapshot to be written and reports the outcome.
#[async_trait]
pub trait SnapshotSaver: Send + Sync {
	async fn save_snapshot(&self) -> Result<ContentId, SnapshotError>;
}

/// Scheduler - periodically persists the document
///
/// Runs as a tokio task for the lifetime of the process. Ticks fall on
/// wall-clock boundaries: with the default 5 minute cadence a save fires
/// at minute 0, 5, 10, ... of every hour, regardless of when the previous
/// save finished.
///
/// A failed save is logged and skipped. The next tick writes whatever the
/// document holds by then; nothing is retried out of band.
pub struct Scheduler {
	handle: Option<JoinHandle<()>>,
}

impl Scheduler {
	/// Start the scheduler on the current tokio runtime
	pub fn start(
		config: SchedulerConfig,
		clock: Arc<dyn Clock>,
		saver: Arc<dyn SnapshotSaver>,
	) -> Self {
		let handle = tokio::spawn(async move {
			info!(
				target: "scheduler",
				interval_secs = config.interval.as_secs(),
				run_on_start = config.run_on_start,
				"Scheduler started"
			);
			Self::run_schedule_loop(&config, clock.as_ref(), saver.as_ref()).await;
		});

		Self {
			handle: Some(handle),
		}
	}

	async fn run_schedule_loop(
		config: &SchedulerConfig,
		clock: &dyn Clock,
		saver: &dyn SnapshotSaver,
	) {
		let interval = config.interval.max(MIN_INTERVAL);

		if config.run_on_start {
			Self::tick(saver).await;
		}

		let mut next = next_boundary(clock.now(), interval);
		loop {
			let delay = (next - clock.now()).to_std().unwrap_or(Duration::ZERO);
			tokio::time::sleep(delay).await;

			Self::tick(saver).await;

			// Boundaries missed while saving (or while suspended) are skipped
			let now = clock.now();
			next = next_boundary(if now > next { now } else { next }, interval);
		}
	}

	async fn tick(saver: &dyn SnapshotSaver) {
		let start = std::time::Instant::now();
		match saver.save_snapshot().await {
			Ok(cid) => {
				info!(
					target: "scheduler",
					cid = %cid,
					save_ms = start.elapsed().as_millis(),
					"Snapshot saved"
				);
			}
			Err(SnapshotError::NotInitialized) => {
				warn!(target: "scheduler", "Document not initialized yet, skipping snapshot");
			}
			Err(e) => {
				error!(target: "scheduler", error = %e, "Failed to save snapshot");
			}
		}
	}

	pub fn shutdown(mut self) {
		info!(target: "scheduler", "Shutting down scheduler");
		if let Some(handle) = self.handle.take() {
			handle.abort();
		}
	}
}

impl Drop for Scheduler {
	fn drop(&mut self) {
		if let Some(handle) = self.handle.take() {
			handle.abort();
		}
	}
}

/// First wall-clock boundary strictly after `now`
///
/// Boundaries are multiples of `interval` since the Unix epoch.
pub fn next_boundary(now: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
	let period_ms = (interval.as_millis() as i64).max(1);
	let now_ms = now.timestamp_millis();
	let elapsed_in_period = now_ms.rem_euclid(period_ms);

	now + TimeDelta::milliseconds(period_ms - elapsed_in_period)
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use tokio::time::Instant;

	use super::*;

	/// Wall clock driven by tokio's (pausable) time
	struct SimulatedClock {
		origin: DateTime<Utc>,
		started: Instant,
	}

	impl SimulatedClock {
		fn new(origin: DateTime<Utc>) -> Self {
			Self {
				origin,
				started: Instant::now(),
			}
		}
	}

	impl Clock for SimulatedClock {
		fn now(&self) -> DateTime<Utc> {
			let elapsed = TimeDelta::from_std(self.started.elapsed()).unwrap_or(TimeDelta::zero());
			self.origin + elapsed
		}
	}

	#[derive(Default)]
	struct CountingSaver {
		calls: AtomicUsize,
		fail: bool,
	}

	#[async_trait]
	impl SnapshotSaver for CountingSaver {
		async fn save_snapshot(&self) -> Result<ContentId, SnapshotError> {
			let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
			if self.fail {
				return Err(SnapshotError::Unavailable("offline".to_string()));
			}
			Ok(ContentId::new(format!("cid-{}", n)))
		}
	}

	fn at(rfc3339: &str) -> DateTime<Utc> {
		DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
	}

	async fn settle() {
		for _ in 0..10 {
			tokio::task::yield_now().await;
		}
	}

	#[test]
	fn test_next_boundary_aligns_to_minute_marks() {
		let five = Duration::from_secs(300);
		assert_eq!(next_boundary(at("2026-01-03T12:03:17Z"), five), at("2026-01-03T12:05:00Z"));
		assert_eq!(next_boundary(at("2026-01-03T12:55:00Z"), five), at("2026-01-03T13:00:00Z"));
		assert_eq!(next_boundary(at("2026-01-03T12:59:59.500Z"), five), at("2026-01-03T13:00:00Z"));
	}

	#[tokio::test(start_paused = true)]
	async fn test_one_period_one_save() {
		let interval = Duration::from_secs(300);
		let saver = Arc::new(CountingSaver::default());
		let clock = Arc::new(SimulatedClock::new(at("2026-01-03T12:00:00Z")));

		let scheduler = Scheduler::start(
			SchedulerConfig {
				interval,
				run_on_start: false,
			},
			clock,
			saver.clone(),
		);
		settle().await;
		assert_eq!(saver.calls.load(Ordering::SeqCst), 0);

		tokio::time::advance(interval).await;
		settle().await;
		assert_eq!(saver.calls.load(Ordering::SeqCst), 1);

		tokio::time::advance(interval - Duration::from_millis(1)).await;
		settle().await;
		assert_eq!(saver.calls.load(Ordering::SeqCst), 1);

		tokio::time::advance(Duration::from_millis(1)).await;
		settle().await;
		assert_eq!(saver.calls.load(Ordering::SeqCst), 2);

		scheduler.shutdown();
	}

	#[tokio::test(start_paused = true)]
	async fn test_run_on_start_then_anchor_to_boundary() {
		let saver = Arc::new(CountingSaver::default());
		// Two minutes past a boundary: the first scheduled tick is three minutes away
		let clock = Arc::new(SimulatedClock::new(at("2026-01-03T12:02:00Z")));

		let _scheduler = Scheduler::start(SchedulerConfig::default(), clock, saver.clone());
		settle().await;
		assert_eq!(saver.calls.load(Ordering::SeqCst), 1);

		tokio::time::advance(Duration::from_secs(179)).await;
		settle().await;
		assert_eq!(saver.calls.load(Ordering::SeqCst), 1);

		tokio::time::advance(Duration::from_secs(1)).await;
		settle().await;
		assert_eq!(saver.calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn test_failed_save_is_skipped() {
		let interval = Duration::from_secs(60);
		let saver = Arc::new(CountingSaver {
			calls: AtomicUsize::new(0),
			fail: true,
		});
		let clock = Arc::new(SimulatedClock::new(at("2026-01-03T12:00:00Z")));

		let _scheduler = Scheduler::start(
			SchedulerConfig {
				interval,
				run_on_start: true,
			},
			clock,
			saver.clone(),
		);
		settle().await;
		assert_eq!(saver.calls.load(Ordering::SeqCst), 1);

		// No out-of-band retry before the next boundary
		tokio::time::advance(Duration::from_secs(30)).await;
		settle().await;
		assert_eq!(saver.calls.load(Ordering::SeqCst), 1);

		tokio::time::advance(Duration::from_secs(30)).await;
		settle().await;
		assert_eq!(saver.calls.load(Ordering::SeqCst), 2);
	}
}
