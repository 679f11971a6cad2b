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

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock time
///
/// The scheduler anchors its cadence to wall-clock boundaries and snapshot
/// names fall back to a timestamp, so both read time through this trait.
pub trait Clock: Send + Sync {
	fn now(&self) -> DateTime<Utc>;
}

/// The system clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to.
#[derive(Debug)]
pub struct FixedClock {
	current: Mutex<DateTime<Utc>>,
}

impl FixedClock {
	pub fn new(initial: DateTime<Utc>) -> Self {
		Self {
			current: Mutex::new(initial),
		}
	}

	pub fn advance(&self, by: Duration) {
		let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
		*current += by;
	}

	pub fn set(&self, to: DateTime<Utc>) {
		*self.current.lock().unwrap_or_else(|e| e.into_inner()) = to;
	}
}

impl Clock for FixedClock {
	fn now(&self) -> DateTime<Utc> {
		*self.current.lock().unwrap_or_else(|e| e.into_inner())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fixed_clock_advances_only_on_request() {
		let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
		let clock = FixedClock::new(start);
		assert_eq!(clock.now(), start);

		clock.advance(Duration::seconds(90));
		assert_eq!(clock.now().timestamp(), 1_700_000_090);

		clock.set(start);
		assert_eq!(clock.now(), start);
	}
}
