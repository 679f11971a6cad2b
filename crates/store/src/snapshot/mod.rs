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

pub mod scheduler;
mod storage;

use thiserror::Error;

use crate::codec::EncodeError;

pub use scheduler::{Scheduler, SchedulerConfig, SnapshotSaver, next_boundary};
pub use storage::{BlobStore, MemoryBlobStore, UploadIndex};

/// Error types for snapshot store operations
#[derive(Debug, Error)]
pub enum SnapshotError {
	/// Transport failure talking to the store or its index
	#[error("Snapshot store unavailable: {0}")]
	Unavailable(String),
	/// The store answered but refused the request
	#[error("Snapshot store rejected request: {0}")]
	Rejected(String),
	#[error("Nothing to save: document not initialized")]
	NotInitialized,
	#[error(transparent)]
	Encode(#[from] EncodeError),
}

/// Name of the file holding a snapshot
///
/// The guild id once one is assigned, otherwise a timestamp label. The
/// name is informational only: snapshots are always looked up by recency.
pub fn snapshot_name(guild_id: Option<&str>, unix_secs: i64) -> String {
	match guild_id {
		Some(guild_id) if !guild_id.is_empty() => guild_id.to_string(),
		_ => format!("snapshot-{}", unix_secs),
	}
}
