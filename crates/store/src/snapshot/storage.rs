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

use std::sync::Arc;

use async_trait::async_trait;
use keeper_sdk::{ContentId, FetchResponse, StoredFile, UploadEntry};
use tokio::sync::Mutex;

use super::SnapshotError;

/// Blob Store trait - the content-addressed, append-only snapshot store
///
/// Uploads are immutable: every `put` yields a new content id and nothing
/// is ever updated in place.
///
/// This abstraction allows different backing stores:
/// - In-memory (testing, local runs)
/// - The remote HTTP store through `keeper_sdk::StorageClient`
#[async_trait]
pub trait BlobStore: Send + Sync {
	/// Upload a set of files
	async fn put(&self, files: Vec<StoredFile>) -> Result<ContentId, SnapshotError>;

	/// Retrieve the files of an upload
	///
	/// `Err` means the store could not be reached; a reachable store that
	/// refuses the request answers `ok = false`.
	async fn get(&self, cid: &ContentId) -> Result<FetchResponse, SnapshotError>;
}

/// Upload Index trait - recency-ordered listing of the owner's uploads
#[async_trait]
pub trait UploadIndex: Send + Sync {
	/// List at most `n` uploads, most recent first
	async fn list_recent(&self, n: usize) -> Result<Vec<UploadEntry>, SnapshotError>;
}

#[derive(Default)]
struct MemoryState {
	/// Uploads in upload order (oldest first)
	uploads: Vec<(ContentId, Vec<StoredFile>)>,
	next_id: u64,
	unavailable: bool,
}

/// In-memory blob store and upload index
///
/// Stores uploads in memory only. Suitable for:
/// - Development and testing
/// - Running the host without a remote store
///
/// Clones share the same uploads.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
	state: Arc<Mutex<MemoryState>>,
}

impl MemoryBlobStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Simulate an outage: every call fails as unavailable until cleared
	pub async fn set_unavailable(&self, unavailable: bool) {
		self.state.lock().await.unavailable = unavailable;
	}

	/// Number of uploads stored so far
	pub async fn upload_count(&self) -> usize {
		self.state.lock().await.uploads.len()
	}

	/// Files of the most recent upload
	pub async fn latest(&self) -> Option<(ContentId, Vec<StoredFile>)> {
		self.state.lock().await.uploads.last().cloned()
	}
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
	async fn put(&self, files: Vec<StoredFile>) -> Result<ContentId, SnapshotError> {
		let mut state = self.state.lock().await;
		if state.unavailable {
			return Err(SnapshotError::Unavailable("memory store offline".to_string()));
		}

		state.next_id += 1;
		let cid = ContentId::new(format!("mem-{}", state.next_id));
		state.uploads.push((cid.clone(), files));
		Ok(cid)
	}

	async fn get(&self, cid: &ContentId) -> Result<FetchResponse, SnapshotError> {
		let state = self.state.lock().await;
		if state.unavailable {
			return Err(SnapshotError::Unavailable("memory store offline".to_string()));
		}

		Ok(state
			.uploads
			.iter()
			.find(|(id, _)| id == cid)
			.map(|(_, files)| FetchResponse::ok(files.clone()))
			.unwrap_or_else(FetchResponse::not_ok))
	}
}

#[async_trait]
impl UploadIndex for MemoryBlobStore {
	async fn list_recent(&self, n: usize) -> Result<Vec<UploadEntry>, SnapshotError> {
		let state = self.state.lock().await;
		if state.unavailable {
			return Err(SnapshotError::Unavailable("memory index offline".to_string()));
		}

		Ok(state
			.uploads
			.iter()
			.rev()
			.take(n)
			.map(|(cid, files)| UploadEntry {
				cid: cid.clone(),
				name: files.first().map(|f| f.name.clone()),
				created: None,
			})
			.collect())
	}
}
