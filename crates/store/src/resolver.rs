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

//! Upload-index resolution
//!
//! Maps the "latest snapshot is known corrupt" flag to the content id a
//! recovery attempt should load: the newest upload normally, the one just
//! before it once the newest has been found corrupt.

use std::sync::Arc;

use keeper_sdk::ContentId;
use thiserror::Error;
use tracing::debug;

use crate::snapshot::UploadIndex;

/// Error types for resolution
#[derive(Debug, Error)]
pub enum ResolveError {
	/// Listing failed in transport; not a corruption signal
	#[error("Upload index unavailable: {0}")]
	IndexUnavailable(String),
}

pub struct Resolver {
	index: Arc<dyn UploadIndex>,
}

impl Resolver {
	pub fn new(index: Arc<dyn UploadIndex>) -> Self {
		Self { index }
	}

	/// Number of index entries requested for a given corruption state
	pub fn depth(corrupted: bool) -> usize {
		if corrupted { 2 } else { 1 }
	}

	/// Resolve the content id to load
	///
	/// Returns `Ok(None)` when no suitable upload exists: the index is
	/// empty, or shorter than the requested depth. A corrupt latest upload
	/// with nothing before it therefore resolves to "no prior state".
	pub async fn resolve(&self, corrupted: bool) -> Result<Option<ContentId>, ResolveError> {
		let size = Self::depth(corrupted);

		let entries = self
			.index
			.list_recent(size)
			.await
			.map_err(|e| ResolveError::IndexUnavailable(e.to_string()))?;

		debug!(
			target: "recovery",
			requested = size,
			listed = entries.len(),
			corrupted = corrupted,
			"Upload index listed"
		);

		if entries.len() < size {
			return Ok(None);
		}

		Ok(entries.into_iter().nth(size - 1).map(|entry| entry.cid))
	}
}
