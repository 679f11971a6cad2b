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

//! Startup recovery
//!
//! This module rebuilds the document from the snapshot store when the
//! process starts. Each attempt walks three phases:
//!
//! 1. Resolve the content id to load from the upload index
//! 2. Fetch the upload from the blob store
//! 3. Decode the snapshot file into a document
//!
//! A corrupt upload (missing file collection, truncated or mis-shaped
//! body) rewinds to the previous upload, once. Anything else is treated as
//! the store being temporarily unavailable: wait, then retry the same
//! target. An empty index is a clean start, not an error.

use std::{sync::Arc, time::Duration};

use keeper_sdk::ContentId;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
	codec,
	document::Document,
	resolver::Resolver,
	snapshot::{BlobStore, UploadIndex},
};

/// Why a single recovery attempt failed
#[derive(Debug, Error)]
pub enum RecoveryFailure {
	#[error("Upload index unavailable: {0}")]
	IndexUnavailable(String),
	#[error("Fetch failed: {0}")]
	FetchFailed(String),
	#[error("Snapshot corrupted: {0}")]
	Corrupt(String),
	#[error("Snapshot could not be decoded: {0}")]
	Undecodable(String),
}

impl RecoveryFailure {
	pub fn is_corruption(&self) -> bool {
		matches!(self, RecoveryFailure::Corrupt(_))
	}
}

/// Error types for the recovery loop
#[derive(Debug, Error)]
pub enum RecoveryError {
	#[error("Recovery gave up after {attempts} attempts: {last_error}")]
	AttemptsExhausted {
		attempts: u32,
		last_error: RecoveryFailure,
	},
}

/// Configuration for the recovery loop
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
	/// Wait between attempts after a transient failure
	pub retry_delay: Duration,
	/// Give up after this many failed attempts; `None` retries forever
	pub max_attempts: Option<u32>,
}

impl Default for RecoveryConfig {
	fn default() -> Self {
		Self {
			retry_delay: Duration::from_secs(5),
			max_attempts: None,
		}
	}
}

/// Outcome of a successful recovery
#[derive(Debug, Clone)]
pub struct Recovered {
	pub document: Document,
	/// Upload the document was decoded from; `None` on a clean start
	pub source: Option<ContentId>,
	/// Attempts made, including the successful one
	pub attempts: u32,
	/// Whether the latest upload was found corrupt and skipped
	pub escalated: bool,
}

/// Recovery loop coordinator
pub struct RecoveryLoop {
	resolver: Resolver,
	blob_store: Arc<dyn BlobStore>,
	config: RecoveryConfig,
}

impl RecoveryLoop {
	pub fn new(
		blob_store: Arc<dyn BlobStore>,
		index: Arc<dyn UploadIndex>,
		config: RecoveryConfig,
	) -> Self {
		Self {
			resolver: Resolver::new(index),
			blob_store,
			config,
		}
	}

	/// Run attempts until a document (or a clean start) is obtained
	///
	/// Returns:
	/// - Ok(recovered): the decoded document, or the empty default when
	///   there is no prior state
	/// - Err(AttemptsExhausted): only when `max_attempts` is configured
	pub async fn recover(&self) -> Result<Recovered, RecoveryError> {
		info!(target: "recovery", "Starting state recovery...");

		let mut corrupted = false;
		let mut attempt: u32 = 0;

		loop {
			attempt += 1;

			let failure = match self.attempt(corrupted).await {
				Ok(Some((document, cid))) => {
					info!(
						target: "recovery",
						cid = %cid,
						attempts = attempt,
						escalated = corrupted,
						proposals = document.proposals.len(),
						members = document.user_wallets.len(),
						"Recovered document from snapshot"
					);
					return Ok(Recovered {
						document,
						source: Some(cid),
						attempts: attempt,
						escalated: corrupted,
					});
				}
				Ok(None) => {
					info!(
						target: "recovery",
						attempts = attempt,
						escalated = corrupted,
						"No prior snapshot, starting from empty document"
					);
					return Ok(Recovered {
						document: Document::new(),
						source: None,
						attempts: attempt,
						escalated: corrupted,
					});
				}
				Err(failure) => failure,
			};

			// Only the latest upload may be skipped; a corrupt penultimate
			// is retried like any transient failure.
			let escalate = failure.is_corruption() && !corrupted;

			if let Some(max_attempts) = self.config.max_attempts
				&& attempt >= max_attempts
			{
				warn!(
					target: "recovery",
					attempts = attempt,
					error = %failure,
					"Recovery attempt ceiling reached"
				);
				return Err(RecoveryError::AttemptsExhausted {
					attempts: attempt,
					last_error: failure,
				});
			}

			if escalate {
				warn!(
					target: "recovery",
					attempt = attempt,
					error = %failure,
					"Latest snapshot corrupted, falling back to the previous one"
				);
				corrupted = true;
				continue;
			}

			warn!(
				target: "recovery",
				attempt = attempt,
				error = %failure,
				retry_in_ms = self.config.retry_delay.as_millis(),
				"Recovery attempt failed, retrying"
			);
			tokio::time::sleep(self.config.retry_delay).await;
		}
	}

	/// One resolve -> fetch -> decode pass
	async fn attempt(
		&self,
		corrupted: bool,
	) -> Result<Option<(Document, ContentId)>, RecoveryFailure> {
		let Some(cid) = self
			.resolver
			.resolve(corrupted)
			.await
			.map_err(|e| RecoveryFailure::IndexUnavailable(e.to_string()))?
		else {
			return Ok(None);
		};

		let response = self
			.blob_store
			.get(&cid)
			.await
			.map_err(|e| RecoveryFailure::FetchFailed(format!("{}: {}", cid, e)))?;

		if !response.ok {
			return Err(RecoveryFailure::FetchFailed(format!(
				"{}: store answered not ok",
				cid
			)));
		}

		let files = response.files.ok_or_else(|| {
			RecoveryFailure::Corrupt(format!("{}: response has no file collection", cid))
		})?;
		let file = files
			.first()
			.ok_or_else(|| RecoveryFailure::Corrupt(format!("{}: upload holds no files", cid)))?;

		let document = codec::decode(file.content.as_bytes()).map_err(|e| {
			if e.is_corruption() {
				RecoveryFailure::Corrupt(format!("{}: {}", cid, e))
			} else {
				RecoveryFailure::Undecodable(format!("{}: {}", cid, e))
			}
		})?;

		Ok(Some((document, cid)))
	}
}
