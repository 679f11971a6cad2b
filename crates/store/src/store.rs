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

//! Document store facade
//!
//! Owns the single in-memory document. The store is created once at boot
//! and shared by handle (`Arc<DocumentStore>`) with every consumer; the
//! document inside it only becomes reachable after `initialize` has run
//! recovery.

use std::sync::Arc;

use async_trait::async_trait;
use keeper_sdk::{ContentId, StoredFile};
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::{
	clock::Clock,
	codec,
	document::Document,
	recovery::{RecoveryConfig, RecoveryError, RecoveryLoop},
	snapshot::{BlobStore, SnapshotError, SnapshotSaver, UploadIndex, snapshot_name},
};

/// Error types for document store access
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("Document store not initialized")]
	NotInitialized,
	#[error(transparent)]
	Recovery(#[from] RecoveryError),
}

pub struct DocumentStore {
	recovery: RecoveryLoop,
	blob_store: Arc<dyn BlobStore>,
	clock: Arc<dyn Clock>,
	document: OnceCell<RwLock<Document>>,
	last_saved: Mutex<Option<ContentId>>,
}

impl DocumentStore {
	pub fn new(
		blob_store: Arc<dyn BlobStore>,
		index: Arc<dyn UploadIndex>,
		config: RecoveryConfig,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self {
			recovery: RecoveryLoop::new(blob_store.clone(), index, config),
			blob_store,
			clock,
			document: OnceCell::new(),
			last_saved: Mutex::new(None),
		}
	}

	/// Recover the document, once
	///
	/// The first call runs the recovery loop; concurrent callers wait for
	/// that same run. Later calls return the cached document without
	/// touching the store. A failed run leaves the store uninitialized.
	pub async fn initialize(&self) -> Result<&RwLock<Document>, StoreError> {
		self.document
			.get_or_try_init(|| async {
				let recovered = self.recovery.recover().await?;
				info!(
					target: "store",
					source = ?recovered.source,
					attempts = recovered.attempts,
					"Document store initialized"
				);
				Ok::<_, StoreError>(RwLock::new(recovered.document))
			})
			.await
	}

	/// Initialize with the empty document
	///
	/// For hosts that choose to proceed after recovery gave up. Has no
	/// effect if the store is already initialized.
	pub async fn initialize_empty(&self) -> &RwLock<Document> {
		self.document
			.get_or_init(|| async {
				info!(target: "store", "Document store initialized with empty document");
				RwLock::new(Document::new())
			})
			.await
	}

	pub fn is_initialized(&self) -> bool {
		self.document.initialized()
	}

	/// The live document
	///
	/// Fails with `NotInitialized` until `initialize` has completed.
	pub fn current(&self) -> Result<&RwLock<Document>, StoreError> {
		self.document.get().ok_or(StoreError::NotInitialized)
	}

	pub async fn read(&self) -> Result<RwLockReadGuard<'_, Document>, StoreError> {
		Ok(self.current()?.read().await)
	}

	pub async fn write(&self) -> Result<RwLockWriteGuard<'_, Document>, StoreError> {
		Ok(self.current()?.write().await)
	}

	/// Content id of the last snapshot written by this process
	pub async fn last_saved(&self) -> Option<ContentId> {
		self.last_saved.lock().await.clone()
	}

	/// Write a snapshot of the current document
	///
	/// The document is only locked while it is encoded; the upload itself
	/// runs without holding the lock.
	pub async fn save_now(&self) -> Result<ContentId, SnapshotError> {
		let document = self.document.get().ok_or(SnapshotError::NotInitialized)?;

		let (name, body) = {
			let document = document.read().await;
			let name = snapshot_name(document.guild_id.as_deref(), self.clock.now().timestamp());
			(name, codec::encode(&document)?)
		};

		debug!(target: "store", name = %name, size_bytes = body.len(), "Uploading snapshot");

		let cid = self
			.blob_store
			.put(vec![StoredFile::new(name, body)])
			.await?;

		*self.last_saved.lock().await = Some(cid.clone());
		Ok(cid)
	}
}

#[async_trait]
impl SnapshotSaver for DocumentStore {
	async fn save_snapshot(&self) -> Result<ContentId, SnapshotError> {
		self.save_now().await
	}
}
