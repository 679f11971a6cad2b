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

//! Remote snapshot store
//!
//! Adapts the SDK's HTTP client to the store capabilities. Transport and
//! decoding problems surface as `Unavailable`; a store that answers with
//! an error status on upload or listing surfaces as `Rejected`.

use async_trait::async_trait;
use keeper_sdk::{ClientError, ContentId, FetchResponse, StorageClient, StoredFile, UploadEntry};

use crate::snapshot::{BlobStore, SnapshotError, UploadIndex};

impl From<ClientError> for SnapshotError {
	fn from(e: ClientError) -> Self {
		match e {
			ClientError::Server(msg) => SnapshotError::Rejected(msg),
			ClientError::Network(msg) | ClientError::Serialization(msg) => {
				SnapshotError::Unavailable(msg)
			}
		}
	}
}

#[async_trait]
impl BlobStore for StorageClient {
	async fn put(&self, files: Vec<StoredFile>) -> Result<ContentId, SnapshotError> {
		Ok(self.put_files(files).await?)
	}

	async fn get(&self, cid: &ContentId) -> Result<FetchResponse, SnapshotError> {
		Ok(self.get_content(cid).await?)
	}
}

#[async_trait]
impl UploadIndex for StorageClient {
	async fn list_recent(&self, n: usize) -> Result<Vec<UploadEntry>, SnapshotError> {
		Ok(self.list_uploads(n).await?)
	}
}
