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

use std::fmt;

use serde::{Deserialize, Serialize};

/// Content identifier assigned by the blob store on upload
///
/// Opaque to the client: it is only ever handed back to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
	pub fn new(cid: impl Into<String>) -> Self {
		Self(cid.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ContentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ContentId {
	fn from(cid: &str) -> Self {
		Self(cid.to_string())
	}
}

impl From<String> for ContentId {
	fn from(cid: String) -> Self {
		Self(cid)
	}
}

/// A single named file inside an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
	/// File name chosen by the uploader
	pub name: String,
	/// File body
	pub content: String,
}

impl StoredFile {
	pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			content: content.into(),
		}
	}
}

/// Request to upload a set of files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
	pub files: Vec<StoredFile>,
}

/// Response from an upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
	/// Content id of the new upload
	pub cid: ContentId,
}

/// Body returned when retrieving an upload
///
/// `files` is optional on the wire: a retrieval that resolves but carries
/// no file collection is reported as-is so the caller can decide what a
/// missing collection means.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentResponse {
	#[serde(default)]
	pub files: Option<Vec<StoredFile>>,
}

/// Result of a retrieval
///
/// Mirrors the store's `{ok, files()}` shape: `ok` is false when the
/// store answered with a non-success status.
#[derive(Debug, Clone, Default)]
pub struct FetchResponse {
	pub ok: bool,
	pub files: Option<Vec<StoredFile>>,
}

impl FetchResponse {
	pub fn ok(files: Vec<StoredFile>) -> Self {
		Self {
			ok: true,
			files: Some(files),
		}
	}

	pub fn not_ok() -> Self {
		Self {
			ok: false,
			files: None,
		}
	}
}

/// Entry of the upload index, most recent first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEntry {
	/// Content id of the upload
	pub cid: ContentId,
	/// Upload name, if the store recorded one
	#[serde(default)]
	pub name: Option<String>,
	/// Creation time as reported by the store (RFC 3339)
	#[serde(default)]
	pub created: Option<String>,
}
