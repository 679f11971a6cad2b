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

//! Snapshot codec
//!
//! A snapshot body is the document as one JSON object. Decoding is strict:
//! truncated or non-conforming input is rejected instead of yielding a
//! partial document, and the rejection is classified so recovery can tell
//! a corrupt upload apart from a generic decode failure.

use serde_json::error::Category;
use thiserror::Error;

use crate::document::Document;

/// The document could not be serialized
#[derive(Debug, Error)]
#[error("Failed to encode snapshot: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

/// Error types for snapshot decoding
#[derive(Debug, Error)]
pub enum DecodeError {
	/// Input ended before the document was complete
	#[error("Snapshot truncated: {0}")]
	Truncated(String),
	/// Well-formed JSON with the wrong shape (missing or mistyped fields)
	#[error("Snapshot does not match the document schema: {0}")]
	Schema(String),
	/// Not JSON at all
	#[error("Malformed snapshot: {0}")]
	Malformed(String),
}

impl DecodeError {
	/// Whether this failure marks the snapshot itself as corrupt
	pub fn is_corruption(&self) -> bool {
		matches!(self, DecodeError::Truncated(_) | DecodeError::Schema(_))
	}
}

impl From<serde_json::Error> for DecodeError {
	fn from(e: serde_json::Error) -> Self {
		match e.classify() {
			Category::Eof => DecodeError::Truncated(e.to_string()),
			Category::Data => DecodeError::Schema(e.to_string()),
			Category::Syntax | Category::Io => DecodeError::Malformed(e.to_string()),
		}
	}
}

/// Encode a document into a snapshot body
pub fn encode(document: &Document) -> Result<String, EncodeError> {
	Ok(serde_json::to_string(document)?)
}

/// Decode a snapshot body
pub fn decode(bytes: &[u8]) -> Result<Document, DecodeError> {
	Ok(serde_json::from_slice(bytes)?)
}
