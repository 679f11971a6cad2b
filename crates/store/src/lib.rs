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

//! Keeper state store
//!
//! This crate keeps the bot's application state (its DAO, member wallets
//! and proposals) in memory and makes it survive restarts without a
//! database: the document is periodically snapshotted to a
//! content-addressed, append-only blob store and recovered from the
//! latest valid snapshot at startup.
//!
//! Architecture:
//! - Document store facade owning the single live document
//! - Recovery loop with corruption fallback to the previous snapshot
//! - Wall-clock anchored scheduler for periodic snapshots
//! - Blob store / upload index capabilities, in memory or over HTTP

pub mod clock;
pub mod codec;
pub mod config;
pub mod document;
pub mod logging;
pub mod recovery;
pub mod remote;
pub mod resolver;
pub mod snapshot;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use codec::{DecodeError, EncodeError, decode, encode};
pub use document::{Document, DocumentError, Proposal};
pub use recovery::{Recovered, RecoveryConfig, RecoveryError, RecoveryFailure, RecoveryLoop};
pub use resolver::{ResolveError, Resolver};
pub use snapshot::{
	BlobStore, MemoryBlobStore, Scheduler, SchedulerConfig, SnapshotError, SnapshotSaver,
	UploadIndex,
};
pub use store::{DocumentStore, StoreError};
