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

//! Snapshot lifecycle tests: save through one store, recover through a
//! fresh one, as a restart would.

use std::{sync::Arc, time::Duration};

use chrono::DateTime;
use keeper_sdk::StoredFile;
use keeper_store::{
	BlobStore, DocumentError, DocumentStore, FixedClock, MemoryBlobStore, RecoveryConfig,
	Scheduler, SchedulerConfig,
};

fn store_over(blob: &MemoryBlobStore) -> Arc<DocumentStore> {
	let clock = FixedClock::new(DateTime::from_timestamp(1_767_441_600, 0).unwrap());
	Arc::new(DocumentStore::new(
		Arc::new(blob.clone()),
		Arc::new(blob.clone()),
		RecoveryConfig::default(),
		Arc::new(clock),
	))
}

#[tokio::test]
async fn test_restart_recovers_saved_document() {
	let blob = MemoryBlobStore::new();

	let before = store_over(&blob);
	assert!(before.initialize().await.unwrap().read().await.is_empty());
	{
		let mut doc = before.write().await.unwrap();
		doc.register_dao("guild-9", "0xdao", "0xplugin").unwrap();
		doc.add_member("bob", "wallet-b").unwrap();
		doc.add_member("alice", "wallet-a").unwrap();
		doc.add_proposal("p-2", "ipfs://two").unwrap();
		doc.add_proposal("p-1", "ipfs://one").unwrap();
	}
	before.save_now().await.unwrap();

	let after = store_over(&blob);
	after.initialize().await.unwrap();

	let recovered = after.read().await.unwrap();
	assert_eq!(*recovered, *before.read().await.unwrap());
	let order: Vec<_> = recovered
		.proposals
		.iter()
		.map(|p| p.proposal_id.as_str())
		.collect();
	assert_eq!(order, vec!["p-2", "p-1"]);
	assert_eq!(recovered.wallet_of("alice"), Some("wallet-a"));
}

#[tokio::test]
async fn test_restart_skips_corrupt_latest_upload() {
	let blob = MemoryBlobStore::new();

	let before = store_over(&blob);
	before.initialize().await.unwrap();
	before
		.write()
		.await
		.unwrap()
		.add_member("alice", "wallet-a")
		.unwrap();
	before.save_now().await.unwrap();

	// A half-written upload lands after the good one
	blob.put(vec![StoredFile::new("guild-9", "{\"proposals\":[")])
		.await
		.unwrap();

	let after = store_over(&blob);
	after.initialize().await.unwrap();
	assert_eq!(after.read().await.unwrap().wallet_of("alice"), Some("wallet-a"));
}

#[tokio::test]
async fn test_membership_is_surfaced_not_overwritten() {
	let blob = MemoryBlobStore::new();
	let store = store_over(&blob);
	store.initialize().await.unwrap();

	let mut doc = store.write().await.unwrap();
	doc.add_member("alice", "wallet-a").unwrap();
	assert_eq!(
		doc.add_member("alice", "wallet-z"),
		Err(DocumentError::AlreadyMember("alice".to_string()))
	);
	assert_eq!(doc.wallet_of("alice"), Some("wallet-a"));
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_persists_latest_mutations() {
	let blob = MemoryBlobStore::new();
	let store = store_over(&blob);
	store.initialize().await.unwrap();

	let interval = Duration::from_secs(60);
	let scheduler = Scheduler::start(
		SchedulerConfig {
			interval,
			run_on_start: true,
		},
		Arc::new(FixedClock::new(DateTime::from_timestamp(1_767_441_600, 0).unwrap())),
		store.clone(),
	);

	tokio::time::sleep(Duration::from_millis(10)).await;
	assert_eq!(blob.upload_count().await, 1);

	store
		.write()
		.await
		.unwrap()
		.add_proposal("p-1", "ipfs://one")
		.unwrap();

	tokio::time::sleep(interval).await;
	assert_eq!(blob.upload_count().await, 2);

	let restarted = store_over(&blob);
	restarted.initialize().await.unwrap();
	assert!(restarted.read().await.unwrap().proposal("p-1").is_some());

	scheduler.shutdown();
}
