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

//! Application state document
//!
//! The document is the single aggregate the bot persists: the DAO it
//! governs, the member wallet mapping and the proposals created so far.
//! Field names serialize in camelCase so a snapshot body is a plain JSON
//! object of the documented shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical errors raised by document mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
	#[error("User {0} is already a member")]
	AlreadyMember(String),
	#[error("DAO already registered at {0}")]
	DaoAlreadyRegistered(String),
	#[error("Proposal already recorded: {0}")]
	DuplicateProposal(String),
}

/// A proposal created through the bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
	pub proposal_id: String,
	/// Location of the proposal metadata
	pub metadata_uri: String,
}

/// Persisted application state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
	/// Owning community; set once at DAO creation
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub guild_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub dao_address: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_voting_plugin_address: Option<String>,
	/// Append-only, in creation order
	pub proposals: Vec<Proposal>,
	/// userId -> walletId
	pub user_wallets: BTreeMap<String, String>,
}

impl Document {
	pub fn new() -> Self {
		Self::default()
	}

	/// True when nothing has been recorded yet
	pub fn is_empty(&self) -> bool {
		self.guild_id.is_none()
			&& self.dao_address.is_none()
			&& self.token_voting_plugin_address.is_none()
			&& self.proposals.is_empty()
			&& self.user_wallets.is_empty()
	}

	/// Record the DAO created for a guild
	///
	/// The DAO address, its token-voting plugin and the owning guild are
	/// written together, once.
	pub fn register_dao(
		&mut self,
		guild_id: impl Into<String>,
		dao_address: impl Into<String>,
		plugin_address: impl Into<String>,
	) -> Result<(), DocumentError> {
		if let Some(existing) = &self.dao_address {
			return Err(DocumentError::DaoAlreadyRegistered(existing.clone()));
		}

		self.guild_id = Some(guild_id.into());
		self.dao_address = Some(dao_address.into());
		self.token_voting_plugin_address = Some(plugin_address.into());
		Ok(())
	}

	pub fn add_proposal(
		&mut self,
		proposal_id: impl Into<String>,
		metadata_uri: impl Into<String>,
	) -> Result<(), DocumentError> {
		let proposal_id = proposal_id.into();
		if self.proposal(&proposal_id).is_some() {
			return Err(DocumentError::DuplicateProposal(proposal_id));
		}

		self.proposals.push(Proposal {
			proposal_id,
			metadata_uri: metadata_uri.into(),
		});
		Ok(())
	}

	pub fn proposal(&self, proposal_id: &str) -> Option<&Proposal> {
		self.proposals.iter().find(|p| p.proposal_id == proposal_id)
	}

	/// Register a member's custodial wallet
	///
	/// A user can be registered once; there is no de-registration.
	pub fn add_member(
		&mut self,
		user_id: impl Into<String>,
		wallet_id: impl Into<String>,
	) -> Result<(), DocumentError> {
		let user_id = user_id.into();
		if self.user_wallets.contains_key(&user_id) {
			return Err(DocumentError::AlreadyMember(user_id));
		}

		self.user_wallets.insert(user_id, wallet_id.into());
		Ok(())
	}

	pub fn is_member(&self, user_id: &str) -> bool {
		self.user_wallets.contains_key(user_id)
	}

	pub fn wallet_of(&self, user_id: &str) -> Option<&str> {
		self.user_wallets.get(user_id).map(String::as_str)
	}
}
