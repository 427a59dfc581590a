// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization and membership types.
//!
//! This module provides:
//! - [`Organization`] - the target organization a provisioned user joins
//! - [`OrgMembership`] - a user's membership, flagged as externally managed
//!   (SSO-linked) when written by the reconciler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{OrgId, UserId};

/// An organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
	/// Unique identifier for this organization.
	pub id: OrgId,

	/// Display name. Not unique; legacy configuration may select the target
	/// organization by name, which can be ambiguous.
	pub name: String,

	/// URL-safe slug. Unique across all organizations.
	pub slug: String,

	/// When the organization was created.
	pub created_at: DateTime<Utc>,
}

/// A user's membership in an organization.
///
/// The pair `(org, user)` is unique in the store. For memberships written by
/// the provisioning reconciler, `role` and `has_global_access` are
/// authoritative: they are overwritten on every login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgMembership {
	/// The organization.
	pub org_id: OrgId,

	/// The member.
	pub user_id: UserId,

	/// Role name carried by the membership. Vocabulary roles are stored by
	/// their canonical lowercase name; a configured fallback role may fall
	/// outside the vocabulary, and the field is absent when neither a mapped
	/// role nor a fallback is available.
	pub role: Option<String>,

	/// Whether the member has access across all projects of the org.
	pub has_global_access: bool,

	/// Marks the membership as created and maintained by an external
	/// identity source rather than manual administration.
	pub sso_linked: bool,

	/// When the membership was created.
	pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn membership_serializes_role_name() {
		let membership = OrgMembership {
			org_id: OrgId::generate(),
			user_id: UserId::generate(),
			role: Some("owner".to_string()),
			has_global_access: true,
			sso_linked: true,
			created_at: Utc::now(),
		};
		let json = serde_json::to_string(&membership).unwrap();
		assert!(json.contains("\"role\":\"owner\""));
		assert!(json.contains("\"sso_linked\":true"));
	}

	#[test]
	fn membership_role_may_be_absent() {
		let membership = OrgMembership {
			org_id: OrgId::generate(),
			user_id: UserId::generate(),
			role: None,
			has_global_access: false,
			sso_linked: true,
			created_at: Utc::now(),
		};
		let json = serde_json::to_string(&membership).unwrap();
		assert!(json.contains("\"role\":null"));
	}
}
