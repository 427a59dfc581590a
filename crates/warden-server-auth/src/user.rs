// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local user records maintained by the provisioning reconciler.
//!
//! This module provides:
//! - [`User`] - the local user entity keyed by directory username
//! - [`UserEmail`] - a single email address attached to a user, with its
//!   verification state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// A local user record.
///
/// Users provisioned by the reconciler are always marked managed: the
/// account is controlled by the external directory, and collaborators must
/// disable local credential management for it.
///
/// # PII Handling
///
/// `username` and `email` are user-provided PII and should be redacted in
/// logs where possible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
	/// Unique identifier for this user.
	pub id: UserId,

	/// Directory username. Unique across all users.
	pub username: String,

	/// Primary email address for notifications, when one could be derived.
	pub email: Option<String>,

	/// Whether this account is controlled by the external directory.
	/// The reconciler sets this unconditionally on every login.
	pub is_managed: bool,

	/// When the user was created.
	pub created_at: DateTime<Utc>,

	/// When the user was last updated.
	pub updated_at: DateTime<Utc>,
}

/// An email address attached to a user.
///
/// A user holds at most one record per distinct email string; the pair
/// `(user, email)` is unique in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEmail {
	/// The owning user.
	pub user_id: UserId,

	/// The address itself.
	pub email: String,

	/// Whether the address has been verified. Set when the directory is
	/// configured as a trusted source of verified mail; never downgraded by
	/// the reconciler.
	pub is_verified: bool,

	/// When the record was created.
	pub created_at: DateTime<Utc>,
}
