// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions for identity provisioning.
//!
//! This module defines:
//!
//! - **ID newtypes**: Type-safe wrappers around UUIDs ([`UserId`], [`OrgId`])
//!   preventing accidental mixing
//! - **Role vocabulary**: The fixed, ordered application role vocabulary
//!   ([`Role`]) used for organization memberships
//!
//! All ID types implement transparent serde serialization (as UUID strings)
//! and provide conversion to/from [`uuid::Uuid`].

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Newtypes
// =============================================================================

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(OrgId, "Unique identifier for an organization.");

// =============================================================================
// Role Vocabulary
// =============================================================================

/// Application roles assignable to an organization membership.
///
/// The vocabulary is fixed and totally ordered by privilege:
/// `member < admin < manager < owner`. When several roles apply to an
/// identity, the resolver picks the one with the highest [`Role::rank`].
///
/// Variant declaration order matches privilege order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Standard member access.
	Member,
	/// Manage projects and settings within the organization.
	Admin,
	/// Manage members, cannot delete the organization.
	Manager,
	/// Full organization control.
	Owner,
}

impl Role {
	/// Returns all roles, lowest privilege first.
	pub fn all() -> &'static [Role] {
		&[Role::Member, Role::Admin, Role::Manager, Role::Owner]
	}

	/// Numeric privilege rank. Higher wins a tie-break.
	pub fn rank(&self) -> u8 {
		match self {
			Role::Member => 0,
			Role::Admin => 1,
			Role::Manager => 2,
			Role::Owner => 3,
		}
	}

	/// Parse a role from its configured name.
	///
	/// Returns `None` for names outside the fixed vocabulary; such names are
	/// permitted in configuration but never participate in tie-breaks.
	pub fn parse(name: &str) -> Option<Role> {
		match name {
			"member" => Some(Role::Member),
			"admin" => Some(Role::Admin),
			"manager" => Some(Role::Manager),
			"owner" => Some(Role::Owner),
			_ => None,
		}
	}

	/// The canonical lowercase name, as stored on membership rows.
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Member => "member",
			Role::Admin => "admin",
			Role::Manager => "manager",
			Role::Owner => "owner",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}
