// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group-membership to role resolution.
//!
//! [`resolve_role`] is a pure function: no I/O, no side effects, and no
//! failure mode besides returning `None`. Callers treat `None` as "no
//! mapping decision" and fall back to a configured default role, or leave
//! the membership role unset.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::types::Role;

/// Configured mapping from role name to the directory groups that grant it.
///
/// Loaded once from configuration and never mutated at runtime. Names
/// outside the fixed role vocabulary are permitted here but are skipped
/// during resolution.
pub type RoleMapping = HashMap<String, HashSet<String>>;

/// Resolve the effective role for an identity's group memberships.
///
/// Returns the highest-privilege vocabulary role whose configured group set
/// intersects `groups`. The tie-break is by [`Role::rank`], never by mapping
/// declaration or iteration order.
///
/// Returns `None` when the mapping is empty, the group set is empty, or no
/// mapped role applies.
pub fn resolve_role(groups: &HashSet<String>, mapping: &RoleMapping) -> Option<Role> {
	if mapping.is_empty() || groups.is_empty() {
		return None;
	}

	let resolved = mapping
		.iter()
		.filter(|(_, mapped_groups)| !mapped_groups.is_disjoint(groups))
		.filter_map(|(name, _)| {
			let role = Role::parse(name);
			if role.is_none() {
				debug!(role = %name, "skipping unknown role name in mapping");
			}
			role
		})
		.max_by_key(Role::rank);

	if let Some(role) = resolved {
		debug!(role = %role, "resolved effective role from group membership");
	}
	resolved
}
