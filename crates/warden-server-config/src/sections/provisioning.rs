// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provisioning policy configuration.
//!
//! Controls how directory identities are mapped onto local users: the
//! group-to-role mapping, the default organization and role, and the
//! trust flags for email verification and subscription defaults.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

/// Provisioning configuration (runtime, fully resolved).
#[derive(Debug, Clone, Default)]
pub struct ProvisioningConfig {
	/// Role name to directory group names. A user in any listed group is a
	/// candidate for that role; the highest-privilege candidate wins.
	pub role_mapping: HashMap<String, HashSet<String>>,

	/// Slug of the organization new logins are enrolled into.
	pub default_org_slug: Option<String>,

	/// Legacy organization lookup by name, consulted only when no slug is
	/// configured.
	pub default_org_name: Option<String>,

	/// Role assigned when the mapping resolves nothing.
	pub default_role: Option<String>,

	/// Whether enrolled memberships carry global access.
	pub global_access: bool,

	/// Whether directory-sourced email addresses are trusted as verified.
	pub mail_verified: bool,

	/// Whether provisioned users keep the default notification
	/// subscription. When false, an opt-out option row is written.
	pub subscribe_by_default: bool,
}

/// Provisioning configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisioningConfigLayer {
	#[serde(default)]
	pub role_mapping: Option<HashMap<String, HashSet<String>>>,
	#[serde(default)]
	pub default_org_slug: Option<String>,
	#[serde(default)]
	pub default_org_name: Option<String>,
	#[serde(default)]
	pub default_role: Option<String>,
	#[serde(default)]
	pub global_access: Option<bool>,
	#[serde(default)]
	pub mail_verified: Option<bool>,
	#[serde(default)]
	pub subscribe_by_default: Option<bool>,
}

impl ProvisioningConfigLayer {
	pub fn merge(&mut self, other: ProvisioningConfigLayer) {
		if other.role_mapping.is_some() {
			self.role_mapping = other.role_mapping;
		}
		if other.default_org_slug.is_some() {
			self.default_org_slug = other.default_org_slug;
		}
		if other.default_org_name.is_some() {
			self.default_org_name = other.default_org_name;
		}
		if other.default_role.is_some() {
			self.default_role = other.default_role;
		}
		if other.global_access.is_some() {
			self.global_access = other.global_access;
		}
		if other.mail_verified.is_some() {
			self.mail_verified = other.mail_verified;
		}
		if other.subscribe_by_default.is_some() {
			self.subscribe_by_default = other.subscribe_by_default;
		}
	}

	pub fn finalize(self) -> ProvisioningConfig {
		ProvisioningConfig {
			role_mapping: self.role_mapping.unwrap_or_default(),
			default_org_slug: self.default_org_slug,
			default_org_name: self.default_org_name,
			default_role: self.default_role,
			global_access: self.global_access.unwrap_or(false),
			mail_verified: self.mail_verified.unwrap_or(false),
			subscribe_by_default: self.subscribe_by_default.unwrap_or(true),
		}
	}
}
