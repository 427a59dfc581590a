// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory identities.
//!
//! A [`DirectoryIdentity`] is the view of an authenticated user handed over
//! by the external directory client after a successful bind and search. It
//! is constructed once per authentication event, consumed by the
//! provisioning reconciler, and discarded.

use std::collections::{HashMap, HashSet};

/// An authenticated directory identity.
///
/// The username has been verified by the external authentication step before
/// this type is constructed; the reconciler performs no validation of its
/// own on it.
#[derive(Debug, Clone)]
pub struct DirectoryIdentity {
	/// Verified directory username.
	pub username: String,

	/// Email addresses from the configured email attribute, in directory
	/// order. May be empty.
	pub emails: Vec<String>,

	/// Directory group identifiers the identity belongs to.
	pub groups: HashSet<String>,
}

impl DirectoryIdentity {
	/// Build an identity from raw directory attributes.
	///
	/// `email_attribute` is the configured logical attribute name holding
	/// email addresses (typically `mail`). Values are copied in attribute
	/// order.
	pub fn from_attributes(
		username: impl Into<String>,
		attrs: &HashMap<String, Vec<String>>,
		groups: HashSet<String>,
		email_attribute: &str,
	) -> Self {
		let emails = attrs.get(email_attribute).cloned().unwrap_or_default();
		Self {
			username: username.into(),
			emails,
			groups,
		}
	}
}

/// Normalize a login name to the bare directory username.
///
/// Directory binds use the portion before the first `@`; login forms may
/// submit either `jdoe` or `jdoe@example.com` and both map to the same
/// directory entry. Surrounding whitespace is trimmed.
pub fn normalize_username(raw: &str) -> &str {
	match raw.split_once('@') {
		Some((local, _)) => local.trim(),
		None => raw.trim(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	mod identity {
		use super::*;

		#[test]
		fn from_attributes_copies_configured_attribute() {
			let mut attrs = HashMap::new();
			attrs.insert(
				"mail".to_string(),
				vec!["a@x.com".to_string(), "b@x.com".to_string()],
			);
			attrs.insert("cn".to_string(), vec!["Jane Doe".to_string()]);

			let identity =
				DirectoryIdentity::from_attributes("jdoe", &attrs, HashSet::new(), "mail");
			assert_eq!(identity.emails, vec!["a@x.com", "b@x.com"]);
		}

		#[test]
		fn from_attributes_missing_attribute_yields_empty() {
			let attrs = HashMap::new();
			let identity =
				DirectoryIdentity::from_attributes("jdoe", &attrs, HashSet::new(), "mail");
			assert!(identity.emails.is_empty());
		}

		#[test]
		fn from_attributes_honors_attribute_name() {
			let mut attrs = HashMap::new();
			attrs.insert("mail".to_string(), vec!["a@x.com".to_string()]);
			attrs.insert("proxyAddresses".to_string(), vec!["b@y.com".to_string()]);

			let identity = DirectoryIdentity::from_attributes(
				"jdoe",
				&attrs,
				HashSet::new(),
				"proxyAddresses",
			);
			assert_eq!(identity.emails, vec!["b@y.com"]);
		}
	}

	mod normalize {
		use super::*;

		#[test]
		fn strips_domain_part() {
			assert_eq!(normalize_username("jdoe@example.com"), "jdoe");
		}

		#[test]
		fn passes_bare_usernames_through() {
			assert_eq!(normalize_username("jdoe"), "jdoe");
		}

		#[test]
		fn trims_whitespace() {
			assert_eq!(normalize_username("  jdoe @example.com"), "jdoe");
			assert_eq!(normalize_username(" jdoe "), "jdoe");
		}

		#[test]
		fn splits_at_first_at_sign() {
			assert_eq!(normalize_username("jdoe@corp@example.com"), "jdoe");
		}

		proptest! {
				#[test]
				fn result_never_contains_at_sign(
						raw in "[a-z0-9@. ]{0,30}"
				) {
						let normalized = normalize_username(&raw);
						prop_assert!(!normalized.contains('@'));
				}
		}
	}
}
