// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Directory attribute mapping configuration.
//!
//! The directory client hands over raw attributes; this section pins down
//! which logical attribute carries email addresses and the legacy default
//! email domain that gates the username-as-email fallback.

use serde::Deserialize;

/// Directory configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
	/// Logical attribute name holding email addresses.
	pub email_attribute: String,

	/// Legacy default email domain. When set and the email attribute is
	/// absent, the reconciler falls back to using the raw username as the
	/// primary email.
	pub default_email_domain: Option<String>,
}

impl Default for DirectoryConfig {
	fn default() -> Self {
		Self {
			email_attribute: "mail".to_string(),
			default_email_domain: None,
		}
	}
}

/// Directory configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectoryConfigLayer {
	#[serde(default)]
	pub email_attribute: Option<String>,
	#[serde(default)]
	pub default_email_domain: Option<String>,
}

impl DirectoryConfigLayer {
	pub fn merge(&mut self, other: DirectoryConfigLayer) {
		if other.email_attribute.is_some() {
			self.email_attribute = other.email_attribute;
		}
		if other.default_email_domain.is_some() {
			self.default_email_domain = other.default_email_domain;
		}
	}

	pub fn finalize(self) -> DirectoryConfig {
		DirectoryConfig {
			email_attribute: self.email_attribute.unwrap_or_else(|| "mail".to_string()),
			default_email_domain: self.default_email_domain,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_email_attribute_defaults_to_mail() {
		let config = DirectoryConfigLayer::default().finalize();
		assert_eq!(config.email_attribute, "mail");
		assert!(config.default_email_domain.is_none());
	}

	#[test]
	fn test_merge_keeps_unset_fields() {
		let mut base = DirectoryConfigLayer {
			email_attribute: Some("proxyAddresses".to_string()),
			default_email_domain: None,
		};
		base.merge(DirectoryConfigLayer {
			email_attribute: None,
			default_email_domain: Some("example.com".to_string()),
		});
		let config = base.finalize();
		assert_eq!(config.email_attribute, "proxyAddresses");
		assert_eq!(config.default_email_domain.as_deref(), Some("example.com"));
	}
}
