// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Mergeable configuration layer.

use serde::Deserialize;

use crate::sections::{
	DatabaseConfigLayer, DirectoryConfigLayer, LoggingConfigLayer, ProvisioningConfigLayer,
};

/// A partial configuration from a single source. Layers from multiple
/// sources merge in precedence order before being finalized.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub database: Option<DatabaseConfigLayer>,
	#[serde(default)]
	pub directory: Option<DirectoryConfigLayer>,
	#[serde(default)]
	pub provisioning: Option<ProvisioningConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
}

impl ServerConfigLayer {
	/// Merge another layer on top of this one. Fields set in `other`
	/// override fields set here.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_section(&mut self.database, other.database, DatabaseConfigLayer::merge);
		merge_section(
			&mut self.directory,
			other.directory,
			DirectoryConfigLayer::merge,
		);
		merge_section(
			&mut self.provisioning,
			other.provisioning,
			ProvisioningConfigLayer::merge,
		);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	match (base.as_mut(), other) {
		(Some(b), Some(o)) => merge(b, o),
		(None, Some(o)) => *base = Some(o),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_fills_missing_sections() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer {
			database: Some(DatabaseConfigLayer {
				url: Some("sqlite::memory:".to_string()),
			}),
			..Default::default()
		});
		assert_eq!(
			base.database.unwrap().url.as_deref(),
			Some("sqlite::memory:")
		);
	}

	#[test]
	fn test_merge_overrides_within_section() {
		let mut base = ServerConfigLayer {
			directory: Some(DirectoryConfigLayer {
				email_attribute: Some("mail".to_string()),
				default_email_domain: Some("corp.example.com".to_string()),
			}),
			..Default::default()
		};
		base.merge(ServerConfigLayer {
			directory: Some(DirectoryConfigLayer {
				email_attribute: Some("userPrincipalName".to_string()),
				default_email_domain: None,
			}),
			..Default::default()
		});
		let directory = base.directory.unwrap();
		assert_eq!(directory.email_attribute.as_deref(), Some("userPrincipalName"));
		assert_eq!(
			directory.default_email_domain.as_deref(),
			Some("corp.example.com")
		);
	}
}
