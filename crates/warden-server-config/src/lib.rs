// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for Warden server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`WARDEN_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use warden_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Database at {}", config.database.url);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub database: DatabaseConfig,
	pub directory: DirectoryConfig,
	pub provisioning: ProvisioningConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`WARDEN_SERVER_*`)
/// 2. Config file (`/etc/warden/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let database = layer.database.unwrap_or_default().finalize();
	let directory = layer.directory.unwrap_or_default().finalize();
	let provisioning = layer.provisioning.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&directory, &provisioning)?;

	info!(
		database = %database.url,
		email_attribute = %directory.email_attribute,
		default_email_domain = directory.default_email_domain.is_some(),
		role_mappings = provisioning.role_mapping.len(),
		default_org_configured =
			provisioning.default_org_slug.is_some() || provisioning.default_org_name.is_some(),
		mail_verified = provisioning.mail_verified,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		database,
		directory,
		provisioning,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(
	directory: &DirectoryConfig,
	provisioning: &ProvisioningConfig,
) -> Result<(), ConfigError> {
	if directory.email_attribute.trim().is_empty() {
		return Err(ConfigError::Validation(
			"WARDEN_SERVER_DIRECTORY_EMAIL_ATTRIBUTE must not be blank".to_string(),
		));
	}

	for (role, groups) in &provisioning.role_mapping {
		if groups.is_empty() {
			return Err(ConfigError::Validation(format!(
				"role mapping for '{role}' lists no groups; remove the entry or add groups"
			)));
		}
	}

	Ok(())
}
