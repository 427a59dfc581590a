// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{
	DatabaseConfigLayer, DirectoryConfigLayer, LoggingConfigLayer, ProvisioningConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/warden/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: WARDEN_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			database: Some(load_database_from_env()?),
			directory: Some(load_directory_from_env()?),
			provisioning: Some(load_provisioning_from_env()?),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn load_database_from_env() -> Result<DatabaseConfigLayer, ConfigError> {
	Ok(DatabaseConfigLayer {
		url: env_var("WARDEN_SERVER_DATABASE_URL"),
	})
}

fn load_directory_from_env() -> Result<DirectoryConfigLayer, ConfigError> {
	Ok(DirectoryConfigLayer {
		email_attribute: env_var("WARDEN_SERVER_DIRECTORY_EMAIL_ATTRIBUTE"),
		default_email_domain: env_var("WARDEN_SERVER_DIRECTORY_DEFAULT_EMAIL_DOMAIN"),
	})
}

fn load_provisioning_from_env() -> Result<ProvisioningConfigLayer, ConfigError> {
	let role_mapping = match env_var("WARDEN_SERVER_PROVISIONING_ROLE_MAPPING") {
		Some(json) => Some(serde_json::from_str(&json).map_err(|e| {
			ConfigError::InvalidValue {
				key: "WARDEN_SERVER_PROVISIONING_ROLE_MAPPING".to_string(),
				message: format!("invalid JSON object of role to group names: {e}"),
			}
		})?),
		None => None,
	};

	Ok(ProvisioningConfigLayer {
		role_mapping,
		default_org_slug: env_var("WARDEN_SERVER_PROVISIONING_DEFAULT_ORG"),
		default_org_name: env_var("WARDEN_SERVER_PROVISIONING_DEFAULT_ORG_NAME"),
		default_role: env_var("WARDEN_SERVER_PROVISIONING_DEFAULT_ROLE"),
		global_access: env_bool("WARDEN_SERVER_PROVISIONING_GLOBAL_ACCESS"),
		mail_verified: env_bool("WARDEN_SERVER_PROVISIONING_MAIL_VERIFIED"),
		subscribe_by_default: env_bool("WARDEN_SERVER_PROVISIONING_SUBSCRIBE_BY_DEFAULT"),
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	Ok(LoggingConfigLayer {
		level: env_var("WARDEN_SERVER_LOG_LEVEL"),
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let source = DefaultsSource;
		let layer = source.load().unwrap();
		assert!(layer.database.is_none());
		assert!(layer.provisioning.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let source = TomlSource::new("/nonexistent/config.toml");
		let layer = source.load().unwrap();
		assert!(layer.database.is_none());
	}

	#[test]
	fn test_toml_source_parses_sections() {
		use std::io::Write as _;

		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[database]
url = "sqlite:/var/lib/warden/warden.db"

[directory]
email_attribute = "mail"
default_email_domain = "example.com"

[provisioning]
default_org_slug = "acme"
default_role = "member"
mail_verified = true

[provisioning.role_mapping]
owner = ["platform-admins"]
member = ["engineering", "support"]

[logging]
level = "debug"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		let database = layer.database.unwrap();
		assert_eq!(database.url.as_deref(), Some("sqlite:/var/lib/warden/warden.db"));

		let provisioning = layer.provisioning.unwrap();
		assert_eq!(provisioning.default_org_slug.as_deref(), Some("acme"));
		assert_eq!(provisioning.mail_verified, Some(true));
		let mapping = provisioning.role_mapping.unwrap();
		assert_eq!(mapping["member"].len(), 2);
		assert!(mapping["owner"].contains("platform-admins"));
	}
}
