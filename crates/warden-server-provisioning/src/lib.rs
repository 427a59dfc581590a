// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity provisioning reconciler for Warden server.
//!
//! After the external directory authenticates a user, the
//! [`IdentityReconciler`] brings the local database in line with the
//! directory's view of that user: the user record itself, email records,
//! organization membership, and notification preferences. Every operation
//! is an idempotent upsert, so the reconciler runs on every login.
//!
//! There is no transaction spanning the steps. Each repository call is
//! independently consistent, and a crash between steps leaves a state the
//! next login repairs. Concurrent logins for the same identity collapse on
//! the schema's uniqueness constraints.

pub mod error;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use warden_server_auth::{resolve_role, DirectoryIdentity, Organization, User, UserId};
use warden_server_config::{DirectoryConfig, ProvisioningConfig};
use warden_server_db::{OrgRepository, UserOptionRepository, UserRepository};

pub use error::ProvisioningError;

/// Option key for the notification subscription preference.
const SUBSCRIBE_BY_DEFAULT_KEY: &str = "subscribe_by_default";

/// Reconciles authenticated directory identities into local records.
///
/// Configuration is fixed at construction for the life of the process;
/// changing provisioning policy means restarting with new configuration.
pub struct IdentityReconciler {
	users: Arc<UserRepository>,
	orgs: Arc<OrgRepository>,
	options: Arc<UserOptionRepository>,
	directory: DirectoryConfig,
	provisioning: ProvisioningConfig,
}

impl IdentityReconciler {
	pub fn new(
		users: Arc<UserRepository>,
		orgs: Arc<OrgRepository>,
		options: Arc<UserOptionRepository>,
		directory: DirectoryConfig,
		provisioning: ProvisioningConfig,
	) -> Self {
		Self {
			users,
			orgs,
			options,
			directory,
			provisioning,
		}
	}

	/// Reconcile a directory identity against the local database.
	///
	/// Returns the local user and whether it was created by this call.
	/// Running twice with the same inputs converges on the same state; the
	/// second call returns `created == false` and writes no new rows.
	///
	/// # Errors
	/// Store failures propagate immediately; partially applied steps are
	/// left for the next reconciliation to complete.
	#[tracing::instrument(skip(self, identity), fields(username = %identity.username))]
	pub async fn reconcile(
		&self,
		identity: &DirectoryIdentity,
	) -> Result<(User, bool), ProvisioningError> {
		info!(
			username = %identity.username,
			groups = identity.groups.len(),
			"reconciling directory identity"
		);

		let (mut user, created) = self.lookup_or_create_user(identity).await?;
		if !created {
			// Managed status is authoritative on every login, even for
			// records that predate directory integration.
			self.users.set_managed(&user.id).await?;
			user.is_managed = true;
		}

		let attr_present = !identity.emails.is_empty();
		let primary = self.derive_primary_email(identity, attr_present);

		if let Some(email) = &primary {
			self.users.set_primary_email(&user.id, email).await?;
			user.email = Some(email.clone());
		}

		if attr_present {
			let mark_verified = self.provisioning.mail_verified;
			for email in &identity.emails {
				self.users.upsert_email(&user.id, email, mark_verified).await?;
			}
		} else if let Some(email) = &primary {
			// Fallback addresses never came from the directory, so the
			// trust flag does not apply to them.
			self.users.upsert_email(&user.id, email, false).await?;
		}

		let Some(org) = self.resolve_default_org().await? else {
			return Ok((user, created));
		};

		let resolved = resolve_role(&identity.groups, &self.provisioning.role_mapping);
		let role = resolved
			.map(|r| r.as_str().to_string())
			.or_else(|| self.provisioning.default_role.clone());

		self.orgs
			.upsert_membership(
				&org.id,
				&user.id,
				role.as_deref(),
				self.provisioning.global_access,
			)
			.await?;

		if !self.provisioning.subscribe_by_default {
			self.options
				.set_value(&user.id, SUBSCRIBE_BY_DEFAULT_KEY, "0")
				.await?;
		}

		Ok((user, created))
	}

	/// Look up the user by directory username, creating a minimal managed
	/// record if none exists.
	async fn lookup_or_create_user(
		&self,
		identity: &DirectoryIdentity,
	) -> Result<(User, bool), ProvisioningError> {
		if let Some(user) = self.users.get_user_by_username(&identity.username).await? {
			return Ok((user, false));
		}

		let now = Utc::now();
		let user = User {
			id: UserId::generate(),
			username: identity.username.clone(),
			email: None,
			is_managed: true,
			created_at: now,
			updated_at: now,
		};
		self.users.create_user(&user).await?;
		info!(user_id = %user.id, username = %user.username, "provisioned new user");

		Ok((user, true))
	}

	/// Derive the primary email candidate.
	///
	/// First value of the configured email attribute when present. When the
	/// attribute is absent and a default email domain is configured, the raw
	/// username is carried verbatim; the legacy behavior this reproduces
	/// never appended the domain, and deployments rely on usernames already
	/// being mail-routable. Otherwise no candidate.
	fn derive_primary_email(
		&self,
		identity: &DirectoryIdentity,
		attr_present: bool,
	) -> Option<String> {
		if attr_present {
			return identity.emails.first().cloned();
		}
		if self.directory.default_email_domain.is_some() {
			return Some(identity.username.clone());
		}
		None
	}

	/// Resolve the configured default organization, slug preferred.
	///
	/// Returns `None` when no organization is configured, when the
	/// configured one does not exist, or when a legacy name lookup is
	/// ambiguous. Enrollment is skipped in all three cases rather than
	/// guessing.
	async fn resolve_default_org(&self) -> Result<Option<Organization>, ProvisioningError> {
		if let Some(slug) = &self.provisioning.default_org_slug {
			let org = self.orgs.get_org_by_slug(slug).await?;
			if org.is_none() {
				debug!(slug = %slug, "configured organization slug not found, skipping enrollment");
			}
			return Ok(org);
		}

		if let Some(name) = &self.provisioning.default_org_name {
			let mut orgs = self.orgs.list_orgs_by_name(name).await?;
			return Ok(match orgs.len() {
				1 => Some(orgs.remove(0)),
				0 => {
					debug!(name = %name, "configured organization name not found, skipping enrollment");
					None
				}
				matches => {
					warn!(
						name = %name,
						matches,
						"organization name is ambiguous, skipping enrollment"
					);
					None
				}
			});
		}

		Ok(None)
	}
}
