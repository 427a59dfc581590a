// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Organization repository for database operations.
//!
//! This module provides database access for:
//! - Organization lookup by slug (unique) or legacy name (possibly ambiguous)
//! - Membership upsert with authoritative role and access-level fields

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;
use warden_server_auth::{OrgId, OrgMembership, Organization, UserId};

use crate::error::DbError;

#[async_trait]
pub trait OrgStore: Send + Sync {
	async fn create_org(&self, org: &Organization) -> Result<(), DbError>;
	async fn get_org_by_slug(&self, slug: &str) -> Result<Option<Organization>, DbError>;
	async fn list_orgs_by_name(&self, name: &str) -> Result<Vec<Organization>, DbError>;
	async fn get_membership(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
	) -> Result<Option<OrgMembership>, DbError>;
	async fn upsert_membership(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
		role: Option<&str>,
		has_global_access: bool,
	) -> Result<(), DbError>;
}

/// Repository for organization database operations.
///
/// All IDs are UUIDs stored as strings in SQLite.
#[derive(Clone)]
pub struct OrgRepository {
	pool: SqlitePool,
}

impl OrgRepository {
	/// Create a new repository with the given pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a new organization.
	///
	/// # Arguments
	/// * `org` - The organization to create
	///
	/// # Errors
	/// Returns `DbError::Sqlx` if insert fails (e.g., duplicate slug).
	///
	/// # Database Constraints
	/// - `id` must be unique
	/// - `slug` must be unique
	#[tracing::instrument(skip(self, org), fields(org_id = %org.id, slug = %org.slug))]
	pub async fn create_org(&self, org: &Organization) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO organizations (id, name, slug, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(org.id.to_string())
		.bind(&org.name)
		.bind(&org.slug)
		.bind(org.created_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(org_id = %org.id, slug = %org.slug, "organization created");
		Ok(())
	}

	/// Get an organization by slug.
	///
	/// # Arguments
	/// * `slug` - The organization's URL-safe slug
	///
	/// # Returns
	/// `None` if no organization exists with this slug.
	#[tracing::instrument(skip(self), fields(slug = %slug))]
	pub async fn get_org_by_slug(&self, slug: &str) -> Result<Option<Organization>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, slug, created_at
			FROM organizations
			WHERE slug = ?
			"#,
		)
		.bind(slug)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_org(&r)).transpose()
	}

	/// List organizations by display name.
	///
	/// Names are not unique; legacy configuration selects the target
	/// organization by name, and callers must treat more than one match as
	/// ambiguous.
	///
	/// # Arguments
	/// * `name` - The organization's display name
	#[tracing::instrument(skip(self), fields(name = %name))]
	pub async fn list_orgs_by_name(&self, name: &str) -> Result<Vec<Organization>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, slug, created_at
			FROM organizations
			WHERE name = ?
			ORDER BY created_at ASC
			"#,
		)
		.bind(name)
		.fetch_all(&self.pool)
		.await?;

		let orgs: Result<Vec<_>, _> = rows.iter().map(|r| self.row_to_org(r)).collect();
		orgs
	}

	/// Get a membership for a user in an organization.
	///
	/// # Arguments
	/// * `org_id` - The organization's UUID
	/// * `user_id` - The user's UUID
	///
	/// # Returns
	/// `None` if the user is not a member.
	#[tracing::instrument(skip(self), fields(org_id = %org_id, user_id = %user_id))]
	pub async fn get_membership(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
	) -> Result<Option<OrgMembership>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT org_id, user_id, role, has_global_access, sso_linked, created_at
			FROM org_memberships
			WHERE org_id = ? AND user_id = ?
			"#,
		)
		.bind(org_id.to_string())
		.bind(user_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_membership(&r)).transpose()
	}

	/// Upsert a membership keyed by `(org, user)`.
	///
	/// The membership is marked SSO-linked, and `role` and
	/// `has_global_access` are overwritten when a row already exists: the
	/// provisioning reconciler is authoritative for these fields.
	///
	/// # Arguments
	/// * `org_id` - The organization's UUID
	/// * `user_id` - The user's UUID
	/// * `role` - Role name to carry, if any
	/// * `has_global_access` - Whether the member gets org-wide access
	///
	/// # Database Constraints
	/// - (`org_id`, `user_id`) must be unique
	#[tracing::instrument(skip(self), fields(org_id = %org_id, user_id = %user_id, role = ?role, has_global_access))]
	pub async fn upsert_membership(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
		role: Option<&str>,
		has_global_access: bool,
	) -> Result<(), DbError> {
		let id = Uuid::new_v4().to_string();
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			INSERT INTO org_memberships (id, org_id, user_id, role, has_global_access, sso_linked, created_at)
			VALUES (?, ?, ?, ?, ?, 1, ?)
			ON CONFLICT(org_id, user_id) DO UPDATE SET
				role = excluded.role,
				has_global_access = excluded.has_global_access,
				sso_linked = 1
			"#,
		)
		.bind(&id)
		.bind(org_id.to_string())
		.bind(user_id.to_string())
		.bind(role)
		.bind(has_global_access as i32)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		tracing::debug!(org_id = %org_id, user_id = %user_id, "membership upserted");
		Ok(())
	}

	// =========================================================================
	// Helpers
	// =========================================================================

	fn row_to_org(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Organization, DbError> {
		let id_str: String = row.get("id");
		let created_at: String = row.get("created_at");

		let id =
			Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(format!("Invalid org ID: {e}")))?;

		Ok(Organization {
			id: OrgId::new(id),
			name: row.get("name"),
			slug: row.get("slug"),
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
		})
	}

	fn row_to_membership(&self, row: &sqlx::sqlite::SqliteRow) -> Result<OrgMembership, DbError> {
		let org_id_str: String = row.get("org_id");
		let user_id_str: String = row.get("user_id");
		let has_global_access: i32 = row.get("has_global_access");
		let sso_linked: i32 = row.get("sso_linked");
		let created_at: String = row.get("created_at");

		let org_id = Uuid::parse_str(&org_id_str)
			.map_err(|e| DbError::Internal(format!("Invalid org_id: {e}")))?;
		let user_id = Uuid::parse_str(&user_id_str)
			.map_err(|e| DbError::Internal(format!("Invalid user_id: {e}")))?;

		Ok(OrgMembership {
			org_id: OrgId::new(org_id),
			user_id: UserId::new(user_id),
			role: row.get("role"),
			has_global_access: has_global_access != 0,
			sso_linked: sso_linked != 0,
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

#[async_trait]
impl OrgStore for OrgRepository {
	async fn create_org(&self, org: &Organization) -> Result<(), DbError> {
		self.create_org(org).await
	}

	async fn get_org_by_slug(&self, slug: &str) -> Result<Option<Organization>, DbError> {
		self.get_org_by_slug(slug).await
	}

	async fn list_orgs_by_name(&self, name: &str) -> Result<Vec<Organization>, DbError> {
		self.list_orgs_by_name(name).await
	}

	async fn get_membership(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
	) -> Result<Option<OrgMembership>, DbError> {
		self.get_membership(org_id, user_id).await
	}

	async fn upsert_membership(
		&self,
		org_id: &OrgId,
		user_id: &UserId,
		role: Option<&str>,
		has_global_access: bool,
	) -> Result<(), DbError> {
		self
			.upsert_membership(org_id, user_id, role, has_global_access)
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{create_provisioning_test_pool, insert_test_user, make_test_org};

	async fn make_org_repo() -> (OrgRepository, SqlitePool) {
		let pool = create_provisioning_test_pool().await;
		(OrgRepository::new(pool.clone()), pool)
	}

	#[tokio::test]
	async fn test_create_and_get_org_by_slug() {
		let (repo, _pool) = make_org_repo().await;
		let org = make_test_org("acme", "Acme Corp");

		repo.create_org(&org).await.unwrap();

		let fetched = repo.get_org_by_slug("acme").await.unwrap();
		assert!(fetched.is_some());
		let fetched = fetched.unwrap();
		assert_eq!(fetched.id, org.id);
		assert_eq!(fetched.name, "Acme Corp");
	}

	#[tokio::test]
	async fn test_get_org_by_slug_not_found() {
		let (repo, _pool) = make_org_repo().await;
		let result = repo.get_org_by_slug("missing").await.unwrap();
		assert!(result.is_none());
	}

	#[tokio::test]
	async fn test_list_orgs_by_name_can_be_ambiguous() {
		let (repo, _pool) = make_org_repo().await;
		repo
			.create_org(&make_test_org("acme-1", "Acme Corp"))
			.await
			.unwrap();
		repo
			.create_org(&make_test_org("acme-2", "Acme Corp"))
			.await
			.unwrap();

		let orgs = repo.list_orgs_by_name("Acme Corp").await.unwrap();
		assert_eq!(orgs.len(), 2);
	}

	#[tokio::test]
	async fn test_upsert_membership_creates_sso_linked_row() {
		let (repo, pool) = make_org_repo().await;
		let org = make_test_org("acme", "Acme Corp");
		repo.create_org(&org).await.unwrap();

		let user_id = UserId::generate();
		insert_test_user(&pool, &user_id, "jdoe").await;

		repo
			.upsert_membership(&org.id, &user_id, Some("admin"), false)
			.await
			.unwrap();

		let membership = repo.get_membership(&org.id, &user_id).await.unwrap();
		assert!(membership.is_some());
		let membership = membership.unwrap();
		assert_eq!(membership.role.as_deref(), Some("admin"));
		assert!(!membership.has_global_access);
		assert!(membership.sso_linked);
	}

	#[tokio::test]
	async fn test_upsert_membership_overwrites_role_and_access() {
		let (repo, pool) = make_org_repo().await;
		let org = make_test_org("acme", "Acme Corp");
		repo.create_org(&org).await.unwrap();

		let user_id = UserId::generate();
		insert_test_user(&pool, &user_id, "jdoe").await;

		repo
			.upsert_membership(&org.id, &user_id, Some("member"), false)
			.await
			.unwrap();
		repo
			.upsert_membership(&org.id, &user_id, Some("owner"), true)
			.await
			.unwrap();

		let membership = repo.get_membership(&org.id, &user_id).await.unwrap().unwrap();
		assert_eq!(membership.role.as_deref(), Some("owner"));
		assert!(membership.has_global_access);

		// No second row: the count through a fresh read stays one.
		let row: (i64,) =
			sqlx::query_as("SELECT COUNT(*) FROM org_memberships WHERE org_id = ? AND user_id = ?")
				.bind(org.id.to_string())
				.bind(user_id.to_string())
				.fetch_one(&pool)
				.await
				.unwrap();
		assert_eq!(row.0, 1);
	}

	#[tokio::test]
	async fn test_upsert_membership_allows_null_role() {
		let (repo, pool) = make_org_repo().await;
		let org = make_test_org("acme", "Acme Corp");
		repo.create_org(&org).await.unwrap();

		let user_id = UserId::generate();
		insert_test_user(&pool, &user_id, "jdoe").await;

		repo
			.upsert_membership(&org.id, &user_id, None, false)
			.await
			.unwrap();

		let membership = repo.get_membership(&org.id, &user_id).await.unwrap().unwrap();
		assert!(membership.role.is_none());
	}
}
