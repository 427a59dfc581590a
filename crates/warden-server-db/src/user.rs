// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository for database operations.
//!
//! This module provides database access for user management including:
//! - User lookup-or-create keyed by directory username
//! - Primary email assignment
//! - Email record upsert with verification marking

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;
use warden_server_auth::{User, UserEmail, UserId};

use crate::error::DbError;

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;
	async fn create_user(&self, user: &User) -> Result<(), DbError>;
	async fn set_managed(&self, id: &UserId) -> Result<(), DbError>;
	async fn set_primary_email(&self, id: &UserId, email: &str) -> Result<(), DbError>;
	async fn upsert_email(
		&self,
		id: &UserId,
		email: &str,
		mark_verified: bool,
	) -> Result<(), DbError>;
	async fn list_emails(&self, id: &UserId) -> Result<Vec<UserEmail>, DbError>;
}

/// Repository for user database operations.
///
/// All IDs are UUIDs stored as strings in SQLite.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Get a user by directory username.
	///
	/// # Arguments
	/// * `username` - The unique directory username
	///
	/// # Returns
	/// `None` if no user exists with this username.
	#[tracing::instrument(skip(self), fields(username = %username))]
	pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, username, email, is_managed, created_at, updated_at
			FROM users
			WHERE username = ?
			"#,
		)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| self.row_to_user(&r)).transpose()
	}

	/// Create a new user.
	///
	/// # Arguments
	/// * `user` - The user to create
	///
	/// # Errors
	/// Returns `DbError::Sqlx` if insert fails (e.g., duplicate username).
	///
	/// # Database Constraints
	/// - `id` must be unique
	/// - `username` must be unique
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id, username = %user.username))]
	pub async fn create_user(&self, user: &User) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, username, email, is_managed, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.username)
		.bind(&user.email)
		.bind(user.is_managed as i32)
		.bind(user.created_at.to_rfc3339())
		.bind(user.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await?;

		tracing::debug!(user_id = %user.id, "user created");
		Ok(())
	}

	/// Mark a user as externally managed.
	///
	/// The reconciler calls this unconditionally on every login; collaborators
	/// honoring the flag must disable local credential management.
	///
	/// # Arguments
	/// * `id` - The user's UUID
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn set_managed(&self, id: &UserId) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			UPDATE users
			SET is_managed = 1, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&now)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	/// Assign a user's primary email address.
	///
	/// # Arguments
	/// * `id` - The user's UUID
	/// * `email` - The address to assign
	#[tracing::instrument(skip(self, email), fields(user_id = %id))]
	pub async fn set_primary_email(&self, id: &UserId, email: &str) -> Result<(), DbError> {
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			UPDATE users
			SET email = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(email)
		.bind(&now)
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		tracing::debug!(user_id = %id, "primary email assigned");
		Ok(())
	}

	/// Upsert an email record keyed by `(user, email)`.
	///
	/// When `mark_verified` is true the record is created or updated as
	/// verified. Otherwise an existing record's verification state is left
	/// untouched and a new record starts unverified — there is no downgrade
	/// path through this method.
	///
	/// # Arguments
	/// * `id` - The owning user's UUID
	/// * `email` - The address
	/// * `mark_verified` - Whether the directory is trusted for verified mail
	///
	/// # Database Constraints
	/// - (`user_id`, `email`) must be unique
	#[tracing::instrument(skip(self, email), fields(user_id = %id, mark_verified))]
	pub async fn upsert_email(
		&self,
		id: &UserId,
		email: &str,
		mark_verified: bool,
	) -> Result<(), DbError> {
		let record_id = Uuid::new_v4().to_string();
		let now = Utc::now().to_rfc3339();

		if mark_verified {
			sqlx::query(
				r#"
				INSERT INTO user_emails (id, user_id, email, is_verified, created_at)
				VALUES (?, ?, ?, 1, ?)
				ON CONFLICT(user_id, email) DO UPDATE SET is_verified = 1
				"#,
			)
			.bind(&record_id)
			.bind(id.to_string())
			.bind(email)
			.bind(&now)
			.execute(&self.pool)
			.await?;
		} else {
			sqlx::query(
				r#"
				INSERT INTO user_emails (id, user_id, email, is_verified, created_at)
				VALUES (?, ?, ?, 0, ?)
				ON CONFLICT(user_id, email) DO NOTHING
				"#,
			)
			.bind(&record_id)
			.bind(id.to_string())
			.bind(email)
			.bind(&now)
			.execute(&self.pool)
			.await?;
		}

		tracing::debug!(user_id = %id, "email record upserted");
		Ok(())
	}

	/// List all email records for a user, oldest first.
	///
	/// # Arguments
	/// * `id` - The user's UUID
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn list_emails(&self, id: &UserId) -> Result<Vec<UserEmail>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT user_id, email, is_verified, created_at
			FROM user_emails
			WHERE user_id = ?
			ORDER BY created_at ASC, email ASC
			"#,
		)
		.bind(id.to_string())
		.fetch_all(&self.pool)
		.await?;

		let emails: Result<Vec<_>, _> = rows.iter().map(|r| self.row_to_email(r)).collect();
		emails
	}

	// =========================================================================
	// Helpers
	// =========================================================================

	fn row_to_user(&self, row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
		let id_str: String = row.get("id");
		let is_managed: i32 = row.get("is_managed");
		let created_at: String = row.get("created_at");
		let updated_at: String = row.get("updated_at");

		let id =
			Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(format!("Invalid user ID: {e}")))?;

		Ok(User {
			id: UserId::new(id),
			username: row.get("username"),
			email: row.get("email"),
			is_managed: is_managed != 0,
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
			updated_at: chrono::DateTime::parse_from_rfc3339(&updated_at)
				.map_err(|e| DbError::Internal(format!("Invalid updated_at: {e}")))?
				.with_timezone(&Utc),
		})
	}

	fn row_to_email(&self, row: &sqlx::sqlite::SqliteRow) -> Result<UserEmail, DbError> {
		let user_id_str: String = row.get("user_id");
		let is_verified: i32 = row.get("is_verified");
		let created_at: String = row.get("created_at");

		let user_id = Uuid::parse_str(&user_id_str)
			.map_err(|e| DbError::Internal(format!("Invalid user_id: {e}")))?;

		Ok(UserEmail {
			user_id: UserId::new(user_id),
			email: row.get("email"),
			is_verified: is_verified != 0,
			created_at: chrono::DateTime::parse_from_rfc3339(&created_at)
				.map_err(|e| DbError::Internal(format!("Invalid created_at: {e}")))?
				.with_timezone(&Utc),
		})
	}
}

#[async_trait]
impl UserStore for UserRepository {
	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		self.get_user_by_username(username).await
	}

	async fn create_user(&self, user: &User) -> Result<(), DbError> {
		self.create_user(user).await
	}

	async fn set_managed(&self, id: &UserId) -> Result<(), DbError> {
		self.set_managed(id).await
	}

	async fn set_primary_email(&self, id: &UserId, email: &str) -> Result<(), DbError> {
		self.set_primary_email(id, email).await
	}

	async fn upsert_email(
		&self,
		id: &UserId,
		email: &str,
		mark_verified: bool,
	) -> Result<(), DbError> {
		self.upsert_email(id, email, mark_verified).await
	}

	async fn list_emails(&self, id: &UserId) -> Result<Vec<UserEmail>, DbError> {
		self.list_emails(id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_provisioning_test_pool;

	fn make_test_user(username: &str) -> User {
		let now = Utc::now();
		User {
			id: UserId::generate(),
			username: username.to_string(),
			email: None,
			is_managed: true,
			created_at: now,
			updated_at: now,
		}
	}

	async fn make_user_repo() -> UserRepository {
		let pool = create_provisioning_test_pool().await;
		UserRepository::new(pool)
	}

	#[tokio::test]
	async fn test_create_and_get_user() {
		let repo = make_user_repo().await;
		let user = make_test_user("jdoe");

		repo.create_user(&user).await.unwrap();

		let fetched = repo.get_user_by_username("jdoe").await.unwrap();
		assert!(fetched.is_some());
		let fetched = fetched.unwrap();
		assert_eq!(fetched.id, user.id);
		assert_eq!(fetched.username, "jdoe");
		assert!(fetched.is_managed);
		assert!(fetched.email.is_none());
	}

	#[tokio::test]
	async fn test_get_user_not_found() {
		let repo = make_user_repo().await;
		let result = repo.get_user_by_username("nobody").await.unwrap();
		assert!(result.is_none());
	}

	#[tokio::test]
	async fn test_duplicate_username_rejected() {
		let repo = make_user_repo().await;
		repo.create_user(&make_test_user("jdoe")).await.unwrap();

		let result = repo.create_user(&make_test_user("jdoe")).await;
		assert!(result.is_err());
	}

	#[tokio::test]
	async fn test_set_primary_email() {
		let repo = make_user_repo().await;
		let user = make_test_user("jdoe");
		repo.create_user(&user).await.unwrap();

		repo
			.set_primary_email(&user.id, "jdoe@example.com")
			.await
			.unwrap();

		let fetched = repo.get_user_by_username("jdoe").await.unwrap().unwrap();
		assert_eq!(fetched.email.as_deref(), Some("jdoe@example.com"));
	}

	#[tokio::test]
	async fn test_set_managed_flips_flag() {
		let repo = make_user_repo().await;
		let mut user = make_test_user("jdoe");
		user.is_managed = false;
		repo.create_user(&user).await.unwrap();

		repo.set_managed(&user.id).await.unwrap();

		let fetched = repo.get_user_by_username("jdoe").await.unwrap().unwrap();
		assert!(fetched.is_managed);
	}

	#[tokio::test]
	async fn test_upsert_email_creates_unverified() {
		let repo = make_user_repo().await;
		let user = make_test_user("jdoe");
		repo.create_user(&user).await.unwrap();

		repo
			.upsert_email(&user.id, "jdoe@example.com", false)
			.await
			.unwrap();

		let emails = repo.list_emails(&user.id).await.unwrap();
		assert_eq!(emails.len(), 1);
		assert_eq!(emails[0].email, "jdoe@example.com");
		assert!(!emails[0].is_verified);
	}

	#[tokio::test]
	async fn test_upsert_email_marks_verified() {
		let repo = make_user_repo().await;
		let user = make_test_user("jdoe");
		repo.create_user(&user).await.unwrap();

		repo
			.upsert_email(&user.id, "jdoe@example.com", true)
			.await
			.unwrap();

		let emails = repo.list_emails(&user.id).await.unwrap();
		assert_eq!(emails.len(), 1);
		assert!(emails[0].is_verified);
	}

	#[tokio::test]
	async fn test_upsert_email_is_idempotent() {
		let repo = make_user_repo().await;
		let user = make_test_user("jdoe");
		repo.create_user(&user).await.unwrap();

		repo
			.upsert_email(&user.id, "jdoe@example.com", false)
			.await
			.unwrap();
		repo
			.upsert_email(&user.id, "jdoe@example.com", false)
			.await
			.unwrap();

		let emails = repo.list_emails(&user.id).await.unwrap();
		assert_eq!(emails.len(), 1);
	}

	#[tokio::test]
	async fn test_upsert_email_never_downgrades_verification() {
		let repo = make_user_repo().await;
		let user = make_test_user("jdoe");
		repo.create_user(&user).await.unwrap();

		repo
			.upsert_email(&user.id, "jdoe@example.com", true)
			.await
			.unwrap();
		// A later reconciliation without the trust flag must not clear it.
		repo
			.upsert_email(&user.id, "jdoe@example.com", false)
			.await
			.unwrap();

		let emails = repo.list_emails(&user.id).await.unwrap();
		assert_eq!(emails.len(), 1);
		assert!(emails[0].is_verified);
	}

	#[tokio::test]
	async fn test_upsert_email_upgrades_verification() {
		let repo = make_user_repo().await;
		let user = make_test_user("jdoe");
		repo.create_user(&user).await.unwrap();

		repo
			.upsert_email(&user.id, "jdoe@example.com", false)
			.await
			.unwrap();
		repo
			.upsert_email(&user.id, "jdoe@example.com", true)
			.await
			.unwrap();

		let emails = repo.list_emails(&user.id).await.unwrap();
		assert_eq!(emails.len(), 1);
		assert!(emails[0].is_verified);
	}

	#[tokio::test]
	async fn test_distinct_emails_create_distinct_records() {
		let repo = make_user_repo().await;
		let user = make_test_user("jdoe");
		repo.create_user(&user).await.unwrap();

		repo.upsert_email(&user.id, "a@x.com", true).await.unwrap();
		repo.upsert_email(&user.id, "b@x.com", true).await.unwrap();

		let emails = repo.list_emails(&user.id).await.unwrap();
		assert_eq!(emails.len(), 2);
	}
}
