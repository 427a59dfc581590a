// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-user option storage.
//!
//! Options are simple string key/value pairs keyed by `(user, key)`. The
//! reconciler uses this to persist the `subscribe_by_default` preference;
//! it only ever writes, never reads back.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;
use warden_server_auth::UserId;

use crate::error::DbError;

#[async_trait]
pub trait UserOptionStore: Send + Sync {
	async fn set_value(&self, user_id: &UserId, key: &str, value: &str) -> Result<(), DbError>;
	async fn get_value(&self, user_id: &UserId, key: &str) -> Result<Option<String>, DbError>;
}

/// Repository for per-user options.
#[derive(Clone)]
pub struct UserOptionRepository {
	pool: SqlitePool,
}

impl UserOptionRepository {
	/// Create a new repository with the given pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Set an option value, replacing any previous value.
	///
	/// # Arguments
	/// * `user_id` - The owning user's UUID
	/// * `key` - Option key
	/// * `value` - Option value
	///
	/// # Database Constraints
	/// - (`user_id`, `key`) must be unique
	#[tracing::instrument(skip(self, value), fields(user_id = %user_id, key = %key))]
	pub async fn set_value(&self, user_id: &UserId, key: &str, value: &str) -> Result<(), DbError> {
		let id = Uuid::new_v4().to_string();
		let now = Utc::now().to_rfc3339();
		sqlx::query(
			r#"
			INSERT INTO user_options (id, user_id, key, value, created_at)
			VALUES (?, ?, ?, ?, ?)
			ON CONFLICT(user_id, key) DO UPDATE SET value = excluded.value
			"#,
		)
		.bind(&id)
		.bind(user_id.to_string())
		.bind(key)
		.bind(value)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		tracing::debug!(user_id = %user_id, key = %key, "user option set");
		Ok(())
	}

	/// Get an option value.
	///
	/// # Arguments
	/// * `user_id` - The owning user's UUID
	/// * `key` - Option key
	///
	/// # Returns
	/// `None` if the option has never been set.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, key = %key))]
	pub async fn get_value(
		&self,
		user_id: &UserId,
		key: &str,
	) -> Result<Option<String>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT value FROM user_options
			WHERE user_id = ? AND key = ?
			"#,
		)
		.bind(user_id.to_string())
		.bind(key)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|r| r.get("value")))
	}
}

#[async_trait]
impl UserOptionStore for UserOptionRepository {
	async fn set_value(&self, user_id: &UserId, key: &str, value: &str) -> Result<(), DbError> {
		self.set_value(user_id, key, value).await
	}

	async fn get_value(&self, user_id: &UserId, key: &str) -> Result<Option<String>, DbError> {
		self.get_value(user_id, key).await
	}
}
