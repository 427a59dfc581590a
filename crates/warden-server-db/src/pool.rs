// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqliteSynchronous};
use std::str::FromStr;

use crate::error::DbError;

/// Create a SqlitePool for the provisioning schema.
///
/// WAL journaling keeps concurrent reconciliations from blocking each other
/// on reads, and foreign keys are switched on so the `ON DELETE CASCADE`
/// clauses in the schema actually fire (SQLite leaves enforcement off by
/// default).
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./warden.db")
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid or connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, DbError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = SqlitePool::connect_with(options).await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

#[cfg(test)]
mod tests {
	use chrono::Utc;
	use sqlx::Row;
	use warden_server_auth::UserId;

	use super::*;
	use crate::migrations::run_migrations;
	use crate::testing::insert_test_user;

	#[tokio::test]
	async fn test_create_pool_uses_wal_on_disk() {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite:{}", dir.path().join("warden.db").display());

		let pool = create_pool(&url).await.unwrap();
		run_migrations(&pool).await.unwrap();

		let row = sqlx::query("PRAGMA journal_mode")
			.fetch_one(&pool)
			.await
			.unwrap();
		let mode: String = row.get(0);
		assert_eq!(mode.to_lowercase(), "wal");
	}

	#[tokio::test]
	async fn test_create_pool_rejects_invalid_url() {
		let result = create_pool("postgres://warden").await;
		assert!(result.is_err());
	}

	#[tokio::test]
	async fn test_deleting_user_cascades_email_records() {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite:{}", dir.path().join("warden.db").display());

		let pool = create_pool(&url).await.unwrap();
		run_migrations(&pool).await.unwrap();

		let user_id = UserId::generate();
		insert_test_user(&pool, &user_id, "jdoe").await;
		sqlx::query(
			"INSERT INTO user_emails (id, user_id, email, is_verified, created_at) VALUES (?, ?, ?, 0, ?)",
		)
		.bind(UserId::generate().to_string())
		.bind(user_id.to_string())
		.bind("jdoe@example.com")
		.bind(Utc::now().to_rfc3339())
		.execute(&pool)
		.await
		.unwrap();

		sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(user_id.to_string())
			.execute(&pool)
			.await
			.unwrap();

		let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_emails")
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_eq!(row.0, 0);
	}
}
