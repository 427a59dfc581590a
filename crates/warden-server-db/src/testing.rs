// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use warden_server_auth::{OrgId, Organization, UserId};

use crate::migrations::run_migrations;

pub async fn create_test_pool() -> SqlitePool {
	SqlitePool::connect(":memory:").await.unwrap()
}

pub async fn create_provisioning_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}

pub fn make_test_org(slug: &str, name: &str) -> Organization {
	Organization {
		id: OrgId::generate(),
		name: name.to_string(),
		slug: slug.to_string(),
		created_at: Utc::now(),
	}
}

pub async fn insert_test_user(pool: &SqlitePool, user_id: &UserId, username: &str) {
	let now = Utc::now().to_rfc3339();
	sqlx::query(
		r#"
		INSERT INTO users (id, username, is_managed, created_at, updated_at)
		VALUES (?, ?, 1, ?, ?)
		"#,
	)
	.bind(user_id.to_string())
	.bind(username)
	.bind(&now)
	.bind(&now)
	.execute(pool)
	.await
	.unwrap();
}
