// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory databases for repository and service tests.
//!
//! Every pool is built from the same embedded migrations the server runs.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::migrations::run_migrations;

/// A single-connection pool, so every query sees the same in-memory database.
pub async fn create_test_pool() -> SqlitePool {
	SqlitePoolOptions::new()
		.max_connections(1)
		.connect("sqlite::memory:")
		.await
		.unwrap()
}

/// A test pool with the full schema applied.
pub async fn create_migrated_test_pool() -> SqlitePool {
	let pool = create_test_pool().await;
	run_migrations(&pool).await.unwrap();
	pool
}

pub async fn create_secret_test_pool() -> SqlitePool {
	create_migrated_test_pool().await
}

pub async fn create_job_test_pool() -> SqlitePool {
	create_migrated_test_pool().await
}
