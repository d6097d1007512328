// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema migrations and database re-exports.

use sqlx::sqlite::SqlitePool;

pub use shatter_server_db::{create_pool, JobRepository, SecretRepository};

use crate::error::ServerError;

/// Bring the schema up to date on startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), ServerError> {
	shatter_server_db::run_migrations(pool).await?;
	tracing::info!(
		migrations = shatter_server_db::MIGRATIONS.len(),
		"database schema up to date"
	);
	Ok(())
}

/// Cheap round trip used by the health endpoint.
pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
	sqlx::query("SELECT 1").execute(pool).await?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use shatter_server_db::testing::create_test_pool;

	#[tokio::test]
	async fn fresh_database_migrates_twice() {
		let pool = create_test_pool().await;
		run_migrations(&pool).await.unwrap();
		run_migrations(&pool).await.unwrap();

		let count: i64 = sqlx::query_scalar(
			"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('secrets', 'job_definitions', 'job_runs')",
		)
		.fetch_one(&pool)
		.await
		.unwrap();
		assert_eq!(count, 3);
	}

	#[tokio::test]
	async fn migration_failure_is_a_database_error() {
		let pool = create_test_pool().await;
		pool.close().await;

		let err = run_migrations(&pool).await.unwrap_err();
		assert!(matches!(err, ServerError::DbError(_)));
	}

	#[tokio::test]
	async fn ping_succeeds() {
		let pool = create_test_pool().await;
		ping(&pool).await.unwrap();
	}
}
