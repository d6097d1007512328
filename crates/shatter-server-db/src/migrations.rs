// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Embedded schema migrations, shared by the server and the test pools.

use sqlx::sqlite::SqlitePool;

use crate::error::Result;

pub const MIGRATIONS: &[(&str, &str)] = &[
	(
		"001_create_secrets",
		include_str!("../migrations/001_create_secrets.sql"),
	),
	(
		"002_create_jobs",
		include_str!("../migrations/002_create_jobs.sql"),
	),
];

/// Apply every migration. Statements are idempotent, so this runs on each start.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
	for (name, sql) in MIGRATIONS {
		for stmt in statements(sql) {
			sqlx::query(&stmt).execute(pool).await?;
		}
		tracing::debug!(migration = name, "migration applied");
	}
	Ok(())
}

/// Split a migration file into statements. `--` comment lines are dropped
/// first so their text never reaches the `;` split.
fn statements(sql: &str) -> Vec<String> {
	let code: String = sql
		.lines()
		.filter(|line| !line.trim_start().starts_with("--"))
		.collect::<Vec<_>>()
		.join("\n");

	code.split(';')
		.map(str::trim)
		.filter(|stmt| !stmt.is_empty())
		.map(str::to_string)
		.collect()
}
