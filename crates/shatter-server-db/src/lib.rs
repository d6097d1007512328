// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Database layer for the shatter server.
//!
//! # Conventions
//!
//! Each table is owned by one repository:
//!
//! 1. A `FooRepository { pool: SqlitePool }` with inherent async methods
//! 2. A `FooStore` trait (`async_trait`, `Send + Sync`) mirroring those methods
//! 3. `impl FooStore for FooRepository` delegating to the inherent methods
//!
//! Services depend on the `*Store` trait so tests can substitute fakes.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC text (microsecond
//! precision, `Z` suffix), which keeps lexicographic and chronological order
//! identical for range queries.
//!
//! State transitions that must happen at most once are single conditional
//! statements (`UPDATE ... WHERE <column> = <expected>`, `DELETE ... RETURNING`)
//! whose affected-row count tells the caller whether it won.

mod error;
pub mod job;
pub mod migrations;
pub mod pool;
pub mod secret;
mod time;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{DbError, Result};
pub use job::{JobDefinition, JobRepository, JobRun, JobStatus, JobStore, TriggerSource};
pub use migrations::{run_migrations, MIGRATIONS};
pub use pool::create_pool;
pub use secret::{NewSecret, SecretRepository, SecretRow, SecretStore};
pub use time::{format_timestamp, parse_timestamp};
