// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background job definitions and run history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::{DbError, Result};
use crate::time::{format_timestamp, parse_timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
	Running,
	Succeeded,
	Failed,
	Cancelled,
}

impl JobStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			JobStatus::Running => "running",
			JobStatus::Succeeded => "succeeded",
			JobStatus::Failed => "failed",
			JobStatus::Cancelled => "cancelled",
		}
	}
}

impl std::str::FromStr for JobStatus {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s {
			"running" => Ok(JobStatus::Running),
			"succeeded" => Ok(JobStatus::Succeeded),
			"failed" => Ok(JobStatus::Failed),
			"cancelled" => Ok(JobStatus::Cancelled),
			_ => Err(format!("unknown job status: {s}")),
		}
	}
}

/// What started a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
	Schedule,
	Manual,
	Retry,
}

impl TriggerSource {
	pub fn as_str(&self) -> &'static str {
		match self {
			TriggerSource::Schedule => "schedule",
			TriggerSource::Manual => "manual",
			TriggerSource::Retry => "retry",
		}
	}
}

impl std::str::FromStr for TriggerSource {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s {
			"schedule" => Ok(TriggerSource::Schedule),
			"manual" => Ok(TriggerSource::Manual),
			"retry" => Ok(TriggerSource::Retry),
			_ => Err(format!("unknown trigger source: {s}")),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDefinition {
	pub id: String,
	pub name: String,
	pub description: String,
	pub interval_secs: Option<i64>,
	pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
	pub id: String,
	pub job_id: String,
	pub status: JobStatus,
	pub started_at: DateTime<Utc>,
	pub completed_at: Option<DateTime<Utc>>,
	pub duration_ms: Option<i64>,
	pub error_message: Option<String>,
	pub retry_count: u32,
	pub triggered_by: TriggerSource,
	pub metadata: Option<serde_json::Value>,
}

#[async_trait]
pub trait JobStore: Send + Sync {
	async fn upsert_definition(&self, def: &JobDefinition) -> Result<()>;
	async fn get_definition(&self, id: &str) -> Result<Option<JobDefinition>>;
	async fn record_run_start(&self, run: &JobRun) -> Result<()>;
	async fn record_run_complete(
		&self,
		run_id: &str,
		status: JobStatus,
		error: Option<String>,
		metadata: Option<serde_json::Value>,
	) -> Result<()>;
	async fn get_run(&self, run_id: &str) -> Result<Option<JobRun>>;
	async fn get_last_run(&self, job_id: &str) -> Result<Option<JobRun>>;
	async fn count_consecutive_failures(&self, job_id: &str) -> Result<u32>;
	async fn delete_old_runs(&self, before: DateTime<Utc>) -> Result<u64>;
}

#[derive(Clone)]
pub struct JobRepository {
	pool: SqlitePool,
}

const RUN_COLUMNS: &str = "id, job_id, status, started_at, completed_at, duration_ms, error_message, retry_count, triggered_by, metadata";

impl JobRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self, def), fields(job_id = %def.id))]
	pub async fn upsert_definition(&self, def: &JobDefinition) -> Result<()> {
		let now = format_timestamp(Utc::now());
		sqlx::query(
			r#"
			INSERT INTO job_definitions (id, name, description, interval_secs, enabled, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			ON CONFLICT(id) DO UPDATE SET
				name = excluded.name,
				description = excluded.description,
				interval_secs = excluded.interval_secs,
				enabled = excluded.enabled,
				updated_at = excluded.updated_at
			"#,
		)
		.bind(&def.id)
		.bind(&def.name)
		.bind(&def.description)
		.bind(def.interval_secs)
		.bind(def.enabled)
		.bind(&now)
		.bind(&now)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_definition(&self, id: &str) -> Result<Option<JobDefinition>> {
		let row = sqlx::query(
			"SELECT id, name, description, interval_secs, enabled FROM job_definitions WHERE id = ?",
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(row.map(|r| JobDefinition {
			id: r.get("id"),
			name: r.get("name"),
			description: r.get("description"),
			interval_secs: r.get("interval_secs"),
			enabled: r.get("enabled"),
		}))
	}

	#[tracing::instrument(skip(self, run), fields(run_id = %run.id, job_id = %run.job_id))]
	pub async fn record_run_start(&self, run: &JobRun) -> Result<()> {
		sqlx::query(
			r#"
			INSERT INTO job_runs (id, job_id, status, started_at, retry_count, triggered_by)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(&run.id)
		.bind(&run.job_id)
		.bind(run.status.as_str())
		.bind(format_timestamp(run.started_at))
		.bind(run.retry_count as i64)
		.bind(run.triggered_by.as_str())
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	#[tracing::instrument(skip(self, error, metadata))]
	pub async fn record_run_complete(
		&self,
		run_id: &str,
		status: JobStatus,
		error: Option<String>,
		metadata: Option<serde_json::Value>,
	) -> Result<()> {
		let now = format_timestamp(Utc::now());
		let metadata_str = metadata.map(|m| m.to_string());

		let result = sqlx::query(
			r#"
			UPDATE job_runs
			SET status = ?,
				completed_at = ?,
				duration_ms = CAST((julianday(?) - julianday(started_at)) * 86400000 AS INTEGER),
				error_message = ?,
				metadata = ?
			WHERE id = ?
			"#,
		)
		.bind(status.as_str())
		.bind(&now)
		.bind(&now)
		.bind(error)
		.bind(metadata_str)
		.bind(run_id)
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("job run {run_id}")));
		}
		Ok(())
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_run(&self, run_id: &str) -> Result<Option<JobRun>> {
		let row = sqlx::query(&format!("SELECT {RUN_COLUMNS} FROM job_runs WHERE id = ?"))
			.bind(run_id)
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| parse_job_run_row(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_last_run(&self, job_id: &str) -> Result<Option<JobRun>> {
		let row = sqlx::query(&format!(
			"SELECT {RUN_COLUMNS} FROM job_runs WHERE job_id = ? ORDER BY started_at DESC LIMIT 1"
		))
		.bind(job_id)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_job_run_row(&r)).transpose()
	}

	/// Number of failed runs since the most recent run that did not fail.
	#[tracing::instrument(skip(self))]
	pub async fn count_consecutive_failures(&self, job_id: &str) -> Result<u32> {
		let row = sqlx::query(
			r#"
			SELECT COUNT(*) AS count
			FROM job_runs
			WHERE job_id = ?1
			  AND status = 'failed'
			  AND started_at > COALESCE(
				(SELECT MAX(started_at) FROM job_runs WHERE job_id = ?1 AND status != 'failed'),
				''
			  )
			"#,
		)
		.bind(job_id)
		.fetch_one(&self.pool)
		.await?;

		let count: i64 = row.get("count");
		Ok(count as u32)
	}

	#[tracing::instrument(skip(self, before), fields(before = %before))]
	pub async fn delete_old_runs(&self, before: DateTime<Utc>) -> Result<u64> {
		let result = sqlx::query("DELETE FROM job_runs WHERE completed_at < ?")
			.bind(format_timestamp(before))
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected())
	}
}

#[async_trait]
impl JobStore for JobRepository {
	async fn upsert_definition(&self, def: &JobDefinition) -> Result<()> {
		self.upsert_definition(def).await
	}

	async fn get_definition(&self, id: &str) -> Result<Option<JobDefinition>> {
		self.get_definition(id).await
	}

	async fn record_run_start(&self, run: &JobRun) -> Result<()> {
		self.record_run_start(run).await
	}

	async fn record_run_complete(
		&self,
		run_id: &str,
		status: JobStatus,
		error: Option<String>,
		metadata: Option<serde_json::Value>,
	) -> Result<()> {
		self
			.record_run_complete(run_id, status, error, metadata)
			.await
	}

	async fn get_run(&self, run_id: &str) -> Result<Option<JobRun>> {
		self.get_run(run_id).await
	}

	async fn get_last_run(&self, job_id: &str) -> Result<Option<JobRun>> {
		self.get_last_run(job_id).await
	}

	async fn count_consecutive_failures(&self, job_id: &str) -> Result<u32> {
		self.count_consecutive_failures(job_id).await
	}

	async fn delete_old_runs(&self, before: DateTime<Utc>) -> Result<u64> {
		self.delete_old_runs(before).await
	}
}

fn parse_job_run_row(row: &sqlx::sqlite::SqliteRow) -> Result<JobRun> {
	let status: String = row.get("status");
	let triggered_by: String = row.get("triggered_by");
	let started_at: String = row.get("started_at");
	let completed_at: Option<String> = row.get("completed_at");
	let retry_count: i64 = row.get("retry_count");
	let metadata: Option<String> = row.get("metadata");

	Ok(JobRun {
		id: row.get("id"),
		job_id: row.get("job_id"),
		status: status.parse().map_err(DbError::Internal)?,
		started_at: parse_timestamp(&started_at)?,
		completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
		duration_ms: row.get("duration_ms"),
		error_message: row.get("error_message"),
		retry_count: retry_count as u32,
		triggered_by: triggered_by.parse().map_err(DbError::Internal)?,
		metadata: metadata.as_deref().and_then(|s| serde_json::from_str(s).ok()),
	})
}
