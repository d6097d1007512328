// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health check types and component checking logic.

use serde::Serialize;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use utoipa::ToSchema;

use shatter_server_jobs::{HealthState, JobScheduler};

/// Health status for components and overall system.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
	Healthy,
	Degraded,
	Unhealthy,
}

impl From<HealthState> for HealthStatus {
	fn from(state: HealthState) -> Self {
		match state {
			HealthState::Healthy => HealthStatus::Healthy,
			HealthState::Degraded => HealthStatus::Degraded,
			HealthState::Unhealthy => HealthStatus::Unhealthy,
		}
	}
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseHealth {
	pub status: HealthStatus,
	pub latency_ms: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub secrets_stored: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobsHealth {
	pub status: HealthStatus,
	pub jobs_total: usize,
	pub jobs_healthy: usize,
	pub jobs_failing: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub failing_jobs: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthComponents {
	pub database: DatabaseHealth,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub jobs: Option<JobsHealth>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
	pub status: HealthStatus,
	pub timestamp: String,
	pub duration_ms: u64,
	pub version: String,
	pub components: HealthComponents,
}

const DB_CHECK_TIMEOUT: Duration = Duration::from_millis(500);

pub async fn check_database(pool: &SqlitePool) -> DatabaseHealth {
	let start = Instant::now();

	let result = timeout(DB_CHECK_TIMEOUT, async {
		crate::db::ping(pool).await?;
		sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM secrets")
			.fetch_one(pool)
			.await
	})
	.await;
	let latency_ms = start.elapsed().as_millis() as u64;

	match result {
		Ok(Ok(count)) => DatabaseHealth {
			status: HealthStatus::Healthy,
			latency_ms,
			error: None,
			secrets_stored: Some(count),
		},
		Ok(Err(e)) => DatabaseHealth {
			status: HealthStatus::Unhealthy,
			latency_ms,
			error: Some(e.to_string()),
			secrets_stored: None,
		},
		Err(_) => DatabaseHealth {
			status: HealthStatus::Unhealthy,
			latency_ms,
			error: Some("database health check timed out".to_string()),
			secrets_stored: None,
		},
	}
}

pub async fn check_jobs(scheduler: Option<&Arc<JobScheduler>>) -> Option<JobsHealth> {
	let scheduler = scheduler?;
	let health = scheduler.health_status().await;

	let failing_jobs: Vec<String> = health
		.jobs
		.iter()
		.filter(|j| j.status == HealthState::Unhealthy)
		.map(|j| j.job_id.clone())
		.collect();

	Some(JobsHealth {
		status: health.status.into(),
		jobs_total: health.jobs.len(),
		jobs_healthy: health
			.jobs
			.iter()
			.filter(|j| j.status == HealthState::Healthy)
			.count(),
		jobs_failing: failing_jobs.len(),
		failing_jobs: if failing_jobs.is_empty() {
			None
		} else {
			Some(failing_jobs)
		},
	})
}

/// Worst status across all reported components.
pub fn aggregate_status(components: &HealthComponents) -> HealthStatus {
	let mut statuses = vec![components.database.status];
	if let Some(ref jobs) = components.jobs {
		statuses.push(jobs.status);
	}

	if statuses.iter().any(|s| *s == HealthStatus::Unhealthy) {
		HealthStatus::Unhealthy
	} else if statuses.iter().any(|s| *s == HealthStatus::Degraded) {
		HealthStatus::Degraded
	} else {
		HealthStatus::Healthy
	}
}
