// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health HTTP handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
	api::AppState,
	health::{self, HealthComponents, HealthResponse, HealthStatus},
	version::VERSION,
};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System is healthy or degraded", body = HealthResponse),
        (status = 503, description = "System is unhealthy", body = HealthResponse)
    ),
    tag = "health"
)]
/// GET /health - Database and background job health.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let overall_start = tokio::time::Instant::now();

	let (database, jobs) = tokio::join!(
		health::check_database(&state.pool),
		health::check_jobs(state.job_scheduler.as_ref()),
	);

	let components = HealthComponents { database, jobs };
	let status = health::aggregate_status(&components);

	let response = HealthResponse {
		status,
		timestamp: chrono::Utc::now().to_rfc3339(),
		duration_ms: overall_start.elapsed().as_millis() as u64,
		version: VERSION.to_string(),
		components,
	};

	let http_status = match status {
		HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
		HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
	};

	(http_status, Json(response))
}
