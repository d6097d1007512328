// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router.

use std::sync::Arc;

use axum::{
	routing::{get, post},
	Json, Router,
};
use shatter_server_config::ServerConfig;
use shatter_server_jobs::JobScheduler;
use shatter_server_secrets::{SecretsService, TokenCodec};
use sqlx::sqlite::SqlitePool;
use utoipa::OpenApi;

use crate::api_docs::ApiDoc;
use crate::db::SecretRepository;
use crate::routes;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub secrets: Arc<SecretsService>,
	pub config: Arc<ServerConfig>,
	pub job_scheduler: Option<Arc<JobScheduler>>,
}

/// Wire the secrets service to the pool.
pub fn create_app_state(pool: SqlitePool, codec: TokenCodec, config: &ServerConfig) -> AppState {
	let repo = Arc::new(SecretRepository::new(pool.clone()));
	let secrets = Arc::new(SecretsService::new(repo, codec, config.notes));

	AppState {
		pool,
		secrets,
		config: Arc::new(config.clone()),
		job_scheduler: None,
	}
}

pub fn create_router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(routes::health::health_check))
		.route("/api/secrets", post(routes::secrets::create_secret))
		.route("/api/status/{status_id}", get(routes::secrets::get_status))
		.route("/api/secrets/{token}", get(routes::secrets::get_secret))
		.route("/api/secrets/{token}/unlock", post(routes::secrets::unlock_secret))
		.route("/api/secrets/{token}/reveal", post(routes::secrets::reveal_secret))
		.route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
		.with_state(state)
}
