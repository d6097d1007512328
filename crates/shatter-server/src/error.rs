// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::Serialize;
use shatter_server_secrets::SecretsError;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("Database error: {0}")]
	Db(#[from] sqlx::Error),

	#[error("Database error: {0}")]
	DbError(#[from] shatter_server_db::DbError),

	#[error(transparent)]
	Secrets(#[from] SecretsError),

	/// Missing note or unusable link. Deliberately carries no detail.
	#[error("Not found")]
	NotFound,

	#[error("Internal error: {0}")]
	Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	fn new(error: &str, message: impl Into<String>) -> Self {
		Self {
			error: error.to_string(),
			message: message.into(),
		}
	}

	pub fn not_found() -> Self {
		Self::new("not_found", "This note does not exist or has already been read")
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, body) = match &self {
			ServerError::Db(e) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("database_error", "A database error occurred"),
				)
			}
			ServerError::DbError(e) => {
				tracing::error!(error = %e, "database error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("database_error", "A database error occurred"),
				)
			}
			ServerError::Secrets(e) => match e {
				SecretsError::InvalidToken | SecretsError::NotFound => {
					(StatusCode::NOT_FOUND, ErrorResponse::not_found())
				}
				SecretsError::Validation(msg) => (
					StatusCode::BAD_REQUEST,
					ErrorResponse::new("bad_request", msg.clone()),
				),
				SecretsError::Database(inner) => {
					tracing::error!(error = %inner, "database error");
					(
						StatusCode::INTERNAL_SERVER_ERROR,
						ErrorResponse::new("database_error", "A database error occurred"),
					)
				}
				other => {
					tracing::error!(error = %other, "secrets error");
					(
						StatusCode::INTERNAL_SERVER_ERROR,
						ErrorResponse::new("internal_error", "An internal error occurred"),
					)
				}
			},
			ServerError::NotFound => (StatusCode::NOT_FOUND, ErrorResponse::not_found()),
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("internal_error", "An internal error occurred"),
				)
			}
		};

		(status, Json(body)).into_response()
	}
}
