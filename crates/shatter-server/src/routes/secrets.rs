// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-time note HTTP handlers.
//!
//! Every path segment token is handed to the secrets service verbatim. A bad
//! token, a missing note and a note that was already read all produce the
//! same `404 not_found` body.
//!
//! Reading a note is a `POST` so that link previewers fetching the `GET`
//! endpoint cannot consume it.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use serde::{Deserialize, Serialize};
use shatter_common_sensitive::SensitiveString;
use shatter_server_secrets::{RevealOutcome, SecretSummary};
use utoipa::ToSchema;

use crate::{
	api::AppState,
	error::{ErrorResponse, ServerError},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSecretRequest {
	#[schema(value_type = String)]
	pub message: SensitiveString,
	/// Optional; an empty string means no passphrase.
	#[serde(default)]
	#[schema(value_type = Option<String>)]
	pub passphrase: Option<SensitiveString>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSecretResponse {
	pub status_id: String,
	pub status_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
	pub secret: SecretSummary,
	/// e.g. "6 days, 23 hours"
	pub expires_in: String,
	/// Only present on the first status check after creation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub reveal_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SecretLookupResponse {
	pub locked: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnlockRequest {
	#[schema(value_type = String)]
	pub passphrase: SensitiveString,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnlockResponse {
	pub unlocked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevealResponse {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub message: Option<String>,
	/// The link's key did not decrypt to text. The note is gone either way.
	pub undecodable: bool,
}

#[utoipa::path(
    post,
    path = "/api/secrets",
    request_body = CreateSecretRequest,
    responses(
        (status = 201, description = "Note stored", body = CreateSecretResponse),
        (status = 400, description = "Empty or oversized input", body = ErrorResponse)
    ),
    tag = "secrets"
)]
/// POST /api/secrets - Store a new note.
pub async fn create_secret(
	State(state): State<AppState>,
	Json(payload): Json<CreateSecretRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let passphrase = payload.passphrase.as_ref().map(|p| p.expose().as_str());
	let created = state
		.secrets
		.create_secret(passphrase, payload.message.expose())
		.await?;

	let status_url = state
		.config
		.http
		.public_url(&format!("/status/{}", created.status_id));

	Ok((
		StatusCode::CREATED,
		Json(CreateSecretResponse {
			status_id: created.status_id,
			status_url,
		}),
	))
}

#[utoipa::path(
    get,
    path = "/api/status/{status_id}",
    params(("status_id" = String, Path, description = "Status id returned at creation")),
    responses(
        (status = 200, description = "Note still waiting to be read", body = StatusResponse),
        (status = 404, description = "Note read, expired or never existed", body = ErrorResponse)
    ),
    tag = "secrets"
)]
/// GET /api/status/{status_id} - Creator's view; includes the reveal link once.
pub async fn get_status(
	State(state): State<AppState>,
	Path(status_id): Path<String>,
) -> Result<Json<StatusResponse>, ServerError> {
	let view = state.secrets.resolve_status(&status_id).await?;
	let secret = view.secret.ok_or(ServerError::NotFound)?;

	Ok(Json(StatusResponse {
		expires_in: secret.format_remaining(chrono::Utc::now()),
		secret,
		reveal_url: view
			.reveal_token
			.map(|token| state.config.http.public_url(&format!("/s/{token}"))),
	}))
}

#[utoipa::path(
    get,
    path = "/api/secrets/{token}",
    params(("token" = String, Path, description = "Reveal token")),
    responses(
        (status = 200, description = "Note exists", body = SecretLookupResponse),
        (status = 404, description = "Note read, expired or never existed", body = ErrorResponse)
    ),
    tag = "secrets"
)]
/// GET /api/secrets/{token} - Check a link without consuming it.
pub async fn get_secret(
	State(state): State<AppState>,
	Path(token): Path<String>,
) -> Result<Json<SecretLookupResponse>, ServerError> {
	let lookup = state.secrets.resolve_secret(&token).await?;
	if !lookup.found {
		return Err(ServerError::NotFound);
	}
	Ok(Json(SecretLookupResponse {
		locked: lookup.locked,
	}))
}

#[utoipa::path(
    post,
    path = "/api/secrets/{token}/unlock",
    params(("token" = String, Path, description = "Reveal token")),
    request_body = UnlockRequest,
    responses(
        (status = 200, description = "Unlock attempted", body = UnlockResponse),
        (status = 404, description = "Note read, expired or never existed", body = ErrorResponse)
    ),
    tag = "secrets"
)]
/// POST /api/secrets/{token}/unlock - Remove the passphrase layer.
pub async fn unlock_secret(
	State(state): State<AppState>,
	Path(token): Path<String>,
	Json(payload): Json<UnlockRequest>,
) -> Result<Json<UnlockResponse>, ServerError> {
	if !state.secrets.resolve_secret(&token).await?.found {
		return Err(ServerError::NotFound);
	}
	let unlocked = state
		.secrets
		.unlock_secret(&token, &payload.passphrase)
		.await?;
	Ok(Json(UnlockResponse { unlocked }))
}

#[utoipa::path(
    post,
    path = "/api/secrets/{token}/reveal",
    params(("token" = String, Path, description = "Reveal token")),
    responses(
        (status = 200, description = "Note consumed", body = RevealResponse),
        (status = 404, description = "Note read, expired or never existed", body = ErrorResponse),
        (status = 423, description = "Note is still locked", body = ErrorResponse)
    ),
    tag = "secrets"
)]
/// POST /api/secrets/{token}/reveal - Read and destroy the note.
pub async fn reveal_secret(
	State(state): State<AppState>,
	Path(token): Path<String>,
) -> Result<Response, ServerError> {
	let response = match state.secrets.reveal_secret(&token).await? {
		RevealOutcome::NotFound => return Err(ServerError::NotFound),
		RevealOutcome::Locked => (
			StatusCode::LOCKED,
			Json(ErrorResponse {
				error: "locked".to_string(),
				message: "Unlock this note with its passphrase first".to_string(),
			}),
		)
			.into_response(),
		RevealOutcome::Revealed(message) => Json(RevealResponse {
			message: Some(message.into_inner()),
			undecodable: false,
		})
		.into_response(),
		RevealOutcome::Undecodable => Json(RevealResponse {
			message: None,
			undecodable: true,
		})
		.into_response(),
	};
	Ok(response)
}
