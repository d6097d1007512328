// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI document, served raw at `/api/openapi.json`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shatter Server API",
        version = "1.0.0",
        description = "One-time notes that are deleted once read or after seven days.",
        license(name = "Proprietary")
    ),
    tags(
        (name = "secrets", description = "Create, unlock and reveal one-time notes"),
        (name = "health", description = "Health checks")
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::secrets::create_secret,
        crate::routes::secrets::get_status,
        crate::routes::secrets::get_secret,
        crate::routes::secrets::unlock_secret,
        crate::routes::secrets::reveal_secret,
    ),
    components(schemas(
        crate::routes::secrets::CreateSecretRequest,
        crate::routes::secrets::CreateSecretResponse,
        crate::routes::secrets::StatusResponse,
        crate::routes::secrets::SecretLookupResponse,
        crate::routes::secrets::UnlockRequest,
        crate::routes::secrets::UnlockResponse,
        crate::routes::secrets::RevealResponse,
        crate::error::ErrorResponse,
        crate::health::HealthResponse,
        shatter_server_secrets::SecretSummary,
    ))
)]
pub struct ApiDoc;
