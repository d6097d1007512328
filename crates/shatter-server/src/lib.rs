// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server for one-time self-destructing notes.
//!
//! This crate is thin glue: JSON handlers over
//! [`shatter_server_secrets::SecretsService`], a health endpoint, schema
//! migrations and the background purge job.

pub mod api;
pub mod api_docs;
pub mod db;
pub mod error;
pub mod health;
pub mod jobs;
pub mod routes;
pub mod version;

pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use error::ServerError;
pub use shatter_server_config::ServerConfig;
