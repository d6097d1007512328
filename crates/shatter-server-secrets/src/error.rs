// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use shatter_crypto::CryptoError;
use shatter_server_db::DbError;
use thiserror::Error;

pub type SecretsResult<T> = Result<T, SecretsError>;

#[derive(Debug, Error)]
pub enum SecretsError {
	#[error("configuration error: {0}")]
	Configuration(String),

	/// Covers every malformed, tampered or truncated token alike.
	#[error("invalid token")]
	InvalidToken,

	#[error("secret not found")]
	NotFound,

	#[error("validation error: {0}")]
	Validation(String),

	#[error("crypto error: {0}")]
	Crypto(#[from] CryptoError),

	#[error("database error: {0}")]
	Database(#[from] DbError),

	#[error("internal error: {0}")]
	Internal(String),
}

impl SecretsError {
	/// HTTP status this error maps to.
	pub fn status_code(&self) -> u16 {
		match self {
			SecretsError::InvalidToken | SecretsError::NotFound => 404,
			SecretsError::Validation(_) => 400,
			SecretsError::Configuration(_)
			| SecretsError::Crypto(_)
			| SecretsError::Database(_)
			| SecretsError::Internal(_) => 500,
		}
	}

	/// Whether details must stay out of client responses.
	pub fn is_internal(&self) -> bool {
		self.status_code() >= 500
	}
}
