// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
	#[error("invalid key length: {actual} bytes (expected 16, 24 or 32)")]
	InvalidKeyLength { actual: usize },

	#[error("input too short to decrypt: {actual} bytes (need at least {minimum})")]
	InvalidInputLength { minimum: usize, actual: usize },

	#[error("tagged input too short: {actual} bytes (need at least {minimum})")]
	TooShort { minimum: usize, actual: usize },

	#[error("authentication tag mismatch")]
	AuthenticationFailed,

	#[error("counter keystream exhausted")]
	KeystreamExhausted,
}
