// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The process master key that seals reveal tokens and status ids.

use base64::{engine::general_purpose::STANDARD, Engine};
use shatter_common_sensitive::SensitiveBytes;
use shatter_crypto::{generate_key, VALID_KEY_SIZES};
use shatter_server_config::load_secret_env;

use crate::error::{SecretsError, SecretsResult};

/// Environment variable holding the base64 master key. `{MASTER_KEY_ENV}_FILE` also works.
pub const MASTER_KEY_ENV: &str = "SHATTER_SERVER_MASTER_KEY";

/// Immutable master key, loaded once at startup and injected where needed.
#[derive(Clone, Debug)]
pub struct MasterKey(SensitiveBytes);

impl MasterKey {
	pub fn from_bytes(bytes: Vec<u8>) -> SecretsResult<Self> {
		if !VALID_KEY_SIZES.contains(&bytes.len()) {
			return Err(SecretsError::Configuration(format!(
				"master key must be 16, 24 or 32 bytes, got {}",
				bytes.len()
			)));
		}
		Ok(Self(SensitiveBytes::new(bytes)))
	}

	/// Decode a standard-alphabet base64 key.
	pub fn from_base64(encoded: &str) -> SecretsResult<Self> {
		let bytes = STANDARD
			.decode(encoded.trim())
			.map_err(|e| SecretsError::Configuration(format!("master key is not valid base64: {e}")))?;
		Self::from_bytes(bytes)
	}

	/// Load from `SHATTER_SERVER_MASTER_KEY_FILE` or `SHATTER_SERVER_MASTER_KEY`.
	pub fn from_env() -> SecretsResult<Self> {
		let encoded = load_secret_env(MASTER_KEY_ENV)
			.map_err(|e| SecretsError::Configuration(e.to_string()))?
			.ok_or_else(|| {
				SecretsError::Configuration(format!(
					"{MASTER_KEY_ENV} (or {MASTER_KEY_ENV}_FILE) is not set"
				))
			})?;
		let key = Self::from_base64(encoded.expose())?;
		tracing::info!(key_bits = key.len() * 8, "master key loaded");
		Ok(key)
	}

	/// A fresh 32-byte key, base64 encoded, for `generate-master-key`.
	pub fn generate_encoded() -> String {
		STANDARD.encode(generate_key(32).as_slice())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub(crate) fn as_bytes(&self) -> &[u8] {
		self.0.expose()
	}
}
