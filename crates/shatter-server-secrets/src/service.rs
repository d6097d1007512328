// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Note lifecycle and the operations the HTTP layer and jobs call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shatter_common_sensitive::{SensitiveBytes, SensitiveString};
use shatter_crypto::{
	decrypt, encrypt, generate_key, hash_passphrase, layer_key, verify_passphrase, NOTE_KEY_SIZE,
};
use shatter_server_config::NotesConfig;
use shatter_server_db::{NewSecret, SecretRow, SecretStore};
use tracing::instrument;

use crate::error::{SecretsError, SecretsResult};
use crate::token::TokenCodec;
use crate::types::{
	retention, CreatedSecret, RevealOutcome, SecretLookup, SecretSummary, StatusView,
};

pub struct SecretsService {
	store: Arc<dyn SecretStore>,
	codec: TokenCodec,
	limits: NotesConfig,
}

impl SecretsService {
	pub fn new(store: Arc<dyn SecretStore>, codec: TokenCodec, limits: NotesConfig) -> Self {
		Self {
			store,
			codec,
			limits,
		}
	}

	pub fn codec(&self) -> &TokenCodec {
		&self.codec
	}

	// Lifecycle transitions

	/// Encrypt and store a new note. The returned row still holds its key.
	#[instrument(skip_all, fields(locked = passphrase.is_some_and(|p| !p.is_empty())))]
	pub async fn create(&self, passphrase: Option<&str>, message: &str) -> SecretsResult<SecretRow> {
		let passphrase = passphrase.filter(|p| !p.is_empty());
		self.validate(passphrase, message)?;

		let key = generate_key(NOTE_KEY_SIZE);
		let inner = encrypt(&key, message.as_bytes())?;

		let (encrypted_message, passphrase_hash) = match passphrase {
			Some(passphrase) => {
				let hash = hash_passphrase(passphrase, None);
				let outer = encrypt(layer_key(&hash)?, &inner)?;
				(outer, Some(SensitiveBytes::new(hash)))
			}
			None => (inner, None),
		};

		let row = self
			.store
			.create_secret(NewSecret {
				encrypted_message,
				passphrase_hash,
				aes_key: Some(SensitiveBytes::new(key.to_vec())),
				created_at: Utc::now(),
			})
			.await?;
		if let Err(e) = to_token_id(row.id) {
			self.store.delete_secret(row.id).await?;
			return Err(e);
		}

		tracing::info!(secret_id = row.id, locked = row.is_locked(), "secret created");
		Ok(row)
	}

	/// Hand out the reveal token once; `None` if it was already issued.
	#[instrument(skip_all, fields(secret_id = secret.id))]
	pub async fn issue_reveal_segment(&self, secret: &SecretRow) -> SecretsResult<Option<String>> {
		let Some(key) = secret.aes_key.as_ref() else {
			return Ok(None);
		};

		let token = self.codec.pack_reveal(to_token_id(secret.id)?, key.expose())?;
		if self.store.clear_aes_key(secret.id, key.expose()).await? {
			Ok(Some(token))
		} else {
			tracing::debug!(secret_id = secret.id, "reveal token issued concurrently");
			Ok(None)
		}
	}

	/// Peel the passphrase layer. Unlocked notes succeed without change.
	#[instrument(skip_all, fields(secret_id = secret.id))]
	pub async fn unlock(&self, secret: &SecretRow, passphrase: &str) -> SecretsResult<bool> {
		let Some(hash) = secret.passphrase_hash.as_ref() else {
			// Same hashing cost as the locked path.
			let _ = hash_passphrase(passphrase, None);
			return Ok(true);
		};

		if !verify_passphrase(passphrase, hash.expose()) {
			tracing::info!(secret_id = secret.id, "wrong passphrase");
			return Ok(false);
		}

		let peeled = decrypt(layer_key(hash.expose())?, &secret.encrypted_message)?;
		if self
			.store
			.unlock_secret(secret.id, hash.expose(), &peeled)
			.await?
		{
			return Ok(true);
		}

		// Lost a race with another unlock of the same note.
		Ok(matches!(
			self.store.get_secret(secret.id).await?,
			Some(current) if !current.is_locked()
		))
	}

	/// Delete the note and decrypt what was stored with `key`.
	#[instrument(skip_all, fields(secret_id = id))]
	pub async fn consume(&self, id: i64, key: &[u8]) -> SecretsResult<RevealOutcome> {
		let Some(ciphertext) = self.store.take_unlocked_secret(id).await? else {
			return Ok(match self.store.get_secret(id).await? {
				Some(_) => RevealOutcome::Locked,
				None => RevealOutcome::NotFound,
			});
		};

		let plaintext = match decrypt(key, &ciphertext) {
			Ok(plaintext) => SensitiveBytes::new(plaintext),
			Err(e) => {
				tracing::info!(secret_id = id, error = %e, "reveal key unusable");
				return Ok(RevealOutcome::Undecodable);
			}
		};

		match plaintext.into_utf8() {
			Ok(message) => Ok(RevealOutcome::Revealed(message)),
			Err(_) => {
				tracing::info!(secret_id = id, "revealed message is not valid text");
				Ok(RevealOutcome::Undecodable)
			}
		}
	}

	// Operations

	pub async fn create_secret(
		&self,
		passphrase: Option<&str>,
		message: &str,
	) -> SecretsResult<CreatedSecret> {
		let row = self.create(passphrase, message).await?;
		let id = to_token_id(row.id)?;
		Ok(CreatedSecret {
			id,
			status_id: self.codec.pack_id(id)?,
		})
	}

	pub async fn get_or_issue_reveal_token(&self, id: u32) -> SecretsResult<Option<String>> {
		match self.store.get_secret(i64::from(id)).await? {
			Some(row) => self.issue_reveal_segment(&row).await,
			None => Ok(None),
		}
	}

	/// Summary for the creator, plus the reveal token on the first visit.
	pub async fn resolve_status(&self, status_id: &str) -> SecretsResult<StatusView> {
		let Some(id) = not_found_if_invalid(self.codec.unpack_id(status_id))? else {
			return Ok(StatusView::default());
		};
		let Some(row) = self.store.get_secret(i64::from(id)).await? else {
			return Ok(StatusView::default());
		};

		Ok(StatusView {
			secret: Some(SecretSummary::from_row(&row)),
			reveal_token: self.issue_reveal_segment(&row).await?,
		})
	}

	pub async fn resolve_secret(&self, token: &str) -> SecretsResult<SecretLookup> {
		let Some((id, _)) = not_found_if_invalid(self.codec.unpack_reveal(token))? else {
			return Ok(SecretLookup::default());
		};

		Ok(match self.store.get_secret(i64::from(id)).await? {
			Some(row) => SecretLookup {
				found: true,
				locked: row.is_locked(),
			},
			None => SecretLookup::default(),
		})
	}

	pub async fn unlock_secret(&self, token: &str, passphrase: &SensitiveString) -> SecretsResult<bool> {
		let Some((id, _)) = not_found_if_invalid(self.codec.unpack_reveal(token))? else {
			return Ok(false);
		};
		match self.store.get_secret(i64::from(id)).await? {
			Some(row) => self.unlock(&row, passphrase.expose()).await,
			None => Ok(false),
		}
	}

	pub async fn reveal_secret(&self, token: &str) -> SecretsResult<RevealOutcome> {
		let Some((id, key)) = not_found_if_invalid(self.codec.unpack_reveal(token))? else {
			return Ok(RevealOutcome::NotFound);
		};
		self.consume(i64::from(id), key.expose()).await
	}

	/// Delete every note past the retention window. Returns how many went.
	pub async fn purge_expired(&self) -> SecretsResult<u64> {
		self.purge_expired_at(Utc::now()).await
	}

	#[instrument(skip(self))]
	pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> SecretsResult<u64> {
		let cutoff = now - retention();
		let purged = self.store.delete_secrets_created_before(cutoff).await?;
		if purged > 0 {
			tracing::info!(purged, %cutoff, "purged expired secrets");
		}
		Ok(purged)
	}

	fn validate(&self, passphrase: Option<&str>, message: &str) -> SecretsResult<()> {
		if message.is_empty() {
			return Err(SecretsError::Validation("message must not be empty".to_string()));
		}
		if message.chars().count() > self.limits.message_max_chars {
			return Err(SecretsError::Validation(format!(
				"message must be at most {} characters",
				self.limits.message_max_chars
			)));
		}
		if let Some(passphrase) = passphrase {
			if passphrase.chars().count() > self.limits.passphrase_max_chars {
				return Err(SecretsError::Validation(format!(
					"passphrase must be at most {} characters",
					self.limits.passphrase_max_chars
				)));
			}
		}
		Ok(())
	}
}

fn to_token_id(id: i64) -> SecretsResult<u32> {
	u32::try_from(id).map_err(|_| SecretsError::Internal(format!("secret id {id} does not fit in a token")))
}

fn not_found_if_invalid<T>(result: SecretsResult<T>) -> SecretsResult<Option<T>> {
	match result {
		Ok(value) => Ok(Some(value)),
		Err(SecretsError::InvalidToken) => Ok(None),
		Err(e) => Err(e),
	}
}
