// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret note repository.
//!
//! Every one-way transition of a note (key issued, outer layer peeled,
//! plaintext consumed) is a single conditional statement. Two requests racing
//! on the same row can both read it, but only one of them sees
//! `rows_affected() == 1` or a `RETURNING` row.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shatter_common_sensitive::SensitiveBytes;
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::{DbError, Result};
use crate::time::{format_timestamp, parse_timestamp};

/// A note about to be inserted.
#[derive(Clone)]
pub struct NewSecret {
	pub encrypted_message: Vec<u8>,
	pub passphrase_hash: Option<SensitiveBytes>,
	pub aes_key: Option<SensitiveBytes>,
	pub created_at: DateTime<Utc>,
}

/// A stored note.
#[derive(Clone)]
pub struct SecretRow {
	pub id: i64,
	pub encrypted_message: Vec<u8>,
	pub passphrase_hash: Option<SensitiveBytes>,
	pub aes_key: Option<SensitiveBytes>,
	pub created_at: DateTime<Utc>,
}

impl SecretRow {
	pub fn is_locked(&self) -> bool {
		self.passphrase_hash.is_some()
	}

	/// Whether the reveal token has already been handed out.
	pub fn key_issued(&self) -> bool {
		self.aes_key.is_none()
	}
}

impl fmt::Debug for SecretRow {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SecretRow")
			.field("id", &self.id)
			.field("message_len", &self.encrypted_message.len())
			.field("locked", &self.is_locked())
			.field("key_issued", &self.key_issued())
			.field("created_at", &self.created_at)
			.finish()
	}
}

impl fmt::Debug for NewSecret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NewSecret")
			.field("message_len", &self.encrypted_message.len())
			.field("locked", &self.passphrase_hash.is_some())
			.field("created_at", &self.created_at)
			.finish()
	}
}

#[async_trait]
pub trait SecretStore: Send + Sync {
	async fn create_secret(&self, secret: NewSecret) -> Result<SecretRow>;
	async fn get_secret(&self, id: i64) -> Result<Option<SecretRow>>;
	async fn clear_aes_key(&self, id: i64, expected_key: &[u8]) -> Result<bool>;
	async fn unlock_secret(
		&self,
		id: i64,
		expected_hash: &[u8],
		peeled_message: &[u8],
	) -> Result<bool>;
	async fn take_unlocked_secret(&self, id: i64) -> Result<Option<Vec<u8>>>;
	async fn delete_secret(&self, id: i64) -> Result<bool>;
	async fn delete_secrets_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
	async fn count_secrets(&self) -> Result<i64>;
}

#[derive(Clone)]
pub struct SecretRepository {
	pool: SqlitePool,
}

impl SecretRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a note and return it with its database-assigned id.
	#[tracing::instrument(skip(self, secret), fields(locked = secret.passphrase_hash.is_some()))]
	pub async fn create_secret(&self, secret: NewSecret) -> Result<SecretRow> {
		let created_at = format_timestamp(secret.created_at);

		let result = sqlx::query(
			r#"
			INSERT INTO secrets (encrypted_message, passphrase_hash, aes_key, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(secret.encrypted_message.as_slice())
		.bind(secret.passphrase_hash.as_ref().map(|h| h.expose().as_slice()))
		.bind(secret.aes_key.as_ref().map(|k| k.expose().as_slice()))
		.bind(&created_at)
		.execute(&self.pool)
		.await?;

		let id = result.last_insert_rowid();
		tracing::debug!(secret_id = id, "secret stored");

		Ok(SecretRow {
			id,
			encrypted_message: secret.encrypted_message,
			passphrase_hash: secret.passphrase_hash,
			aes_key: secret.aes_key,
			created_at: parse_timestamp(&created_at)?,
		})
	}

	#[tracing::instrument(skip(self), fields(secret_id = id))]
	pub async fn get_secret(&self, id: i64) -> Result<Option<SecretRow>> {
		let row = sqlx::query(
			r#"
			SELECT id, encrypted_message, passphrase_hash, aes_key, created_at
			FROM secrets
			WHERE id = ?
			"#,
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_secret_row(&r)).transpose()
	}

	/// Null `aes_key` only if it still holds `expected_key`.
	///
	/// # Returns
	/// `true` for exactly one caller per note.
	#[tracing::instrument(skip(self, expected_key), fields(secret_id = id))]
	pub async fn clear_aes_key(&self, id: i64, expected_key: &[u8]) -> Result<bool> {
		let result = sqlx::query("UPDATE secrets SET aes_key = NULL WHERE id = ? AND aes_key = ?")
			.bind(id)
			.bind(expected_key)
			.execute(&self.pool)
			.await?;

		let cleared = result.rows_affected() > 0;
		if cleared {
			tracing::info!(secret_id = id, "reveal key cleared");
		}
		Ok(cleared)
	}

	/// Replace the message with its peeled form and null `passphrase_hash`,
	/// only if the hash is still `expected_hash`.
	#[tracing::instrument(skip(self, expected_hash, peeled_message), fields(secret_id = id))]
	pub async fn unlock_secret(
		&self,
		id: i64,
		expected_hash: &[u8],
		peeled_message: &[u8],
	) -> Result<bool> {
		let result = sqlx::query(
			r#"
			UPDATE secrets
			SET encrypted_message = ?, passphrase_hash = NULL
			WHERE id = ? AND passphrase_hash = ?
			"#,
		)
		.bind(peeled_message)
		.bind(id)
		.bind(expected_hash)
		.execute(&self.pool)
		.await?;

		let unlocked = result.rows_affected() > 0;
		if unlocked {
			tracing::info!(secret_id = id, "secret unlocked");
		}
		Ok(unlocked)
	}

	/// Delete an unlocked note and hand back its ciphertext.
	///
	/// Locked notes are left untouched and yield `None`, as do missing ones.
	#[tracing::instrument(skip(self), fields(secret_id = id))]
	pub async fn take_unlocked_secret(&self, id: i64) -> Result<Option<Vec<u8>>> {
		let row = sqlx::query(
			r#"
			DELETE FROM secrets
			WHERE id = ? AND passphrase_hash IS NULL
			RETURNING encrypted_message
			"#,
		)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		let message = row.map(|r| r.get::<Vec<u8>, _>("encrypted_message"));
		if message.is_some() {
			tracing::info!(secret_id = id, "secret consumed");
		}
		Ok(message)
	}

	#[tracing::instrument(skip(self), fields(secret_id = id))]
	pub async fn delete_secret(&self, id: i64) -> Result<bool> {
		let result = sqlx::query("DELETE FROM secrets WHERE id = ?")
			.bind(id)
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}

	#[tracing::instrument(skip(self, cutoff), fields(cutoff = %cutoff))]
	pub async fn delete_secrets_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
		let result = sqlx::query("DELETE FROM secrets WHERE created_at < ?")
			.bind(format_timestamp(cutoff))
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected();
		tracing::debug!(deleted, "deleted secrets created before cutoff");
		Ok(deleted)
	}

	#[tracing::instrument(skip(self))]
	pub async fn count_secrets(&self) -> Result<i64> {
		let row = sqlx::query("SELECT COUNT(*) AS count FROM secrets")
			.fetch_one(&self.pool)
			.await?;
		Ok(row.get("count"))
	}
}

#[async_trait]
impl SecretStore for SecretRepository {
	async fn create_secret(&self, secret: NewSecret) -> Result<SecretRow> {
		self.create_secret(secret).await
	}

	async fn get_secret(&self, id: i64) -> Result<Option<SecretRow>> {
		self.get_secret(id).await
	}

	async fn clear_aes_key(&self, id: i64, expected_key: &[u8]) -> Result<bool> {
		self.clear_aes_key(id, expected_key).await
	}

	async fn unlock_secret(
		&self,
		id: i64,
		expected_hash: &[u8],
		peeled_message: &[u8],
	) -> Result<bool> {
		self.unlock_secret(id, expected_hash, peeled_message).await
	}

	async fn take_unlocked_secret(&self, id: i64) -> Result<Option<Vec<u8>>> {
		self.take_unlocked_secret(id).await
	}

	async fn delete_secret(&self, id: i64) -> Result<bool> {
		self.delete_secret(id).await
	}

	async fn delete_secrets_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
		self.delete_secrets_created_before(cutoff).await
	}

	async fn count_secrets(&self) -> Result<i64> {
		self.count_secrets().await
	}
}

fn parse_secret_row(row: &sqlx::sqlite::SqliteRow) -> Result<SecretRow> {
	let id: i64 = row.get("id");
	let encrypted_message: Vec<u8> = row.get("encrypted_message");
	let passphrase_hash: Option<Vec<u8>> = row.get("passphrase_hash");
	let aes_key: Option<Vec<u8>> = row.get("aes_key");
	let created_at_str: String = row.get("created_at");

	let created_at = parse_timestamp(&created_at_str)
		.map_err(|e| DbError::Internal(format!("Invalid created_at for secret {id}: {e}")))?;

	Ok(SecretRow {
		id,
		encrypted_message,
		passphrase_hash: passphrase_hash.map(SensitiveBytes::from),
		aes_key: aes_key.map(SensitiveBytes::from),
		created_at,
	})
}
