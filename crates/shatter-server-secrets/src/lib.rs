// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One-time notes: creation, single reveal, passphrase unlock and purge.
//!
//! A note's message is encrypted under a random 16-byte key. When the creator
//! sets a passphrase, the result is encrypted a second time under the digest
//! half of the passphrase hash. The inner key is handed out exactly once,
//! packed with the row id into a reveal token sealed by the process master key.
//!
//! Every state change goes through a conditional update in the store, so two
//! requests racing on the same note cannot both win:
//!
//! - issuing the reveal token clears `aes_key` only if it still holds the key read
//! - unlocking swaps the message only if `passphrase_hash` is unchanged
//! - revealing deletes and returns the row in one statement
//!
//! # Example
//!
//! ```ignore
//! let service = SecretsService::new(Arc::new(SecretRepository::new(pool)), codec, limits);
//! let created = service.create_secret(Some("pw1"), "hello").await?;
//! let token = service.get_or_issue_reveal_token(created.id).await?;
//! ```

pub mod config;
pub mod error;
pub mod service;
pub mod token;
pub mod types;

pub use config::{MasterKey, MASTER_KEY_ENV};
pub use error::{SecretsError, SecretsResult};
pub use service::SecretsService;
pub use token::TokenCodec;
pub use types::{
	CreatedSecret, RevealOutcome, SecretLookup, SecretSummary, StatusView, RETENTION_DAYS,
};
