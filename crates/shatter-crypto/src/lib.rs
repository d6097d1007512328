// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cryptographic primitives behind one-time notes.
//!
//! - [`cipher`]: AES in counter mode, random 16-byte nonce prepended to the output
//! - [`tag`]: HMAC-SHA256 appended to data and verified before stripping
//! - [`passphrase`]: salted SHA-256 hashes for the optional unlock passphrase
//! - [`keys`]: random key generation
//!
//! None of these are authenticated encryption on their own. Callers that need
//! tamper detection compose [`cipher`] and [`tag`] (encrypt, then tag).

pub mod cipher;
pub mod error;
pub mod keys;
pub mod passphrase;
pub mod tag;

pub use cipher::{decrypt, encrypt, AesCtrCipher, NONCE_SIZE, VALID_KEY_SIZES};
pub use error::{CryptoError, CryptoResult};
pub use keys::{generate_key, NOTE_KEY_SIZE};
pub use passphrase::{hash_passphrase, layer_key, verify_passphrase, PASSPHRASE_HASH_SIZE, SALT_SIZE};
pub use tag::{append_tag, verify_and_strip, TAG_SIZE};
