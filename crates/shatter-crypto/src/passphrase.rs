// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Salted SHA-256 hashes for note passphrases.
//!
//! A stored hash is `salt (16 bytes) || SHA-256(salt || passphrase)`. The
//! digest half doubles as the AES-256 key of a locked note's outer layer.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::{CryptoError, CryptoResult};

pub const SALT_SIZE: usize = 16;
const DIGEST_SIZE: usize = 32;

/// Length of a stored passphrase hash.
pub const PASSPHRASE_HASH_SIZE: usize = SALT_SIZE + DIGEST_SIZE;

/// Hash `passphrase` under `salt`, or under 16 fresh random bytes when `salt` is `None`.
pub fn hash_passphrase(passphrase: &str, salt: Option<[u8; SALT_SIZE]>) -> Vec<u8> {
	let salt = salt.unwrap_or_else(|| {
		let mut fresh = [0u8; SALT_SIZE];
		OsRng.fill_bytes(&mut fresh);
		fresh
	});

	let mut hasher = Sha256::new();
	hasher.update(salt);
	hasher.update(passphrase.as_bytes());

	let mut stored = Vec::with_capacity(PASSPHRASE_HASH_SIZE);
	stored.extend_from_slice(&salt);
	stored.extend_from_slice(&hasher.finalize());
	stored
}

/// Check `passphrase` against a stored hash in constant time.
///
/// Malformed stored hashes never verify.
pub fn verify_passphrase(passphrase: &str, stored: &[u8]) -> bool {
	if stored.len() != PASSPHRASE_HASH_SIZE {
		return false;
	}
	let mut salt = [0u8; SALT_SIZE];
	salt.copy_from_slice(&stored[..SALT_SIZE]);
	hash_passphrase(passphrase, Some(salt)).ct_eq(stored).into()
}

/// The outer-layer key of a locked note: the digest half of its passphrase hash.
pub fn layer_key(stored: &[u8]) -> CryptoResult<&[u8]> {
	if stored.len() != PASSPHRASE_HASH_SIZE {
		return Err(CryptoError::InvalidKeyLength {
			actual: stored.len().saturating_sub(SALT_SIZE),
		});
	}
	Ok(&stored[SALT_SIZE..])
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	const FIXED_SALT: [u8; SALT_SIZE] = *b"0123456789012345";

	#[test]
	fn matches_reference_digest() {
		let stored = hash_passphrase("value to hash", Some(FIXED_SALT));
		assert_eq!(stored.len(), PASSPHRASE_HASH_SIZE);
		assert_eq!(&stored[..SALT_SIZE], b"0123456789012345");
		assert_eq!(
			hex::encode(&stored[SALT_SIZE..]),
			"2a7aab4fedbfac7d54e9fc747d9daaa49cf7c66f3eb6bd69163ef994552d9483"
		);
	}

	#[test]
	fn random_salt_differs_between_calls() {
		let a = hash_passphrase("pw1", None);
		let b = hash_passphrase("pw1", None);
		assert_ne!(a[..SALT_SIZE], b[..SALT_SIZE]);
		assert!(verify_passphrase("pw1", &a));
		assert!(verify_passphrase("pw1", &b));
	}

	#[test]
	fn wrong_passphrase_does_not_verify() {
		let stored = hash_passphrase("pw1", None);
		assert!(!verify_passphrase("pw2", &stored));
		assert!(!verify_passphrase("", &stored));
	}

	#[test]
	fn malformed_hash_does_not_verify() {
		let stored = hash_passphrase("pw1", Some(FIXED_SALT));
		assert!(!verify_passphrase("pw1", &stored[..40]));
		assert!(!verify_passphrase("pw1", &[]));
	}

	#[test]
	fn layer_key_is_digest_half() {
		let stored = hash_passphrase("pw1", Some(FIXED_SALT));
		let key = layer_key(&stored).unwrap();
		assert_eq!(key.len(), 32);
		assert_eq!(key, &stored[SALT_SIZE..]);
		assert!(layer_key(&stored[..20]).is_err());
	}

	proptest! {
		#[test]
		fn verify_accepts_own_hash(passphrase in "\\PC{0,100}") {
			prop_assert!(verify_passphrase(&passphrase, &hash_passphrase(&passphrase, None)));
		}

		#[test]
		fn verify_rejects_other_passphrase(a in "\\PC{1,40}", b in "\\PC{1,40}") {
			prop_assume!(a != b);
			prop_assert!(!verify_passphrase(&b, &hash_passphrase(&a, None)));
		}
	}
}
