// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! AES in counter mode with a random nonce prepended to the ciphertext.
//!
//! Output layout is `nonce (16 bytes) || keystream XOR plaintext`. The nonce is
//! the initial value of a 128-bit big-endian counter, so ciphertext length
//! equals plaintext length plus [`NONCE_SIZE`]. Nothing here authenticates the
//! ciphertext; see [`crate::tag`].

use std::fmt;

use aes::{Aes128, Aes192, Aes256};
use ctr::cipher::{KeyIvInit, StreamCipher};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};

/// AES block size, used as the nonce length.
pub const NONCE_SIZE: usize = 16;

/// Accepted key lengths (AES-128, AES-192, AES-256).
pub const VALID_KEY_SIZES: [usize; 3] = [16, 24, 32];

type Aes128Ctr = ctr::Ctr128BE<Aes128>;
type Aes192Ctr = ctr::Ctr128BE<Aes192>;
type Aes256Ctr = ctr::Ctr128BE<Aes256>;

/// A counter-mode cipher bound to one key.
#[derive(Clone)]
pub struct AesCtrCipher {
	key: Zeroizing<Vec<u8>>,
}

impl AesCtrCipher {
	/// Fails with [`CryptoError::InvalidKeyLength`] unless the key is 16, 24 or 32 bytes.
	pub fn new(key: &[u8]) -> CryptoResult<Self> {
		if !VALID_KEY_SIZES.contains(&key.len()) {
			return Err(CryptoError::InvalidKeyLength { actual: key.len() });
		}
		Ok(Self {
			key: Zeroizing::new(key.to_vec()),
		})
	}

	pub fn key_len(&self) -> usize {
		self.key.len()
	}

	/// Encrypt under a fresh random nonce.
	pub fn encrypt(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
		let mut nonce = [0u8; NONCE_SIZE];
		OsRng.fill_bytes(&mut nonce);

		let mut output = Vec::with_capacity(NONCE_SIZE + plaintext.len());
		output.extend_from_slice(&nonce);
		output.extend_from_slice(plaintext);
		self.apply_keystream(&nonce, &mut output[NONCE_SIZE..])?;
		Ok(output)
	}

	/// Decrypt `nonce || ciphertext`.
	pub fn decrypt(&self, ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
		if ciphertext.len() < NONCE_SIZE {
			return Err(CryptoError::InvalidInputLength {
				minimum: NONCE_SIZE,
				actual: ciphertext.len(),
			});
		}

		let (nonce, body) = ciphertext.split_at(NONCE_SIZE);
		let mut nonce_block = [0u8; NONCE_SIZE];
		nonce_block.copy_from_slice(nonce);

		let mut plaintext = body.to_vec();
		self.apply_keystream(&nonce_block, &mut plaintext)?;
		Ok(plaintext)
	}

	fn apply_keystream(&self, nonce: &[u8; NONCE_SIZE], buf: &mut [u8]) -> CryptoResult<()> {
		let invalid_key = |_| CryptoError::InvalidKeyLength {
			actual: self.key.len(),
		};
		let result = match self.key.len() {
			16 => Aes128Ctr::new_from_slices(&self.key, nonce)
				.map_err(invalid_key)?
				.try_apply_keystream(buf),
			24 => Aes192Ctr::new_from_slices(&self.key, nonce)
				.map_err(invalid_key)?
				.try_apply_keystream(buf),
			32 => Aes256Ctr::new_from_slices(&self.key, nonce)
				.map_err(invalid_key)?
				.try_apply_keystream(buf),
			actual => return Err(CryptoError::InvalidKeyLength { actual }),
		};
		result.map_err(|_| CryptoError::KeystreamExhausted)
	}
}

impl fmt::Debug for AesCtrCipher {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AesCtrCipher")
			.field("key_bits", &(self.key.len() * 8))
			.finish_non_exhaustive()
	}
}

/// One-shot encrypt with `key`.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
	AesCtrCipher::new(key)?.encrypt(plaintext)
}

/// One-shot decrypt with `key`.
pub fn decrypt(key: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
	AesCtrCipher::new(key)?.decrypt(ciphertext)
}
