// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Reveal tokens and status ids.
//!
//! Both are `base64url(encrypt(master, payload) || hmac(master, ciphertext))`
//! with `=` padding removed so they sit cleanly in a URL path segment:
//!
//! | Kind        | Payload                          |
//! |-------------|----------------------------------|
//! | reveal      | `id (u32 big-endian) || note key` |
//! | status id   | `id (u32 big-endian)`             |
//!
//! Decoding tolerates trailing `=`. Every failure is reported as
//! [`SecretsError::InvalidToken`]; the specific cause is only logged.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use shatter_common_sensitive::SensitiveBytes;
use shatter_crypto::{append_tag, decrypt, encrypt, verify_and_strip, CryptoError};
use zeroize::Zeroizing;

use crate::config::MasterKey;
use crate::error::{SecretsError, SecretsResult};

const ID_SIZE: usize = 4;

enum TokenFault {
	Base64(base64::DecodeError),
	Crypto(CryptoError),
	PayloadLength(usize),
}

impl fmt::Display for TokenFault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenFault::Base64(e) => write!(f, "bad base64: {e}"),
			TokenFault::Crypto(e) => write!(f, "{e}"),
			TokenFault::PayloadLength(len) => write!(f, "unexpected payload length {len}"),
		}
	}
}

#[derive(Clone, Debug)]
pub struct TokenCodec {
	master: MasterKey,
}

impl TokenCodec {
	pub fn new(master: MasterKey) -> Self {
		Self { master }
	}

	/// Seal a row id together with the note key.
	pub fn pack_reveal(&self, id: u32, key: &[u8]) -> SecretsResult<String> {
		let mut payload = Zeroizing::new(Vec::with_capacity(ID_SIZE + key.len()));
		payload.extend_from_slice(&id.to_be_bytes());
		payload.extend_from_slice(key);
		self.seal(&payload)
	}

	pub fn unpack_reveal(&self, token: &str) -> SecretsResult<(u32, SensitiveBytes)> {
		let payload = self.open(token).map_err(|fault| reject("reveal", fault))?;
		if payload.len() <= ID_SIZE {
			return Err(reject("reveal", TokenFault::PayloadLength(payload.len())));
		}
		let id = read_id(&payload[..ID_SIZE]);
		Ok((id, SensitiveBytes::new(payload[ID_SIZE..].to_vec())))
	}

	/// Seal a bare row id.
	pub fn pack_id(&self, id: u32) -> SecretsResult<String> {
		self.seal(&id.to_be_bytes())
	}

	pub fn unpack_id(&self, token: &str) -> SecretsResult<u32> {
		let payload = self.open(token).map_err(|fault| reject("status", fault))?;
		if payload.len() != ID_SIZE {
			return Err(reject("status", TokenFault::PayloadLength(payload.len())));
		}
		Ok(read_id(&payload))
	}

	fn seal(&self, payload: &[u8]) -> SecretsResult<String> {
		let ciphertext = encrypt(self.master.as_bytes(), payload)?;
		let tagged = append_tag(self.master.as_bytes(), &ciphertext)?;
		Ok(URL_SAFE_NO_PAD.encode(tagged))
	}

	fn open(&self, token: &str) -> Result<Zeroizing<Vec<u8>>, TokenFault> {
		let raw = URL_SAFE_NO_PAD
			.decode(token.trim_end_matches('='))
			.map_err(TokenFault::Base64)?;
		let ciphertext =
			verify_and_strip(self.master.as_bytes(), &raw).map_err(TokenFault::Crypto)?;
		let payload = decrypt(self.master.as_bytes(), ciphertext).map_err(TokenFault::Crypto)?;
		Ok(Zeroizing::new(payload))
	}
}

fn read_id(bytes: &[u8]) -> u32 {
	let mut id = [0u8; ID_SIZE];
	id.copy_from_slice(bytes);
	u32::from_be_bytes(id)
}

fn reject(kind: &'static str, fault: TokenFault) -> SecretsError {
	tracing::debug!(kind, cause = %fault, "rejected token");
	SecretsError::InvalidToken
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn codec() -> TokenCodec {
		TokenCodec::new(MasterKey::from_bytes((0u8..32).collect()).unwrap())
	}

	fn flip_byte(token: &str, index: usize) -> String {
		let mut raw = URL_SAFE_NO_PAD.decode(token).unwrap();
		let at = index % raw.len();
		raw[at] ^= 0x01;
		URL_SAFE_NO_PAD.encode(raw)
	}

	#[test]
	fn reveal_token_round_trips() {
		let codec = codec();
		let token = codec.pack_reveal(42, &[0xAB; 16]).unwrap();
		let (id, key) = codec.unpack_reveal(&token).unwrap();
		assert_eq!(id, 42);
		assert_eq!(key.expose(), &vec![0xAB; 16]);
	}

	#[test]
	fn reveal_token_layout() {
		// 16 nonce + 4 id + 16 key + 32 tag
		let token = codec().pack_reveal(1, &[0u8; 16]).unwrap();
		assert_eq!(URL_SAFE_NO_PAD.decode(&token).unwrap().len(), 68);
	}

	#[test]
	fn padding_is_tolerated() {
		let codec = codec();
		// 16 + 4 + 32 = 52 bytes, two pad characters in padded base64.
		let token = codec.pack_id(7).unwrap();
		assert!(!token.contains('='));
		assert_eq!(codec.unpack_id(&format!("{token}==")).unwrap(), 7);
	}

	#[test]
	fn other_master_key_is_rejected() {
		let token = codec().pack_id(7).unwrap();
		let other = TokenCodec::new(MasterKey::from_bytes(vec![0x55; 32]).unwrap());
		assert!(matches!(other.unpack_id(&token), Err(SecretsError::InvalidToken)));
	}

	#[test]
	fn kinds_are_not_interchangeable() {
		let codec = codec();
		let status = codec.pack_id(9).unwrap();
		assert!(matches!(codec.unpack_reveal(&status), Err(SecretsError::InvalidToken)));

		let reveal = codec.pack_reveal(9, &[1u8; 16]).unwrap();
		assert!(matches!(codec.unpack_id(&reveal), Err(SecretsError::InvalidToken)));
	}

	#[test]
	fn garbage_is_invalid_token() {
		let codec = codec();
		for input in ["", "=", "not*base64", "AAAA", "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA"] {
			assert!(
				matches!(codec.unpack_id(input), Err(SecretsError::InvalidToken)),
				"{input:?}"
			);
			assert!(
				matches!(codec.unpack_reveal(input), Err(SecretsError::InvalidToken)),
				"{input:?}"
			);
		}
	}

	proptest! {
		#[test]
		fn any_id_and_key_round_trip(
			id in any::<u32>(),
			key in proptest::collection::vec(any::<u8>(), 1..64),
		) {
			let codec = codec();
			let token = codec.pack_reveal(id, &key).unwrap();
			let (got_id, got_key) = codec.unpack_reveal(&token).unwrap();
			prop_assert_eq!(got_id, id);
			prop_assert_eq!(got_key.expose(), &key);
		}

		#[test]
		fn any_id_round_trips(id in any::<u32>()) {
			let codec = codec();
			prop_assert_eq!(codec.unpack_id(&codec.pack_id(id).unwrap()).unwrap(), id);
		}

		#[test]
		fn corrupted_byte_is_rejected(id in any::<u32>(), index in any::<usize>()) {
			let codec = codec();
			let token = codec.pack_reveal(id, &[3u8; 16]).unwrap();
			let tampered = flip_byte(&token, index);
			prop_assert!(matches!(codec.unpack_reveal(&tampered), Err(SecretsError::InvalidToken)));
		}

		#[test]
		fn tokens_use_url_alphabet(id in any::<u32>()) {
			let token = codec().pack_reveal(id, &[0xFF; 16]).unwrap();
			prop_assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
		}
	}
}
