// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

/// Size of the per-note key generated at creation (AES-128).
pub const NOTE_KEY_SIZE: usize = 16;

/// Generate `size` random bytes from the operating system CSPRNG.
pub fn generate_key(size: usize) -> Zeroizing<Vec<u8>> {
	let mut key = Zeroizing::new(vec![0u8; size]);
	OsRng.fill_bytes(key.as_mut_slice());
	key
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn generates_requested_size() {
		assert_eq!(generate_key(NOTE_KEY_SIZE).len(), 16);
		assert_eq!(generate_key(32).len(), 32);
	}

	#[test]
	fn keys_are_unique() {
		let a = generate_key(NOTE_KEY_SIZE);
		let b = generate_key(NOTE_KEY_SIZE);
		assert_ne!(a.as_slice(), b.as_slice());
	}
}
