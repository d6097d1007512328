// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HMAC-SHA256 integrity tags appended to the end of a buffer.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag.
pub const TAG_SIZE: usize = 32;

fn mac_for(key: &[u8]) -> CryptoResult<HmacSha256> {
	HmacSha256::new_from_slice(key).map_err(|_| CryptoError::InvalidKeyLength { actual: key.len() })
}

/// Return `data || HMAC-SHA256(key, data)`.
pub fn append_tag(key: &[u8], data: &[u8]) -> CryptoResult<Vec<u8>> {
	let mut mac = mac_for(key)?;
	mac.update(data);
	let tag = mac.finalize().into_bytes();

	let mut tagged = Vec::with_capacity(data.len() + TAG_SIZE);
	tagged.extend_from_slice(data);
	tagged.extend_from_slice(&tag);
	Ok(tagged)
}

/// Check the trailing tag and return the data in front of it.
///
/// The comparison is constant time.
pub fn verify_and_strip<'a>(key: &[u8], tagged: &'a [u8]) -> CryptoResult<&'a [u8]> {
	if tagged.len() < TAG_SIZE {
		return Err(CryptoError::TooShort {
			minimum: TAG_SIZE,
			actual: tagged.len(),
		});
	}

	let (data, tag) = tagged.split_at(tagged.len() - TAG_SIZE);
	let mut mac = mac_for(key)?;
	mac.update(data);
	mac.verify_slice(tag)
		.map_err(|_| CryptoError::AuthenticationFailed)?;
	Ok(data)
}
