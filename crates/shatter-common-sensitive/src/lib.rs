// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wrapper type for material that must never reach a log line.
//!
//! Note keys, passphrases, passphrase hashes, the master key and revealed
//! plaintext all travel through the server wrapped in [`Sensitive<T>`]:
//!
//! - `Debug`, `Display` and `Serialize` print `[REDACTED]`
//! - memory is zeroized on drop
//! - the value is only reachable through an explicit `.expose()`
//!
//! ```
//! use shatter_common_sensitive::Sensitive;
//!
//! let passphrase = Sensitive::new("correct horse".to_string());
//! assert_eq!(format!("{passphrase}"), "[REDACTED]");
//! assert_eq!(passphrase.expose(), "correct horse");
//! ```

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// The placeholder printed instead of the wrapped value.
pub const REDACTED: &str = "[REDACTED]";

/// A value that is redacted in all output and zeroized on drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Sensitive<T>
where
	T: Zeroize,
{
	inner: T,
}

pub type SensitiveString = Sensitive<String>;
pub type SensitiveBytes = Sensitive<Vec<u8>>;

impl<T> Sensitive<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Explicitly access the inner value.
	pub fn expose(&self) -> &T {
		&self.inner
	}

	/// Clone the inner value out of the wrapper.
	///
	/// The wrapper's own copy is still zeroized when it drops.
	pub fn into_inner(self) -> T
	where
		T: Clone,
	{
		self.inner.clone()
	}
}

impl SensitiveBytes {
	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Reinterpret the bytes as UTF-8 text.
	///
	/// On failure the original bytes are handed back, still wrapped.
	pub fn into_utf8(mut self) -> Result<SensitiveString, SensitiveBytes> {
		let bytes = std::mem::take(&mut self.inner);
		match String::from_utf8(bytes) {
			Ok(text) => Ok(Sensitive::new(text)),
			Err(err) => Err(Sensitive::new(err.into_bytes())),
		}
	}
}

impl From<Vec<u8>> for SensitiveBytes {
	fn from(value: Vec<u8>) -> Self {
		Self::new(value)
	}
}

impl From<String> for SensitiveString {
	fn from(value: String) -> Self {
		Self::new(value)
	}
}

impl From<&str> for SensitiveString {
	fn from(value: &str) -> Self {
		Self::new(value.to_string())
	}
}

impl<T> Clone for Sensitive<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Sensitive<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Sensitive").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Sensitive<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Sensitive<T>
where
	T: Zeroize + AsRef<[u8]>,
{
	fn eq(&self, other: &Self) -> bool {
		self.inner.as_ref().ct_eq(other.inner.as_ref()).into()
	}
}

impl<T> Eq for Sensitive<T> where T: Zeroize + AsRef<[u8]> {}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Sensitive, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Sensitive<T>
	where
		T: Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Sensitive<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			T::deserialize(deserializer).map(Sensitive::new)
		}
	}
}
