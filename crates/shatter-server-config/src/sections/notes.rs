// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Limits on submitted notes.

use serde::{Deserialize, Serialize};

const DEFAULT_MESSAGE_MAX_CHARS: usize = 25_000;
const DEFAULT_PASSPHRASE_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotesConfigLayer {
	pub message_max_chars: Option<usize>,
	pub passphrase_max_chars: Option<usize>,
}

impl NotesConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.message_max_chars.is_some() {
			self.message_max_chars = other.message_max_chars;
		}
		if other.passphrase_max_chars.is_some() {
			self.passphrase_max_chars = other.passphrase_max_chars;
		}
	}

	pub fn finalize(self) -> NotesConfig {
		NotesConfig {
			message_max_chars: self.message_max_chars.unwrap_or(DEFAULT_MESSAGE_MAX_CHARS),
			passphrase_max_chars: self
				.passphrase_max_chars
				.unwrap_or(DEFAULT_PASSPHRASE_MAX_CHARS),
		}
	}
}

/// Character limits, counted in Unicode scalar values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotesConfig {
	pub message_max_chars: usize,
	pub passphrase_max_chars: usize,
}

impl Default for NotesConfig {
	fn default() -> Self {
		NotesConfigLayer::default().finalize()
	}
}
