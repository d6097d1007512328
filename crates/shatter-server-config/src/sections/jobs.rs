// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Jobs configuration section.

use serde::{Deserialize, Serialize};

const DEFAULT_HISTORY_RETENTION_DAYS: u32 = 30;
const DEFAULT_PURGE_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JobsConfigLayer {
	pub history_retention_days: Option<u32>,
	pub purge_interval_secs: Option<u64>,
}

impl JobsConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.history_retention_days.is_some() {
			self.history_retention_days = other.history_retention_days;
		}
		if other.purge_interval_secs.is_some() {
			self.purge_interval_secs = other.purge_interval_secs;
		}
	}

	pub fn finalize(self) -> JobsConfig {
		JobsConfig {
			history_retention_days: self
				.history_retention_days
				.unwrap_or(DEFAULT_HISTORY_RETENTION_DAYS),
			purge_interval_secs: self
				.purge_interval_secs
				.unwrap_or(DEFAULT_PURGE_INTERVAL_SECS),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobsConfig {
	/// How long finished job runs are kept.
	pub history_retention_days: u32,
	/// How often the expired-note purge runs.
	pub purge_interval_secs: u64,
}

impl Default for JobsConfig {
	fn default() -> Self {
		JobsConfigLayer::default().finalize()
	}
}
