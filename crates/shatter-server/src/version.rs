// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Build information for `shatter-server version`.

use std::time::Duration;

use shatter_server_secrets::RETENTION_DAYS;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format version info for display.
pub fn format_version_info() -> String {
	let retention = Duration::from_secs(RETENTION_DAYS as u64 * 24 * 60 * 60);
	format!(
		"shatter-server version: {}\n\
		 Platform:               {}-{}\n\
		 Note retention:         {}",
		VERSION,
		std::env::consts::OS,
		std::env::consts::ARCH,
		humantime::format_duration(retention),
	)
}
