// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use shatter_common_sensitive::SensitiveString;
use shatter_server_db::SecretRow;
use utoipa::ToSchema;

/// Notes older than this are purged whatever their state.
pub const RETENTION_DAYS: i64 = 7;

pub fn retention() -> Duration {
	Duration::days(RETENTION_DAYS)
}

/// Handle returned to the creator of a note.
#[derive(Debug, Clone)]
pub struct CreatedSecret {
	pub id: u32,
	/// Sealed id for the creator's status page.
	pub status_id: String,
}

/// What the creator's status page may show about a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SecretSummary {
	pub created_at: DateTime<Utc>,
	pub expires_at: DateTime<Utc>,
	pub locked: bool,
}

impl SecretSummary {
	pub fn from_row(row: &SecretRow) -> Self {
		Self {
			created_at: row.created_at,
			expires_at: row.created_at + retention(),
			locked: row.is_locked(),
		}
	}

	/// Human readable time left before the note is purged.
	pub fn format_remaining(&self, now: DateTime<Utc>) -> String {
		let left = self.expires_at - now;
		if left <= Duration::zero() {
			return "expired".to_string();
		}
		if left < Duration::minutes(1) {
			return "less than a minute".to_string();
		}

		let days = left.num_days();
		let hours = left.num_hours() % 24;
		let minutes = left.num_minutes() % 60;
		// A zero lower part is dropped: "6 days", not "6 days, 0 hours".
		let (major, minor) = if days > 0 {
			(plural(days, "day"), (hours > 0).then(|| plural(hours, "hour")))
		} else if hours > 0 {
			(plural(hours, "hour"), (minutes > 0).then(|| plural(minutes, "minute")))
		} else {
			return plural(minutes, "minute");
		};
		match minor {
			Some(minor) => format!("{major}, {minor}"),
			None => major,
		}
	}
}

fn plural(count: i64, unit: &str) -> String {
	if count == 1 {
		format!("1 {unit}")
	} else {
		format!("{count} {unit}s")
	}
}

/// Result of resolving a status id.
#[derive(Debug, Clone, Default)]
pub struct StatusView {
	/// `None` when the id is invalid or the note is gone.
	pub secret: Option<SecretSummary>,
	/// Present only on the one request that issued it.
	pub reveal_token: Option<String>,
}

/// Non-destructive view of a reveal token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecretLookup {
	pub found: bool,
	pub locked: bool,
}

#[derive(Debug, PartialEq)]
pub enum RevealOutcome {
	NotFound,
	/// Still behind its passphrase; nothing was consumed.
	Locked,
	Revealed(SensitiveString),
	/// The key did not produce UTF-8 text. The note is gone regardless.
	Undecodable,
}
