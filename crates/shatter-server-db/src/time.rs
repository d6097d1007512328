// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{DbError, Result};

/// Render a timestamp in the fixed-width form used by every table.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
	ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("invalid timestamp '{value}': {e}")))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, TimeZone};
	use proptest::prelude::*;

	#[test]
	fn format_is_fixed_width() {
		let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
		assert_eq!(format_timestamp(ts), "2026-01-02T03:04:05.000000Z");
	}

	#[test]
	fn parse_rejects_garbage() {
		assert!(matches!(parse_timestamp("yesterday"), Err(DbError::Internal(_))));
	}

	proptest! {
		#[test]
		fn text_order_matches_time_order(a in 0i64..4_000_000_000, b in 0i64..4_000_000_000, micros in 0i64..1_000_000) {
			let base = Utc.timestamp_opt(0, 0).unwrap();
			let ta = base + Duration::seconds(a) + Duration::microseconds(micros);
			let tb = base + Duration::seconds(b);
			prop_assert_eq!(format_timestamp(ta) < format_timestamp(tb), ta < tb);
		}

		#[test]
		fn parse_inverts_format(secs in 0i64..4_000_000_000, micros in 0i64..1_000_000) {
			let ts = Utc.timestamp_opt(0, 0).unwrap() + Duration::seconds(secs) + Duration::microseconds(micros);
			prop_assert_eq!(parse_timestamp(&format_timestamp(ts)).unwrap(), ts);
		}
	}
}
