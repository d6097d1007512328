// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use shatter_server_db::JobStore;
use shatter_server_jobs::{Job, JobContext, JobError, JobOutput};

pub struct JobHistoryCleanupJob {
	store: Arc<dyn JobStore>,
	retention_days: u32,
}

impl JobHistoryCleanupJob {
	pub fn new(store: Arc<dyn JobStore>, retention_days: u32) -> Self {
		Self {
			store,
			retention_days,
		}
	}
}

#[async_trait]
impl Job for JobHistoryCleanupJob {
	fn id(&self) -> &str {
		"job-history-cleanup"
	}

	fn name(&self) -> &str {
		"Job History Cleanup"
	}

	fn description(&self) -> &str {
		"Removes old job run history entries"
	}

	async fn run(&self, ctx: &JobContext) -> Result<JobOutput, JobError> {
		if ctx.cancellation_token.is_cancelled() {
			return Err(JobError::Cancelled);
		}

		let before = Utc::now() - Duration::days(i64::from(self.retention_days));
		match self.store.delete_old_runs(before).await {
			Ok(count) => {
				tracing::info!(
					deleted = count,
					retention_days = self.retention_days,
					"Job history cleanup completed"
				);
				Ok(JobOutput {
					message: format!("Cleaned up {count} old job run records"),
					metadata: Some(serde_json::json!({
						"deleted_count": count,
						"retention_days": self.retention_days
					})),
				})
			}
			Err(e) => Err(JobError::Failed {
				message: format!("Job history cleanup failed: {e}"),
				retryable: true,
			}),
		}
	}
}
