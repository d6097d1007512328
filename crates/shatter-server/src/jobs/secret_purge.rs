// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use async_trait::async_trait;
use shatter_server_jobs::{Job, JobContext, JobError, JobOutput};
use shatter_server_secrets::{SecretsService, RETENTION_DAYS};
use tracing::instrument;

pub const SECRET_PURGE_JOB_ID: &str = "secret-purge";

pub struct SecretPurgeJob {
	secrets: Arc<SecretsService>,
}

impl SecretPurgeJob {
	pub fn new(secrets: Arc<SecretsService>) -> Self {
		Self { secrets }
	}
}

#[async_trait]
impl Job for SecretPurgeJob {
	fn id(&self) -> &str {
		SECRET_PURGE_JOB_ID
	}

	fn name(&self) -> &str {
		"Secret Purge"
	}

	fn description(&self) -> &str {
		"Delete notes older than the retention window, read or not"
	}

	#[instrument(skip(self, ctx), fields(job_id = SECRET_PURGE_JOB_ID))]
	async fn run(&self, ctx: &JobContext) -> Result<JobOutput, JobError> {
		if ctx.cancellation_token.is_cancelled() {
			return Err(JobError::Cancelled);
		}

		let purged = self
			.secrets
			.purge_expired()
			.await
			.map_err(|e| JobError::Failed {
				message: e.to_string(),
				retryable: true,
			})?;

		tracing::info!(purged, retention_days = RETENTION_DAYS, "Secret purge completed");

		Ok(JobOutput {
			message: format!("Purged {purged} expired secrets"),
			metadata: Some(serde_json::json!({
				"purged": purged,
				"retention_days": RETENTION_DAYS,
			})),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, Utc};
	use shatter_common_sensitive::SensitiveBytes;
	use shatter_server_config::NotesConfig;
	use shatter_server_db::testing::create_secret_test_pool;
	use shatter_server_db::{NewSecret, SecretRepository};
	use shatter_server_jobs::{CancellationToken, TriggerSource};
	use shatter_server_secrets::{MasterKey, TokenCodec};

	fn context() -> JobContext {
		JobContext {
			run_id: "run-1".to_string(),
			triggered_by: TriggerSource::Manual,
			cancellation_token: CancellationToken::new(),
		}
	}

	async fn setup() -> (SecretPurgeJob, Arc<SecretRepository>) {
		let pool = create_secret_test_pool().await;
		let repo = Arc::new(SecretRepository::new(pool));
		let codec = TokenCodec::new(MasterKey::from_bytes(vec![1u8; 16]).unwrap());
		let service = SecretsService::new(repo.clone(), codec, NotesConfig::default());
		(SecretPurgeJob::new(Arc::new(service)), repo)
	}

	#[tokio::test]
	async fn purges_only_expired() {
		let (job, repo) = setup().await;
		for age_days in [1, 8, 30] {
			repo.create_secret(NewSecret {
				encrypted_message: vec![0u8; 20],
				passphrase_hash: None,
				aes_key: Some(SensitiveBytes::new(vec![0u8; 16])),
				created_at: Utc::now() - Duration::days(age_days),
			})
			.await
			.unwrap();
		}

		let output = job.run(&context()).await.unwrap();
		assert_eq!(output.metadata.unwrap()["purged"], 2);
		assert_eq!(repo.count_secrets().await.unwrap(), 1);
	}

	#[tokio::test]
	async fn respects_cancellation() {
		let (job, _) = setup().await;
		let ctx = context();
		ctx.cancellation_token.cancel();
		assert!(matches!(job.run(&ctx).await, Err(JobError::Cancelled)));
	}
}
