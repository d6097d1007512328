// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background jobs registered with the scheduler.

mod job_history_cleanup;
mod secret_purge;

pub use job_history_cleanup::JobHistoryCleanupJob;
pub use secret_purge::{SecretPurgeJob, SECRET_PURGE_JOB_ID};
