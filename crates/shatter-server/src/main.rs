// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shatter server binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shatter_server::{create_app_state, create_router, db, jobs, version};
use shatter_server_config::{LogFormat, ServerConfig};
use shatter_server_db::JobRepository;
use shatter_server_jobs::{JobScheduler, TriggerSource};
use shatter_server_secrets::{MasterKey, TokenCodec};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Shatter server - one-time self-destructing notes.
#[derive(Parser, Debug)]
#[command(name = "shatter-server", about = "One-time note server", version)]
struct Args {
	/// Config file (defaults to /etc/shatter/server.toml)
	#[arg(long, short, env = "SHATTER_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Delete expired notes once and exit
	Purge,
	/// Show version and build information
	Version,
	/// Print a fresh base64 master key for SHATTER_SERVER_MASTER_KEY
	GenerateMasterKey,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	// Subcommands that need neither config nor database
	match args.command {
		Some(Command::Version) => {
			println!("{}", version::format_version_info());
			return Ok(());
		}
		Some(Command::GenerateMasterKey) => {
			println!("{}", MasterKey::generate_encoded());
			return Ok(());
		}
		_ => {}
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => shatter_server_config::load_config_with_file(path)?,
		None => shatter_server_config::load_config()?,
	};

	init_tracing(&config);

	// Fatal: without a master key no token can be issued or read.
	let master_key = MasterKey::from_env().context("loading master key")?;
	let codec = TokenCodec::new(master_key);

	let pool = db::create_pool(&config.database.url)
		.await
		.context("opening database")?;
	db::run_migrations(&pool).await.context("running migrations")?;

	let mut state = create_app_state(pool.clone(), codec, &config);
	let job_repo = Arc::new(JobRepository::new(pool.clone()));
	let mut scheduler = JobScheduler::new(job_repo.clone());

	if let Some(Command::Purge) = args.command {
		scheduler.register_one_shot(Arc::new(jobs::SecretPurgeJob::new(Arc::clone(
			&state.secrets,
		))));
		let run_id = scheduler
			.trigger_job(jobs::SECRET_PURGE_JOB_ID, TriggerSource::Manual)
			.await
			.context("purging expired secrets")?;
		let run = job_repo.get_run(&run_id).await?;
		let purged = run
			.and_then(|r| r.metadata)
			.and_then(|m| m["purged"].as_u64())
			.unwrap_or(0);
		println!("purged {purged} expired secrets");
		return Ok(());
	}

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		"starting shatter-server"
	);

	// Register secret purge job
	scheduler.register_periodic(
		Arc::new(jobs::SecretPurgeJob::new(Arc::clone(&state.secrets))),
		Duration::from_secs(config.jobs.purge_interval_secs),
	);

	// Register job history cleanup job
	scheduler.register_periodic(
		Arc::new(jobs::JobHistoryCleanupJob::new(
			job_repo.clone(),
			config.jobs.history_retention_days,
		)),
		Duration::from_secs(24 * 60 * 60), // Daily
	);

	let scheduler = Arc::new(scheduler);
	state.job_scheduler = Some(Arc::clone(&scheduler));

	if let Err(e) = scheduler.start().await {
		tracing::error!(error = %e, "Failed to start job scheduler");
	}

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
			scheduler.shutdown().await;
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}

fn init_tracing(config: &ServerConfig) {
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
	let registry = tracing_subscriber::registry().with(filter);

	match config.logging.format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.init(),
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
	}
}
