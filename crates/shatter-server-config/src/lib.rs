// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the shatter server.
//!
//! Sources are merged in precedence order: built-in defaults, the TOML file
//! (`/etc/shatter/server.toml` unless overridden), then `SHATTER_SERVER_*`
//! environment variables. Secrets such as the master key are not part of the
//! layered config; they are read through [`load_secret_env`] so they can come
//! from a `*_FILE` path.
//!
//! ```ignore
//! use shatter_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod secret_env;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use secret_env::{load_secret_env, require_secret_env, RequiredSecretError, SecretEnvError};
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::PathBuf;

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub logging: LoggingConfig,
	pub jobs: JobsConfig,
	pub notes: NotesConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`SHATTER_SERVER_*`)
/// 2. Config file (`/etc/shatter/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve a merged layer into a validated config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let config = ServerConfig {
		http: layer.http.unwrap_or_default().finalize(),
		database: layer.database.unwrap_or_default().finalize(),
		logging: layer.logging.unwrap_or_default().finalize()?,
		jobs: layer.jobs.unwrap_or_default().finalize(),
		notes: layer.notes.unwrap_or_default().finalize(),
	};

	validate_config(&config)?;

	info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		log_format = ?config.logging.format,
		purge_interval_secs = config.jobs.purge_interval_secs,
		"configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &ServerConfig) -> Result<(), ConfigError> {
	if config.jobs.purge_interval_secs == 0 {
		return Err(ConfigError::Validation(
			"jobs.purge_interval_secs must be greater than zero".to_string(),
		));
	}
	if config.notes.message_max_chars == 0 {
		return Err(ConfigError::Validation(
			"notes.message_max_chars must be greater than zero".to_string(),
		));
	}
	if config.notes.passphrase_max_chars == 0 {
		return Err(ConfigError::Validation(
			"notes.passphrase_max_chars must be greater than zero".to_string(),
		));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn defaults_resolve() {
		let config = finalize(ServerConfigLayer::default()).unwrap();
		assert_eq!(config.socket_addr(), "0.0.0.0:8080");
		assert_eq!(config.database.url, "sqlite:./shatter.db");
		assert_eq!(config.notes.message_max_chars, 25_000);
		assert_eq!(config.notes.passphrase_max_chars, 100);
		assert_eq!(config.jobs.purge_interval_secs, 3600);
	}

	#[test]
	fn zero_purge_interval_is_rejected() {
		let layer = ServerConfigLayer {
			jobs: Some(JobsConfigLayer {
				purge_interval_secs: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn zero_message_limit_is_rejected() {
		let layer = ServerConfigLayer {
			notes: Some(NotesConfigLayer {
				message_max_chars: Some(0),
				..Default::default()
			}),
			..Default::default()
		};
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn toml_file_overrides_defaults() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[http]
port = 9000

[notes]
message_max_chars = 500

[logging]
format = "json"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		let config = finalize(layer).unwrap();
		assert_eq!(config.http.port, 9000);
		assert_eq!(config.http.base_url, "http://localhost:9000");
		assert_eq!(config.notes.message_max_chars, 500);
		assert_eq!(config.notes.passphrase_max_chars, 100);
		assert_eq!(config.logging.format, LogFormat::Json);
	}
}
