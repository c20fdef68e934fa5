// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Broker connection configuration for the Open Service Broker client.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Validation of the merged result into a [`BrokerConfig`]
//! - Consistent environment variable naming (`OSB_BROKER_*`)
//! - A [`Secret`] wrapper so broker credentials never reach logs
//!
//! # Usage
//!
//! ```ignore
//! use osb_client_config::load_config;
//!
//! let config = load_config()?;
//! println!("Talking to {} at {}", config.name, config.url);
//! ```

pub mod error;
pub mod layer;
pub mod secret;
pub mod sources;

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};
use url::Url;

pub use error::ConfigError;
pub use layer::{AuthConfigLayer, BrokerConfigLayer};
pub use secret::{Secret, SecretString, REDACTED};
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

/// Fully resolved broker connection settings.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
	/// Human readable broker name, used in logs.
	pub name: String,
	pub url: Url,
	/// OSB API version in `major.minor` form.
	pub api_version: String,
	pub request_timeout: Duration,
	pub insecure_skip_verify: bool,
	pub auth: BrokerAuth,
}

/// Credentials presented to the broker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BrokerAuth {
	#[default]
	None,
	Basic {
		username: String,
		password: SecretString,
	},
	Bearer {
		token: SecretString,
	},
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`OSB_BROKER_*`)
/// 2. Config file (`$XDG_CONFIG_HOME/osb-client/broker.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<BrokerConfig, ConfigError> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(DefaultsSource), Box::new(EnvSource)];
	if let Some(user) = TomlSource::user() {
		sources.push(Box::new(user));
	}
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl Into<PathBuf>) -> Result<BrokerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

/// Load configuration from defaults and environment only.
pub fn load_config_from_env() -> Result<BrokerConfig, ConfigError> {
	load_from_sources(vec![Box::new(DefaultsSource), Box::new(EnvSource)])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<BrokerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = BrokerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Validate a merged layer into resolved config.
pub fn finalize(layer: BrokerConfigLayer) -> Result<BrokerConfig, ConfigError> {
	let raw_url = layer
		.url
		.ok_or_else(|| ConfigError::MissingField("url".to_string()))?;
	let url = Url::parse(&raw_url).map_err(|e| ConfigError::invalid_value("url", e.to_string()))?;
	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::invalid_value(
			"url",
			format!("unsupported scheme '{}'", url.scheme()),
		));
	}

	let api_version = layer
		.api_version
		.unwrap_or_else(|| sources::DEFAULT_API_VERSION.to_string());
	validate_api_version(&api_version)?;

	let timeout_secs = layer
		.request_timeout_secs
		.unwrap_or(sources::DEFAULT_REQUEST_TIMEOUT_SECS);
	if timeout_secs == 0 {
		return Err(ConfigError::invalid_value(
			"request_timeout_secs",
			"must be greater than zero",
		));
	}

	let auth = finalize_auth(layer.auth.unwrap_or_default())?;

	let config = BrokerConfig {
		name: layer
			.name
			.unwrap_or_else(|| sources::DEFAULT_BROKER_NAME.to_string()),
		url,
		api_version,
		request_timeout: Duration::from_secs(timeout_secs),
		insecure_skip_verify: layer.insecure_skip_verify.unwrap_or(false),
		auth,
	};

	info!(
		broker = %config.name,
		url = %config.url,
		api_version = %config.api_version,
		timeout_secs,
		insecure = config.insecure_skip_verify,
		auth = auth_kind(&config.auth),
		"Broker configuration loaded"
	);

	Ok(config)
}

fn validate_api_version(version: &str) -> Result<(), ConfigError> {
	let valid = version
		.split_once('.')
		.map(|(major, minor)| {
			!major.is_empty()
				&& !minor.is_empty()
				&& major.bytes().all(|b| b.is_ascii_digit())
				&& minor.bytes().all(|b| b.is_ascii_digit())
		})
		.unwrap_or(false);

	if valid {
		Ok(())
	} else {
		Err(ConfigError::invalid_value(
			"api_version",
			format!("expected 'major.minor', got '{version}'"),
		))
	}
}

fn finalize_auth(layer: AuthConfigLayer) -> Result<BrokerAuth, ConfigError> {
	match (layer.username, layer.password, layer.token) {
		(None, None, None) => Ok(BrokerAuth::None),
		(None, None, Some(token)) => Ok(BrokerAuth::Bearer { token }),
		(Some(_) | None, Some(_) | None, Some(_)) => Err(ConfigError::Validation(
			"basic auth and bearer token are mutually exclusive".to_string(),
		)),
		(Some(username), Some(password), None) => Ok(BrokerAuth::Basic { username, password }),
		(Some(_), None, None) => Err(ConfigError::MissingField("auth.password".to_string())),
		(None, Some(_), None) => Err(ConfigError::MissingField("auth.username".to_string())),
	}
}

fn auth_kind(auth: &BrokerAuth) -> &'static str {
	match auth {
		BrokerAuth::None => "none",
		BrokerAuth::Basic { .. } => "basic",
		BrokerAuth::Bearer { .. } => "bearer",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use tempfile::TempDir;

	fn layer_with_url(url: &str) -> BrokerConfigLayer {
		let mut layer = DefaultsSource.load().unwrap();
		layer.url = Some(url.to_string());
		layer
	}

	#[test]
	fn defaults_apply() {
		let config = finalize(layer_with_url("http://localhost:8080")).unwrap();
		assert_eq!(config.name, "broker");
		assert_eq!(config.api_version, "2.13");
		assert_eq!(config.request_timeout, Duration::from_secs(60));
		assert!(!config.insecure_skip_verify);
		assert_eq!(config.auth, BrokerAuth::None);
	}

	#[test]
	fn url_is_required() {
		let err = finalize(DefaultsSource.load().unwrap()).unwrap_err();
		assert!(matches!(err, ConfigError::MissingField(field) if field == "url"));
	}

	#[test]
	fn rejects_non_http_scheme() {
		let err = finalize(layer_with_url("ftp://broker")).unwrap_err();
		assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "url"));
	}

	#[test]
	fn rejects_zero_timeout() {
		let mut layer = layer_with_url("http://localhost");
		layer.request_timeout_secs = Some(0);
		assert!(finalize(layer).is_err());
	}

	#[test]
	fn basic_auth_requires_password() {
		let mut layer = layer_with_url("http://localhost");
		layer.auth = Some(AuthConfigLayer {
			username: Some("admin".to_string()),
			..Default::default()
		});
		let err = finalize(layer).unwrap_err();
		assert!(matches!(err, ConfigError::MissingField(field) if field == "auth.password"));
	}

	#[test]
	fn basic_and_bearer_are_exclusive() {
		let mut layer = layer_with_url("http://localhost");
		layer.auth = Some(AuthConfigLayer {
			username: Some("admin".to_string()),
			password: Some(Secret::new("pw".to_string())),
			token: Some(Secret::new("tok".to_string())),
		});
		assert!(matches!(finalize(layer), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn file_overrides_defaults() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("broker.toml");
		std::fs::write(
			&path,
			r#"
			name = "redis"
			url = "https://redis-broker.example.com"
			api_version = "2.14"

			[auth]
			username = "admin"
			password = "pw"
			"#,
		)
		.unwrap();

		let mut merged = DefaultsSource.load().unwrap();
		merged.merge(TomlSource::new(&path).load().unwrap());
		let config = finalize(merged).unwrap();

		assert_eq!(config.name, "redis");
		assert_eq!(config.api_version, "2.14");
		assert_eq!(config.request_timeout, Duration::from_secs(60));
		match config.auth {
			BrokerAuth::Basic { username, password } => {
				assert_eq!(username, "admin");
				assert_eq!(password.expose(), "pw");
			}
			other => panic!("expected basic auth, got {other:?}"),
		}
	}

	#[test]
	fn debug_output_hides_credentials() {
		let mut layer = layer_with_url("http://localhost");
		layer.auth = Some(AuthConfigLayer {
			token: Some(Secret::new("very-secret-token".to_string())),
			..Default::default()
		});
		let config = finalize(layer).unwrap();
		assert!(!format!("{config:?}").contains("very-secret-token"));
	}

	proptest! {
		#[test]
		fn numeric_versions_are_accepted(major in 0u32..10, minor in 0u32..100) {
			let version = format!("{}.{}", major, minor);
			prop_assert!(validate_api_version(&version).is_ok());
		}

		#[test]
		fn versions_without_dot_are_rejected(version in "[0-9]{1,4}") {
			prop_assert!(validate_api_version(&version).is_err());
		}
	}
}
