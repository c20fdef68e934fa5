// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment variables.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::{AuthConfigLayer, BrokerConfigLayer};
use crate::secret::Secret;

pub const DEFAULT_API_VERSION: &str = "2.13";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_BROKER_NAME: &str = "broker";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<BrokerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<BrokerConfigLayer, ConfigError> {
		Ok(BrokerConfigLayer {
			name: Some(DEFAULT_BROKER_NAME.to_string()),
			api_version: Some(DEFAULT_API_VERSION.to_string()),
			request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
			insecure_skip_verify: Some(false),
			..Default::default()
		})
	}
}

/// TOML file configuration source. A missing file yields an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `$XDG_CONFIG_HOME/osb-client/broker.toml`, when a config dir exists.
	pub fn user() -> Option<Self> {
		dirs::config_dir().map(|dir| Self::new(dir.join("osb-client").join("broker.toml")))
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<BrokerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(BrokerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: BrokerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: OSB_BROKER_<FIELD>
pub struct EnvSource;

impl EnvSource {
	/// Builds a layer from an arbitrary variable lookup.
	pub fn load_from<F>(lookup: F) -> Result<BrokerConfigLayer, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

		let request_timeout_secs = match var("OSB_BROKER_TIMEOUT_SECS") {
			Some(v) => Some(v.parse::<u64>().map_err(|_| {
				ConfigError::invalid_value("OSB_BROKER_TIMEOUT_SECS", format!("invalid u64 value '{v}'"))
			})?),
			None => None,
		};

		let auth = AuthConfigLayer {
			username: var("OSB_BROKER_USERNAME"),
			password: var("OSB_BROKER_PASSWORD").map(Secret::new),
			token: var("OSB_BROKER_TOKEN").map(Secret::new),
		};

		Ok(BrokerConfigLayer {
			name: var("OSB_BROKER_NAME"),
			url: var("OSB_BROKER_URL"),
			api_version: var("OSB_BROKER_API_VERSION"),
			request_timeout_secs,
			insecure_skip_verify: var("OSB_BROKER_INSECURE")
				.map(|v| v.eq_ignore_ascii_case("true") || v == "1"),
			auth: (!auth.is_empty()).then_some(auth),
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<BrokerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Self::load_from(|name| std::env::var(name).ok())
	}
}
