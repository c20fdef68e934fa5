// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by a single source.
//!
//! Every field is optional. Layers are merged in precedence order, a later
//! layer overriding only the fields it actually sets.

use serde::{Deserialize, Serialize};

use crate::secret::SecretString;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrokerConfigLayer {
	pub name: Option<String>,
	pub url: Option<String>,
	pub api_version: Option<String>,
	pub request_timeout_secs: Option<u64>,
	pub insecure_skip_verify: Option<bool>,
	#[serde(default)]
	pub auth: Option<AuthConfigLayer>,
}

impl BrokerConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.name.is_some() {
			self.name = other.name;
		}
		if other.url.is_some() {
			self.url = other.url;
		}
		if other.api_version.is_some() {
			self.api_version = other.api_version;
		}
		if other.request_timeout_secs.is_some() {
			self.request_timeout_secs = other.request_timeout_secs;
		}
		if other.insecure_skip_verify.is_some() {
			self.insecure_skip_verify = other.insecure_skip_verify;
		}
		if let Some(other_auth) = other.auth {
			let auth = self.auth.get_or_insert_with(Default::default);
			auth.merge(other_auth);
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfigLayer {
	pub username: Option<String>,
	pub password: Option<SecretString>,
	pub token: Option<SecretString>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		if other.token.is_some() {
			self.token = other.token;
		}
	}

	pub fn is_empty(&self) -> bool {
		self.username.is_none() && self.password.is_none() && self.token.is_none()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::secret::Secret;

	#[test]
	fn merge_overrides_only_set_fields() {
		let mut base = BrokerConfigLayer {
			name: Some("mysql".to_string()),
			url: Some("http://localhost:8080".to_string()),
			request_timeout_secs: Some(60),
			..Default::default()
		};
		base.merge(BrokerConfigLayer {
			url: Some("https://broker.example.com".to_string()),
			..Default::default()
		});

		assert_eq!(base.name.as_deref(), Some("mysql"));
		assert_eq!(base.url.as_deref(), Some("https://broker.example.com"));
		assert_eq!(base.request_timeout_secs, Some(60));
	}

	#[test]
	fn merge_combines_auth_fields() {
		let mut base = BrokerConfigLayer {
			auth: Some(AuthConfigLayer {
				username: Some("admin".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(BrokerConfigLayer {
			auth: Some(AuthConfigLayer {
				password: Some(Secret::new("pw".to_string())),
				..Default::default()
			}),
			..Default::default()
		});

		let auth = base.auth.unwrap();
		assert_eq!(auth.username.as_deref(), Some("admin"));
		assert_eq!(auth.password.unwrap().expose(), "pw");
	}

	#[test]
	fn parses_from_toml() {
		let layer: BrokerConfigLayer = toml::from_str(
			r#"
			name = "postgres"
			url = "https://broker.example.com"
			api_version = "2.14"
			request_timeout_secs = 15

			[auth]
			token = "abc"
			"#,
		)
		.unwrap();

		assert_eq!(layer.api_version.as_deref(), Some("2.14"));
		assert_eq!(layer.request_timeout_secs, Some(15));
		assert_eq!(layer.auth.unwrap().token.unwrap().expose(), "abc");
	}
}
