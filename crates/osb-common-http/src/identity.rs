// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Originating identity propagation.
//!
//! Platforms forward the identity of the end user that triggered a request so
//! that brokers can audit it. On the wire this is a single header whose value
//! is the platform name followed by the base64 encoded identity document.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::IdentityError;

pub const ORIGINATING_IDENTITY_HEADER: &str = "X-Broker-API-Originating-Identity";

/// Identity of the user on whose behalf the platform is calling the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginatingIdentity {
	/// Platform name, e.g. `kubernetes` or `cloudfoundry`.
	pub platform: String,
	/// Platform specific identity document, usually JSON.
	pub value: String,
}

impl OriginatingIdentity {
	pub fn new(platform: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			platform: platform.into(),
			value: value.into(),
		}
	}

	/// Encodes the identity as `<platform> <base64(value)>`.
	pub fn header_value(&self) -> String {
		format!("{} {}", self.platform, STANDARD.encode(self.value.as_bytes()))
	}

	/// Decodes a header produced by [`OriginatingIdentity::header_value`].
	pub fn parse_header(header: &str) -> Result<Self, IdentityError> {
		let (platform, encoded) = header
			.trim()
			.split_once(' ')
			.ok_or(IdentityError::Malformed)?;
		if platform.is_empty() || encoded.is_empty() {
			return Err(IdentityError::Malformed);
		}

		let decoded = STANDARD
			.decode(encoded.trim())
			.map_err(|_| IdentityError::InvalidBase64)?;
		let value = String::from_utf8(decoded).map_err(|_| IdentityError::InvalidUtf8)?;

		Ok(Self::new(platform, value))
	}
}
