// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the broker transport.

use thiserror::Error;

/// Errors raised while moving bytes to and from a broker.
#[derive(Debug, Error)]
pub enum TransportError {
	/// The transport deadline elapsed.
	#[error("request timed out")]
	Timeout,

	/// The connection to the broker could not be established.
	#[error("connection failed: {0}")]
	Connect(#[source] reqwest::Error),

	/// Any other reqwest failure while sending or reading.
	#[error("HTTP request failed: {0}")]
	Request(#[source] reqwest::Error),

	/// The underlying HTTP client could not be constructed.
	#[error("failed to build HTTP client: {0}")]
	Build(#[source] reqwest::Error),

	/// A header could not be encoded.
	#[error("invalid value for header {header}")]
	InvalidHeader { header: &'static str },

	/// Failure reported by a non-reqwest transport.
	#[error("transport failure: {0}")]
	Other(String),
}

impl TransportError {
	/// Maps a reqwest error onto the transport taxonomy.
	pub fn from_reqwest(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			TransportError::Timeout
		} else if err.is_connect() {
			TransportError::Connect(err)
		} else {
			TransportError::Request(err)
		}
	}

	/// Whether repeating the same request might succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(self, TransportError::Timeout | TransportError::Connect(_))
	}
}

/// Errors decoding an originating identity header.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
	#[error("originating identity header must be '<platform> <base64 value>'")]
	Malformed,

	#[error("originating identity value is not valid base64")]
	InvalidBase64,

	#[error("originating identity value is not valid UTF-8")]
	InvalidUtf8,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn timeout_is_retryable() {
		assert!(TransportError::Timeout.is_retryable());
	}

	#[test]
	fn other_is_not_retryable() {
		assert!(!TransportError::Other("boom".to_string()).is_retryable());
		assert!(!TransportError::InvalidHeader {
			header: "X-Broker-API-Version"
		}
		.is_retryable());
	}
}
