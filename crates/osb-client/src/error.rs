// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for broker lifecycle operations.

use osb_common_http::{DrainedResponse, StatusCode, TransportError};
use serde::Deserialize;
use thiserror::Error;

use crate::version::ApiVersion;

/// Structured error body returned by a broker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BrokerErrorBody {
	/// Machine readable error code, e.g. `AsyncRequired`.
	pub error: Option<String>,
	pub description: Option<String>,
	pub instance_usable: Option<bool>,
	pub update_repeatable: Option<bool>,
}

impl BrokerErrorBody {
	/// Parses an error body, returning `None` when it is absent or malformed.
	pub(crate) fn parse(response: &DrainedResponse) -> Option<Self> {
		if response.is_body_empty() {
			return None;
		}
		serde_json::from_slice(&response.body).ok()
	}
}

/// Errors returned by [`BrokerClient`](crate::BrokerClient) operations.
#[derive(Debug, Error)]
pub enum OsbError {
	/// A required identifier was empty; nothing was sent.
	#[error("required field missing: {field}")]
	RequiredFieldMissing { field: &'static str },

	/// The status was legal HTTP but not acceptable for this call.
	#[error("unexpected status code {status}")]
	UnexpectedStatusCode {
		status: u16,
		broker_error: Option<BrokerErrorBody>,
	},

	/// The broker described the failure in a structured error body.
	#[error(
		"broker reported failure ({status}): {}: {}",
		error.as_deref().unwrap_or("<none>"),
		description.as_deref().unwrap_or("<none>")
	)]
	BrokerReportedFailure {
		status: u16,
		error: Option<String>,
		description: Option<String>,
		instance_usable: Option<bool>,
		update_repeatable: Option<bool>,
	},

	/// Failure status without a usable error body.
	#[error("broker returned HTTP {status}")]
	HttpStatus { status: u16 },

	/// A success body could not be decoded into the expected shape.
	#[error("failed to decode broker response ({status}): {source}")]
	ResponseDecode {
		status: u16,
		#[source]
		source: serde_json::Error,
	},

	/// The request body could not be encoded.
	#[error("failed to encode request body: {0}")]
	RequestEncode(#[source] serde_json::Error),

	/// The configured API version does not support the requested feature.
	#[error("{feature} requires API version {required}, client is configured for {configured}")]
	UnsupportedApiVersion {
		feature: &'static str,
		required: ApiVersion,
		configured: ApiVersion,
	},

	/// A request URL could not be formed from the broker base URL.
	#[error("invalid broker URL: {0}")]
	InvalidUrl(String),

	/// The client could not be constructed from its configuration.
	#[error("configuration error: {0}")]
	Config(String),

	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Result type alias for broker operations.
pub type Result<T> = std::result::Result<T, OsbError>;

impl OsbError {
	/// Failure derived from a non-success response.
	pub(crate) fn from_failure(response: &DrainedResponse) -> Self {
		let status = response.status.as_u16();
		match BrokerErrorBody::parse(response) {
			Some(body) => OsbError::BrokerReportedFailure {
				status,
				error: body.error,
				description: body.description,
				instance_usable: body.instance_usable,
				update_repeatable: body.update_repeatable,
			},
			None => OsbError::HttpStatus { status },
		}
	}

	/// Failure for a status the operation's table rejects outright.
	pub(crate) fn unexpected(response: &DrainedResponse) -> Self {
		OsbError::UnexpectedStatusCode {
			status: response.status.as_u16(),
			broker_error: BrokerErrorBody::parse(response),
		}
	}

	pub(crate) fn decode(status: StatusCode, source: serde_json::Error) -> Self {
		OsbError::ResponseDecode {
			status: status.as_u16(),
			source,
		}
	}

	/// HTTP status of the broker response behind this error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			OsbError::UnexpectedStatusCode { status, .. }
			| OsbError::BrokerReportedFailure { status, .. }
			| OsbError::HttpStatus { status }
			| OsbError::ResponseDecode { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Broker error code, if the broker sent one.
	pub fn broker_error_code(&self) -> Option<&str> {
		match self {
			OsbError::BrokerReportedFailure { error, .. } => error.as_deref(),
			OsbError::UnexpectedStatusCode {
				broker_error: Some(body),
				..
			} => body.error.as_deref(),
			_ => None,
		}
	}

	pub fn is_gone(&self) -> bool {
		self.status() == Some(StatusCode::GONE.as_u16())
	}

	pub fn is_conflict(&self) -> bool {
		self.status() == Some(StatusCode::CONFLICT.as_u16())
	}

	/// The broker only supports this operation asynchronously.
	pub fn is_async_required(&self) -> bool {
		self.is_unprocessable_with("AsyncRequired")
	}

	/// Another operation is in progress on the same resource.
	pub fn is_concurrency_error(&self) -> bool {
		self.is_unprocessable_with("ConcurrencyError")
	}

	/// The broker requires an application GUID to bind.
	pub fn is_app_guid_required(&self) -> bool {
		self.is_unprocessable_with("RequiresApp")
	}

	/// Whether repeating the same call might succeed. The client never retries
	/// on its own.
	pub fn is_retryable(&self) -> bool {
		match self {
			OsbError::Transport(e) => e.is_retryable(),
			OsbError::BrokerReportedFailure { status, .. } | OsbError::HttpStatus { status } => {
				*status >= 500 || self.is_concurrency_error()
			}
			_ => false,
		}
	}

	fn is_unprocessable_with(&self, code: &str) -> bool {
		self.status() == Some(StatusCode::UNPROCESSABLE_ENTITY.as_u16())
			&& self.broker_error_code() == Some(code)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::Bytes;

	fn response(status: u16, body: &'static str) -> DrainedResponse {
		DrainedResponse {
			status: StatusCode::from_u16(status).unwrap(),
			body: Bytes::from_static(body.as_bytes()),
		}
	}

	#[test]
	fn structured_body_is_surfaced_verbatim() {
		let err = OsbError::from_failure(&response(
			400,
			r#"{"error":"BadRequest","description":"plan is not valid","instance_usable":true}"#,
		));
		match err {
			OsbError::BrokerReportedFailure {
				status,
				error,
				description,
				instance_usable,
				update_repeatable,
			} => {
				assert_eq!(status, 400);
				assert_eq!(error.as_deref(), Some("BadRequest"));
				assert_eq!(description.as_deref(), Some("plan is not valid"));
				assert_eq!(instance_usable, Some(true));
				assert_eq!(update_repeatable, None);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn empty_body_yields_generic_failure() {
		let err = OsbError::from_failure(&response(503, ""));
		assert!(matches!(err, OsbError::HttpStatus { status: 503 }));
		assert!(err.is_retryable());
	}

	#[test]
	fn unparseable_body_yields_generic_failure() {
		let err = OsbError::from_failure(&response(500, "<html>oops</html>"));
		assert!(matches!(err, OsbError::HttpStatus { status: 500 }));
	}

	#[test]
	fn unexpected_keeps_broker_body() {
		let err = OsbError::unexpected(&response(410, r#"{"description":"gone"}"#));
		assert!(err.is_gone());
		match err {
			OsbError::UnexpectedStatusCode { broker_error, .. } => {
				assert_eq!(broker_error.unwrap().description.as_deref(), Some("gone"));
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn unprocessable_entity_codes() {
		let async_required = OsbError::from_failure(&response(422, r#"{"error":"AsyncRequired"}"#));
		assert!(async_required.is_async_required());
		assert!(!async_required.is_concurrency_error());
		assert!(!async_required.is_retryable());

		let concurrency = OsbError::from_failure(&response(422, r#"{"error":"ConcurrencyError"}"#));
		assert!(concurrency.is_concurrency_error());
		assert!(concurrency.is_retryable());

		let requires_app = OsbError::from_failure(&response(422, r#"{"error":"RequiresApp"}"#));
		assert!(requires_app.is_app_guid_required());
	}

	#[test]
	fn conflict_is_detected() {
		assert!(OsbError::from_failure(&response(409, "{}")).is_conflict());
	}

	#[test]
	fn validation_errors_have_no_status() {
		let err = OsbError::RequiredFieldMissing { field: "instanceID" };
		assert_eq!(err.status(), None);
		assert!(!err.is_retryable());
		assert_eq!(err.to_string(), "required field missing: instanceID");
	}
}
