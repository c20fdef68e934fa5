// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire adapter helpers: broker URLs, query parameters and body decoding.

use osb_common_http::{DrainedResponse, Url, WireRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{OsbError, Result};
use crate::types::OperationKey;
use crate::version::ApiVersion;

pub const SERVICE_ID: &str = "service_id";
pub const PLAN_ID: &str = "plan_id";
pub const ACCEPTS_INCOMPLETE: &str = "accepts_incomplete";
pub const FORCE: &str = "force";
pub const OPERATION: &str = "operation";

/// Everything an operation needs to know about the client to build a request.
#[derive(Debug, Clone, Copy)]
pub struct WireContext<'a> {
	pub base_url: &'a Url,
	pub api_version: ApiVersion,
}

impl WireContext<'_> {
	/// Appends `segments` to the base URL path, percent-encoding each one.
	pub fn url(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.base_url.clone();
		url.path_segments_mut()
			.map_err(|_| OsbError::InvalidUrl(self.base_url.to_string()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	pub fn catalog_url(&self) -> Result<Url> {
		self.url(&["v2", "catalog"])
	}

	pub fn instance_url(&self, instance_id: &str) -> Result<Url> {
		self.url(&["v2", "service_instances", instance_id])
	}

	pub fn instance_last_operation_url(&self, instance_id: &str) -> Result<Url> {
		self.url(&["v2", "service_instances", instance_id, "last_operation"])
	}

	pub fn binding_url(&self, instance_id: &str, binding_id: &str) -> Result<Url> {
		self.url(&[
			"v2",
			"service_instances",
			instance_id,
			"service_bindings",
			binding_id,
		])
	}

	pub fn binding_last_operation_url(&self, instance_id: &str, binding_id: &str) -> Result<Url> {
		self.url(&[
			"v2",
			"service_instances",
			instance_id,
			"service_bindings",
			binding_id,
			"last_operation",
		])
	}

	/// Whether request bodies may carry a `context` object.
	pub fn sends_context(&self) -> bool {
		self.api_version.at_least(ApiVersion::V2_12)
	}

	/// Whether the originating identity header may be sent.
	pub fn sends_originating_identity(&self) -> bool {
		self.api_version.at_least(ApiVersion::V2_13)
	}
}

/// Adds `accepts_incomplete=true` when the caller tolerates async completion.
pub fn with_accepts_incomplete(request: WireRequest, accepts_incomplete: bool) -> WireRequest {
	if accepts_incomplete {
		request.query_param(ACCEPTS_INCOMPLETE, "true")
	} else {
		request
	}
}

pub fn encode_body<T: Serialize>(body: &T) -> Result<serde_json::Value> {
	serde_json::to_value(body).map_err(OsbError::RequestEncode)
}

/// Decodes a body that must be present.
pub fn decode_required<T: DeserializeOwned>(response: &DrainedResponse) -> Result<T> {
	serde_json::from_slice(&response.body).map_err(|e| OsbError::decode(response.status, e))
}

/// Decodes a body whose absence means "all fields unset". A JSON `null`
/// counts as absent.
pub fn decode_optional<T: DeserializeOwned + Default>(response: &DrainedResponse) -> Result<T> {
	if response.is_body_empty() || is_json_null(&response.body) {
		return Ok(T::default());
	}
	decode_required(response)
}

fn is_json_null(body: &[u8]) -> bool {
	matches!(std::str::from_utf8(body).map(str::trim), Ok("null"))
}

/// Body of a 202 Accepted response.
#[derive(Debug, Default, Deserialize)]
pub struct AsyncSuccessResponseBody {
	pub operation: Option<String>,
	pub dashboard_url: Option<String>,
}

impl AsyncSuccessResponseBody {
	pub fn operation_key(&self) -> Option<OperationKey> {
		self.operation.as_deref().map(OperationKey::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::Bytes;
	use osb_common_http::StatusCode;

	fn ctx(base: &Url) -> WireContext<'_> {
		WireContext {
			base_url: base,
			api_version: ApiVersion::V2_13,
		}
	}

	fn drained(status: StatusCode, body: &'static str) -> DrainedResponse {
		DrainedResponse {
			status,
			body: Bytes::from_static(body.as_bytes()),
		}
	}

	#[test]
	fn instance_url_appends_to_base_path() {
		let base = Url::parse("https://broker.example.com/osb/").unwrap();
		assert_eq!(
			ctx(&base).instance_url("inst-1").unwrap().as_str(),
			"https://broker.example.com/osb/v2/service_instances/inst-1"
		);

		let base = Url::parse("https://broker.example.com").unwrap();
		assert_eq!(
			ctx(&base).binding_last_operation_url("i", "b").unwrap().as_str(),
			"https://broker.example.com/v2/service_instances/i/service_bindings/b/last_operation"
		);
	}

	#[test]
	fn identifiers_are_percent_encoded() {
		let base = Url::parse("https://broker.example.com").unwrap();
		let url = ctx(&base).instance_url("a/b c").unwrap();
		assert_eq!(url.path(), "/v2/service_instances/a%2Fb%20c");
	}

	#[test]
	fn cannot_be_a_base_url_is_rejected() {
		let base = Url::parse("mailto:broker@example.com").unwrap();
		assert!(matches!(ctx(&base).catalog_url(), Err(OsbError::InvalidUrl(_))));
	}

	#[test]
	fn async_body_with_operation() {
		let body: AsyncSuccessResponseBody =
			decode_optional(&drained(StatusCode::ACCEPTED, r#"{"operation":"op-123"}"#)).unwrap();
		assert_eq!(body.operation_key(), Some(OperationKey::new("op-123")));
	}

	#[test]
	fn async_body_empty() {
		let body: AsyncSuccessResponseBody =
			decode_optional(&drained(StatusCode::ACCEPTED, "")).unwrap();
		assert_eq!(body.operation_key(), None);
	}

	#[test]
	fn async_body_null_is_absent() {
		let body: AsyncSuccessResponseBody =
			decode_optional(&drained(StatusCode::ACCEPTED, " null\n")).unwrap();
		assert_eq!(body.operation_key(), None);
		assert_eq!(body.dashboard_url, None);
	}

	#[test]
	fn async_body_malformed() {
		let err = decode_optional::<AsyncSuccessResponseBody>(&drained(StatusCode::ACCEPTED, "{"))
			.unwrap_err();
		assert!(matches!(err, OsbError::ResponseDecode { status: 202, .. }));
	}

	#[test]
	fn version_gates() {
		let base = Url::parse("https://broker.example.com").unwrap();
		let old = WireContext {
			base_url: &base,
			api_version: ApiVersion::V2_11,
		};
		assert!(!old.sends_context());
		assert!(!old.sends_originating_identity());
		assert!(ctx(&base).sends_context());
		assert!(ctx(&base).sends_originating_identity());
	}
}
