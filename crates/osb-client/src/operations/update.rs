// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use osb_common_http::{DrainedResponse, Method, OriginatingIdentity, WireRequest};
use serde::{Deserialize, Serialize};

use crate::classify::{OperationKind, Outcome};
use crate::error::{OsbError, Result};
use crate::operations::LifecycleOperation;
use crate::types::{JsonObject, OperationKey};
use crate::validate::{require, Validate};
use crate::wire::{self, AsyncSuccessResponseBody, WireContext};

/// Request to change the plan or parameters of a service instance.
#[derive(Debug, Clone, Default)]
pub struct UpdateInstanceRequest {
	pub instance_id: String,
	pub accepts_incomplete: bool,
	pub service_id: String,
	/// New plan, if the plan is changing.
	pub plan_id: Option<String>,
	pub parameters: Option<JsonObject>,
	pub previous_values: Option<PreviousValues>,
	pub context: Option<JsonObject>,
	pub originating_identity: Option<OriginatingIdentity>,
}

/// Values the instance had before this update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousValues {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub plan_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub service_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub organization_id: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub space_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateInstanceResponse {
	pub is_async: bool,
	pub dashboard_url: Option<String>,
	pub operation_key: Option<OperationKey>,
}

#[derive(Debug, Serialize)]
struct UpdateInstanceRequestBody<'a> {
	service_id: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	plan_id: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	parameters: Option<&'a JsonObject>,
	#[serde(skip_serializing_if = "Option::is_none")]
	previous_values: Option<&'a PreviousValues>,
	#[serde(skip_serializing_if = "Option::is_none")]
	context: Option<&'a JsonObject>,
}

#[derive(Debug, Default, Deserialize)]
struct UpdateInstanceSuccessResponseBody {
	dashboard_url: Option<String>,
}

impl Validate for UpdateInstanceRequest {
	fn validate(&self) -> Result<()> {
		require("instanceID", &self.instance_id)?;
		require("serviceID", &self.service_id)
	}
}

impl LifecycleOperation for UpdateInstanceRequest {
	type Response = UpdateInstanceResponse;

	const KIND: OperationKind = OperationKind::Update;

	fn accepts_incomplete(&self) -> bool {
		self.accepts_incomplete
	}

	fn to_wire(&self, ctx: &WireContext<'_>) -> Result<WireRequest> {
		let body = UpdateInstanceRequestBody {
			service_id: &self.service_id,
			plan_id: self.plan_id.as_deref(),
			parameters: self.parameters.as_ref(),
			previous_values: self.previous_values.as_ref(),
			context: self.context.as_ref().filter(|_| ctx.sends_context()),
		};

		let mut request = WireRequest::new(Method::PATCH, ctx.instance_url(&self.instance_id)?)
			.json_body(wire::encode_body(&body)?);
		request = wire::with_accepts_incomplete(request, self.accepts_incomplete);
		if ctx.sends_originating_identity() {
			request = request.originating_identity(self.originating_identity.clone());
		}
		Ok(request)
	}

	fn into_response(outcome: Outcome, response: &DrainedResponse) -> Result<Self::Response> {
		match outcome {
			Outcome::Success => {
				let body: UpdateInstanceSuccessResponseBody = wire::decode_optional(response)?;
				Ok(UpdateInstanceResponse {
					dashboard_url: body.dashboard_url,
					..Default::default()
				})
			}
			Outcome::AsyncAccepted => {
				let body: AsyncSuccessResponseBody = wire::decode_optional(response)?;
				Ok(UpdateInstanceResponse {
					is_async: true,
					operation_key: body.operation_key(),
					dashboard_url: body.dashboard_url,
				})
			}
			_ => Err(OsbError::unexpected(response)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::version::ApiVersion;
	use osb_common_http::Url;
	use serde_json::json;

	#[test]
	fn plan_is_optional() {
		let req = UpdateInstanceRequest {
			instance_id: "inst-1".to_string(),
			service_id: "svc-1".to_string(),
			..Default::default()
		};
		assert!(req.validate().is_ok());

		let base = Url::parse("https://broker.example.com").unwrap();
		let ctx = WireContext {
			base_url: &base,
			api_version: ApiVersion::V2_13,
		};
		let wire = req.to_wire(&ctx).unwrap();
		assert_eq!(wire.method, Method::PATCH);
		assert_eq!(wire.body.unwrap(), json!({"service_id": "svc-1"}));
	}

	#[test]
	fn previous_values_are_sent() {
		let req = UpdateInstanceRequest {
			instance_id: "inst-1".to_string(),
			service_id: "svc-1".to_string(),
			plan_id: Some("plan-2".to_string()),
			previous_values: Some(PreviousValues {
				plan_id: Some("plan-1".to_string()),
				..Default::default()
			}),
			..Default::default()
		};

		let base = Url::parse("https://broker.example.com").unwrap();
		let ctx = WireContext {
			base_url: &base,
			api_version: ApiVersion::V2_13,
		};
		assert_eq!(
			req.to_wire(&ctx).unwrap().body.unwrap(),
			json!({
				"service_id": "svc-1",
				"plan_id": "plan-2",
				"previous_values": {"plan_id": "plan-1"},
			})
		);
	}

	#[test]
	fn service_is_required() {
		let req = UpdateInstanceRequest {
			instance_id: "inst-1".to_string(),
			..Default::default()
		};
		assert!(matches!(
			req.validate(),
			Err(OsbError::RequiredFieldMissing { field: "serviceID" })
		));
	}
}
