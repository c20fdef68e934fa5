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

/// Request to create a service instance.
#[derive(Debug, Clone, Default)]
pub struct ProvisionRequest {
	pub instance_id: String,
	pub accepts_incomplete: bool,
	pub service_id: String,
	pub plan_id: String,
	pub organization_guid: String,
	pub space_guid: String,
	pub parameters: Option<JsonObject>,
	/// Platform specific context, sent from API 2.12.
	pub context: Option<JsonObject>,
	pub originating_identity: Option<OriginatingIdentity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionResponse {
	pub is_async: bool,
	pub dashboard_url: Option<String>,
	pub operation_key: Option<OperationKey>,
}

#[derive(Debug, Serialize)]
struct ProvisionRequestBody<'a> {
	service_id: &'a str,
	plan_id: &'a str,
	organization_guid: &'a str,
	space_guid: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	parameters: Option<&'a JsonObject>,
	#[serde(skip_serializing_if = "Option::is_none")]
	context: Option<&'a JsonObject>,
}

#[derive(Debug, Default, Deserialize)]
struct ProvisionSuccessResponseBody {
	dashboard_url: Option<String>,
}

impl Validate for ProvisionRequest {
	fn validate(&self) -> Result<()> {
		require("instanceID", &self.instance_id)?;
		require("serviceID", &self.service_id)?;
		require("planID", &self.plan_id)?;
		require("organizationGUID", &self.organization_guid)?;
		require("spaceGUID", &self.space_guid)
	}
}

impl LifecycleOperation for ProvisionRequest {
	type Response = ProvisionResponse;

	const KIND: OperationKind = OperationKind::Provision;

	fn accepts_incomplete(&self) -> bool {
		self.accepts_incomplete
	}

	fn to_wire(&self, ctx: &WireContext<'_>) -> Result<WireRequest> {
		let body = ProvisionRequestBody {
			service_id: &self.service_id,
			plan_id: &self.plan_id,
			organization_guid: &self.organization_guid,
			space_guid: &self.space_guid,
			parameters: self.parameters.as_ref(),
			context: self.context.as_ref().filter(|_| ctx.sends_context()),
		};

		let mut request = WireRequest::new(Method::PUT, ctx.instance_url(&self.instance_id)?)
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
				let body: ProvisionSuccessResponseBody = wire::decode_optional(response)?;
				Ok(ProvisionResponse {
					dashboard_url: body.dashboard_url,
					..Default::default()
				})
			}
			Outcome::AsyncAccepted => {
				let body: AsyncSuccessResponseBody = wire::decode_optional(response)?;
				Ok(ProvisionResponse {
					is_async: true,
					operation_key: body.operation_key(),
					dashboard_url: body.dashboard_url,
				})
			}
			_ => Err(OsbError::unexpected(response)),
		}
	}
}
