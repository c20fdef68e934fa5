// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use osb_common_http::{DrainedResponse, Method, OriginatingIdentity, WireRequest};
use serde::{Deserialize, Serialize};

use crate::classify::{OperationKind, Outcome};
use crate::error::{OsbError, Result};
use crate::operations::LifecycleOperation;
use crate::types::{JsonObject, OperationKey};
use crate::validate::{require, require_version, Validate};
use crate::version::ApiVersion;
use crate::wire::{self, AsyncSuccessResponseBody, WireContext};

/// Request to create a binding to a service instance.
#[derive(Debug, Clone, Default)]
pub struct BindRequest {
	pub binding_id: String,
	pub instance_id: String,
	/// Async bindings need API 2.14.
	pub accepts_incomplete: bool,
	pub service_id: String,
	pub plan_id: String,
	/// Deprecated in favour of `bind_resource`, still sent when set.
	pub app_guid: Option<String>,
	pub bind_resource: Option<BindResource>,
	pub parameters: Option<JsonObject>,
	pub context: Option<JsonObject>,
	pub originating_identity: Option<OriginatingIdentity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindResource {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub app_guid: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub route: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindResponse {
	pub is_async: bool,
	pub credentials: Option<JsonObject>,
	pub syslog_drain_url: Option<String>,
	pub route_service_url: Option<String>,
	pub volume_mounts: Vec<VolumeMount>,
	pub operation_key: Option<OperationKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeMount {
	pub driver: String,
	pub container_dir: String,
	pub mode: String,
	pub device_type: String,
	pub device: VolumeDevice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeDevice {
	pub volume_id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mount_config: Option<JsonObject>,
}

#[derive(Debug, Serialize)]
struct BindRequestBody<'a> {
	service_id: &'a str,
	plan_id: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	app_guid: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	bind_resource: Option<&'a BindResource>,
	#[serde(skip_serializing_if = "Option::is_none")]
	parameters: Option<&'a JsonObject>,
	#[serde(skip_serializing_if = "Option::is_none")]
	context: Option<&'a JsonObject>,
}

#[derive(Debug, Default, Deserialize)]
struct BindSuccessResponseBody {
	credentials: Option<JsonObject>,
	syslog_drain_url: Option<String>,
	route_service_url: Option<String>,
	#[serde(default)]
	volume_mounts: Vec<VolumeMount>,
}

impl Validate for BindRequest {
	fn validate(&self) -> Result<()> {
		require("bindingID", &self.binding_id)?;
		require("instanceID", &self.instance_id)?;
		require("serviceID", &self.service_id)?;
		require("planID", &self.plan_id)
	}
}

impl LifecycleOperation for BindRequest {
	type Response = BindResponse;

	const KIND: OperationKind = OperationKind::Bind;

	fn check_version(&self, version: ApiVersion) -> Result<()> {
		if self.accepts_incomplete {
			require_version("asynchronous bind", ApiVersion::V2_14, version)?;
		}
		Ok(())
	}

	fn accepts_incomplete(&self) -> bool {
		self.accepts_incomplete
	}

	fn to_wire(&self, ctx: &WireContext<'_>) -> Result<WireRequest> {
		let body = BindRequestBody {
			service_id: &self.service_id,
			plan_id: &self.plan_id,
			app_guid: self.app_guid.as_deref(),
			bind_resource: self.bind_resource.as_ref(),
			parameters: self.parameters.as_ref(),
			context: self.context.as_ref().filter(|_| ctx.sends_context()),
		};

		let url = ctx.binding_url(&self.instance_id, &self.binding_id)?;
		let mut request = WireRequest::new(Method::PUT, url).json_body(wire::encode_body(&body)?);
		request = wire::with_accepts_incomplete(request, self.accepts_incomplete);
		if ctx.sends_originating_identity() {
			request = request.originating_identity(self.originating_identity.clone());
		}
		Ok(request)
	}

	fn into_response(outcome: Outcome, response: &DrainedResponse) -> Result<Self::Response> {
		match outcome {
			Outcome::Success => {
				let body: BindSuccessResponseBody = wire::decode_optional(response)?;
				Ok(BindResponse {
					credentials: body.credentials,
					syslog_drain_url: body.syslog_drain_url,
					route_service_url: body.route_service_url,
					volume_mounts: body.volume_mounts,
					..Default::default()
				})
			}
			Outcome::AsyncAccepted => {
				let body: AsyncSuccessResponseBody = wire::decode_optional(response)?;
				Ok(BindResponse {
					is_async: true,
					operation_key: body.operation_key(),
					..Default::default()
				})
			}
			_ => Err(OsbError::unexpected(response)),
		}
	}
}
