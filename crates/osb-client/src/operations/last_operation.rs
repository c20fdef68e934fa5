// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Last-operation polling for instances and bindings.
//!
//! Polling is stateless: the caller passes back the [`OperationKey`] from a
//! 202 response and repeats the call on its own schedule.

use osb_common_http::{DrainedResponse, Method, OriginatingIdentity, Url, WireRequest};
use serde::Deserialize;

use crate::classify::{OperationKind, Outcome};
use crate::error::{OsbError, Result};
use crate::operations::LifecycleOperation;
use crate::types::{LastOperationState, OperationKey};
use crate::validate::{require, require_version, Validate};
use crate::version::ApiVersion;
use crate::wire::{self, WireContext};

#[derive(Debug, Clone, Default)]
pub struct LastOperationRequest {
	pub instance_id: String,
	pub service_id: Option<String>,
	pub plan_id: Option<String>,
	/// Key from the 202 response that started the operation.
	pub operation_key: Option<OperationKey>,
	pub originating_identity: Option<OriginatingIdentity>,
}

#[derive(Debug, Clone, Default)]
pub struct BindingLastOperationRequest {
	pub instance_id: String,
	pub binding_id: String,
	pub service_id: Option<String>,
	pub plan_id: Option<String>,
	pub operation_key: Option<OperationKey>,
	pub originating_identity: Option<OriginatingIdentity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LastOperationResponse {
	pub state: LastOperationState,
	#[serde(default)]
	pub description: Option<String>,
}

fn poll_request(
	ctx: &WireContext<'_>,
	url: Url,
	service_id: Option<&str>,
	plan_id: Option<&str>,
	operation_key: Option<&OperationKey>,
	originating_identity: Option<&OriginatingIdentity>,
) -> WireRequest {
	let mut request = WireRequest::new(Method::GET, url);
	if let Some(service_id) = service_id {
		request = request.query_param(wire::SERVICE_ID, service_id);
	}
	if let Some(plan_id) = plan_id {
		request = request.query_param(wire::PLAN_ID, plan_id);
	}
	if let Some(key) = operation_key {
		request = request.query_param(wire::OPERATION, key.as_str());
	}
	if ctx.sends_originating_identity() {
		request = request.originating_identity(originating_identity.cloned());
	}
	request
}

fn decode_state(outcome: Outcome, response: &DrainedResponse) -> Result<LastOperationResponse> {
	match outcome {
		Outcome::Success => wire::decode_required(response),
		_ => Err(OsbError::unexpected(response)),
	}
}

impl Validate for LastOperationRequest {
	fn validate(&self) -> Result<()> {
		require("instanceID", &self.instance_id)
	}
}

impl LifecycleOperation for LastOperationRequest {
	type Response = LastOperationResponse;

	const KIND: OperationKind = OperationKind::LastOperation;

	fn to_wire(&self, ctx: &WireContext<'_>) -> Result<WireRequest> {
		Ok(poll_request(
			ctx,
			ctx.instance_last_operation_url(&self.instance_id)?,
			self.service_id.as_deref(),
			self.plan_id.as_deref(),
			self.operation_key.as_ref(),
			self.originating_identity.as_ref(),
		))
	}

	fn into_response(outcome: Outcome, response: &DrainedResponse) -> Result<Self::Response> {
		decode_state(outcome, response)
	}
}

impl Validate for BindingLastOperationRequest {
	fn validate(&self) -> Result<()> {
		require("bindingID", &self.binding_id)?;
		require("instanceID", &self.instance_id)
	}
}

impl LifecycleOperation for BindingLastOperationRequest {
	type Response = LastOperationResponse;

	const KIND: OperationKind = OperationKind::BindingLastOperation;

	fn check_version(&self, version: ApiVersion) -> Result<()> {
		require_version("binding last operation", ApiVersion::V2_14, version)
	}

	fn to_wire(&self, ctx: &WireContext<'_>) -> Result<WireRequest> {
		Ok(poll_request(
			ctx,
			ctx.binding_last_operation_url(&self.instance_id, &self.binding_id)?,
			self.service_id.as_deref(),
			self.plan_id.as_deref(),
			self.operation_key.as_ref(),
			self.originating_identity.as_ref(),
		))
	}

	fn into_response(outcome: Outcome, response: &DrainedResponse) -> Result<Self::Response> {
		decode_state(outcome, response)
	}
}
