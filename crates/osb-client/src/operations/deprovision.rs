// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use osb_common_http::{DrainedResponse, Method, OriginatingIdentity, WireRequest};

use crate::classify::{OperationKind, Outcome};
use crate::error::{OsbError, Result};
use crate::operations::LifecycleOperation;
use crate::types::OperationKey;
use crate::validate::{require, Validate};
use crate::wire::{self, AsyncSuccessResponseBody, WireContext};

/// Request to delete a service instance.
#[derive(Debug, Clone, Default)]
pub struct DeprovisionRequest {
	pub instance_id: String,
	/// The caller can poll for completion if the broker answers 202.
	pub accepts_incomplete: bool,
	/// Ask the broker to skip its own safety checks.
	pub force: bool,
	pub service_id: String,
	pub plan_id: String,
	pub originating_identity: Option<OriginatingIdentity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeprovisionResponse {
	pub is_async: bool,
	pub operation_key: Option<OperationKey>,
}

impl Validate for DeprovisionRequest {
	fn validate(&self) -> Result<()> {
		require("instanceID", &self.instance_id)?;
		require("serviceID", &self.service_id)?;
		require("planID", &self.plan_id)
	}
}

impl LifecycleOperation for DeprovisionRequest {
	type Response = DeprovisionResponse;

	const KIND: OperationKind = OperationKind::Deprovision;

	fn accepts_incomplete(&self) -> bool {
		self.accepts_incomplete
	}

	fn to_wire(&self, ctx: &WireContext<'_>) -> Result<WireRequest> {
		let mut request = WireRequest::new(Method::DELETE, ctx.instance_url(&self.instance_id)?)
			.query_param(wire::SERVICE_ID, self.service_id.as_str())
			.query_param(wire::PLAN_ID, self.plan_id.as_str());
		request = wire::with_accepts_incomplete(request, self.accepts_incomplete);
		if self.force {
			request = request.query_param(wire::FORCE, "true");
		}
		if ctx.sends_originating_identity() {
			request = request.originating_identity(self.originating_identity.clone());
		}
		Ok(request)
	}

	fn into_response(outcome: Outcome, response: &DrainedResponse) -> Result<Self::Response> {
		match outcome {
			Outcome::Success => Ok(DeprovisionResponse::default()),
			Outcome::AsyncAccepted => {
				let body: AsyncSuccessResponseBody = wire::decode_optional(response)?;
				Ok(DeprovisionResponse {
					is_async: true,
					operation_key: body.operation_key(),
				})
			}
			_ => Err(OsbError::unexpected(response)),
		}
	}
}
