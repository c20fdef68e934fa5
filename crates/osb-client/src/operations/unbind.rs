// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use osb_common_http::{DrainedResponse, Method, OriginatingIdentity, WireRequest};

use crate::classify::{OperationKind, Outcome};
use crate::error::{OsbError, Result};
use crate::operations::LifecycleOperation;
use crate::types::OperationKey;
use crate::validate::{require, require_version, Validate};
use crate::version::ApiVersion;
use crate::wire::{self, AsyncSuccessResponseBody, WireContext};

/// Request to delete a binding.
#[derive(Debug, Clone, Default)]
pub struct UnbindRequest {
	pub binding_id: String,
	pub instance_id: String,
	/// Async unbind needs API 2.14.
	pub accepts_incomplete: bool,
	pub service_id: String,
	pub plan_id: String,
	pub originating_identity: Option<OriginatingIdentity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnbindResponse {
	pub is_async: bool,
	pub operation_key: Option<OperationKey>,
}

impl Validate for UnbindRequest {
	fn validate(&self) -> Result<()> {
		require("bindingID", &self.binding_id)?;
		require("instanceID", &self.instance_id)?;
		require("serviceID", &self.service_id)?;
		require("planID", &self.plan_id)
	}
}

impl LifecycleOperation for UnbindRequest {
	type Response = UnbindResponse;

	const KIND: OperationKind = OperationKind::Unbind;

	fn check_version(&self, version: ApiVersion) -> Result<()> {
		if self.accepts_incomplete {
			require_version("asynchronous unbind", ApiVersion::V2_14, version)?;
		}
		Ok(())
	}

	fn accepts_incomplete(&self) -> bool {
		self.accepts_incomplete
	}

	fn to_wire(&self, ctx: &WireContext<'_>) -> Result<WireRequest> {
		let url = ctx.binding_url(&self.instance_id, &self.binding_id)?;
		let mut request = WireRequest::new(Method::DELETE, url)
			.query_param(wire::SERVICE_ID, self.service_id.as_str())
			.query_param(wire::PLAN_ID, self.plan_id.as_str());
		request = wire::with_accepts_incomplete(request, self.accepts_incomplete);
		if ctx.sends_originating_identity() {
			request = request.originating_identity(self.originating_identity.clone());
		}
		Ok(request)
	}

	fn into_response(outcome: Outcome, response: &DrainedResponse) -> Result<Self::Response> {
		match outcome {
			// 410: the binding is already gone, which is what the caller wanted.
			Outcome::Success | Outcome::AlreadyGone => Ok(UnbindResponse::default()),
			Outcome::AsyncAccepted => {
				let body: AsyncSuccessResponseBody = wire::decode_optional(response)?;
				Ok(UnbindResponse {
					is_async: true,
					operation_key: body.operation_key(),
				})
			}
			_ => Err(OsbError::unexpected(response)),
		}
	}
}
