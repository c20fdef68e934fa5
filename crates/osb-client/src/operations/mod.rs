// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One module per broker operation: request and response types, validation,
//! request construction and interpretation of a classified response.

mod bind;
mod catalog;
mod deprovision;
mod last_operation;
mod provision;
mod unbind;
mod update;

pub use bind::{BindRequest, BindResource, BindResponse, VolumeDevice, VolumeMount};
pub use catalog::{CatalogRequest, CatalogResponse, Plan, Service};
pub use deprovision::{DeprovisionRequest, DeprovisionResponse};
pub use last_operation::{BindingLastOperationRequest, LastOperationRequest, LastOperationResponse};
pub use provision::{ProvisionRequest, ProvisionResponse};
pub use unbind::{UnbindRequest, UnbindResponse};
pub use update::{PreviousValues, UpdateInstanceRequest, UpdateInstanceResponse};

use osb_common_http::{DrainedResponse, WireRequest};

use crate::classify::{OperationKind, Outcome};
use crate::error::Result;
use crate::validate::Validate;
use crate::version::ApiVersion;
use crate::wire::WireContext;

/// A request the client knows how to send and interpret.
pub(crate) trait LifecycleOperation: Validate {
	type Response;

	const KIND: OperationKind;

	/// Rejects features the configured API version does not support.
	fn check_version(&self, _version: ApiVersion) -> Result<()> {
		Ok(())
	}

	fn accepts_incomplete(&self) -> bool {
		false
	}

	fn to_wire(&self, ctx: &WireContext<'_>) -> Result<WireRequest>;

	/// Builds the typed response for a non-failure outcome.
	fn into_response(outcome: Outcome, response: &DrainedResponse) -> Result<Self::Response>;
}
