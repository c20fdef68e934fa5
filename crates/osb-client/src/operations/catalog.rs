// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use osb_common_http::{DrainedResponse, Method, WireRequest};
use serde::{Deserialize, Serialize};

use crate::classify::{OperationKind, Outcome};
use crate::error::{OsbError, Result};
use crate::operations::LifecycleOperation;
use crate::types::JsonObject;
use crate::validate::Validate;
use crate::wire::{self, WireContext};

/// Fetches the broker's service catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogRequest;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogResponse {
	#[serde(default)]
	pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
	pub id: String,
	pub name: String,
	pub description: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub requires: Vec<String>,
	pub bindable: bool,
	#[serde(default)]
	pub plan_updateable: Option<bool>,
	#[serde(default)]
	pub instances_retrievable: Option<bool>,
	#[serde(default)]
	pub bindings_retrievable: Option<bool>,
	#[serde(default)]
	pub plans: Vec<Plan>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<JsonObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
	pub id: String,
	pub name: String,
	pub description: String,
	#[serde(default)]
	pub free: Option<bool>,
	/// Overrides the service level `bindable` when set.
	#[serde(default)]
	pub bindable: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<JsonObject>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub schemas: Option<serde_json::Value>,
}

impl Validate for CatalogRequest {
	fn validate(&self) -> Result<()> {
		Ok(())
	}
}

impl LifecycleOperation for CatalogRequest {
	type Response = CatalogResponse;

	const KIND: OperationKind = OperationKind::Catalog;

	fn to_wire(&self, ctx: &WireContext<'_>) -> Result<WireRequest> {
		Ok(WireRequest::new(Method::GET, ctx.catalog_url()?))
	}

	fn into_response(outcome: Outcome, response: &DrainedResponse) -> Result<Self::Response> {
		match outcome {
			Outcome::Success => wire::decode_required(response),
			_ => Err(OsbError::unexpected(response)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use bytes::Bytes;
	use osb_common_http::StatusCode;

	#[test]
	fn decodes_services_and_plans() {
		let response = DrainedResponse {
			status: StatusCode::OK,
			body: Bytes::from_static(
				br#"{"services":[{
					"id":"svc-1",
					"name":"postgres",
					"description":"Managed Postgres",
					"bindable":true,
					"tags":["sql"],
					"plans":[{"id":"plan-1","name":"small","description":"1 GB","free":true}]
				}]}"#,
			),
		};

		let catalog = CatalogRequest::into_response(Outcome::Success, &response).unwrap();
		assert_eq!(catalog.services.len(), 1);
		let service = &catalog.services[0];
		assert_eq!(service.name, "postgres");
		assert!(service.bindable);
		assert_eq!(service.tags, vec!["sql".to_string()]);
		assert_eq!(service.plans[0].free, Some(true));
		assert_eq!(service.plans[0].bindable, None);
	}

	#[test]
	fn missing_required_service_field_fails() {
		let response = DrainedResponse {
			status: StatusCode::OK,
			body: Bytes::from_static(br#"{"services":[{"id":"svc-1"}]}"#),
		};
		assert!(matches!(
			CatalogRequest::into_response(Outcome::Success, &response),
			Err(OsbError::ResponseDecode { .. })
		));
	}
}
