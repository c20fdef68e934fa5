// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Open Service Broker API lifecycle client.
//!
//! Every call follows the same path: the request is validated locally, turned
//! into a wire request, sent through a [`Transport`], and the drained response
//! is classified by the operation's decision table into a typed result or an
//! [`OsbError`].
//!
//! ```no_run
//! # async fn run() -> osb_client::Result<()> {
//! use osb_client::{ApiVersion, BrokerClient, DeprovisionRequest};
//!
//! let client = BrokerClient::builder()
//! 	.base_url("https://broker.example.com")
//! 	.api_version(ApiVersion::V2_13)
//! 	.build()?;
//!
//! let response = client
//! 	.deprovision_instance(&DeprovisionRequest {
//! 		instance_id: "instance-1".into(),
//! 		service_id: "service-1".into(),
//! 		plan_id: "plan-1".into(),
//! 		accepts_incomplete: true,
//! 		..Default::default()
//! 	})
//! 	.await?;
//!
//! if let Some(key) = response.operation_key {
//! 	println!("poll with operation {key}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod classify;
mod client;
pub mod error;
mod operations;
pub mod types;
mod validate;
pub mod version;
mod wire;

pub use client::{BrokerClient, BrokerClientBuilder};
pub use error::{BrokerErrorBody, OsbError, Result};
pub use operations::{
	BindRequest, BindResource, BindResponse, BindingLastOperationRequest, CatalogRequest,
	CatalogResponse, DeprovisionRequest, DeprovisionResponse, LastOperationRequest,
	LastOperationResponse, Plan, PreviousValues, ProvisionRequest, ProvisionResponse, Service,
	UnbindRequest, UnbindResponse, UpdateInstanceRequest, UpdateInstanceResponse, VolumeDevice,
	VolumeMount,
};
pub use types::{JsonObject, LastOperationState, OperationKey};
pub use validate::Validate;
pub use version::{ApiVersion, ParseApiVersionError};

pub use osb_client_config::{BrokerAuth, BrokerConfig};
pub use osb_common_http::{
	HttpTransport, HttpTransportConfig, OriginatingIdentity, Transport, TransportAuth,
	TransportError,
};
