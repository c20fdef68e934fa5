// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Broker client: validation, request construction, classification.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use osb_client_config::{BrokerAuth, BrokerConfig};
use osb_common_http::{HttpTransport, HttpTransportConfig, Transport, TransportAuth, Url};
use tracing::{debug, instrument, trace};

use crate::classify::Outcome;
use crate::error::{OsbError, Result};
use crate::operations::{
	BindRequest, BindResponse, BindingLastOperationRequest, CatalogRequest, CatalogResponse,
	DeprovisionRequest, DeprovisionResponse, LastOperationRequest, LastOperationResponse,
	LifecycleOperation, ProvisionRequest, ProvisionResponse, UnbindRequest, UnbindResponse,
	UpdateInstanceRequest, UpdateInstanceResponse,
};
use crate::version::ApiVersion;
use crate::wire::WireContext;

const DEFAULT_BROKER_NAME: &str = "broker";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for a single Open Service Broker.
///
/// Holds only immutable configuration; clones share the same transport and
/// calls may run concurrently.
#[derive(Clone)]
pub struct BrokerClient {
	inner: Arc<Inner>,
}

struct Inner {
	name: String,
	base_url: Url,
	api_version: ApiVersion,
	transport: Arc<dyn Transport>,
}

impl fmt::Debug for BrokerClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BrokerClient")
			.field("name", &self.inner.name)
			.field("base_url", &self.inner.base_url.as_str())
			.field("api_version", &self.inner.api_version.to_string())
			.finish_non_exhaustive()
	}
}

/// Builder for [`BrokerClient`].
#[derive(Default)]
pub struct BrokerClientBuilder {
	name: Option<String>,
	base_url: Option<String>,
	api_version: ApiVersion,
	transport: Option<Arc<dyn Transport>>,
	auth: TransportAuth,
	request_timeout: Option<Duration>,
	insecure_skip_verify: bool,
}

impl BrokerClientBuilder {
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = Some(base_url.into());
		self
	}

	pub fn api_version(mut self, api_version: ApiVersion) -> Self {
		self.api_version = api_version;
		self
	}

	/// Uses `transport` instead of the default reqwest transport.
	///
	/// Auth, timeout and TLS settings on the builder are ignored in that case.
	pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
		self.transport = Some(transport);
		self
	}

	pub fn auth(mut self, auth: TransportAuth) -> Self {
		self.auth = auth;
		self
	}

	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);
		self
	}

	pub fn insecure_skip_verify(mut self, insecure: bool) -> Self {
		self.insecure_skip_verify = insecure;
		self
	}

	pub fn build(self) -> Result<BrokerClient> {
		let raw_url = self
			.base_url
			.ok_or_else(|| OsbError::Config("base_url is required".to_string()))?;
		let base_url =
			Url::parse(&raw_url).map_err(|e| OsbError::InvalidUrl(format!("{raw_url}: {e}")))?;
		if base_url.cannot_be_a_base() {
			return Err(OsbError::InvalidUrl(raw_url));
		}

		let transport: Arc<dyn Transport> = match self.transport {
			Some(transport) => transport,
			None => Arc::new(HttpTransport::new(HttpTransportConfig {
				api_version: self.api_version.to_string(),
				request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
				insecure_skip_verify: self.insecure_skip_verify,
				auth: self.auth,
			})?),
		};

		let name = self.name.unwrap_or_else(|| DEFAULT_BROKER_NAME.to_string());
		debug!(broker = %name, url = %base_url, api_version = %self.api_version, "broker client created");

		Ok(BrokerClient {
			inner: Arc::new(Inner {
				name,
				base_url,
				api_version: self.api_version,
				transport,
			}),
		})
	}
}

impl BrokerClient {
	pub fn builder() -> BrokerClientBuilder {
		BrokerClientBuilder::default()
	}

	/// Creates a client backed by the reqwest transport described by `config`.
	pub fn from_config(config: &BrokerConfig) -> Result<Self> {
		let api_version = config
			.api_version
			.parse::<ApiVersion>()
			.map_err(|e| OsbError::Config(e.to_string()))?;

		let auth = match &config.auth {
			BrokerAuth::None => TransportAuth::None,
			BrokerAuth::Basic { username, password } => TransportAuth::Basic {
				username: username.clone(),
				password: password.expose().clone(),
			},
			BrokerAuth::Bearer { token } => TransportAuth::Bearer {
				token: token.expose().clone(),
			},
		};

		Self::builder()
			.name(config.name.clone())
			.base_url(config.url.as_str())
			.api_version(api_version)
			.auth(auth)
			.request_timeout(config.request_timeout)
			.insecure_skip_verify(config.insecure_skip_verify)
			.build()
	}

	pub fn name(&self) -> &str {
		&self.inner.name
	}

	pub fn base_url(&self) -> &Url {
		&self.inner.base_url
	}

	pub fn api_version(&self) -> ApiVersion {
		self.inner.api_version
	}

	#[instrument(skip(self), fields(broker = %self.inner.name))]
	pub async fn get_catalog(&self) -> Result<CatalogResponse> {
		self.execute(&CatalogRequest).await
	}

	#[instrument(skip(self, request), fields(broker = %self.inner.name, instance_id = %request.instance_id))]
	pub async fn provision_instance(&self, request: &ProvisionRequest) -> Result<ProvisionResponse> {
		self.execute(request).await
	}

	#[instrument(skip(self, request), fields(broker = %self.inner.name, instance_id = %request.instance_id))]
	pub async fn update_instance(
		&self,
		request: &UpdateInstanceRequest,
	) -> Result<UpdateInstanceResponse> {
		self.execute(request).await
	}

	/// Deletes a service instance.
	///
	/// A 410 from the broker is reported as
	/// [`OsbError::UnexpectedStatusCode`]; callers that treat an absent
	/// instance as deleted can check [`OsbError::is_gone`].
	#[instrument(skip(self, request), fields(broker = %self.inner.name, instance_id = %request.instance_id))]
	pub async fn deprovision_instance(
		&self,
		request: &DeprovisionRequest,
	) -> Result<DeprovisionResponse> {
		self.execute(request).await
	}

	#[instrument(skip(self, request), fields(broker = %self.inner.name, instance_id = %request.instance_id))]
	pub async fn poll_last_operation(
		&self,
		request: &LastOperationRequest,
	) -> Result<LastOperationResponse> {
		self.execute(request).await
	}

	#[instrument(skip(self, request), fields(broker = %self.inner.name, instance_id = %request.instance_id, binding_id = %request.binding_id))]
	pub async fn bind(&self, request: &BindRequest) -> Result<BindResponse> {
		self.execute(request).await
	}

	/// Deletes a binding. A binding the broker no longer knows (410) counts
	/// as unbound.
	#[instrument(skip(self, request), fields(broker = %self.inner.name, instance_id = %request.instance_id, binding_id = %request.binding_id))]
	pub async fn unbind(&self, request: &UnbindRequest) -> Result<UnbindResponse> {
		self.execute(request).await
	}

	#[instrument(skip(self, request), fields(broker = %self.inner.name, instance_id = %request.instance_id, binding_id = %request.binding_id))]
	pub async fn poll_binding_last_operation(
		&self,
		request: &BindingLastOperationRequest,
	) -> Result<LastOperationResponse> {
		self.execute(request).await
	}

	/// Validate, send, drain, classify.
	///
	/// Nothing reaches the transport unless validation and the version check
	/// pass. The response body is read to the end before it is interpreted and
	/// is dropped with the response on every error path.
	async fn execute<Op: LifecycleOperation>(&self, op: &Op) -> Result<Op::Response> {
		op.validate()?;
		op.check_version(self.inner.api_version)?;

		let ctx = WireContext {
			base_url: &self.inner.base_url,
			api_version: self.inner.api_version,
		};
		let request = op.to_wire(&ctx)?;
		trace!(operation = %Op::KIND, method = %request.method, url = %request.url, "request built");

		let response = self.inner.transport.send(request).await?.drain().await?;

		let accepts_incomplete = op.accepts_incomplete();
		let outcome = Op::KIND
			.table()
			.classify(response.status, accepts_incomplete);
		debug!(
			operation = %Op::KIND,
			status = response.status.as_u16(),
			accepts_incomplete,
			outcome = ?outcome,
			"broker response classified"
		);

		match outcome {
			Outcome::Failure => Err(OsbError::from_failure(&response)),
			Outcome::Unexpected => Err(OsbError::unexpected(&response)),
			Outcome::Success | Outcome::AsyncAccepted | Outcome::AlreadyGone => {
				Op::into_response(outcome, &response)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use bytes::Bytes;
	use futures::stream::{self, StreamExt};
	use osb_common_http::{
		ResponseBody, StatusCode, TransportError, WireRequest, WireResponse,
	};
	use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
	use std::sync::Mutex;

	/// Replies with a fixed status and body, recording what it saw.
	struct ScriptedTransport {
		status: StatusCode,
		body: &'static str,
		fail_mid_body: bool,
		calls: AtomicUsize,
		drained: Arc<AtomicBool>,
		last_request: Mutex<Option<WireRequest>>,
	}

	impl ScriptedTransport {
		fn new(status: StatusCode, body: &'static str) -> Arc<Self> {
			Arc::new(Self {
				status,
				body,
				fail_mid_body: false,
				calls: AtomicUsize::new(0),
				drained: Arc::new(AtomicBool::new(false)),
				last_request: Mutex::new(None),
			})
		}

		fn failing_body(status: StatusCode) -> Arc<Self> {
			Arc::new(Self {
				status,
				body: "{",
				fail_mid_body: true,
				calls: AtomicUsize::new(0),
				drained: Arc::new(AtomicBool::new(false)),
				last_request: Mutex::new(None),
			})
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}

		fn drained(&self) -> bool {
			self.drained.load(Ordering::SeqCst)
		}
	}

	#[async_trait]
	impl Transport for ScriptedTransport {
		async fn send(&self, request: WireRequest) -> std::result::Result<WireResponse, TransportError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			*self.last_request.lock().unwrap() = Some(request);

			let drained = Arc::clone(&self.drained);
			let mut chunks = vec![Ok(Bytes::from_static(self.body.as_bytes()))];
			if self.fail_mid_body {
				chunks.push(Err(TransportError::Other("connection reset".to_string())));
			}
			// Marks the body as fully read once the stream is exhausted.
			let body = stream::iter(chunks).chain(stream::poll_fn(move |_| {
				drained.store(true, Ordering::SeqCst);
				std::task::Poll::Ready(None)
			}));
			Ok(WireResponse::new(self.status, ResponseBody::from_stream(body)))
		}
	}

	fn client(transport: Arc<ScriptedTransport>, version: ApiVersion) -> BrokerClient {
		BrokerClient::builder()
			.name("test-broker")
			.base_url("https://broker.example.com")
			.api_version(version)
			.transport(transport)
			.build()
			.unwrap()
	}

	fn deprovision(accepts_incomplete: bool) -> DeprovisionRequest {
		DeprovisionRequest {
			instance_id: "inst-1".to_string(),
			service_id: "svc-1".to_string(),
			plan_id: "plan-1".to_string(),
			accepts_incomplete,
			..Default::default()
		}
	}

	#[tokio::test]
	async fn validation_failure_sends_nothing() {
		let transport = ScriptedTransport::new(StatusCode::OK, "{}");
		let client = client(Arc::clone(&transport), ApiVersion::V2_13);

		let request = DeprovisionRequest {
			plan_id: String::new(),
			..deprovision(false)
		};
		let err = client.deprovision_instance(&request).await.unwrap_err();

		assert!(matches!(err, OsbError::RequiredFieldMissing { field: "planID" }));
		assert_eq!(transport.calls(), 0);
	}

	#[tokio::test]
	async fn version_gate_sends_nothing() {
		let transport = ScriptedTransport::new(StatusCode::OK, "{}");
		let client = client(Arc::clone(&transport), ApiVersion::V2_13);

		let request = UnbindRequest {
			binding_id: "bind-1".to_string(),
			instance_id: "inst-1".to_string(),
			service_id: "svc-1".to_string(),
			plan_id: "plan-1".to_string(),
			accepts_incomplete: true,
			..Default::default()
		};
		let err = client.unbind(&request).await.unwrap_err();

		assert!(matches!(err, OsbError::UnsupportedApiVersion { .. }));
		assert_eq!(transport.calls(), 0);
	}

	#[tokio::test]
	async fn sync_success_drains_body() {
		let transport = ScriptedTransport::new(StatusCode::OK, "{}");
		let client = client(Arc::clone(&transport), ApiVersion::V2_13);

		let response = client.deprovision_instance(&deprovision(false)).await.unwrap();

		assert_eq!(response, DeprovisionResponse::default());
		assert_eq!(transport.calls(), 1);
		assert!(transport.drained());
	}

	#[tokio::test]
	async fn unexpected_async_drains_body() {
		let transport = ScriptedTransport::new(StatusCode::ACCEPTED, r#"{"operation":"op-1"}"#);
		let client = client(Arc::clone(&transport), ApiVersion::V2_13);

		let err = client.deprovision_instance(&deprovision(false)).await.unwrap_err();

		assert!(matches!(err, OsbError::UnexpectedStatusCode { status: 202, .. }));
		assert!(transport.drained());
	}

	#[tokio::test]
	async fn failure_drains_body() {
		let transport = ScriptedTransport::new(
			StatusCode::UNPROCESSABLE_ENTITY,
			r#"{"error":"AsyncRequired","description":"needs async"}"#,
		);
		let client = client(Arc::clone(&transport), ApiVersion::V2_13);

		let err = client.deprovision_instance(&deprovision(false)).await.unwrap_err();

		assert!(err.is_async_required());
		assert!(transport.drained());
	}

	#[tokio::test]
	async fn body_error_surfaces_as_transport_error() {
		let transport = ScriptedTransport::failing_body(StatusCode::OK);
		let client = client(Arc::clone(&transport), ApiVersion::V2_13);

		let err = client.deprovision_instance(&deprovision(false)).await.unwrap_err();

		assert!(matches!(err, OsbError::Transport(_)));
		assert!(!transport.drained());
	}

	#[tokio::test]
	async fn identity_header_dropped_before_2_13() {
		let transport = ScriptedTransport::new(StatusCode::OK, "{}");
		let client = client(Arc::clone(&transport), ApiVersion::V2_12);

		let request = DeprovisionRequest {
			originating_identity: Some(osb_common_http::OriginatingIdentity::new(
				"cloudfoundry",
				r#"{"user_id":"u-1"}"#,
			)),
			..deprovision(false)
		};
		client.deprovision_instance(&request).await.unwrap();

		let sent = transport.last_request.lock().unwrap().take().unwrap();
		assert!(sent.originating_identity.is_none());
	}

	#[test]
	fn builder_requires_base_url() {
		let err = BrokerClient::builder()
			.transport(ScriptedTransport::new(StatusCode::OK, ""))
			.build()
			.unwrap_err();
		assert!(matches!(err, OsbError::Config(_)));
	}

	#[test]
	fn builder_rejects_bad_url() {
		let err = BrokerClient::builder()
			.base_url("not a url")
			.transport(ScriptedTransport::new(StatusCode::OK, ""))
			.build()
			.unwrap_err();
		assert!(matches!(err, OsbError::InvalidUrl(_)));
	}

	#[test]
	fn debug_does_not_expose_transport() {
		let client = client(ScriptedTransport::new(StatusCode::OK, ""), ApiVersion::V2_14);
		let debug = format!("{client:?}");
		assert!(debug.contains("test-broker"));
		assert!(debug.contains("2.14"));
	}
}
