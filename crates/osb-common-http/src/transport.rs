// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Transport seam between the lifecycle client and the network.
//!
//! The client describes a call as a [`WireRequest`] and receives a
//! [`WireResponse`] whose body is a stream. Callers interpret a response only
//! after [`WireResponse::drain`] has read the stream to the end, so the
//! connection can go back to the pool. Dropping an undrained body releases the
//! stream without reading it.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, Stream, StreamExt};
use reqwest::header::HeaderValue;
use reqwest::{Client, Method, StatusCode};
use tracing::{debug, trace};
use url::Url;

use crate::error::TransportError;
use crate::identity::{OriginatingIdentity, ORIGINATING_IDENTITY_HEADER};

pub const API_VERSION_HEADER: &str = "X-Broker-API-Version";

const DEFAULT_API_VERSION: &str = "2.13";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A single broker call, fully described.
#[derive(Debug, Clone)]
pub struct WireRequest {
	pub method: Method,
	pub url: Url,
	pub query: Vec<(String, String)>,
	pub body: Option<serde_json::Value>,
	pub originating_identity: Option<OriginatingIdentity>,
}

impl WireRequest {
	pub fn new(method: Method, url: Url) -> Self {
		Self {
			method,
			url,
			query: Vec::new(),
			body: None,
			originating_identity: None,
		}
	}

	pub fn query_param(mut self, key: &str, value: impl Into<String>) -> Self {
		self.query.push((key.to_string(), value.into()));
		self
	}

	pub fn json_body(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);
		self
	}

	pub fn originating_identity(mut self, identity: Option<OriginatingIdentity>) -> Self {
		self.originating_identity = identity;
		self
	}

	/// Returns the value of the first query parameter named `key`.
	pub fn query_value(&self, key: &str) -> Option<&str> {
		self.query
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	/// The URL with all query parameters percent-encoded onto it.
	pub fn full_url(&self) -> Url {
		let mut url = self.url.clone();
		if !self.query.is_empty() {
			let mut pairs = url.query_pairs_mut();
			for (key, value) in &self.query {
				pairs.append_pair(key, value);
			}
		}
		url
	}
}

/// Streaming response body owned by exactly one response.
pub struct ResponseBody {
	stream: BoxStream<'static, Result<Bytes, TransportError>>,
}

impl ResponseBody {
	pub fn from_stream<S>(stream: S) -> Self
	where
		S: Stream<Item = Result<Bytes, TransportError>> + Send + 'static,
	{
		Self {
			stream: stream.boxed(),
		}
	}

	/// Reads the stream to its end.
	///
	/// On error the remaining stream is dropped together with `self`.
	pub async fn drain(mut self) -> Result<Bytes, TransportError> {
		let mut buf = BytesMut::new();
		while let Some(chunk) = self.stream.next().await {
			buf.extend_from_slice(&chunk?);
		}
		Ok(buf.freeze())
	}
}

impl fmt::Debug for ResponseBody {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResponseBody").finish_non_exhaustive()
	}
}

/// Status plus an undrained body.
#[derive(Debug)]
pub struct WireResponse {
	pub status: StatusCode,
	pub body: ResponseBody,
}

impl WireResponse {
	pub fn new(status: StatusCode, body: ResponseBody) -> Self {
		Self { status, body }
	}

	/// Consumes the body so that the response can be classified.
	pub async fn drain(self) -> Result<DrainedResponse, TransportError> {
		let status = self.status;
		let body = self.body.drain().await?;
		trace!(status = %status, bytes = body.len(), "drained response body");
		Ok(DrainedResponse { status, body })
	}
}

/// A response whose body has been read completely.
#[derive(Debug, Clone)]
pub struct DrainedResponse {
	pub status: StatusCode,
	pub body: Bytes,
}

impl DrainedResponse {
	/// True when the body carries no content besides whitespace.
	pub fn is_body_empty(&self) -> bool {
		self.body.iter().all(u8::is_ascii_whitespace)
	}
}

/// Sends wire requests to a broker.
#[async_trait]
pub trait Transport: Send + Sync {
	async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

/// Credentials attached to every request.
#[derive(Clone, Default)]
pub enum TransportAuth {
	#[default]
	None,
	Basic {
		username: String,
		password: String,
	},
	Bearer {
		token: String,
	},
}

impl fmt::Debug for TransportAuth {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransportAuth::None => f.write_str("None"),
			TransportAuth::Basic { username, .. } => f
				.debug_struct("Basic")
				.field("username", username)
				.field("password", &"[REDACTED]")
				.finish(),
			TransportAuth::Bearer { .. } => f
				.debug_struct("Bearer")
				.field("token", &"[REDACTED]")
				.finish(),
		}
	}
}

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
	/// Value of the `X-Broker-API-Version` header.
	pub api_version: String,
	pub request_timeout: Duration,
	/// Accept invalid TLS certificates. Development only.
	pub insecure_skip_verify: bool,
	pub auth: TransportAuth,
}

impl Default for HttpTransportConfig {
	fn default() -> Self {
		Self {
			api_version: DEFAULT_API_VERSION.to_string(),
			request_timeout: DEFAULT_TIMEOUT,
			insecure_skip_verify: false,
			auth: TransportAuth::None,
		}
	}
}

/// reqwest-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: Client,
	api_version: HeaderValue,
	auth: TransportAuth,
}

impl HttpTransport {
	pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
		let api_version =
			HeaderValue::from_str(&config.api_version).map_err(|_| TransportError::InvalidHeader {
				header: API_VERSION_HEADER,
			})?;

		let client = crate::client::builder()
			.timeout(config.request_timeout)
			.danger_accept_invalid_certs(config.insecure_skip_verify)
			.build()
			.map_err(TransportError::Build)?;

		debug!(
			api_version = %config.api_version,
			timeout_secs = config.request_timeout.as_secs_f64(),
			insecure = config.insecure_skip_verify,
			"HTTP transport initialized"
		);

		Ok(Self {
			client,
			api_version,
			auth: config.auth,
		})
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
		let url = request.full_url();
		debug!(method = %request.method, url = %url, "sending broker request");

		let mut builder = self
			.client
			.request(request.method.clone(), url)
			.header(API_VERSION_HEADER, self.api_version.clone());

		if let Some(identity) = &request.originating_identity {
			let value = HeaderValue::from_str(&identity.header_value()).map_err(|_| {
				TransportError::InvalidHeader {
					header: ORIGINATING_IDENTITY_HEADER,
				}
			})?;
			builder = builder.header(ORIGINATING_IDENTITY_HEADER, value);
		}

		builder = match &self.auth {
			TransportAuth::None => builder,
			TransportAuth::Basic { username, password } => {
				builder.basic_auth(username, Some(password))
			}
			TransportAuth::Bearer { token } => builder.bearer_auth(token),
		};

		if let Some(body) = &request.body {
			builder = builder.json(body);
		}

		let response = builder.send().await.map_err(TransportError::from_reqwest)?;
		let status = response.status();
		debug!(status = %status, "received broker response");

		let stream = response
			.bytes_stream()
			.map(|chunk| chunk.map_err(TransportError::from_reqwest));

		Ok(WireResponse::new(status, ResponseBody::from_stream(stream)))
	}
}
