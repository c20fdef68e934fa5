// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared HTTP plumbing for Open Service Broker clients.
//!
//! This crate provides:
//! - A pre-configured HTTP client with consistent User-Agent header
//! - The [`Transport`] seam used by the lifecycle client, with a reqwest-backed
//!   implementation in [`HttpTransport`]
//! - Response bodies that are always drained before they are interpreted
//! - Originating identity header encoding

mod client;
mod error;
mod identity;
mod transport;

pub use client::{builder, user_agent};
pub use error::{IdentityError, TransportError};
pub use identity::{OriginatingIdentity, ORIGINATING_IDENTITY_HEADER};
pub use transport::{
	DrainedResponse, HttpTransport, HttpTransportConfig, ResponseBody, Transport, TransportAuth,
	WireRequest, WireResponse, API_VERSION_HEADER,
};

pub use reqwest::{Method, StatusCode};
pub use url::Url;
