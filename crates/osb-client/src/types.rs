// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Types shared between several lifecycle operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque token a broker issues when it accepts an operation asynchronously.
///
/// Passed back unchanged when polling. An empty key is a valid key; "no key"
/// is expressed as `Option::None`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationKey(String);

impl OperationKey {
	pub fn new(key: impl Into<String>) -> Self {
		Self(key.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for OperationKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<&str> for OperationKey {
	fn from(key: &str) -> Self {
		Self::new(key)
	}
}

/// State of the most recent operation on an instance or binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LastOperationState {
	#[serde(rename = "in progress")]
	InProgress,
	#[serde(rename = "succeeded")]
	Succeeded,
	#[serde(rename = "failed")]
	Failed,
}

impl LastOperationState {
	pub fn is_terminal(self) -> bool {
		!matches!(self, LastOperationState::InProgress)
	}
}

impl fmt::Display for LastOperationState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			LastOperationState::InProgress => "in progress",
			LastOperationState::Succeeded => "succeeded",
			LastOperationState::Failed => "failed",
		};
		f.write_str(s)
	}
}

/// Free-form JSON object used for parameters, context and credentials.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;
