// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Local request validation.
//!
//! Runs before anything is sent. Each request type checks its identifiers in
//! a fixed order and reports the first missing one.

use crate::error::{OsbError, Result};
use crate::version::ApiVersion;

/// Checks that a request is complete enough to send.
pub trait Validate {
	fn validate(&self) -> Result<()>;
}

/// Fails with [`OsbError::RequiredFieldMissing`] when `value` is empty.
pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
	if value.is_empty() {
		return Err(OsbError::RequiredFieldMissing { field });
	}
	Ok(())
}

/// Fails with [`OsbError::UnsupportedApiVersion`] below `required`.
pub(crate) fn require_version(
	feature: &'static str,
	required: ApiVersion,
	configured: ApiVersion,
) -> Result<()> {
	if configured.at_least(required) {
		Ok(())
	} else {
		Err(OsbError::UnsupportedApiVersion {
			feature,
			required,
			configured,
		})
	}
}
