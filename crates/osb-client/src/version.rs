// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Broker API versions and the features they gate.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// An OSB API version as sent in `X-Broker-API-Version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
	pub major: u32,
	pub minor: u32,
}

impl ApiVersion {
	pub const V2_11: Self = Self::new(2, 11);
	/// Request `context` objects.
	pub const V2_12: Self = Self::new(2, 12);
	/// Originating identity header.
	pub const V2_13: Self = Self::new(2, 13);
	/// Asynchronous bindings and binding last-operation polling.
	pub const V2_14: Self = Self::new(2, 14);

	pub const fn new(major: u32, minor: u32) -> Self {
		Self { major, minor }
	}

	pub fn at_least(self, other: Self) -> bool {
		self >= other
	}
}

impl Default for ApiVersion {
	fn default() -> Self {
		Self::V2_13
	}
}

impl fmt::Display for ApiVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}", self.major, self.minor)
	}
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid API version '{0}', expected 'major.minor'")]
pub struct ParseApiVersionError(String);

impl FromStr for ApiVersion {
	type Err = ParseApiVersionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let err = || ParseApiVersionError(s.to_string());
		let (major, minor) = s.trim().split_once('.').ok_or_else(err)?;
		Ok(Self {
			major: major.parse().map_err(|_| err())?,
			minor: minor.parse().map_err(|_| err())?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn parses_and_displays() {
		let version: ApiVersion = "2.14".parse().unwrap();
		assert_eq!(version, ApiVersion::V2_14);
		assert_eq!(version.to_string(), "2.14");
	}

	#[test]
	fn rejects_garbage() {
		assert!("two.fourteen".parse::<ApiVersion>().is_err());
		assert!("2".parse::<ApiVersion>().is_err());
		assert!("2.".parse::<ApiVersion>().is_err());
	}

	#[test]
	fn ordering_is_numeric() {
		assert!(ApiVersion::V2_14.at_least(ApiVersion::V2_13));
		assert!(!ApiVersion::V2_11.at_least(ApiVersion::V2_12));
		assert!(ApiVersion::new(3, 0).at_least(ApiVersion::V2_14));
		assert!(ApiVersion::new(2, 9) < ApiVersion::V2_11);
	}

	proptest! {
		#[test]
		fn display_parses_back(major in 0u32..100, minor in 0u32..100) {
			let version = ApiVersion::new(major, minor);
			prop_assert_eq!(version.to_string().parse::<ApiVersion>(), Ok(version));
		}
	}
}
