// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Response classification.
//!
//! Each operation owns a [`DecisionTable`] mapping `(status, accepts_incomplete)`
//! to an [`Outcome`]. A status with no matching row is a [`Outcome::Failure`]
//! and is explained by the broker's error body when it sent one.

use std::fmt;

use osb_common_http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
	Catalog,
	Provision,
	Update,
	Deprovision,
	Bind,
	Unbind,
	LastOperation,
	BindingLastOperation,
}

impl OperationKind {
	pub const ALL: [OperationKind; 8] = [
		OperationKind::Catalog,
		OperationKind::Provision,
		OperationKind::Update,
		OperationKind::Deprovision,
		OperationKind::Bind,
		OperationKind::Unbind,
		OperationKind::LastOperation,
		OperationKind::BindingLastOperation,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			OperationKind::Catalog => "catalog",
			OperationKind::Provision => "provision",
			OperationKind::Update => "update",
			OperationKind::Deprovision => "deprovision",
			OperationKind::Bind => "bind",
			OperationKind::Unbind => "unbind",
			OperationKind::LastOperation => "last_operation",
			OperationKind::BindingLastOperation => "binding_last_operation",
		}
	}

	pub fn table(self) -> &'static DecisionTable {
		match self {
			OperationKind::Catalog => &CATALOG,
			OperationKind::Provision => &PROVISION,
			OperationKind::Update => &UPDATE,
			OperationKind::Deprovision => &DEPROVISION,
			OperationKind::Bind => &BIND,
			OperationKind::Unbind => &UNBIND,
			OperationKind::LastOperation => &LAST_OPERATION,
			OperationKind::BindingLastOperation => &BINDING_LAST_OPERATION,
		}
	}
}

impl fmt::Display for OperationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// How a row constrains the caller's `accepts_incomplete` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagMatch {
	Any,
	Set,
	Unset,
}

impl FlagMatch {
	pub fn matches(self, accepts_incomplete: bool) -> bool {
		match self {
			FlagMatch::Any => true,
			FlagMatch::Set => accepts_incomplete,
			FlagMatch::Unset => !accepts_incomplete,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// Completed synchronously.
	Success,
	/// Accepted for asynchronous completion; the body may carry an operation key.
	AsyncAccepted,
	/// The resource is already absent and the operation counts as done.
	AlreadyGone,
	/// A status this operation must reject, even though it is not an HTTP error
	/// class in itself (e.g. 202 without `accepts_incomplete`).
	Unexpected,
	/// Any other status; explained by the broker error body.
	Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row {
	pub status: StatusCode,
	pub accepts_incomplete: FlagMatch,
	pub outcome: Outcome,
}

impl Row {
	const fn new(status: StatusCode, accepts_incomplete: FlagMatch, outcome: Outcome) -> Self {
		Self {
			status,
			accepts_incomplete,
			outcome,
		}
	}
}

#[derive(Debug)]
pub struct DecisionTable {
	pub kind: OperationKind,
	pub rows: &'static [Row],
}

impl DecisionTable {
	pub fn classify(&self, status: StatusCode, accepts_incomplete: bool) -> Outcome {
		self.rows
			.iter()
			.find(|row| row.status == status && row.accepts_incomplete.matches(accepts_incomplete))
			.map(|row| row.outcome)
			.unwrap_or(Outcome::Failure)
	}
}

use FlagMatch::{Any, Set, Unset};

pub static CATALOG: DecisionTable = DecisionTable {
	kind: OperationKind::Catalog,
	rows: &[Row::new(StatusCode::OK, Any, Outcome::Success)],
};

pub static PROVISION: DecisionTable = DecisionTable {
	kind: OperationKind::Provision,
	rows: &[
		Row::new(StatusCode::OK, Any, Outcome::Success),
		Row::new(StatusCode::CREATED, Any, Outcome::Success),
		Row::new(StatusCode::ACCEPTED, Set, Outcome::AsyncAccepted),
		Row::new(StatusCode::ACCEPTED, Unset, Outcome::Unexpected),
	],
};

pub static UPDATE: DecisionTable = DecisionTable {
	kind: OperationKind::Update,
	rows: &[
		Row::new(StatusCode::OK, Any, Outcome::Success),
		Row::new(StatusCode::ACCEPTED, Set, Outcome::AsyncAccepted),
		Row::new(StatusCode::ACCEPTED, Unset, Outcome::Unexpected),
	],
};

/// 410 stays a failure: callers observe an already-removed instance as an error.
pub static DEPROVISION: DecisionTable = DecisionTable {
	kind: OperationKind::Deprovision,
	rows: &[
		Row::new(StatusCode::OK, Any, Outcome::Success),
		Row::new(StatusCode::GONE, Any, Outcome::Unexpected),
		Row::new(StatusCode::ACCEPTED, Set, Outcome::AsyncAccepted),
		Row::new(StatusCode::ACCEPTED, Unset, Outcome::Unexpected),
	],
};

pub static BIND: DecisionTable = DecisionTable {
	kind: OperationKind::Bind,
	rows: &[
		Row::new(StatusCode::OK, Any, Outcome::Success),
		Row::new(StatusCode::CREATED, Any, Outcome::Success),
		Row::new(StatusCode::ACCEPTED, Set, Outcome::AsyncAccepted),
		Row::new(StatusCode::ACCEPTED, Unset, Outcome::Unexpected),
	],
};

pub static UNBIND: DecisionTable = DecisionTable {
	kind: OperationKind::Unbind,
	rows: &[
		Row::new(StatusCode::OK, Any, Outcome::Success),
		Row::new(StatusCode::GONE, Any, Outcome::AlreadyGone),
		Row::new(StatusCode::ACCEPTED, Set, Outcome::AsyncAccepted),
		Row::new(StatusCode::ACCEPTED, Unset, Outcome::Unexpected),
	],
};

pub static LAST_OPERATION: DecisionTable = DecisionTable {
	kind: OperationKind::LastOperation,
	rows: &[Row::new(StatusCode::OK, Any, Outcome::Success)],
};

pub static BINDING_LAST_OPERATION: DecisionTable = DecisionTable {
	kind: OperationKind::BindingLastOperation,
	rows: &[Row::new(StatusCode::OK, Any, Outcome::Success)],
};
