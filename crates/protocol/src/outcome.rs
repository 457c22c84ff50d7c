//! Classified result of one bridged session operation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The result envelope produced by the invocation bridge for every
/// command.
///
/// Exactly one of four shapes: the operation's payload, an expected
/// domain rejection, an unexpected failure, or a timeout. The outer
/// protocol layer marshals this directly; it never sees raw errors
/// from the external SDK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
	/// Operation completed within the timeout.
	Success {
		/// Payload returned by the operation, passed through untouched.
		value: T,
	},
	/// Expected, recoverable rejection (bad argument, permission denial,
	/// domain-level refusal).
	UserError {
		/// Human-readable message, preserved verbatim from the failure.
		message: String,
	},
	/// Unexpected failure indicating a bug or infrastructure fault.
	SystemError {
		/// Human-readable message including the failure chain.
		message: String,
	},
	/// The operation exceeded the fixed invocation bound.
	Timeout {
		/// The configured bound that elapsed, in seconds.
		seconds: u64,
	},
}

impl<T> Outcome<T> {
	/// Wraps a successful payload.
	pub fn success(value: T) -> Self {
		Self::Success { value }
	}

	/// Wraps an expected rejection message.
	pub fn user_error(message: impl Into<String>) -> Self {
		Self::UserError { message: message.into() }
	}

	/// Wraps an unexpected failure message.
	pub fn system_error(message: impl Into<String>) -> Self {
		Self::SystemError { message: message.into() }
	}

	/// Wraps an elapsed timeout bound.
	pub fn timeout(bound: Duration) -> Self {
		Self::Timeout { seconds: bound.as_secs() }
	}

	/// Whether this outcome carries a payload.
	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success { .. })
	}

	/// Error or timeout message, `None` for success.
	pub fn message(&self) -> Option<&str> {
		match self {
			Self::Success { .. } => None,
			Self::UserError { message } | Self::SystemError { message } => Some(message),
			Self::Timeout { .. } => Some("operation timed out"),
		}
	}

	/// Maps the success payload, leaving other shapes untouched.
	pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
		match self {
			Self::Success { value } => Outcome::Success { value: f(value) },
			Self::UserError { message } => Outcome::UserError { message },
			Self::SystemError { message } => Outcome::SystemError { message },
			Self::Timeout { seconds } => Outcome::Timeout { seconds },
		}
	}

	/// Consumes the outcome, returning the payload when present.
	pub fn into_value(self) -> Option<T> {
		match self {
			Self::Success { value } => Some(value),
			_ => None,
		}
	}
}
