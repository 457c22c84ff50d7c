//! Timeout-bounded invocation of deferred session operations.
//!
//! Every command handler funnels its external call through one
//! [`InvocationBridge`], so timeout behavior, failure classification,
//! and log severity are identical across the whole command surface
//! instead of re-decided per command.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use sg_protocol::Outcome;
use tracing::{error, warn};

use crate::config::DEFAULT_CALL_TIMEOUT;
use crate::error::OpError;

/// Identifies one invocation in logs: operation name plus its primary
/// subject (a path, a branch name), enough to triage a log line without
/// correlating back to source.
#[derive(Debug, Clone, Copy)]
pub struct OpLabel<'a> {
	/// Operation name, e.g. `"log.list"`.
	pub op: &'a str,
	/// Primary argument of the operation, when there is one.
	pub subject: Option<&'a str>,
}

impl<'a> OpLabel<'a> {
	/// Labels an operation with no primary subject.
	pub fn new(op: &'a str) -> Self {
		Self { op, subject: None }
	}

	/// Attaches the operation's primary subject.
	pub fn subject(mut self, subject: &'a str) -> Self {
		self.subject = Some(subject);
		self
	}
}

impl fmt::Display for OpLabel<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.subject {
			Some(subject) => write!(f, "{} {}", self.op, subject),
			None => f.write_str(self.op),
		}
	}
}

/// Executes deferred external calls under a fixed bound and classifies
/// every completion into an [`Outcome`].
#[derive(Debug, Clone, Copy)]
pub struct InvocationBridge {
	timeout: Duration,
}

impl Default for InvocationBridge {
	fn default() -> Self {
		Self::new(DEFAULT_CALL_TIMEOUT)
	}
}

impl InvocationBridge {
	/// Creates a bridge with the given per-operation bound.
	pub fn new(timeout: Duration) -> Self {
		Self { timeout }
	}

	/// The per-operation bound this bridge enforces.
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// Races `call` against the timeout and classifies the result.
	///
	/// Timing out drops the future; cancellation is advisory only, the
	/// external side may run the operation to completion anyway.
	/// Expected rejections are logged at warn level without diagnostics;
	/// unexpected failures at error level with the full chain.
	pub async fn invoke<T, F>(&self, label: OpLabel<'_>, call: F) -> Outcome<T>
	where
		F: Future<Output = Result<T, OpError>>,
	{
		match tokio::time::timeout(self.timeout, call).await {
			Ok(Ok(value)) => Outcome::success(value),
			Ok(Err(OpError::Other(err))) => {
				error!(target: "sg.invoke", operation = %label, error = ?err, "operation failed unexpectedly");
				Outcome::system_error(format!("{err:#}"))
			}
			Ok(Err(err)) => {
				warn!(target: "sg.invoke", operation = %label, error = %err, "operation rejected");
				Outcome::user_error(err.to_string())
			}
			Err(_elapsed) => {
				warn!(
					target: "sg.invoke",
					operation = %label,
					timeout_secs = self.timeout.as_secs(),
					"operation timed out"
				);
				Outcome::timeout(self.timeout)
			}
		}
	}
}
