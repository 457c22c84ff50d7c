//! Error taxonomy for the session gateway core.
//!
//! Two distinct failure surfaces: [`ConnectError`] is raised by
//! `SessionRegistry::connect` and propagates to the caller unchanged;
//! [`OpError`] is produced by domain operations on an open session and
//! is classified by the invocation bridge, never surfaced raw.

use thiserror::Error;

/// Failure opening an external session.
///
/// The registry installs nothing when the connector fails; the error
/// reaches the `connect` caller as-is.
#[derive(Debug, Error)]
pub enum ConnectError {
	/// The target address could not be reached or refused the connection.
	#[error("connection to {address} failed: {message}")]
	Unreachable {
		/// Address the connector tried to reach.
		address: String,
		/// Transport-level detail.
		message: String,
	},
	/// The remote endpoint rejected the principal or secret.
	#[error("authentication failed for {principal}: {message}")]
	Auth {
		/// Principal that was rejected.
		principal: String,
		/// Rejection detail from the endpoint.
		message: String,
	},
	/// The registry has been shut down; no new sessions are accepted.
	#[error("session registry is shut down")]
	ShutDown,
	/// Any other connector failure.
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

/// Failure of a domain operation invoked on an open session.
///
/// The first four kinds are expected, recoverable conditions and map to
/// `Outcome::UserError`; [`OpError::Other`] is an unexpected fault and
/// maps to `Outcome::SystemError` with full diagnostic logging.
#[derive(Debug, Error)]
pub enum OpError {
	/// The caller supplied an argument the operation rejects.
	#[error("{0}")]
	InvalidArgument(String),
	/// The principal lacks permission for the operation.
	#[error("{0}")]
	PermissionDenied(String),
	/// The operation's subject does not exist on the remote side.
	#[error("{0}")]
	NotFound(String),
	/// Session-level domain rejection (expired, revoked, wrong state).
	#[error("{0}")]
	Session(String),
	/// Unexpected failure: a bug or an infrastructure fault.
	#[error(transparent)]
	Other(#[from] anyhow::Error),
}

impl OpError {
	/// Whether this failure is an expected, recoverable condition.
	pub fn is_user_error(&self) -> bool {
		!matches!(self, Self::Other(_))
	}
}
