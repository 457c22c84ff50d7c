//! Collaborator traits for the external system.
//!
//! The gateway never speaks to the external system directly; it goes
//! through these two seams. Implementations wrap whatever SDK actually
//! holds the connection.

use std::sync::Arc;

use async_trait::async_trait;
use sg_protocol::ConnectParams;
use tokio::sync::watch;

use crate::error::ConnectError;

/// Opaque handle to one live external connection.
///
/// Handles are shared as `Arc` and must be individually thread-safe:
/// the registry only serializes its own bookkeeping, not operations on
/// the session. A session may transition to closed on its own at any
/// time; the registry observes that through [`closed_signal`].
///
/// [`closed_signal`]: ExternalSession::closed_signal
#[async_trait]
pub trait ExternalSession: Send + Sync + 'static {
	/// Whether the underlying connection is known to be closed.
	fn is_closed(&self) -> bool;

	/// Closes the connection.
	///
	/// Terminal and safe to call more than once. Implementations log
	/// and swallow transport errors; nothing propagates to the registry.
	async fn close(&self);

	/// Subscription point for asynchronous closure.
	///
	/// The receiver observes `true` once the session has transitioned
	/// to closed, whether by [`close`] or by the remote side.
	///
	/// [`close`]: ExternalSession::close
	fn closed_signal(&self) -> watch::Receiver<bool>;
}

/// Opens external sessions from connection parameters.
#[async_trait]
pub trait SessionConnector: Send + Sync + 'static {
	/// Session handle type this connector produces.
	type Session: ExternalSession;

	/// Opens a session, blocking on whatever I/O that takes.
	async fn open(&self, params: &ConnectParams) -> Result<Arc<Self::Session>, ConnectError>;
}
