//! Fake connector and session for testing registry lifecycle and
//! command handling without a live external system.
//!
//! # Example
//!
//! ```ignore
//! let connector = Arc::new(FakeConnector::new());
//! let registry = SessionRegistry::new(Arc::clone(&connector), RegistryConfig::default());
//!
//! registry.connect(&caller, &params).await?;
//! connector.opened()[0].close_remotely();
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sg_protocol::ConnectParams;
use tokio::sync::watch;

use crate::error::ConnectError;
use crate::session::{ExternalSession, SessionConnector};

/// In-memory session whose closure can be driven from tests.
#[derive(Debug)]
pub struct FakeSession {
	address: String,
	closed_tx: watch::Sender<bool>,
	close_calls: AtomicUsize,
}

impl FakeSession {
	/// Creates an open session for the given address.
	pub fn open(address: impl Into<String>) -> Arc<Self> {
		let (closed_tx, _) = watch::channel(false);
		Arc::new(Self {
			address: address.into(),
			closed_tx,
			close_calls: AtomicUsize::new(0),
		})
	}

	/// Address this session was opened against.
	pub fn address(&self) -> &str {
		&self.address
	}

	/// Number of times [`ExternalSession::close`] was called.
	pub fn close_calls(&self) -> usize {
		self.close_calls.load(Ordering::SeqCst)
	}

	/// Simulates the remote side dropping the connection.
	pub fn close_remotely(&self) {
		let _ = self.closed_tx.send(true);
	}
}

#[async_trait]
impl ExternalSession for FakeSession {
	fn is_closed(&self) -> bool {
		*self.closed_tx.borrow()
	}

	async fn close(&self) {
		let _ = self.close_calls.fetch_add(1, Ordering::SeqCst);
		let _ = self.closed_tx.send(true);
	}

	fn closed_signal(&self) -> watch::Receiver<bool> {
		self.closed_tx.subscribe()
	}
}

/// Connector that hands out [`FakeSession`]s and records every open.
///
/// Failures can be scripted per call with [`fail_next`].
///
/// [`fail_next`]: FakeConnector::fail_next
#[derive(Default)]
pub struct FakeConnector {
	failures: Mutex<VecDeque<ConnectError>>,
	opened: Mutex<Vec<Arc<FakeSession>>>,
}

impl FakeConnector {
	/// Creates a connector that succeeds until told otherwise.
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a failure returned by the next `open` call.
	pub fn fail_next(&self, err: ConnectError) {
		self.failures.lock().expect("failure queue poisoned").push_back(err);
	}

	/// Sessions handed out so far, in connect order.
	pub fn opened(&self) -> Vec<Arc<FakeSession>> {
		self.opened.lock().expect("session log poisoned").clone()
	}
}

#[async_trait]
impl SessionConnector for FakeConnector {
	type Session = FakeSession;

	async fn open(&self, params: &ConnectParams) -> Result<Arc<FakeSession>, ConnectError> {
		if let Some(err) = self.failures.lock().expect("failure queue poisoned").pop_front() {
			return Err(err);
		}
		let session = FakeSession::open(params.address.clone());
		self.opened.lock().expect("session log poisoned").push(Arc::clone(&session));
		Ok(session)
	}
}
