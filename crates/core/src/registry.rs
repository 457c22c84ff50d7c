//! Caller-scoped session registry with idle reaping and orderly shutdown.
//!
//! One registry instance is the single source of truth for "which
//! external session, if any, does this caller currently have". A single
//! async mutex guards the whole entry map, so session handle, activity
//! timestamp, and closure watcher can never drift apart. A background
//! reaper removes sessions that closed on their own or sat idle past
//! the configured timeout.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use sg_protocol::{CallerId, ConnectParams};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::RegistryConfig;
use crate::error::ConnectError;
use crate::session::{ExternalSession, SessionConnector};

/// Bounded wait for the reaper task to observe shutdown before it is
/// forcibly aborted.
const REAPER_STOP_GRACE: Duration = Duration::from_secs(2);

/// Everything the registry tracks for one caller.
struct Entry<S> {
	session: Arc<S>,
	last_activity: Instant,
	watcher: JoinHandle<()>,
}

struct State<S> {
	entries: HashMap<CallerId, Entry<S>>,
	shut_down: bool,
}

struct Inner<C: SessionConnector> {
	connector: Arc<C>,
	config: RegistryConfig,
	state: Mutex<State<C::Session>>,
	shutdown: CancellationToken,
}

/// Concurrent caller-id to session map, safe under arbitrary parallel
/// command handling plus one background reaper.
///
/// Create one per process (or per test, with a fake connector); tear it
/// down once with [`shutdown`].
///
/// [`shutdown`]: SessionRegistry::shutdown
pub struct SessionRegistry<C: SessionConnector> {
	inner: Arc<Inner<C>>,
	reaper: Mutex<Option<JoinHandle<()>>>,
}

impl<C: SessionConnector> SessionRegistry<C> {
	/// Creates a registry and starts its reaper.
	///
	/// Must be called inside a tokio runtime.
	pub fn new(connector: Arc<C>, config: RegistryConfig) -> Self {
		let inner = Arc::new(Inner {
			connector,
			config,
			state: Mutex::new(State {
				entries: HashMap::new(),
				shut_down: false,
			}),
			shutdown: CancellationToken::new(),
		});
		let reaper = tokio::spawn(reap_loop(Arc::downgrade(&inner)));
		Self {
			inner,
			reaper: Mutex::new(Some(reaper)),
		}
	}

	/// Opens a session for `caller`, replacing any existing one.
	///
	/// An existing entry is closed and removed before the connector
	/// runs, so at most one session per caller exists at any point.
	/// Connector I/O runs under the registry lock: concurrent connects
	/// for the same caller serialize here, which is what keeps replace
	/// atomic. On connector failure nothing is installed and the error
	/// propagates unchanged.
	pub async fn connect(&self, caller: &CallerId, params: &ConnectParams) -> Result<Arc<C::Session>, ConnectError> {
		let mut state = self.inner.state.lock().await;
		if state.shut_down {
			return Err(ConnectError::ShutDown);
		}

		if let Some(prior) = state.entries.remove(caller) {
			info!(target: "sg.registry", caller = %caller, "replacing existing session");
			prior.watcher.abort();
			if !prior.session.is_closed() {
				prior.session.close().await;
			}
		}

		let session = self.inner.connector.open(params).await?;
		let watcher = spawn_close_watcher(Arc::downgrade(&self.inner), caller.clone(), &session);
		let replaced = state.entries.insert(
			caller.clone(),
			Entry {
				session: Arc::clone(&session),
				last_activity: Instant::now(),
				watcher,
			},
		);
		debug_assert!(replaced.is_none());

		info!(target: "sg.registry", caller = %caller, address = %params.address, "session connected");
		Ok(session)
	}

	/// Looks up the caller's session, refreshing its activity timestamp.
	///
	/// The lookup itself counts as activity; a caller that keeps issuing
	/// commands never idles out.
	pub async fn get(&self, caller: &CallerId) -> Option<Arc<C::Session>> {
		let mut state = self.inner.state.lock().await;
		let entry = state.entries.get_mut(caller)?;
		entry.last_activity = Instant::now();
		Some(Arc::clone(&entry.session))
	}

	/// Removes and closes the caller's session, if any.
	///
	/// Idempotent: disconnecting an absent caller reports `None` and is
	/// not an error. Returns the session that was removed.
	pub async fn disconnect(&self, caller: &CallerId) -> Option<Arc<C::Session>> {
		let removed = {
			let mut state = self.inner.state.lock().await;
			state.entries.remove(caller)
		};
		match removed {
			Some(entry) => {
				entry.watcher.abort();
				if !entry.session.is_closed() {
					entry.session.close().await;
				}
				info!(target: "sg.registry", caller = %caller, "session disconnected");
				Some(entry.session)
			}
			None => {
				debug!(target: "sg.registry", caller = %caller, "nothing to disconnect");
				None
			}
		}
	}

	/// Number of live entries. Primarily for diagnostics and tests.
	pub async fn len(&self) -> usize {
		self.inner.state.lock().await.entries.len()
	}

	/// Whether the registry holds no sessions.
	pub async fn is_empty(&self) -> bool {
		self.len().await == 0
	}

	/// Stops the reaper and closes every remaining session.
	///
	/// The map is drained before any session is closed, so a closure
	/// notification arriving mid-shutdown finds nothing to remove.
	/// Idempotent; afterwards `connect` fails with
	/// [`ConnectError::ShutDown`] and lookups report absence.
	pub async fn shutdown(&self) {
		self.inner.shutdown.cancel();

		if let Some(mut handle) = self.reaper.lock().await.take() {
			if tokio::time::timeout(REAPER_STOP_GRACE, &mut handle).await.is_err() {
				warn!(target: "sg.registry", "reaper did not stop in time; aborting");
				handle.abort();
			}
		}

		let drained: Vec<(CallerId, Entry<C::Session>)> = {
			let mut state = self.inner.state.lock().await;
			state.shut_down = true;
			state.entries.drain().collect()
		};

		for (caller, entry) in drained {
			entry.watcher.abort();
			if !entry.session.is_closed() {
				entry.session.close().await;
			}
			debug!(target: "sg.registry", caller = %caller, "session closed at shutdown");
		}

		info!(target: "sg.registry", "registry shut down");
	}
}

/// Watches one session's closure signal and evicts its entry when the
/// session reports closed on its own.
fn spawn_close_watcher<C: SessionConnector>(inner: Weak<Inner<C>>, caller: CallerId, session: &Arc<C::Session>) -> JoinHandle<()> {
	let mut signal = session.closed_signal();
	let session = Arc::clone(session);
	tokio::spawn(async move {
		loop {
			if *signal.borrow() {
				break;
			}
			if signal.changed().await.is_err() {
				// Signal sender gone without reporting closure; only
				// treat that as closed when the session agrees.
				if session.is_closed() {
					break;
				}
				return;
			}
		}

		let Some(inner) = inner.upgrade() else {
			return;
		};
		let mut state = inner.state.lock().await;
		if state.shut_down {
			return;
		}
		// The entry may have been replaced or disconnected since this
		// watcher was registered; evict only the session it belongs to.
		let matches = state.entries.get(&caller).is_some_and(|entry| Arc::ptr_eq(&entry.session, &session));
		if matches {
			let _ = state.entries.remove(&caller);
			debug!(target: "sg.registry", caller = %caller, "session reported closed; entry removed");
		}
	})
}

/// Reaper task body: one pass per period until shutdown.
async fn reap_loop<C: SessionConnector>(inner: Weak<Inner<C>>) {
	let Some(strong) = inner.upgrade() else {
		return;
	};
	let period = strong.config.reap_interval;
	let token = strong.shutdown.clone();
	drop(strong);

	let mut ticker = tokio::time::interval(period);
	loop {
		tokio::select! {
			() = token.cancelled() => {
				debug!(target: "sg.registry", "reaper stopped");
				return;
			}
			_ = ticker.tick() => {}
		}
		let Some(inner) = inner.upgrade() else {
			return;
		};
		reap_pass(&inner).await;
	}
}

/// One reaper pass: evict closed and idle entries.
///
/// Two-phase so the lock is never held across `close`: candidates are
/// marked from a snapshot, then re-checked under the lock before
/// removal. The re-check guards against a concurrent `connect` having
/// replaced the entry (`Arc::ptr_eq`) and lets a concurrent `get`
/// rescue an entry by refreshing its activity between snapshot and
/// removal. Idle sessions are closed after removal, outside the lock,
/// so no lookup can return a session this pass already closed.
async fn reap_pass<C: SessionConnector>(inner: &Inner<C>) {
	let idle_timeout = inner.config.idle_timeout;
	let now = Instant::now();

	let candidates: Vec<(CallerId, Arc<C::Session>)> = {
		let state = inner.state.lock().await;
		if state.shut_down {
			return;
		}
		state
			.entries
			.iter()
			.filter(|(_, entry)| entry.session.is_closed() || now.saturating_duration_since(entry.last_activity) > idle_timeout)
			.map(|(caller, entry)| (caller.clone(), Arc::clone(&entry.session)))
			.collect()
	};
	if candidates.is_empty() {
		return;
	}

	let mut evicted: Vec<(CallerId, Arc<C::Session>)> = Vec::new();
	{
		let mut state = inner.state.lock().await;
		if state.shut_down {
			return;
		}
		for (caller, session) in candidates {
			let still_doomed = state.entries.get(&caller).is_some_and(|entry| {
				Arc::ptr_eq(&entry.session, &session)
					&& (entry.session.is_closed() || now.saturating_duration_since(entry.last_activity) > idle_timeout)
			});
			if still_doomed {
				if let Some(entry) = state.entries.remove(&caller) {
					entry.watcher.abort();
					evicted.push((caller, entry.session));
				}
			}
		}
	}

	for (caller, session) in evicted {
		if session.is_closed() {
			debug!(target: "sg.registry", caller = %caller, "reaped externally closed session");
		} else {
			info!(
				target: "sg.registry",
				caller = %caller,
				idle_timeout_secs = idle_timeout.as_secs(),
				"closing idle session"
			);
			session.close().await;
		}
	}
}
