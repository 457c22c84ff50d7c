//! Uniform command-handler path: registry lookup, then bridged
//! invocation.
//!
//! Every protocol command reduces to "find the caller's session, run
//! one async operation on it, report a classified outcome". This
//! facade is that contract in one place, so handlers cannot diverge on
//! how a missing session or a failure is reported.

use std::future::Future;
use std::sync::Arc;

use sg_protocol::{CallerId, Outcome};

use crate::error::OpError;
use crate::invoke::{InvocationBridge, OpLabel};
use crate::registry::SessionRegistry;
use crate::session::SessionConnector;

/// Service facade command handlers go through to reach a session.
pub struct SessionService<C: SessionConnector> {
	registry: SessionRegistry<C>,
	bridge: InvocationBridge,
}

impl<C: SessionConnector> SessionService<C> {
	/// Combines a registry and a bridge into one handler-facing surface.
	pub fn new(registry: SessionRegistry<C>, bridge: InvocationBridge) -> Self {
		Self { registry, bridge }
	}

	/// The underlying registry, for connect/disconnect/shutdown handlers.
	pub fn registry(&self) -> &SessionRegistry<C> {
		&self.registry
	}

	/// The bridge this service invokes through.
	pub fn bridge(&self) -> &InvocationBridge {
		&self.bridge
	}

	/// Looks up the caller's session and runs `f` through the bridge.
	///
	/// A missing session is an expected condition, not a fault: it
	/// reports as a user error telling the caller to connect first.
	pub async fn call<T, F, Fut>(&self, caller: &CallerId, label: OpLabel<'_>, f: F) -> Outcome<T>
	where
		F: FnOnce(Arc<C::Session>) -> Fut,
		Fut: Future<Output = Result<T, OpError>>,
	{
		let Some(session) = self.registry.get(caller).await else {
			return Outcome::user_error(format!("no session for caller {caller}; connect first"));
		};
		self.bridge.invoke(label, f(session)).await
	}
}
