//! Operational timing constants, injected at construction rather than
//! scattered as literals so tests can shrink them or run on virtual time.

use std::time::Duration;

/// Maximum duration a session may remain unused before the reaper
/// closes it.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Period between reaper passes.
pub const DEFAULT_REAP_INTERVAL: Duration = Duration::from_secs(30);

/// Per-operation bound enforced by the invocation bridge.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Timing configuration for a [`SessionRegistry`].
///
/// [`SessionRegistry`]: crate::registry::SessionRegistry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
	/// Idle duration after which the reaper closes a session.
	pub idle_timeout: Duration,
	/// Period between reaper passes.
	pub reap_interval: Duration,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			idle_timeout: DEFAULT_IDLE_TIMEOUT,
			reap_interval: DEFAULT_REAP_INTERVAL,
		}
	}
}
