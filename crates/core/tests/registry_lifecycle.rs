use std::sync::Arc;
use std::time::Duration;

use sg::config::RegistryConfig;
use sg::error::ConnectError;
use sg::fake::FakeConnector;
use sg::registry::SessionRegistry;
use sg::session::ExternalSession;
use sg::{CallerId, ConnectParams};

fn params(address: &str) -> ConnectParams {
	ConnectParams::new(address, "bob", "pw")
}

fn registry_with_connector() -> (Arc<FakeConnector>, SessionRegistry<FakeConnector>) {
	let connector = Arc::new(FakeConnector::new());
	let registry = SessionRegistry::new(Arc::clone(&connector), RegistryConfig::default());
	(connector, registry)
}

#[tokio::test(start_paused = true)]
async fn connect_then_get_returns_same_session() {
	let (connector, registry) = registry_with_connector();
	let caller = CallerId::from("A");

	let connected = registry.connect(&caller, &params("svn://host/repo")).await.expect("connect should succeed");
	let fetched = registry.get(&caller).await.expect("session should be present");

	assert!(Arc::ptr_eq(&connected, &fetched));
	assert!(Arc::ptr_eq(&fetched, &connector.opened()[0]));
	assert_eq!(fetched.address(), "svn://host/repo");
}

#[tokio::test(start_paused = true)]
async fn get_without_connect_is_none() {
	let (_, registry) = registry_with_connector();
	assert!(registry.get(&CallerId::from("stranger")).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn reconnect_replaces_and_closes_prior_exactly_once() {
	let (connector, registry) = registry_with_connector();
	let caller = CallerId::from("A");

	registry.connect(&caller, &params("svn://host/repo")).await.expect("first connect should succeed");
	registry.connect(&caller, &params("svn://host/other")).await.expect("second connect should succeed");

	let opened = connector.opened();
	assert_eq!(opened.len(), 2);
	assert_eq!(opened[0].close_calls(), 1, "prior session should be closed exactly once");
	assert!(opened[0].is_closed());
	assert_eq!(opened[1].close_calls(), 0);

	let current = registry.get(&caller).await.expect("replacement should be present");
	assert!(Arc::ptr_eq(&current, &opened[1]));
	assert_eq!(registry.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn disconnect_closes_and_is_idempotent() {
	let (connector, registry) = registry_with_connector();
	let caller = CallerId::from("A");

	registry.connect(&caller, &params("svn://host/repo")).await.expect("connect should succeed");

	let removed = registry.disconnect(&caller).await.expect("disconnect should report the session");
	assert!(Arc::ptr_eq(&removed, &connector.opened()[0]));
	assert_eq!(removed.close_calls(), 1);
	assert!(registry.get(&caller).await.is_none());

	assert!(registry.disconnect(&caller).await.is_none(), "second disconnect is a no-op");
}

#[tokio::test(start_paused = true)]
async fn idle_session_is_reaped_after_timeout() {
	let (connector, registry) = registry_with_connector();
	let caller = CallerId::from("A");

	registry.connect(&caller, &params("svn://host/repo")).await.expect("connect should succeed");

	// Default idle timeout is 300s with a 30s reap period; no activity.
	tokio::time::sleep(Duration::from_secs(331)).await;

	assert!(registry.get(&caller).await.is_none(), "idle session should be gone");
	assert_eq!(connector.opened()[0].close_calls(), 1);
	assert!(registry.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn lookup_activity_defers_reaping() {
	let (connector, registry) = registry_with_connector();
	let caller = CallerId::from("A");

	registry.connect(&caller, &params("svn://host/repo")).await.expect("connect should succeed");

	// Two lookups, each just inside the idle window, keep the session alive
	// across what would otherwise be two expiries.
	tokio::time::sleep(Duration::from_secs(290)).await;
	assert!(registry.get(&caller).await.is_some());
	tokio::time::sleep(Duration::from_secs(290)).await;
	assert!(registry.get(&caller).await.is_some(), "refreshed session should survive");
	assert_eq!(connector.opened()[0].close_calls(), 0);

	// Then silence past the timeout: the next pass reaps it.
	tokio::time::sleep(Duration::from_secs(331)).await;
	assert!(registry.get(&caller).await.is_none());
	assert_eq!(connector.opened()[0].close_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn externally_closed_session_is_removed_without_lookup() {
	let (connector, registry) = registry_with_connector();
	let caller = CallerId::from("A");

	registry.connect(&caller, &params("svn://host/repo")).await.expect("connect should succeed");

	connector.opened()[0].close_remotely();
	tokio::time::sleep(Duration::from_millis(1)).await;

	assert!(registry.get(&caller).await.is_none(), "closed session must be unobservable");
	assert_eq!(connector.opened()[0].close_calls(), 0, "registry must not re-close a self-closed session");
	assert!(registry.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn connector_failure_installs_nothing() {
	let (connector, registry) = registry_with_connector();
	let caller = CallerId::from("A");

	connector.fail_next(ConnectError::Unreachable {
		address: "svn://host/repo".into(),
		message: "connection refused".into(),
	});

	let err = registry.connect(&caller, &params("svn://host/repo")).await.expect_err("connect should fail");
	assert!(matches!(err, ConnectError::Unreachable { .. }));
	assert!(registry.get(&caller).await.is_none());
	assert!(registry.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn failed_reconnect_still_closes_prior_session() {
	let (connector, registry) = registry_with_connector();
	let caller = CallerId::from("A");

	registry.connect(&caller, &params("svn://host/repo")).await.expect("first connect should succeed");
	connector.fail_next(ConnectError::Auth {
		principal: "bob".into(),
		message: "bad credentials".into(),
	});

	// Replace closes the prior entry before the connector runs, so a
	// failed reconnect leaves the caller with no session at all.
	registry.connect(&caller, &params("svn://host/repo")).await.expect_err("second connect should fail");
	assert_eq!(connector.opened()[0].close_calls(), 1);
	assert!(registry.get(&caller).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_closes_everything_once_and_rejects_new_work() {
	let (connector, registry) = registry_with_connector();
	let a = CallerId::from("A");
	let b = CallerId::from("B");

	registry.connect(&a, &params("svn://host/one")).await.expect("connect A should succeed");
	registry.connect(&b, &params("svn://host/two")).await.expect("connect B should succeed");

	registry.shutdown().await;

	for session in connector.opened() {
		assert_eq!(session.close_calls(), 1, "each session closed exactly once at shutdown");
	}
	assert!(registry.is_empty().await);
	assert!(registry.get(&a).await.is_none());
	assert!(registry.disconnect(&a).await.is_none());

	let err = registry.connect(&a, &params("svn://host/one")).await.expect_err("connect after shutdown must fail");
	assert!(matches!(err, ConnectError::ShutDown));

	// Idempotent: a second shutdown finds nothing left to do.
	registry.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn late_closure_notification_after_shutdown_is_harmless() {
	let (connector, registry) = registry_with_connector();
	let caller = CallerId::from("A");

	registry.connect(&caller, &params("svn://host/repo")).await.expect("connect should succeed");
	registry.shutdown().await;

	// The session's closure signal fires after the registry drained;
	// nothing must panic or re-populate the map.
	connector.opened()[0].close_remotely();
	tokio::time::sleep(Duration::from_millis(1)).await;
	assert!(registry.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn idle_scenario_end_to_end() {
	// connect("A") succeeds, get("A") returns the session, five minutes of
	// silence plus one reaper tick later get("A") reports no session.
	let (connector, registry) = registry_with_connector();
	let caller = CallerId::from("A");

	registry.connect(&caller, &params("url1")).await.expect("connect should succeed");
	assert!(registry.get(&caller).await.is_some());

	tokio::time::sleep(Duration::from_secs(5 * 60 + 31)).await;

	assert!(registry.get(&caller).await.is_none());
	assert_eq!(connector.opened()[0].close_calls(), 1);
	registry.shutdown().await;
}
