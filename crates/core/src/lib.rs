//! Session gateway core: a caller-scoped session registry and the
//! invocation bridge that runs async operations against those sessions.
//!
//! The gateway lets a stateless command protocol drive long-lived
//! external connections. Each remote caller owns at most one session,
//! tracked by the [`registry::SessionRegistry`]; every domain operation
//! runs through the [`invoke::InvocationBridge`], which enforces a fixed
//! timeout and classifies failures uniformly. Command handlers compose
//! the two via [`service::SessionService`].
//!
//! The external system itself is a collaborator: implement
//! [`session::SessionConnector`] and [`session::ExternalSession`] for it.

/// Operational timing constants and registry configuration.
pub mod config;
/// Connector and operation error taxonomy.
pub mod error;
/// Fake connector/session for testing without a live backend.
pub mod fake;
/// Timeout-bounded invocation and outcome classification.
pub mod invoke;
/// Caller-id to session mapping with reaping and shutdown.
pub mod registry;
/// Uniform lookup-then-invoke path for command handlers.
pub mod service;
/// Collaborator traits for the external system.
pub mod session;

pub use config::RegistryConfig;
pub use error::{ConnectError, OpError};
pub use invoke::{InvocationBridge, OpLabel};
pub use registry::SessionRegistry;
pub use service::SessionService;
pub use session::{ExternalSession, SessionConnector};
/// Protocol-facing types re-exported for handler convenience.
pub use sg_protocol::{CallerId, ConnectParams, Outcome};
