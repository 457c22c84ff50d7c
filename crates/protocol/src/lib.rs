//! Result and identity types for the session gateway.
//!
//! This crate contains the serde-serializable types exchanged with the
//! outer protocol layer - the shapes of command results and caller
//! identity as they appear at the gateway boundary.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: No behavior beyond (de)serialization and small accessors
//! * Protocol-facing: What command handlers marshal to the wire
//! * Stable: Changes only when the result contract changes
//!
//! The registry and invocation bridge that produce these values live in
//! `sg-core`.

pub mod caller;
pub mod connect;
pub mod outcome;

pub use caller::*;
pub use connect::*;
pub use outcome::*;
