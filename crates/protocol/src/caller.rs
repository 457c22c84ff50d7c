//! Opaque caller identity assigned by the outer protocol layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for one logical remote client/context.
///
/// The outer protocol layer supplies one per command invocation; the
/// registry keys session ownership on it. The value is opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
	/// Wraps a protocol-layer identifier.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// Returns the raw identifier.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CallerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for CallerId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for CallerId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn serializes_transparently() {
		let id = CallerId::new("client-7");
		assert_eq!(serde_json::to_string(&id).unwrap(), r#""client-7""#);
		let back: CallerId = serde_json::from_str(r#""client-7""#).unwrap();
		assert_eq!(back, id);
	}

	#[test]
	fn displays_raw_value() {
		assert_eq!(CallerId::from("abc").to_string(), "abc");
	}
}
