//! Connection parameters for opening an external session.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything the connector needs to open one external session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectParams {
	/// Target address of the external system.
	pub address: String,
	/// Principal to authenticate as.
	pub principal: String,
	/// Secret for the principal. Redacted from `Debug` output.
	pub secret: String,
	/// Optional connector-specific properties.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub properties: Option<BTreeMap<String, String>>,
}

impl ConnectParams {
	/// Builds parameters with no extra properties.
	pub fn new(address: impl Into<String>, principal: impl Into<String>, secret: impl Into<String>) -> Self {
		Self {
			address: address.into(),
			principal: principal.into(),
			secret: secret.into(),
			properties: None,
		}
	}

	/// Sets connector-specific properties.
	pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
		self.properties = Some(properties);
		self
	}

	/// Looks up a single property by key.
	pub fn property(&self, key: &str) -> Option<&str> {
		self.properties.as_ref()?.get(key).map(String::as_str)
	}
}

impl fmt::Debug for ConnectParams {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ConnectParams")
			.field("address", &self.address)
			.field("principal", &self.principal)
			.field("secret", &"<redacted>")
			.field("properties", &self.properties)
			.finish()
	}
}
