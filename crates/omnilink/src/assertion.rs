// External assertion types — what the upstream authentication transport
// delivers after a handshake: either a verified assertion or a failure
// object.

use serde::{Deserialize, Serialize};

/// A verified claim of identity issued by an external provider.
///
/// Produced by the upstream transport once per inbound callback; owned
/// transiently by the flow and discarded when it completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalAssertion {
    /// Identifier of the issuing provider (e.g., "github", "ldap").
    pub provider: String,
    /// Provider-scoped unique user identifier.
    pub external_user_id: String,
    /// Provider-supplied claims (email, name, picture, ...).
    #[serde(default)]
    pub raw_attributes: serde_json::Map<String, serde_json::Value>,
}

impl ExternalAssertion {
    pub fn new(provider: impl Into<String>, external_user_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            external_user_id: external_user_id.into(),
            raw_attributes: serde_json::Map::new(),
        }
    }

    /// Attach a claim.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.raw_attributes.insert(key.into(), value.into());
        self
    }

    /// A string claim, if present and non-empty.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.raw_attributes
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// An opaque upstream handshake failure.
///
/// Carries whatever the transport could extract: a structured reason, a
/// generic error code, a plain message, and the request-scoped error type
/// tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Last-resort type tag from request-scoped error metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Derive a human-readable message from an upstream failure.
///
/// Candidates are tried in order (reason, error code, message, type tag);
/// the first non-empty one wins and is humanized. Returns an empty string
/// when nothing is available.
pub fn failure_message(failure: &UpstreamFailure) -> String {
    let extractors: [fn(&UpstreamFailure) -> Option<&str>; 4] = [
        |f| f.reason.as_deref(),
        |f| f.error.as_deref(),
        |f| f.message.as_deref(),
        |f| f.error_type.as_deref(),
    ];

    extractors
        .iter()
        .filter_map(|extract| extract(failure))
        .find(|candidate| !candidate.is_empty())
        .map(humanize)
        .unwrap_or_default()
}

/// Render a code-like string as capitalized words:
/// `invalid_credentials` -> `Invalid credentials`.
pub fn humanize(s: &str) -> String {
    let spaced = s.replace(['_', '-'], " ");
    let trimmed = spaced.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
