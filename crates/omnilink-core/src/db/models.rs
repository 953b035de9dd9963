// Database models for the three tables the linking flow touches:
// account, identityLink, session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::id::generate_id;

/// A local account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Additional deployment-specific fields (flattened into the record).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Account {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: name.into(),
            email: email.into().to_lowercase(),
            email_verified: false,
            image: None,
            created_at: now,
            updated_at: now,
            extra: serde_json::Map::new(),
        }
    }
}

/// An identity link — ties one `(provider, externalUserId)` pair to exactly
/// one local account. At most one link exists per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityLink {
    pub id: String,
    /// Provider identifier (e.g., "google", "github", "ldap").
    pub provider_id: String,
    /// Provider-scoped user identifier (e.g., Google sub, GitHub id).
    pub external_user_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IdentityLink {
    pub fn new(
        provider_id: impl Into<String>,
        external_user_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            provider_id: provider_id.into(),
            external_user_id: external_user_id.into(),
            user_id: user_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Build a session for `user_id` expiring `expires_in_secs` from now.
    pub fn new(user_id: impl Into<String>, expires_in_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            token: generate_id(),
            user_id: user_id.into(),
            expires_at: now + chrono::Duration::seconds(expires_in_secs),
            ip_address: None,
            user_agent: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}
