// Internal adapter — typed, high-level storage operations built on top of
// the raw Adapter trait.
//
// The raw adapter speaks `serde_json::Value`; this layer converts to and
// from the typed models and knows the model names and lookup keys the flow
// uses.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use omnilink_core::db::adapter::{Adapter, WhereClause};
use omnilink_core::db::model_names;
use omnilink_core::db::models::{Account, IdentityLink, Session};
use omnilink_core::error::OmnilinkError;

/// Errors from the internal adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Record not found")]
    NotFound,

    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<OmnilinkError> for StoreError {
    fn from(e: OmnilinkError) -> Self {
        match e {
            OmnilinkError::Conflict(msg) => Self::Duplicate(msg),
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<StoreError> for OmnilinkError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate(msg) => Self::Conflict(msg),
            other => Self::Database(other.to_string()),
        }
    }
}

/// Options for creating a session.
#[derive(Debug, Clone, Default)]
pub struct CreateSessionOptions {
    /// Client IP address, when the transport provides it.
    pub ip_address: Option<String>,
    /// Client User-Agent, when the transport provides it.
    pub user_agent: Option<String>,
}

/// Typed high-level storage operations used by the linking flow.
#[async_trait]
pub trait InternalAdapter: Send + Sync {
    // ─── Account Operations ──────────────────────────────────────

    async fn find_account_by_id(&self, id: &str) -> Result<Option<Account>, StoreError>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn create_account(&self, account: Account) -> Result<Account, StoreError>;

    // ─── Identity Link Operations ────────────────────────────────

    /// Find the link for a `(provider, externalUserId)` pair, if any.
    async fn find_link(
        &self,
        provider_id: &str,
        external_user_id: &str,
    ) -> Result<Option<IdentityLink>, StoreError>;

    async fn create_link(&self, link: IdentityLink) -> Result<IdentityLink, StoreError>;

    /// Idempotent find-or-create for the link attaching
    /// `(provider, externalUserId)` to `user_id`. Calling twice with the
    /// same inputs never creates a duplicate. Fails with
    /// `StoreError::Duplicate` when the pair is already attached to a
    /// different account.
    async fn find_or_create_link(
        &self,
        provider_id: &str,
        external_user_id: &str,
        user_id: &str,
    ) -> Result<IdentityLink, StoreError>;

    async fn links_for_account(&self, user_id: &str) -> Result<Vec<IdentityLink>, StoreError>;

    // ─── Session Operations ──────────────────────────────────────

    /// Create a session for `user_id` expiring `expires_in_secs` from now.
    async fn create_session(
        &self,
        user_id: &str,
        options: CreateSessionOptions,
        expires_in_secs: i64,
    ) -> Result<Session, StoreError>;

    async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>, StoreError>;

    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;
}

// ─── Concrete Implementation ────────────────────────────────────

/// Internal adapter backed by a raw `Adapter` (memory, SQL, ...).
pub struct ConcreteInternalAdapter {
    adapter: Arc<dyn Adapter>,
}

impl ConcreteInternalAdapter {
    pub fn new(adapter: Arc<dyn Adapter>) -> Self {
        Self { adapter }
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn link_key_clauses(provider_id: &str, external_user_id: &str) -> Vec<WhereClause> {
    vec![
        WhereClause::eq("providerId", provider_id).and(),
        WhereClause::eq("externalUserId", external_user_id),
    ]
}

#[async_trait]
impl InternalAdapter for ConcreteInternalAdapter {
    async fn find_account_by_id(&self, id: &str) -> Result<Option<Account>, StoreError> {
        let found = self
            .adapter
            .find_one(model_names::ACCOUNT, &[WhereClause::eq("id", id)])
            .await?;
        found.map(from_value).transpose()
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let found = self
            .adapter
            .find_one(
                model_names::ACCOUNT,
                &[WhereClause::eq("email", email.to_lowercase())],
            )
            .await?;
        found.map(from_value).transpose()
    }

    async fn create_account(&self, account: Account) -> Result<Account, StoreError> {
        let created = self
            .adapter
            .create(model_names::ACCOUNT, to_value(&account)?)
            .await?;
        from_value(created)
    }

    async fn find_link(
        &self,
        provider_id: &str,
        external_user_id: &str,
    ) -> Result<Option<IdentityLink>, StoreError> {
        let found = self
            .adapter
            .find_one(
                model_names::IDENTITY_LINK,
                &link_key_clauses(provider_id, external_user_id),
            )
            .await?;
        found.map(from_value).transpose()
    }

    async fn create_link(&self, link: IdentityLink) -> Result<IdentityLink, StoreError> {
        let created = self
            .adapter
            .create(model_names::IDENTITY_LINK, to_value(&link)?)
            .await?;
        from_value(created)
    }

    async fn find_or_create_link(
        &self,
        provider_id: &str,
        external_user_id: &str,
        user_id: &str,
    ) -> Result<IdentityLink, StoreError> {
        if let Some(existing) = self.find_link(provider_id, external_user_id).await? {
            if existing.user_id == user_id {
                return Ok(existing);
            }
            return Err(StoreError::Duplicate(format!(
                "identity ({provider_id}, {external_user_id}) is linked to another account"
            )));
        }

        let link = IdentityLink::new(provider_id, external_user_id, user_id);
        match self.create_link(link).await {
            Ok(created) => Ok(created),
            // Lost a race: another request created the link between our
            // lookup and insert. Re-read and apply the same ownership check.
            Err(StoreError::Duplicate(_)) => {
                match self.find_link(provider_id, external_user_id).await? {
                    Some(existing) if existing.user_id == user_id => Ok(existing),
                    Some(_) => Err(StoreError::Duplicate(format!(
                        "identity ({provider_id}, {external_user_id}) is linked to another account"
                    ))),
                    None => Err(StoreError::NotFound),
                }
            }
            Err(other) => Err(other),
        }
    }

    async fn links_for_account(&self, user_id: &str) -> Result<Vec<IdentityLink>, StoreError> {
        let query = omnilink_core::db::adapter::FindManyQuery {
            where_clauses: vec![WhereClause::eq("userId", user_id)],
            ..Default::default()
        };
        let found = self
            .adapter
            .find_many(model_names::IDENTITY_LINK, query)
            .await?;
        found.into_iter().map(from_value).collect()
    }

    async fn create_session(
        &self,
        user_id: &str,
        options: CreateSessionOptions,
        expires_in_secs: i64,
    ) -> Result<Session, StoreError> {
        let mut session = Session::new(user_id, expires_in_secs);
        session.ip_address = options.ip_address;
        session.user_agent = options.user_agent;

        let created = self
            .adapter
            .create(model_names::SESSION, to_value(&session)?)
            .await?;
        from_value(created)
    }

    async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let found = self
            .adapter
            .find_one(model_names::SESSION, &[WhereClause::eq("token", token)])
            .await?;
        found.map(from_value).transpose()
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        self.adapter
            .delete(model_names::SESSION, &[WhereClause::eq("token", token)])
            .await?;
        Ok(())
    }
}
