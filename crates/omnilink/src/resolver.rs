// Account resolution — the collaborator that turns an external assertion
// into a local account, new or existing.
//
// `AccountResolver` is the contract; `JitResolver` is the default
// just-in-time implementation that provisions accounts from assertion
// claims. Deployments with their own user directory plug in here.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use omnilink_core::db::models::Account;

use crate::assertion::ExternalAssertion;
use crate::internal_adapter::{InternalAdapter, StoreError};

/// A single field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Render as `"<field> <message>"`.
    pub fn render(&self) -> String {
        format!("{} {}", self.field, self.message)
    }
}

/// Join field errors as `"<field> <message>"` pairs separated by `", "`.
/// Empty string when there are none.
pub fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::render)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The outcome of resolving an assertion to a local account.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The resolved account. Unpersisted when validation failed.
    pub account: Account,
    /// Whether the account exists in storage.
    pub persisted: bool,
    /// Field-level validation errors, in the order they were produced.
    pub errors: Vec<FieldError>,
    /// Directory gate verdict: `None` for accounts that are not
    /// directory-managed, `Some(allowed)` otherwise.
    pub directory_allowed: Option<bool>,
}

impl Resolution {
    /// A persisted, valid account with no gate.
    pub fn persisted(account: Account) -> Self {
        Self {
            account,
            persisted: true,
            errors: Vec::new(),
            directory_allowed: None,
        }
    }

    /// An unpersisted account carrying validation errors.
    pub fn invalid(account: Account, errors: Vec<FieldError>) -> Self {
        Self {
            account,
            persisted: false,
            errors,
            directory_allowed: None,
        }
    }

    pub fn with_directory_allowed(mut self, allowed: bool) -> Self {
        self.directory_allowed = Some(allowed);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Resolution failures that are not validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// Self-service signup is closed for this provider. An expected,
    /// benign condition — never rendered as an error banner.
    #[error("signup is disabled for provider {provider}")]
    SignupDisabled { provider: String },

    /// A structural failure (storage unavailable, dangling link).
    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for ResolveError {
    fn from(e: StoreError) -> Self {
        Self::Internal(e.to_string())
    }
}

/// The account-resolution collaborator.
#[async_trait]
pub trait AccountResolver: Send + Sync {
    /// Resolve or create a local account for the assertion.
    async fn resolve(&self, assertion: &ExternalAssertion) -> Result<Resolution, ResolveError>;
}

// ─── Just-In-Time Resolver ──────────────────────────────────────

/// Default resolver: provisions a local account from assertion claims on
/// first sign-in, and returns the already-linked account afterwards.
///
/// Assertions from a trusted provider may attach to an existing account by
/// email; for everyone else a claimed email that is already taken is a
/// validation error.
pub struct JitResolver {
    adapter: Arc<dyn InternalAdapter>,
    /// Whether this provider may provision accounts at all. Distinct from
    /// the site-wide signup flag, which only controls the remediation hint.
    allow_signup: bool,
    /// Providers whose email claims may match existing accounts.
    trusted_providers: Vec<String>,
}

impl JitResolver {
    pub fn new(adapter: Arc<dyn InternalAdapter>) -> Self {
        Self {
            adapter,
            allow_signup: true,
            trusted_providers: Vec::new(),
        }
    }

    pub fn with_allow_signup(mut self, allow_signup: bool) -> Self {
        self.allow_signup = allow_signup;
        self
    }

    pub fn with_trusted_providers(mut self, providers: Vec<String>) -> Self {
        self.trusted_providers = providers;
        self
    }

    fn is_trusted(&self, provider: &str) -> bool {
        self.trusted_providers.iter().any(|p| p == provider)
    }

    /// Build the candidate account from assertion claims.
    fn account_from_claims(assertion: &ExternalAssertion) -> Account {
        let email = assertion.attribute("email").unwrap_or_default();
        let name = assertion
            .attribute("name")
            .map(str::to_string)
            .or_else(|| email.split('@').next().map(str::to_string))
            .unwrap_or_default();
        Account::new(name, email)
    }

    /// Validate the candidate against claims and storage state.
    async fn validate(&self, account: &Account) -> Result<Vec<FieldError>, ResolveError> {
        let mut errors = Vec::new();

        if account.email.is_empty() {
            errors.push(FieldError::new("email", "can't be blank"));
        } else if !account.email.contains('@') {
            errors.push(FieldError::new("email", "is invalid"));
        } else if self
            .adapter
            .find_account_by_email(&account.email)
            .await?
            .is_some()
        {
            errors.push(FieldError::new("email", "has already been taken"));
        }

        if account.name.is_empty() {
            errors.push(FieldError::new("name", "can't be blank"));
        }

        Ok(errors)
    }
}

#[async_trait]
impl AccountResolver for JitResolver {
    async fn resolve(&self, assertion: &ExternalAssertion) -> Result<Resolution, ResolveError> {
        // A returning identity resolves to its linked account.
        if let Some(link) = self
            .adapter
            .find_link(&assertion.provider, &assertion.external_user_id)
            .await?
        {
            let account = self
                .adapter
                .find_account_by_id(&link.user_id)
                .await?
                .ok_or_else(|| {
                    ResolveError::Internal(format!(
                        "identity link {} references missing account {}",
                        link.id, link.user_id
                    ))
                })?;
            return Ok(Resolution::persisted(account));
        }

        // A trusted provider's email claim may attach to an existing account.
        if self.is_trusted(&assertion.provider) {
            if let Some(email) = assertion.attribute("email") {
                if let Some(existing) = self.adapter.find_account_by_email(email).await? {
                    self.adapter
                        .find_or_create_link(
                            &assertion.provider,
                            &assertion.external_user_id,
                            &existing.id,
                        )
                        .await?;
                    return Ok(Resolution::persisted(existing));
                }
            }
        }

        if !self.allow_signup {
            return Err(ResolveError::SignupDisabled {
                provider: assertion.provider.clone(),
            });
        }

        let candidate = Self::account_from_claims(assertion);
        let errors = self.validate(&candidate).await?;
        if !errors.is_empty() {
            return Ok(Resolution::invalid(candidate, errors));
        }

        let account = self.adapter.create_account(candidate).await?;
        self.adapter
            .find_or_create_link(
                &assertion.provider,
                &assertion.external_user_id,
                &account.id,
            )
            .await?;

        Ok(Resolution::persisted(account))
    }
}
