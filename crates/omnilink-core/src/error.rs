// Error codes and error types shared across the workspace.
//
// `ErrorCode` carries the stable machine-readable codes surfaced in redirect
// query strings and catalog lookups; `ApiError` pairs a code with an HTTP
// status for the error page; `OmnilinkError` is the umbrella error for
// everything else.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable error codes for every condition the linking flow can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AccountNotFound,
    FailedToCreateAccount,
    FailedToCreateSession,
    FailedToLinkIdentity,
    IdentityAlreadyLinked,
    ProviderNotFound,
    SignupDisabled,
    AccessDenied,
    InvalidAssertion,
    InternalServerError,
}

impl ErrorCode {
    /// The catalog key for this code (same text as the serde rename).
    pub fn as_key(&self) -> &'static str {
        match self {
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::FailedToCreateAccount => "FAILED_TO_CREATE_ACCOUNT",
            Self::FailedToCreateSession => "FAILED_TO_CREATE_SESSION",
            Self::FailedToLinkIdentity => "FAILED_TO_LINK_IDENTITY",
            Self::IdentityAlreadyLinked => "IDENTITY_ALREADY_LINKED",
            Self::ProviderNotFound => "PROVIDER_NOT_FOUND",
            Self::SignupDisabled => "SIGNUP_DISABLED",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::InvalidAssertion => "INVALID_ASSERTION",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::AccountNotFound => "Account not found",
            Self::FailedToCreateAccount => "Failed to create account",
            Self::FailedToCreateSession => "Failed to create session",
            Self::FailedToLinkIdentity => "Failed to link identity",
            Self::IdentityAlreadyLinked => "Identity already linked",
            Self::ProviderNotFound => "Provider not found",
            Self::SignupDisabled => "Signup disabled",
            Self::AccessDenied => "Access denied",
            Self::InvalidAssertion => "Invalid assertion",
            Self::InternalServerError => "Internal server error",
        };
        write!(f, "{msg}")
    }
}

/// HTTP status codes used by the error page and API surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpStatus {
    Found = 302,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    UnprocessableEntity = 422,
    InternalServerError = 500,
}

impl HttpStatus {
    pub fn status_code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// An error with an HTTP status, a stable code, and a human-readable message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status} {code}: {message}")]
pub struct ApiError {
    pub status: HttpStatus,
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: HttpStatus, code: ErrorCode) -> Self {
        Self {
            message: code.to_string(),
            status,
            code,
        }
    }

    pub fn with_message(status: HttpStatus, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn unprocessable(code: ErrorCode) -> Self {
        Self::new(HttpStatus::UnprocessableEntity, code)
    }

    pub fn forbidden(code: ErrorCode) -> Self {
        Self::new(HttpStatus::Forbidden, code)
    }

    pub fn internal(code: ErrorCode) -> Self {
        Self::new(HttpStatus::InternalServerError, code)
    }

    /// JSON body for an error response.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code,
            "message": self.message,
        })
    }
}

/// Umbrella error for omnilink operations.
#[derive(Debug, thiserror::Error)]
pub enum OmnilinkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    /// A storage-level uniqueness violation.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Unified result type for omnilink operations.
pub type Result<T> = std::result::Result<T, OmnilinkError>;
