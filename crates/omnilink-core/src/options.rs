// OmnilinkOptions — the main configuration struct.
//
// Everything has a serde default so deployments can configure from JSON/TOML
// fragments and override only what they need.

use serde::{Deserialize, Serialize};

/// Top-level configuration for omnilink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OmnilinkOptions {
    /// App name for log prefixes and page titles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,

    /// Base URL of the application (e.g., "https://example.com").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Path prefix for auth routes (default: "/auth").
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Locale for user-facing messages (default: "en").
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Configured provider identifiers. Assertions from providers not in
    /// this list are rejected. An empty list disables the check.
    #[serde(default)]
    pub providers: Vec<String>,

    /// Self-service signup policy.
    #[serde(default)]
    pub signup: SignupOptions,

    /// Session lifetime configuration.
    #[serde(default)]
    pub session: SessionOptions,

    /// Identity-linking configuration.
    #[serde(default)]
    pub linking: LinkingOptions,

    /// Redirect targets for flow outcomes.
    #[serde(default)]
    pub redirects: RedirectOptions,

    /// Logger configuration.
    #[serde(default)]
    pub logger: LoggerOptions,
}

fn default_base_path() -> String {
    "/auth".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

impl Default for OmnilinkOptions {
    fn default() -> Self {
        Self {
            app_name: None,
            base_url: None,
            base_path: default_base_path(),
            locale: default_locale(),
            providers: Vec::new(),
            signup: SignupOptions::default(),
            session: SessionOptions::default(),
            linking: LinkingOptions::default(),
            redirects: RedirectOptions::default(),
            logger: LoggerOptions::default(),
        }
    }
}

impl OmnilinkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider identifier.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.providers.push(provider.into());
        self
    }

    /// Whether `provider` may be used with this configuration.
    pub fn provider_enabled(&self, provider: &str) -> bool {
        self.providers.is_empty() || self.providers.iter().any(|p| p == provider)
    }
}

/// Self-service signup policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupOptions {
    /// Site-wide flag: whether users may create local accounts themselves.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SignupOptions {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Session lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOptions {
    /// Session TTL in seconds (default: 604800 = 7 days).
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    /// Session TTL in seconds when "remember me" is requested
    /// (default: 2592000 = 30 days).
    #[serde(default = "default_remember_expires_in")]
    pub remember_expires_in: i64,
}

fn default_expires_in() -> i64 {
    604_800
}

fn default_remember_expires_in() -> i64 {
    2_592_000
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            expires_in: default_expires_in(),
            remember_expires_in: default_remember_expires_in(),
        }
    }
}

/// Identity-linking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkingOptions {
    /// Whether linking a provider to an existing signed-in account is allowed.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Providers whose assertions are trusted to match accounts by email.
    #[serde(default)]
    pub trusted_providers: Vec<String>,
}

impl Default for LinkingOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            trusted_providers: Vec::new(),
        }
    }
}

/// Redirect targets for the flow's terminal outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectOptions {
    /// Target after a successful link to the current account.
    #[serde(default = "default_account_settings")]
    pub account_settings: String,
    /// Target for benign notices (signup closed, access denied).
    #[serde(default = "default_sign_in")]
    pub sign_in: String,
    /// Target for provisioning failures; receives provider + error params.
    #[serde(default = "default_error_page")]
    pub error_page: String,
}

fn default_account_settings() -> String {
    "/profile/account".to_string()
}

fn default_sign_in() -> String {
    "/users/sign_in".to_string()
}

fn default_error_page() -> String {
    "/auth/error".to_string()
}

impl Default for RedirectOptions {
    fn default() -> Self {
        Self {
            account_settings: default_account_settings(),
            sign_in: default_sign_in(),
            error_page: default_error_page(),
        }
    }
}

/// Logger configuration in serializable form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggerOptions {
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub disable_colors: bool,
    /// Minimum level: "debug", "info", "success", "warn", "error".
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            disabled: false,
            disable_colors: false,
            level: default_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = OmnilinkOptions::new();
        assert_eq!(options.base_path, "/auth");
        assert_eq!(options.locale, "en");
        assert!(options.signup.enabled);
        assert!(options.linking.enabled);
        assert_eq!(options.session.expires_in, 604_800);
        assert_eq!(options.session.remember_expires_in, 2_592_000);
        assert_eq!(options.redirects.sign_in, "/users/sign_in");
    }

    #[test]
    fn test_provider_enabled() {
        let options = OmnilinkOptions::new()
            .with_provider("github")
            .with_provider("google");
        assert!(options.provider_enabled("github"));
        assert!(options.provider_enabled("google"));
        assert!(!options.provider_enabled("twitter"));

        // Empty registry allows everything
        let open = OmnilinkOptions::new();
        assert!(open.provider_enabled("anything"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let options: OmnilinkOptions = serde_json::from_str(
            r#"{
                "providers": ["github"],
                "signup": { "enabled": false },
                "session": { "expiresIn": 3600 }
            }"#,
        )
        .unwrap();
        assert!(!options.signup.enabled);
        assert_eq!(options.session.expires_in, 3600);
        // Unspecified fields keep their defaults
        assert_eq!(options.session.remember_expires_in, 2_592_000);
        assert_eq!(options.base_path, "/auth");
    }
}
