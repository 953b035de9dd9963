//! # omnilink-i18n
//!
//! Locale-keyed message catalog for the user-facing strings the linking flow
//! produces. Ships a built-in English dictionary; deployments add their own
//! locales and the catalog falls back to English for any missing key.
//!
//! ## Usage
//! ```rust
//! use omnilink_i18n::{MessageCatalog, MessageDictionary};
//!
//! let mut zh = MessageDictionary::new();
//! zh.insert("IDENTITY_LINKED".to_string(), "认证方法已更新".to_string());
//!
//! let catalog = MessageCatalog::new("zh").with_locale("zh", zh);
//! assert_eq!(catalog.render("IDENTITY_LINKED", &[]), "认证方法已更新");
//! // Missing keys fall back to the built-in English text
//! assert!(catalog.render("ACCESS_DENIED", &[("provider", "ldap")]).contains("ldap"));
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Translation dictionary: message key -> message template.
pub type MessageDictionary = HashMap<String, String>;

/// Message keys produced by the linking flow.
pub mod keys {
    pub const IDENTITY_LINKED: &str = "IDENTITY_LINKED";
    pub const SIGNUP_DISABLED: &str = "SIGNUP_DISABLED";
    pub const SIGNUP_DISABLED_HINT: &str = "SIGNUP_DISABLED_HINT";
    pub const IDENTITY_ALREADY_LINKED: &str = "IDENTITY_ALREADY_LINKED";
    pub const LINKING_DISABLED: &str = "LINKING_DISABLED";
    pub const ACCESS_DENIED: &str = "ACCESS_DENIED";
    pub const PROVIDER_NOT_FOUND: &str = "PROVIDER_NOT_FOUND";
}

/// The built-in English dictionary.
pub fn english_defaults() -> MessageDictionary {
    let mut dict = MessageDictionary::new();
    dict.insert(
        keys::IDENTITY_LINKED.to_string(),
        "Authentication method updated.".to_string(),
    );
    dict.insert(
        keys::SIGNUP_DISABLED.to_string(),
        "Signing in using your {provider} account without a pre-existing account is not allowed."
            .to_string(),
    );
    dict.insert(
        keys::SIGNUP_DISABLED_HINT.to_string(),
        "Create an account first, and then connect it to your {provider} account.".to_string(),
    );
    dict.insert(
        keys::IDENTITY_ALREADY_LINKED.to_string(),
        "Your {provider} identity is already connected to a different account.".to_string(),
    );
    dict.insert(
        keys::LINKING_DISABLED.to_string(),
        "Connecting additional sign-in methods is disabled.".to_string(),
    );
    dict.insert(
        keys::ACCESS_DENIED.to_string(),
        "Access denied for your {provider} account.".to_string(),
    );
    dict.insert(
        keys::PROVIDER_NOT_FOUND.to_string(),
        "Authentication provider {provider} is not enabled.".to_string(),
    );
    dict
}

/// A message catalog bound to one configured locale.
///
/// Lookup order: configured locale, then "en". Unknown keys render as the
/// key itself so a missing translation is visible rather than silent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCatalog {
    locale: String,
    translations: HashMap<String, MessageDictionary>,
}

impl MessageCatalog {
    /// Create a catalog for `locale` with the built-in English dictionary.
    pub fn new(locale: impl Into<String>) -> Self {
        let mut translations = HashMap::new();
        translations.insert("en".to_string(), english_defaults());
        Self {
            locale: locale.into(),
            translations,
        }
    }

    /// Add or extend a locale dictionary. Entries override existing keys.
    pub fn with_locale(mut self, locale: impl Into<String>, dict: MessageDictionary) -> Self {
        let entry = self
            .translations
            .entry(locale.into())
            .or_insert_with(MessageDictionary::new);
        entry.extend(dict);
        self
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn available_locales(&self) -> Vec<&str> {
        self.translations.keys().map(|s| s.as_str()).collect()
    }

    /// Look up the template for `key`, falling back to English.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.translations
            .get(&self.locale)
            .and_then(|dict| dict.get(key))
            .or_else(|| self.translations.get("en").and_then(|dict| dict.get(key)))
            .map(|s| s.as_str())
    }

    /// Render the message for `key`, substituting `{name}` placeholders.
    pub fn render(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = self.lookup(key).unwrap_or(key);
        let mut out = template.to_string();
        for (name, value) in params {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new("en")
    }
}
