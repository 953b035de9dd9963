// Link context — the fully-initialized configuration for one deployment,
// shared across request handlers.

use std::sync::Arc;

use omnilink_core::logger::{LinkLogger, LoggerConfig};
use omnilink_core::options::OmnilinkOptions;
use omnilink_i18n::MessageCatalog;

use crate::internal_adapter::InternalAdapter;
use crate::resolver::AccountResolver;

/// Everything the linking flow needs: resolved options, the storage
/// adapter, the account resolver, the logger and the message catalog.
///
/// Built once at startup; applications typically wrap it in an `Arc` and
/// hand it to their request handlers.
pub struct LinkContext {
    pub options: OmnilinkOptions,
    pub adapter: Arc<dyn InternalAdapter>,
    pub resolver: Arc<dyn AccountResolver>,
    pub logger: LinkLogger,
    pub catalog: MessageCatalog,
}

// Manual Debug impl because the adapter and resolver are not Debug
impl std::fmt::Debug for LinkContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkContext")
            .field("options", &self.options)
            .field("logger", &self.logger)
            .field("locale", &self.catalog.locale())
            .finish()
    }
}

impl LinkContext {
    /// Build a context from options, an adapter and a resolver. The logger
    /// comes from `options.logger`; the catalog from `options.locale` with
    /// the built-in English dictionary.
    pub fn new(
        options: OmnilinkOptions,
        adapter: Arc<dyn InternalAdapter>,
        resolver: Arc<dyn AccountResolver>,
    ) -> Self {
        let logger = LinkLogger::new(LoggerConfig {
            disabled: options.logger.disabled,
            disable_colors: options.logger.disable_colors,
            level: options.logger.level.as_str().into(),
            custom_handler: None,
        });
        let catalog = MessageCatalog::new(options.locale.clone());

        Self {
            options,
            adapter,
            resolver,
            logger,
            catalog,
        }
    }

    /// Replace the message catalog (deployment-supplied translations).
    pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = catalog;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal_adapter::ConcreteInternalAdapter;
    use crate::resolver::JitResolver;
    use omnilink_core::logger::LogLevel;
    use omnilink_memory::MemoryAdapter;

    fn make_context(options: OmnilinkOptions) -> LinkContext {
        let adapter: Arc<dyn InternalAdapter> =
            Arc::new(ConcreteInternalAdapter::new(Arc::new(MemoryAdapter::new())));
        let resolver = Arc::new(JitResolver::new(adapter.clone()));
        LinkContext::new(options, adapter, resolver)
    }

    #[test]
    fn test_context_defaults() {
        let ctx = make_context(OmnilinkOptions::new());
        assert_eq!(ctx.catalog.locale(), "en");
        assert_eq!(ctx.logger.level(), LogLevel::Warn);
    }

    #[test]
    fn test_context_logger_from_options() {
        let mut options = OmnilinkOptions::new();
        options.logger.level = "debug".into();
        let ctx = make_context(options);
        assert_eq!(ctx.logger.level(), LogLevel::Debug);
    }

    #[test]
    fn test_context_locale_from_options() {
        let mut options = OmnilinkOptions::new();
        options.locale = "zh".into();
        let ctx = make_context(options);
        assert_eq!(ctx.catalog.locale(), "zh");
    }
}
