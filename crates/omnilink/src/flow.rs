// The identity-linking flow.
//
// One invocation handles one completed upstream handshake and produces
// exactly one terminal outcome: a signed-in account, or a redirect carrying
// a notice or an error. Which branch runs depends entirely on whether the
// request already carries an authenticated session.

use omnilink_core::db::models::{Account, Session};
use omnilink_core::error::Result;
use omnilink_i18n::keys;

use crate::assertion::ExternalAssertion;
use crate::context::LinkContext;
use crate::internal_adapter::{CreateSessionOptions, StoreError};
use crate::resolver::{join_field_errors, ResolveError};
use crate::routes::redirect::error_redirect;

/// The session state of the inbound request.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// A request already authenticated as this account.
    Authenticated(Account),
    /// No session.
    Anonymous,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Whether a redirect carries an expected notice or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    Notice,
    Error,
}

/// The flow's terminal outcome.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The assertion resolved to a persisted, valid account and a session
    /// was established for it.
    SignedIn { account: Account, session: Session },
    /// Send the user to `target` with a flash `message`.
    Redirect {
        target: String,
        kind: RedirectKind,
        message: String,
    },
}

impl Outcome {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }

    fn notice(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Redirect {
            target: target.into(),
            kind: RedirectKind::Notice,
            message: message.into(),
        }
    }

    fn error(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Redirect {
            target: target.into(),
            kind: RedirectKind::Error,
            message: message.into(),
        }
    }
}

/// Handle one external assertion.
///
/// An authenticated session takes the linking branch: the assertion's
/// identity is attached to the current account (idempotently) and the
/// session is left untouched. An anonymous session takes the provisioning
/// branch: the resolver finds or creates a local account and, when it is
/// persisted and valid, a new session is established for it.
///
/// All expected failures are converted to redirects; only structural
/// storage faults propagate as `Err`.
pub async fn handle_assertion(
    ctx: &LinkContext,
    assertion: &ExternalAssertion,
    session: SessionState,
    remember_me: bool,
) -> Result<Outcome> {
    // Site-wide policy flag, read once per invocation.
    let signup_enabled = ctx.options.signup.enabled;
    let provider = assertion.provider.as_str();
    let redirects = &ctx.options.redirects;

    if !ctx.options.provider_enabled(provider) {
        ctx.logger
            .warn(&format!("rejected assertion from unconfigured provider {provider}"));
        let message = ctx
            .catalog
            .render(keys::PROVIDER_NOT_FOUND, &[("provider", provider)]);
        let target = error_redirect(&redirects.error_page, provider, &message);
        return Ok(Outcome::error(target, message));
    }

    match session {
        SessionState::Authenticated(account) => {
            if !ctx.options.linking.enabled {
                let message = ctx.catalog.render(keys::LINKING_DISABLED, &[]);
                let target = error_redirect(&redirects.error_page, provider, &message);
                return Ok(Outcome::error(target, message));
            }

            match ctx
                .adapter
                .find_or_create_link(provider, &assertion.external_user_id, &account.id)
                .await
            {
                Ok(_) => {
                    ctx.logger.info(&format!(
                        "linked {provider} identity {} to account {}",
                        assertion.external_user_id, account.id
                    ));
                    let message = ctx.catalog.render(keys::IDENTITY_LINKED, &[]);
                    Ok(Outcome::notice(redirects.account_settings.clone(), message))
                }
                Err(StoreError::Duplicate(_)) => {
                    ctx.logger.warn(&format!(
                        "{provider} identity {} already linked elsewhere",
                        assertion.external_user_id
                    ));
                    let message = ctx
                        .catalog
                        .render(keys::IDENTITY_ALREADY_LINKED, &[("provider", provider)]);
                    let target = error_redirect(&redirects.error_page, provider, &message);
                    Ok(Outcome::error(target, message))
                }
                Err(other) => Err(other.into()),
            }
        }

        SessionState::Anonymous => match ctx.resolver.resolve(assertion).await {
            Err(ResolveError::SignupDisabled { provider }) => {
                let mut message = ctx
                    .catalog
                    .render(keys::SIGNUP_DISABLED, &[("provider", provider.as_str())]);
                if signup_enabled {
                    message.push(' ');
                    message.push_str(&ctx.catalog.render(
                        keys::SIGNUP_DISABLED_HINT,
                        &[("provider", provider.as_str())],
                    ));
                }
                ctx.logger
                    .info(&format!("signup closed for provider {provider}"));
                Ok(Outcome::notice(redirects.sign_in.clone(), message))
            }

            Err(ResolveError::Internal(e)) => {
                Err(omnilink_core::error::OmnilinkError::Database(e))
            }

            Ok(resolution) => {
                if resolution.persisted && resolution.is_valid() {
                    if resolution.directory_allowed == Some(false) {
                        ctx.logger.warn(&format!(
                            "directory denied access for {provider} account {}",
                            resolution.account.id
                        ));
                        let message = ctx
                            .catalog
                            .render(keys::ACCESS_DENIED, &[("provider", provider)]);
                        return Ok(Outcome::error(redirects.sign_in.clone(), message));
                    }

                    let expires_in = if remember_me {
                        ctx.options.session.remember_expires_in
                    } else {
                        ctx.options.session.expires_in
                    };
                    let session = ctx
                        .adapter
                        .create_session(
                            &resolution.account.id,
                            CreateSessionOptions::default(),
                            expires_in,
                        )
                        .await?;

                    ctx.logger.success(&format!(
                        "signed in account {} via {provider}",
                        resolution.account.id
                    ));
                    Ok(Outcome::SignedIn {
                        account: resolution.account,
                        session,
                    })
                } else {
                    let error_message = join_field_errors(&resolution.errors);
                    ctx.logger.warn(&format!(
                        "provisioning via {provider} failed validation: {error_message}"
                    ));
                    let target = error_redirect(&redirects.error_page, provider, &error_message);
                    Ok(Outcome::error(target, error_message))
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use omnilink_core::options::OmnilinkOptions;
    use omnilink_memory::MemoryAdapter;

    use crate::internal_adapter::{ConcreteInternalAdapter, InternalAdapter};
    use crate::resolver::JitResolver;

    fn quiet_options() -> OmnilinkOptions {
        let mut options = OmnilinkOptions::new();
        options.logger.disabled = true;
        options
    }

    fn make_context(options: OmnilinkOptions) -> LinkContext {
        let adapter: Arc<dyn InternalAdapter> =
            Arc::new(ConcreteInternalAdapter::new(Arc::new(MemoryAdapter::new())));
        let resolver = Arc::new(JitResolver::new(adapter.clone()));
        LinkContext::new(options, adapter, resolver)
    }

    #[tokio::test]
    async fn test_linking_branch_preserves_session_and_links() {
        let ctx = make_context(quiet_options());
        let account = ctx
            .adapter
            .create_account(Account::new("Jane", "jane@example.com"))
            .await
            .unwrap();
        let assertion = ExternalAssertion::new("google", "123");

        let outcome = handle_assertion(
            &ctx,
            &assertion,
            SessionState::Authenticated(account.clone()),
            false,
        )
        .await
        .unwrap();

        match outcome {
            Outcome::Redirect { target, kind, message } => {
                assert_eq!(kind, RedirectKind::Notice);
                assert_eq!(target, "/profile/account");
                assert_eq!(message, "Authentication method updated.");
            }
            other => panic!("expected notice redirect, got {other:?}"),
        }

        let link = ctx.adapter.find_link("google", "123").await.unwrap().unwrap();
        assert_eq!(link.user_id, account.id);
    }

    #[tokio::test]
    async fn test_provisioning_branch_signs_in_new_account() {
        let ctx = make_context(quiet_options());
        let assertion = ExternalAssertion::new("github", "42")
            .with_attribute("email", "dev@example.com")
            .with_attribute("name", "Dev");

        let outcome = handle_assertion(&ctx, &assertion, SessionState::Anonymous, false)
            .await
            .unwrap();

        match outcome {
            Outcome::SignedIn { account, session } => {
                assert_eq!(account.email, "dev@example.com");
                assert_eq!(session.user_id, account.id);
            }
            other => panic!("expected SignedIn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_rejected_before_any_branch() {
        let mut options = quiet_options();
        options.providers = vec!["github".into()];
        let ctx = make_context(options);
        let assertion = ExternalAssertion::new("twitter", "42")
            .with_attribute("email", "dev@example.com");

        let outcome = handle_assertion(&ctx, &assertion, SessionState::Anonymous, false)
            .await
            .unwrap();

        match outcome {
            Outcome::Redirect { kind, message, .. } => {
                assert_eq!(kind, RedirectKind::Error);
                assert!(message.contains("twitter"));
            }
            other => panic!("expected error redirect, got {other:?}"),
        }
        // Nothing was created
        assert!(ctx.adapter.find_link("twitter", "42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_linking_disabled_yields_error_redirect() {
        let mut options = quiet_options();
        options.linking.enabled = false;
        let ctx = make_context(options);
        let account = ctx
            .adapter
            .create_account(Account::new("Jane", "jane@example.com"))
            .await
            .unwrap();

        let outcome = handle_assertion(
            &ctx,
            &ExternalAssertion::new("google", "123"),
            SessionState::Authenticated(account),
            false,
        )
        .await
        .unwrap();

        match outcome {
            Outcome::Redirect { kind, .. } => assert_eq!(kind, RedirectKind::Error),
            other => panic!("expected error redirect, got {other:?}"),
        }
        assert!(ctx.adapter.find_link("google", "123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remember_me_uses_long_ttl() {
        let ctx = make_context(quiet_options());
        let assertion = ExternalAssertion::new("github", "42")
            .with_attribute("email", "dev@example.com")
            .with_attribute("name", "Dev");

        let outcome = handle_assertion(&ctx, &assertion, SessionState::Anonymous, true)
            .await
            .unwrap();

        let session = match outcome {
            Outcome::SignedIn { session, .. } => session,
            other => panic!("expected SignedIn, got {other:?}"),
        };
        let ttl = (session.expires_at - session.created_at).num_seconds();
        assert_eq!(ttl, ctx.options.session.remember_expires_in);
    }
}
