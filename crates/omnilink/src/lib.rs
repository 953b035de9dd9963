// omnilink — external identity linking and just-in-time provisioning.
//
// Wires together the assertion types, the account resolver, the internal
// adapter, and the flow that turns one completed upstream handshake into
// one terminal outcome.

pub mod assertion;
pub mod context;
pub mod flow;
pub mod internal_adapter;
pub mod resolver;
pub mod routes;

pub use assertion::{failure_message, ExternalAssertion, UpstreamFailure};
pub use context::LinkContext;
pub use flow::{handle_assertion, Outcome, RedirectKind, SessionState};
pub use internal_adapter::{ConcreteInternalAdapter, CreateSessionOptions, InternalAdapter, StoreError};
pub use resolver::{AccountResolver, FieldError, JitResolver, Resolution, ResolveError};

// Re-export the core types applications touch directly.
pub use omnilink_core::db::models::{Account, IdentityLink, Session};
pub use omnilink_core::options::OmnilinkOptions;
