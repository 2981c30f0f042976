//! The Handler trait every island action implements.

use async_trait::async_trait;
use thiserror::Error;

use archipelago_core::params::ParamSchema;
use archipelago_core::response::FieldErrors;

use crate::invocation::Invocation;

/// Outcome of the authorization step, consumed explicitly by the lifecycle.
/// `NotDeclared` is distinct from `Denied` so deny-by-default configuration
/// can treat an undeclared predicate as a policy gap rather than an explicit
/// denial; the distinction never reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    Authorized,
    Denied,
    NotDeclared,
}

/// Domain-logic failure modes the lifecycle knows how to classify.
#[derive(Debug, Error)]
pub enum ActionFailure {
    /// A persistence collaborator rejected the record. The lifecycle folds
    /// the collaborator's own field/message structure into the error map and
    /// answers with the `error` response.
    #[error("record invalid")]
    RecordInvalid(FieldErrors),

    /// Anything else. Propagates uncaught so programming defects are never
    /// disguised as user-facing validation errors.
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl ActionFailure {
    /// Convenience for a single-field record failure.
    pub fn record_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.entry(field.into()).or_default().push(message.into());
        Self::RecordInvalid(errors)
    }
}

/// A concrete island action: a parameter schema, an optional authorization
/// predicate, and a body of domain logic. Handlers are stateless and shared;
/// all per-invocation state lives in the [`Invocation`].
///
/// The trait bound is the capability check: anything registered is
/// action-shaped by construction, so resolution needs no per-call validation.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Qualified name used for tracing and introspection, e.g.
    /// `Islands::TeamMembers::AddMember`.
    fn name(&self) -> &str;

    /// The declared parameter schema, shared read-only across invocations.
    fn schema(&self) -> &ParamSchema;

    /// Authorization predicate. The default declares no policy; under
    /// deny-by-default configuration that fails the request.
    fn authorize(&self, invocation: &Invocation) -> AuthDecision {
        let _ = invocation;
        AuthDecision::NotDeclared
    }

    /// Domain logic. May set props, request a redirect, or append field
    /// errors through the invocation.
    async fn perform(&self, invocation: &mut Invocation) -> Result<(), ActionFailure>;
}
