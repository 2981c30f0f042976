//! Error types for resolution and the action lifecycle

use thiserror::Error;

/// A handler could not be resolved for a component/operation pair. The
/// variants carry distinct messages but deliberately collapse to one error
/// kind at the boundary, so callers cannot tell a malformed name from a
/// genuinely missing handler.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("invalid component name: {0:?}")]
    InvalidComponent(String),

    #[error("invalid operation name: {0:?}")]
    InvalidOperation(String),

    #[error("unknown island action: {component}#{operation}")]
    UnknownAction { component: String, operation: String },
}

/// Failures the lifecycle does not fold into a `Response`. These propagate to
/// the dispatch boundary: an unsafe redirect target is a defect in the
/// handler, not user-correctable input, and unexpected domain failures are
/// never masked as field errors.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("unsafe redirect: {0}")]
    InvalidRedirect(String),

    #[error("broadcast failed: {0}")]
    Broadcast(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
