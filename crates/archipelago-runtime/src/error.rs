//! The failure taxonomy surfaced to the controller collaborator. It decides
//! the transport status; [`FailureClass`] documents the intended grouping.

use thiserror::Error;

use archipelago_registry::error::{LifecycleError, ResolutionError};

pub type DispatchResult<T> = Result<T, DispatchError>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("invalid origin: {0}")]
    InvalidOrigin(String),

    #[error("unsafe redirect: {0}")]
    InvalidRedirect(String),

    #[error("broadcast failed: {0}")]
    Broadcast(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<LifecycleError> for DispatchError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidRedirect(detail) => Self::InvalidRedirect(detail),
            LifecycleError::Broadcast(detail) => Self::Broadcast(detail),
            LifecycleError::Internal(err) => Self::Internal(err),
        }
    }
}

/// Coarse grouping the hosting layer maps onto status codes: resolution
/// failures are not-found, origin failures are forbidden, redirect failures
/// are unprocessable (they carry detail, being handler defects), everything
/// else is a server error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    NotFound,
    Forbidden,
    Unprocessable,
    Internal,
}

impl DispatchError {
    pub fn class(&self) -> FailureClass {
        match self {
            Self::Resolution(_) => FailureClass::NotFound,
            Self::InvalidOrigin(_) => FailureClass::Forbidden,
            Self::InvalidRedirect(_) => FailureClass::Unprocessable,
            Self::Broadcast(_) | Self::Internal(_) => FailureClass::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_group_the_taxonomy() {
        let resolution = DispatchError::Resolution(ResolutionError::UnknownAction {
            component: "Teams".to_string(),
            operation: "create".to_string(),
        });
        assert_eq!(resolution.class(), FailureClass::NotFound);

        assert_eq!(
            DispatchError::InvalidOrigin("origin mismatch".to_string()).class(),
            FailureClass::Forbidden
        );
        assert_eq!(
            DispatchError::InvalidRedirect("unsafe redirect host".to_string()).class(),
            FailureClass::Unprocessable
        );
        assert_eq!(
            DispatchError::Internal(anyhow::anyhow!("boom")).class(),
            FailureClass::Internal
        );
    }
}
