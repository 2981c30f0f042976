use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),
    #[error("unsafe redirect: {0}")]
    InvalidRedirect(String),
}
