pub mod broadcast;
pub mod config;
pub mod context;
pub mod error;
pub mod params;
pub mod response;
pub mod security;

// Re-export commonly used types
pub use broadcast::{valid_stream_name, Broadcaster};
pub use config::{Config, VersionSource};
pub use context::{ActionContext, Principal, RequestMeta};
pub use error::{CoreError, CoreResult};
pub use params::{
    CoercedParams, ParamDefault, ParamDefinition, ParamSchema, ParamType, ParamValue,
};
pub use response::{FieldErrors, Response};
pub use security::{validate_origin, validate_redirect};
