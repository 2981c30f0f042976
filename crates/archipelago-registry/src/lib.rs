pub mod error;
pub mod handler;
pub mod invocation;
pub mod registry;
pub mod resolver;

// Re-export commonly used types
pub use error::{LifecycleError, LifecycleResult, ResolutionError};
pub use handler::{ActionFailure, AuthDecision, Handler};
pub use invocation::Invocation;
pub use registry::Registry;
pub use resolver::Resolver;
