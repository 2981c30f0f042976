pub mod broadcast;
pub mod dispatch;
pub mod error;
pub mod test_helpers;

pub use broadcast::{Delivery, MemoryBroadcaster, NullBroadcaster};
pub use dispatch::Dispatcher;
pub use error::{DispatchError, DispatchResult, FailureClass};
