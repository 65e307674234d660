pub mod channel;
pub mod dispatch;
pub mod error;
pub mod registry;

pub use channel::AlertChannel;
pub use dispatch::{drain_backlog, fan_out, DeliveryLog};
pub use error::{ChannelError, RelayError};
pub use registry::ConnectionRegistry;
