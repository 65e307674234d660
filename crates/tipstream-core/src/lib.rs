pub mod config;
pub mod error;
pub mod normalize;
pub mod types;

pub use config::TipstreamConfig;
pub use error::ConfigError;
pub use types::{AlertPayload, IdentityProfile, IngestEvent, NotificationRecord};
