pub mod db;
pub mod error;
pub mod identities;
pub mod queue;

pub use error::StoreError;
pub use identities::IdentityStore;
pub use queue::NotificationQueue;
