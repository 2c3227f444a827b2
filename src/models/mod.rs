pub mod message;
pub mod provider;

pub use message::{DeliveryOutcome, MessagePayload, MessageResponse, REQUIRED_FIELDS};
pub use provider::{ProviderConfig, ProviderKind};
