//! Delivery Core Library
//!
//! Domain models, error types, configuration, subscription lifecycle rules and
//! the order cart shared by the API client, the services and the CLI.

pub mod cart;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;

// Re-export commonly used types
pub use cart::{Cart, CartItem};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, ErrorMetadata, LogLevel, Operation};
pub use lifecycle::{
    LifecyclePolicy, PurchaseEligibility, RenewalEligibility, SubscriptionState,
    SubscriptionStatus,
};
