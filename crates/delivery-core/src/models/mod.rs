//! Data models for the delivery client
//!
//! Wire types for every endpoint the client consumes, organized by domain.
//! Field names follow the service's camelCase JSON.

mod auth;
pub mod dates;
mod menu;
mod order;
mod subscription;

pub use auth::*;
pub use menu::*;
pub use order::*;
pub use subscription::*;
