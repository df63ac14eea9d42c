//! Delivery Services
//!
//! Stateful workflows the CLI drives: the cart with its sequenced price
//! quotes, the user's subscription records and the plan catalog. Each holds
//! its remote side behind a trait from [`backend`].

pub mod backend;
pub mod catalog;
pub mod ordering;
pub mod subscriptions;

#[cfg(test)]
mod test_helpers;

pub use backend::{OrderingApi, SubscriptionApi};
pub use catalog::{CatalogDesk, PlanOffer};
pub use ordering::{CartAggregator, QuoteOutcome, QuoteRequest, QuoteResponse};
pub use subscriptions::SubscriptionDesk;
