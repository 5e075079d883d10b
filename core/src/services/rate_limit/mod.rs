//! Rate limiting module
//!
//! Per-user, per-action failure counters with lockout. The counter state
//! lives behind the `RateLimitStore` trait so that a durable shared backend
//! (Redis in the infrastructure crate) keeps limits correct across service
//! instances, while the in-memory store gives deterministic tests.

mod memory;
mod service;
mod store;

#[cfg(test)]
mod tests;

pub use memory::InMemoryRateLimitStore;
pub use service::{RateLimitDecision, RateLimitService};
pub use store::RateLimitStore;
