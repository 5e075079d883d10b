//! Shared utilities and common types for the SecondFactor server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Response structures
//! - Utility functions (phone validation, etc.)

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{CacheConfig, DatabaseConfig, RateLimitConfig, RateLimitPolicy};
pub use types::ErrorResponse;
pub use utils::phone;
