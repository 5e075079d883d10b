//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `cache` - Redis configuration for ephemeral 2FA state
//! - `database` - Database connection and pool configuration
//! - `rate_limit` - Per-action attempt limits and lockout windows

pub mod cache;
pub mod database;
pub mod rate_limit;

// Re-export commonly used types
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use rate_limit::{RateLimitConfig, RateLimitPolicy};
