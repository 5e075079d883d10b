//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the SecondFactor 2FA
//! subsystem. It provides concrete implementations for the persistence and
//! delivery seams the core crate defines:
//!
//! - **Database**: MySQL repositories (profiles, backup codes) using SQLx
//! - **Cache**: Redis stores for the ephemeral state (rate-limit counters,
//!   OTP challenges, pending enrollments)
//! - **SMS**: SMS gateway implementations (Twilio, mock)
//! - **QR**: enrollment challenge rendering
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis store support (default)
//! - `twilio-sms`: Enable the Twilio SMS gateway (default)

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Cache module - Redis client and stores
#[cfg(feature = "redis-cache")]
pub mod cache;

/// SMS service module - External SMS providers
pub mod sms;

/// QR module - enrollment challenge rendering
pub mod qr;

/// Configuration module for infrastructure services
pub mod config {
    //! Configuration management for infrastructure services
    //!
    //! Handles database connection strings, Redis configuration, SMS
    //! credentials and the secret-encryption key, loaded from environment
    //! variables.

    use serde::{Deserialize, Serialize};
    use sf_shared::config::{cache::CacheConfig, database::DatabaseConfig};

    /// Infrastructure configuration settings
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct InfrastructureConfig {
        /// Database configuration
        pub database: DatabaseConfig,
        /// Redis cache configuration
        pub cache: CacheConfig,
        /// SMS service configuration
        pub sms: SmsConfig,
        /// Base64-encoded 32-byte key for secret encryption at rest
        pub secret_cipher_key: String,
    }

    /// SMS service configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SmsConfig {
        /// SMS service provider ("twilio", "mock")
        pub provider: String,
        /// API credentials
        pub api_key: String,
        /// API secret/token
        pub api_secret: String,
        /// From phone number
        pub from_number: String,
    }

    impl Default for SmsConfig {
        fn default() -> Self {
            Self {
                provider: "mock".to_string(),
                api_key: String::new(),
                api_secret: String::new(),
                from_number: "+1234567890".to_string(),
            }
        }
    }

    impl InfrastructureConfig {
        /// Load infrastructure configuration from environment variables
        pub fn from_env() -> Self {
            dotenvy::dotenv().ok(); // Load .env file if present

            let sms = SmsConfig {
                provider: std::env::var("SMS_PROVIDER").unwrap_or_else(|_| "mock".to_string()),
                api_key: std::env::var("SMS_API_KEY").unwrap_or_default(),
                api_secret: std::env::var("SMS_API_SECRET").unwrap_or_default(),
                from_number: std::env::var("SMS_FROM_NUMBER")
                    .unwrap_or_else(|_| "+1234567890".to_string()),
            };

            Self {
                database: DatabaseConfig::from_env(),
                cache: CacheConfig::from_env(),
                sms,
                secret_cipher_key: std::env::var("SECRET_CIPHER_KEY").unwrap_or_default(),
            }
        }
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<InfrastructureError> for sf_core::errors::DomainError {
    fn from(err: InfrastructureError) -> Self {
        sf_core::errors::DomainError::Internal {
            message: err.to_string(),
        }
    }
}
