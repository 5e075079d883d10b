//! Collaborator traits for SMS delivery

use async_trait::async_trait;

/// Trait for the external SMS delivery gateway
///
/// Implementations own transport, retries and provider failover. The
/// channel never learns provider internals; a failure comes back as an
/// opaque message suitable for logging only.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Deliver a one-time password to a phone number
    ///
    /// # Returns
    /// * `Ok(message_id)` - Provider-assigned delivery identifier
    /// * `Err(reason)` - Delivery failed; the reason is for logs, not users
    async fn send_otp(&self, phone_number: &str, code: &str) -> Result<String, String>;
}
