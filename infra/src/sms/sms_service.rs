//! SMS service trait and shared helpers

use async_trait::async_trait;

use crate::InfrastructureError;

// Phone helpers shared with the core crate
pub use sf_shared::utils::phone::{is_valid_phone_number, mask_phone_number};

/// Common interface for SMS providers
///
/// Providers own transport and retries; callers hand over a ready-made
/// message body.
#[async_trait]
pub trait SmsService: Send + Sync {
    /// Send an SMS message
    ///
    /// # Arguments
    /// * `phone_number` - Destination in E.164 format
    /// * `message` - Message body
    ///
    /// # Returns
    /// * `Ok(String)` - Provider-assigned message identifier
    /// * `Err(InfrastructureError)` - Delivery failed
    async fn send_sms(
        &self,
        phone_number: &str,
        message: &str,
    ) -> Result<String, InfrastructureError>;
}

/// Compose the verification message sent for an OTP code
pub fn verification_message(code: &str) -> String {
    format!(
        "Your SecondFactor verification code is {}. It expires in 5 minutes. \
         Never share this code with anyone.",
        code
    )
}
