//! SMS Gateway Adapter
//!
//! Bridges any infrastructure `SmsService` provider to the core
//! `SmsGateway` trait. The adapter owns the OTP message wording; provider
//! errors are flattened to strings so no provider internals cross the
//! boundary into the core crate.

use async_trait::async_trait;

use sf_core::services::sms_otp::SmsGateway;

use super::sms_service::{verification_message, SmsService};

/// Adapter implementing the core SmsGateway for any SMS provider
pub struct SmsGatewayAdapter {
    inner: Box<dyn SmsService>,
}

impl SmsGatewayAdapter {
    /// Wrap a provider implementation
    pub fn new(inner: Box<dyn SmsService>) -> Self {
        Self { inner }
    }

    /// Build the adapter straight from configuration
    pub fn from_config(config: &crate::config::SmsConfig) -> Self {
        Self::new(super::create_sms_service(config))
    }
}

#[async_trait]
impl SmsGateway for SmsGatewayAdapter {
    async fn send_otp(&self, phone_number: &str, code: &str) -> Result<String, String> {
        self.inner
            .send_sms(phone_number, &verification_message(code))
            .await
            .map_err(|e| e.to_string())
    }
}
