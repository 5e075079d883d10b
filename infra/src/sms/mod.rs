//! SMS Service Module
//!
//! SMS delivery implementations behind the core `SmsGateway` seam:
//!
//! - **SMS Service Trait**: common interface for all providers
//! - **Mock Implementation**: console output for development
//! - **Twilio Support**: production SMS via the Twilio API (feature-gated)
//! - **Gateway Adapter**: bridges any provider to the core trait and owns
//!   the OTP message wording

pub mod gateway_adapter;
pub mod mock_sms;
pub mod sms_service;

// Twilio SMS service (feature-gated)
#[cfg(feature = "twilio-sms")]
pub mod twilio;

// Re-export commonly used types
pub use gateway_adapter::SmsGatewayAdapter;
pub use mock_sms::MockSmsService;
pub use sms_service::SmsService;

#[cfg(feature = "twilio-sms")]
pub use twilio::{TwilioConfig, TwilioSmsService};

#[cfg(test)]
mod tests;

/// Create an SMS service based on configuration
///
/// Returns the provider named in the configuration, falling back to the
/// mock service when a provider cannot be initialized.
pub fn create_sms_service(config: &crate::config::SmsConfig) -> Box<dyn SmsService> {
    match config.provider.as_str() {
        #[cfg(feature = "twilio-sms")]
        "twilio" => {
            let twilio_config = TwilioConfig {
                account_sid: config.api_key.clone(),
                auth_token: config.api_secret.clone(),
                from_number: config.from_number.clone(),
                max_retries: 3,
                retry_delay_ms: 1000,
            };

            match TwilioSmsService::new(twilio_config) {
                Ok(service) => Box::new(service),
                Err(e) => {
                    tracing::error!("Failed to initialize Twilio SMS service: {}", e);
                    tracing::warn!("Falling back to mock SMS service");
                    Box::new(MockSmsService::new())
                }
            }
        }
        "mock" => Box::new(MockSmsService::new()),
        other => {
            tracing::warn!(
                provider = other,
                "Unknown SMS provider, falling back to mock SMS service"
            );
            Box::new(MockSmsService::new())
        }
    }
}
