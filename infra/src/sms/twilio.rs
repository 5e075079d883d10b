//! Twilio SMS Service Implementation
//!
//! SMS delivery using the Twilio API, with E.164 validation, retry with
//! exponential backoff, and phone number masking in logs.

use async_trait::async_trait;
use phonenumber::{Mode, PhoneNumber};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use twilio::{Client, OutboundMessage};

use super::sms_service::{mask_phone_number, SmsService};
use crate::InfrastructureError;

/// Twilio SMS service configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// From phone number (must be a Twilio phone number)
    pub from_number: String,
    /// Maximum retry attempts for failed requests
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
}

impl TwilioConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID")
            .map_err(|_| InfrastructureError::Config("TWILIO_ACCOUNT_SID not set".to_string()))?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN")
            .map_err(|_| InfrastructureError::Config("TWILIO_AUTH_TOKEN not set".to_string()))?;
        let from_number = std::env::var("TWILIO_FROM_NUMBER")
            .map_err(|_| InfrastructureError::Config("TWILIO_FROM_NUMBER not set".to_string()))?;

        if !from_number.starts_with('+') {
            return Err(InfrastructureError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        Ok(Self {
            account_sid,
            auth_token,
            from_number,
            max_retries: std::env::var("TWILIO_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: std::env::var("TWILIO_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
        })
    }
}

/// Twilio SMS service implementation
pub struct TwilioSmsService {
    client: Client,
    config: TwilioConfig,
}

impl TwilioSmsService {
    /// Create a new Twilio SMS service
    pub fn new(config: TwilioConfig) -> Result<Self, InfrastructureError> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(InfrastructureError::Config(
                "Twilio credentials are not configured".to_string(),
            ));
        }

        let client = Client::new(&config.account_sid, &config.auth_token);

        info!(
            "Twilio SMS service initialized with from number: {}",
            mask_phone_number(&config.from_number)
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let config = TwilioConfig::from_env()?;
        Self::new(config)
    }

    /// Validate and normalize phone number to E.164 format
    fn validate_phone_number(&self, phone: &str) -> Result<String, InfrastructureError> {
        match phone.parse::<PhoneNumber>() {
            Ok(parsed) => {
                let formatted = parsed.format().mode(Mode::E164).to_string();
                debug!("Validated phone number: {}", mask_phone_number(&formatted));
                Ok(formatted)
            }
            Err(e) => {
                error!(
                    "Invalid phone number format for {}: {}",
                    mask_phone_number(phone),
                    e
                );
                Err(InfrastructureError::Sms(
                    "Invalid phone number format".to_string(),
                ))
            }
        }
    }
}

#[async_trait]
impl SmsService for TwilioSmsService {
    async fn send_sms(
        &self,
        phone_number: &str,
        message: &str,
    ) -> Result<String, InfrastructureError> {
        let to = self.validate_phone_number(phone_number)?;

        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;

            match self
                .client
                .send_message(OutboundMessage::new(&self.config.from_number, &to, message))
                .await
            {
                Ok(response) => {
                    info!(
                        phone = %mask_phone_number(&to),
                        message_sid = %response.sid,
                        attempt = attempts,
                        "Twilio SMS sent"
                    );
                    return Ok(response.sid);
                }
                Err(e) if attempts <= self.config.max_retries => {
                    warn!(
                        phone = %mask_phone_number(&to),
                        attempt = attempts,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "Twilio send failed, retrying in {}ms",
                        delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 10 seconds
                    delay = (delay * 2).min(10_000);
                }
                Err(e) => {
                    error!(
                        phone = %mask_phone_number(&to),
                        attempts = attempts,
                        error = %e,
                        "Twilio send failed after all retries"
                    );
                    return Err(InfrastructureError::Sms(
                        "SMS delivery failed".to_string(),
                    ));
                }
            }
        }
    }
}
