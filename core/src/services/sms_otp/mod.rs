//! SMS OTP channel module
//!
//! One-time-password fallback over SMS:
//! - Code generation and hashed challenge storage (store-then-deliver)
//! - Delivery through an external gateway collaborator
//! - Verification with consumption and phone-number confirmation
//!
//! Challenge lifecycle and delivery are deliberately decoupled: a gateway
//! failure never rolls back the stored challenge.

mod config;
mod service;
mod traits;

#[cfg(test)]
mod tests;

pub use config::SmsOtpConfig;
pub use service::{SendOtpResult, SmsOtpChannel};
pub use traits::SmsGateway;
