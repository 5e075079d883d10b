//! TOTP engine module
//!
//! Implements RFC 6238 secret issuance and time-window verification:
//! - Secret generation with provisioning URIs for authenticator apps
//! - Verification across adjacent time steps to tolerate clock drift
//! - Constant-time code comparison
//!
//! QR rendering is a collaborator seam (`ChallengeRenderer`); the engine
//! itself never produces images.

mod config;
mod engine;
mod traits;

pub use config::TotpConfig;
pub use engine::{GeneratedSecret, TotpEngine};
pub use traits::ChallengeRenderer;
