//! QR rendering for enrollment challenges
//!
//! Implements the core `ChallengeRenderer` seam: a pure transform from a
//! provisioning URI to a scannable image, returned as a base64 PNG data
//! URI.

use totp_rs::TOTP;

use sf_core::services::totp::ChallengeRenderer;

/// QR renderer producing base64 PNG data URIs
pub struct QrPngRenderer;

impl QrPngRenderer {
    /// Create a new renderer
    pub fn new() -> Self {
        Self
    }
}

impl Default for QrPngRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChallengeRenderer for QrPngRenderer {
    fn render(&self, provisioning_uri: &str) -> Result<String, String> {
        let totp = TOTP::from_url(provisioning_uri)
            .map_err(|e| format!("Invalid provisioning URI: {}", e))?;

        let qr_base64 = totp.get_qr_base64()?;
        Ok(format!("data:image/png;base64,{}", qr_base64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::services::totp::TotpEngine;

    #[test]
    fn test_renders_data_uri_for_generated_secret() {
        let engine = TotpEngine::new();
        let generated = engine.generate_secret("user@example.com").unwrap();

        let renderer = QrPngRenderer::new();
        let image = renderer.render(&generated.provisioning_uri).unwrap();

        assert!(image.starts_with("data:image/png;base64,"));
        assert!(image.len() > 100);
    }

    #[test]
    fn test_rejects_garbage_uri() {
        let renderer = QrPngRenderer::new();
        assert!(renderer.render("not a uri").is_err());
    }
}
