//! Collaborator traits for the TOTP engine

/// Trait for rendering a provisioning URI into a scannable challenge
///
/// A pure transform: URI in, image out. The concrete renderer lives in the
/// infrastructure layer.
pub trait ChallengeRenderer: Send + Sync {
    /// Render a provisioning URI as an image data URI
    fn render(&self, provisioning_uri: &str) -> Result<String, String>;
}
