//! Types for enrollment operation results

/// Result of starting an enrollment
///
/// The secret and rendered challenge are shown to the user once for
/// authenticator setup; the server keeps its own pending copy for
/// confirmation.
#[derive(Debug, Clone)]
pub struct StartEnrollmentResult {
    /// Base32 TOTP secret, for manual entry
    pub secret: String,
    /// `otpauth://` provisioning URI
    pub provisioning_uri: String,
    /// Rendered challenge (image data URI) for scanning
    pub challenge_image: String,
}

/// Result of confirming an enrollment
#[derive(Debug, Clone)]
pub struct ConfirmEnrollmentResult {
    /// The first backup code batch, shown exactly once
    pub backup_codes: Vec<String>,
}
