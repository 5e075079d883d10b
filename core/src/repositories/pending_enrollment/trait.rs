//! Pending enrollment repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::pending_enrollment::PendingEnrollment;
use crate::errors::DomainError;

/// Repository trait for server-held pending enrollments
///
/// At most one pending enrollment exists per user. `put` supersedes, and
/// `take` removes-and-returns in one step so that two concurrent `confirm`
/// calls cannot both claim the same candidate secret.
#[async_trait]
pub trait PendingEnrollmentRepository: Send + Sync {
    /// Store a pending enrollment, superseding any existing one for the user
    async fn put(&self, enrollment: PendingEnrollment) -> Result<(), DomainError>;

    /// Find the pending enrollment for a user, if any
    async fn find(&self, user_id: Uuid) -> Result<Option<PendingEnrollment>, DomainError>;

    /// Atomically remove and return the pending enrollment for a user
    ///
    /// # Returns
    /// * `Ok(Some(PendingEnrollment))` - This call claimed the enrollment
    /// * `Ok(None)` - Nothing was pending (or another call claimed it first)
    async fn take(&self, user_id: Uuid) -> Result<Option<PendingEnrollment>, DomainError>;

    /// Remove the pending enrollment for a user, if any
    async fn remove(&self, user_id: Uuid) -> Result<(), DomainError>;
}
