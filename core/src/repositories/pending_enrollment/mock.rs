//! Mock implementation of PendingEnrollmentRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::pending_enrollment::PendingEnrollment;
use crate::errors::DomainError;

use super::trait_::PendingEnrollmentRepository;

/// Mock pending enrollment repository backed by an in-memory map
pub struct MockPendingEnrollmentRepository {
    pending: Arc<RwLock<HashMap<Uuid, PendingEnrollment>>>,
}

impl MockPendingEnrollmentRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            pending: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MockPendingEnrollmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PendingEnrollmentRepository for MockPendingEnrollmentRepository {
    async fn put(&self, enrollment: PendingEnrollment) -> Result<(), DomainError> {
        let mut pending = self.pending.write().await;
        pending.insert(enrollment.user_id, enrollment);
        Ok(())
    }

    async fn find(&self, user_id: Uuid) -> Result<Option<PendingEnrollment>, DomainError> {
        let pending = self.pending.read().await;
        Ok(pending.get(&user_id).cloned())
    }

    async fn take(&self, user_id: Uuid) -> Result<Option<PendingEnrollment>, DomainError> {
        let mut pending = self.pending.write().await;
        Ok(pending.remove(&user_id))
    }

    async fn remove(&self, user_id: Uuid) -> Result<(), DomainError> {
        let mut pending = self.pending.write().await;
        pending.remove(&user_id);
        Ok(())
    }
}
