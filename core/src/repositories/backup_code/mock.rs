//! Mock implementation of BackupCodeRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::backup_code::BackupCode;
use crate::errors::DomainError;

use super::trait_::BackupCodeRepository;

/// Mock backup code repository backed by an in-memory map
pub struct MockBackupCodeRepository {
    codes: Arc<RwLock<HashMap<Uuid, Vec<BackupCode>>>>,
}

impl MockBackupCodeRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            codes: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MockBackupCodeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackupCodeRepository for MockBackupCodeRepository {
    async fn replace_batch(
        &self,
        user_id: Uuid,
        codes: Vec<BackupCode>,
    ) -> Result<(), DomainError> {
        let mut store = self.codes.write().await;
        store.insert(user_id, codes);
        Ok(())
    }

    async fn active_codes(&self, user_id: Uuid) -> Result<Vec<BackupCode>, DomainError> {
        let store = self.codes.read().await;
        Ok(store
            .get(&user_id)
            .map(|codes| codes.iter().filter(|c| !c.used).cloned().collect())
            .unwrap_or_default())
    }

    async fn consume(
        &self,
        user_id: Uuid,
        code_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut store = self.codes.write().await;
        if let Some(codes) = store.get_mut(&user_id) {
            if let Some(code) = codes.iter_mut().find(|c| c.id == code_id && !c.used) {
                code.mark_used(now);
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn count_remaining(&self, user_id: Uuid) -> Result<u32, DomainError> {
        let store = self.codes.read().await;
        Ok(store
            .get(&user_id)
            .map(|codes| codes.iter().filter(|c| !c.used).count() as u32)
            .unwrap_or(0))
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), DomainError> {
        let mut store = self.codes.write().await;
        store.remove(&user_id);
        Ok(())
    }
}
