//! Mock implementation of TwoFactorProfileRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::two_factor_profile::TwoFactorProfile;
use crate::errors::DomainError;

use super::trait_::TwoFactorProfileRepository;

/// Mock profile repository backed by an in-memory map
pub struct MockProfileRepository {
    profiles: Arc<RwLock<HashMap<Uuid, TwoFactorProfile>>>,
}

impl MockProfileRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed a profile directly (test setup helper)
    pub async fn insert(&self, profile: TwoFactorProfile) {
        self.profiles.write().await.insert(profile.user_id, profile);
    }
}

impl Default for MockProfileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TwoFactorProfileRepository for MockProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TwoFactorProfile>, DomainError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(&user_id).cloned())
    }

    async fn activate(
        &self,
        user_id: Uuid,
        encrypted_secret: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(user_id)
            .or_insert_with(|| TwoFactorProfile::new(user_id));

        if profile.enabled {
            return Ok(false);
        }

        profile.activate(encrypted_secret.to_string(), now);
        Ok(true)
    }

    async fn deactivate(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut profiles = self.profiles.write().await;
        match profiles.get_mut(&user_id) {
            Some(profile) if profile.enabled => {
                profile.deactivate(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_phone(
        &self,
        user_id: Uuid,
        phone_number: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
        let profile = profiles
            .entry(user_id)
            .or_insert_with(|| TwoFactorProfile::new(user_id));
        profile.set_phone_number(phone_number.to_string(), now);
        Ok(())
    }

    async fn mark_phone_verified(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
        match profiles.get_mut(&user_id) {
            Some(profile) => {
                profile.mark_phone_verified(now);
                Ok(())
            }
            None => Err(DomainError::NotFound {
                resource: "TwoFactorProfile".to_string(),
            }),
        }
    }

    async fn set_last_totp_step(
        &self,
        user_id: Uuid,
        step: i64,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut profiles = self.profiles.write().await;
        match profiles.get_mut(&user_id) {
            Some(profile) => {
                profile.last_totp_step = Some(step);
                profile.updated_at = now;
                Ok(())
            }
            None => Err(DomainError::NotFound {
                resource: "TwoFactorProfile".to_string(),
            }),
        }
    }
}
