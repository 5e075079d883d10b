//! MySQL implementation of the TwoFactorProfileRepository trait.
//!
//! The enable/disable transitions are expressed as conditional UPDATEs
//! (`WHERE enabled = FALSE` / `WHERE enabled = TRUE`), so the state change
//! happens exactly once even under concurrent duplicate submissions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sf_core::domain::entities::two_factor_profile::TwoFactorProfile;
use sf_core::errors::DomainError;
use sf_core::repositories::profile::TwoFactorProfileRepository;

/// MySQL implementation of TwoFactorProfileRepository
pub struct MySqlProfileRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlProfileRepository {
    /// Create a new MySQL profile repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to TwoFactorProfile entity
    fn row_to_profile(row: &sqlx::mysql::MySqlRow) -> Result<TwoFactorProfile, DomainError> {
        let user_id: String = row
            .try_get("user_id")
            .map_err(|e| db_error("user_id", e))?;

        Ok(TwoFactorProfile {
            user_id: Uuid::parse_str(&user_id).map_err(|e| DomainError::Internal {
                message: format!("Invalid UUID in two_factor_profiles: {}", e),
            })?,
            secret: row.try_get("secret").map_err(|e| db_error("secret", e))?,
            enabled: row.try_get("enabled").map_err(|e| db_error("enabled", e))?,
            enabled_at: row
                .try_get("enabled_at")
                .map_err(|e| db_error("enabled_at", e))?,
            phone_number: row
                .try_get("phone_number")
                .map_err(|e| db_error("phone_number", e))?,
            phone_verified: row
                .try_get("phone_verified")
                .map_err(|e| db_error("phone_verified", e))?,
            last_totp_step: row
                .try_get("last_totp_step")
                .map_err(|e| db_error("last_totp_step", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| db_error("created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| db_error("updated_at", e))?,
        })
    }

    /// Insert an empty profile row if none exists yet
    async fn ensure_row(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<(), DomainError> {
        let query = r#"
            INSERT IGNORE INTO two_factor_profiles
                (user_id, enabled, phone_verified, created_at, updated_at)
            VALUES (?, FALSE, FALSE, ?, ?)
        "#;

        sqlx::query(query)
            .bind(user_id.to_string())
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(())
    }
}

#[async_trait]
impl TwoFactorProfileRepository for MySqlProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<TwoFactorProfile>, DomainError> {
        let query = r#"
            SELECT user_id, secret, enabled, enabled_at, phone_number,
                   phone_verified, last_totp_step, created_at, updated_at
            FROM two_factor_profiles
            WHERE user_id = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.map(|row| Self::row_to_profile(&row)).transpose()
    }

    async fn activate(
        &self,
        user_id: Uuid,
        encrypted_secret: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.ensure_row(user_id, now).await?;

        let query = r#"
            UPDATE two_factor_profiles
            SET secret = ?, enabled = TRUE, enabled_at = ?, updated_at = ?
            WHERE user_id = ? AND enabled = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(encrypted_secret)
            .bind(now)
            .bind(now)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn deactivate(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE two_factor_profiles
            SET secret = NULL, enabled = FALSE, enabled_at = NULL,
                last_totp_step = NULL, updated_at = ?
            WHERE user_id = ? AND enabled = TRUE
        "#;

        let result = sqlx::query(query)
            .bind(now)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_phone(
        &self,
        user_id: Uuid,
        phone_number: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_row(user_id, now).await?;

        // A changed number drops the verified flag; the same number keeps it
        let query = r#"
            UPDATE two_factor_profiles
            SET phone_verified = (phone_number <=> ?) AND phone_verified,
                phone_number = ?, updated_at = ?
            WHERE user_id = ?
        "#;

        sqlx::query(query)
            .bind(phone_number)
            .bind(phone_number)
            .bind(now)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(())
    }

    async fn mark_phone_verified(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let query = r#"
            UPDATE two_factor_profiles
            SET phone_verified = TRUE, updated_at = ?
            WHERE user_id = ?
        "#;

        let result = sqlx::query(query)
            .bind(now)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        // MySQL reports zero affected rows for no-op updates too, so a
        // missing profile has to be told apart from an idempotent call
        if result.rows_affected() == 0 && self.find_by_user(user_id).await?.is_none() {
            return Err(DomainError::NotFound {
                resource: "TwoFactorProfile".to_string(),
            });
        }
        Ok(())
    }

    async fn set_last_totp_step(
        &self,
        user_id: Uuid,
        step: i64,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let query = r#"
            UPDATE two_factor_profiles
            SET last_totp_step = ?, updated_at = ?
            WHERE user_id = ?
        "#;

        let result = sqlx::query(query)
            .bind(step)
            .bind(now)
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 && self.find_by_user(user_id).await?.is_none() {
            return Err(DomainError::NotFound {
                resource: "TwoFactorProfile".to_string(),
            });
        }
        Ok(())
    }
}

fn db_error(column: &str, e: sqlx::Error) -> DomainError {
    DomainError::Internal {
        message: format!("Failed to read column {}: {}", column, e),
    }
}

fn query_error(e: sqlx::Error) -> DomainError {
    DomainError::Internal {
        message: format!("Database query failed: {}", e),
    }
}
