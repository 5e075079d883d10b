//! MySQL implementation of the BackupCodeRepository trait.
//!
//! `replace_batch` runs inside a transaction so the old batch disappears
//! and the new one lands as one unit. `consume` is a single conditional
//! UPDATE (`WHERE used = FALSE`); the database arbitrates concurrent
//! spends of the same code.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use sf_core::domain::entities::backup_code::BackupCode;
use sf_core::errors::DomainError;
use sf_core::repositories::backup_code::BackupCodeRepository;

/// MySQL implementation of BackupCodeRepository
pub struct MySqlBackupCodeRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlBackupCodeRepository {
    /// Create a new MySQL backup code repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to BackupCode entity
    fn row_to_code(row: &sqlx::mysql::MySqlRow) -> Result<BackupCode, DomainError> {
        let id: String = row.try_get("id").map_err(|e| db_error("id", e))?;
        let user_id: String = row.try_get("user_id").map_err(|e| db_error("user_id", e))?;
        let batch_id: String = row
            .try_get("batch_id")
            .map_err(|e| db_error("batch_id", e))?;

        Ok(BackupCode {
            id: parse_uuid(&id)?,
            user_id: parse_uuid(&user_id)?,
            batch_id: parse_uuid(&batch_id)?,
            code_hash: row
                .try_get("code_hash")
                .map_err(|e| db_error("code_hash", e))?,
            used: row.try_get("used").map_err(|e| db_error("used", e))?,
            used_at: row.try_get("used_at").map_err(|e| db_error("used_at", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| db_error("created_at", e))?,
        })
    }
}

#[async_trait]
impl BackupCodeRepository for MySqlBackupCodeRepository {
    async fn replace_batch(
        &self,
        user_id: Uuid,
        codes: Vec<BackupCode>,
    ) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(query_error)?;

        sqlx::query("DELETE FROM backup_codes WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;

        let insert = r#"
            INSERT INTO backup_codes
                (id, user_id, batch_id, code_hash, used, used_at, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        for code in &codes {
            sqlx::query(insert)
                .bind(code.id.to_string())
                .bind(code.user_id.to_string())
                .bind(code.batch_id.to_string())
                .bind(&code.code_hash)
                .bind(code.used)
                .bind(code.used_at)
                .bind(code.created_at)
                .execute(&mut *tx)
                .await
                .map_err(query_error)?;
        }

        tx.commit().await.map_err(query_error)?;
        Ok(())
    }

    async fn active_codes(&self, user_id: Uuid) -> Result<Vec<BackupCode>, DomainError> {
        let query = r#"
            SELECT id, user_id, batch_id, code_hash, used, used_at, created_at
            FROM backup_codes
            WHERE user_id = ? AND used = FALSE
            ORDER BY created_at
        "#;

        let rows = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        rows.iter().map(Self::row_to_code).collect()
    }

    async fn consume(
        &self,
        user_id: Uuid,
        code_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE backup_codes
            SET used = TRUE, used_at = ?
            WHERE id = ? AND user_id = ? AND used = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(now)
            .bind(code_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_remaining(&self, user_id: Uuid) -> Result<u32, DomainError> {
        let query = r#"
            SELECT COUNT(*) AS remaining
            FROM backup_codes
            WHERE user_id = ? AND used = FALSE
        "#;

        let row = sqlx::query(query)
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(query_error)?;

        let remaining: i64 = row
            .try_get("remaining")
            .map_err(|e| db_error("remaining", e))?;
        Ok(remaining.max(0) as u32)
    }

    async fn clear(&self, user_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM backup_codes WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_error)?;
        Ok(())
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw).map_err(|e| DomainError::Internal {
        message: format!("Invalid UUID in backup_codes: {}", e),
    })
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
