//! MySQL repository implementations
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE two_factor_profiles (
//!     user_id         CHAR(36) PRIMARY KEY,
//!     secret          TEXT NULL,
//!     enabled         BOOLEAN NOT NULL DEFAULT FALSE,
//!     enabled_at      TIMESTAMP NULL,
//!     phone_number    VARCHAR(20) NULL,
//!     phone_verified  BOOLEAN NOT NULL DEFAULT FALSE,
//!     last_totp_step  BIGINT NULL,
//!     created_at      TIMESTAMP NOT NULL,
//!     updated_at      TIMESTAMP NOT NULL
//! );
//!
//! CREATE TABLE backup_codes (
//!     id          CHAR(36) PRIMARY KEY,
//!     user_id     CHAR(36) NOT NULL,
//!     batch_id    CHAR(36) NOT NULL,
//!     code_hash   VARCHAR(100) NOT NULL,
//!     used        BOOLEAN NOT NULL DEFAULT FALSE,
//!     used_at     TIMESTAMP NULL,
//!     created_at  TIMESTAMP NOT NULL,
//!     INDEX idx_backup_codes_user (user_id, used)
//! );
//! ```

pub mod backup_code_repository_impl;
pub mod profile_repository_impl;

pub use backup_code_repository_impl::MySqlBackupCodeRepository;
pub use profile_repository_impl::MySqlProfileRepository;
