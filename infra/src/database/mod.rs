//! Database module - MySQL implementations using SQLx

pub mod mysql;

pub use mysql::{MySqlBackupCodeRepository, MySqlProfileRepository};
