//! Unit tests for backup code generation and consumption

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::repositories::backup_code::MockBackupCodeRepository;
use crate::services::backup_code::{BackupCodeConfig, BackupCodeVault};

fn test_vault() -> BackupCodeVault<MockBackupCodeRepository> {
    BackupCodeVault::new(
        Arc::new(MockBackupCodeRepository::new()),
        BackupCodeConfig::fast_for_tests(),
    )
}

#[tokio::test]
async fn test_generate_batch_returns_formatted_unique_codes() {
    let vault = test_vault();
    let user_id = Uuid::new_v4();

    let codes = vault.generate_batch(user_id).await.unwrap();

    assert_eq!(codes.len(), 10);
    let unique: HashSet<_> = codes.iter().collect();
    assert_eq!(unique.len(), 10);

    for code in &codes {
        // Two groups of five separated by a hyphen
        assert_eq!(code.len(), 11);
        let (left, right) = code.split_once('-').expect("separator present");
        assert_eq!(left.len(), 5);
        assert_eq!(right.len(), 5);
        // No ambiguous characters
        for c in code.chars().filter(|c| *c != '-') {
            assert!(!"0O1IL".contains(c), "ambiguous character {} in {}", c, code);
        }
    }

    assert_eq!(vault.remaining(user_id).await.unwrap(), 10);
}

#[tokio::test]
async fn test_code_verifies_exactly_once() {
    let vault = test_vault();
    let user_id = Uuid::new_v4();

    let codes = vault.generate_batch(user_id).await.unwrap();

    // Consume code #3, then retry it
    assert!(vault.verify_and_consume(user_id, &codes[2]).await.unwrap());
    assert!(!vault.verify_and_consume(user_id, &codes[2]).await.unwrap());

    assert_eq!(vault.remaining(user_id).await.unwrap(), 9);
}

#[tokio::test]
async fn test_verification_is_tolerant_of_input_formatting() {
    let vault = test_vault();
    let user_id = Uuid::new_v4();

    let codes = vault.generate_batch(user_id).await.unwrap();
    let sloppy = codes[0].replace('-', " ").to_lowercase();

    assert!(vault.verify_and_consume(user_id, &sloppy).await.unwrap());
}

#[tokio::test]
async fn test_wrong_code_is_rejected() {
    let vault = test_vault();
    let user_id = Uuid::new_v4();

    vault.generate_batch(user_id).await.unwrap();

    assert!(!vault
        .verify_and_consume(user_id, "AAAAA-AAAAA")
        .await
        .unwrap());
    assert!(!vault.verify_and_consume(user_id, "too-short").await.unwrap());
    assert_eq!(vault.remaining(user_id).await.unwrap(), 10);
}

#[tokio::test]
async fn test_regenerate_invalidates_prior_batch() {
    let vault = test_vault();
    let user_id = Uuid::new_v4();

    let first_batch = vault.generate_batch(user_id).await.unwrap();
    let second_batch = vault.generate_batch(user_id).await.unwrap();

    // Unused codes from the first batch are dead immediately
    assert!(!vault
        .verify_and_consume(user_id, &first_batch[0])
        .await
        .unwrap());
    assert!(vault
        .verify_and_consume(user_id, &second_batch[0])
        .await
        .unwrap());
}

#[tokio::test]
async fn test_clear_removes_all_codes() {
    let vault = test_vault();
    let user_id = Uuid::new_v4();

    let codes = vault.generate_batch(user_id).await.unwrap();
    vault.clear(user_id).await.unwrap();

    assert_eq!(vault.remaining(user_id).await.unwrap(), 0);
    assert!(!vault.verify_and_consume(user_id, &codes[0]).await.unwrap());
}

#[tokio::test]
async fn test_users_have_independent_batches() {
    let vault = test_vault();
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();

    let codes_a = vault.generate_batch(user_a).await.unwrap();
    vault.generate_batch(user_b).await.unwrap();

    // A's code is not valid for B
    assert!(!vault.verify_and_consume(user_b, &codes_a[0]).await.unwrap());
    assert!(vault.verify_and_consume(user_a, &codes_a[0]).await.unwrap());
}
