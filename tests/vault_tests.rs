//! Integration tests for the KeySeal vault: full create → mutate →
//! reload cycles against a real file.

use chrono::NaiveDate;
use keyseal::crypto::MIN_ROUNDS;
use keyseal::errors::KeySealError;
use keyseal::vault::{CredentialInput, Vault};
use tempfile::TempDir;
use zeroize::Zeroizing;

const MASTER: &str = "Str0ng!Pass";

/// Helper: a temporary vault file path inside a fresh temp dir.
fn vault_file() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("test.vault");
    (dir, path)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

fn input(id: &str, secret: &str) -> CredentialInput {
    CredentialInput {
        id: id.to_string(),
        username: None,
        email: id.to_string(),
        secret: Zeroizing::new(secret.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Create, add, reload
// ---------------------------------------------------------------------------

#[test]
fn create_add_reload_reveal() {
    let (_dir, path) = vault_file();

    let mut vault = Vault::create(path.clone(), MASTER, MIN_ROUNDS, today()).expect("create");
    vault
        .add_credential(input("svc@example.com", "hunter2"), today())
        .expect("add");
    drop(vault);

    // Reload with the same password.
    let vault = Vault::unlock(path, MASTER).expect("unlock");
    assert_eq!(vault.credential_count(), 1);

    let record = vault.read_credential("svc@example.com").expect("read");
    assert_eq!(record.email, "svc@example.com");
    assert_ne!(record.secret, b"hunter2");

    let secret = vault.reveal_secret("svc@example.com").expect("reveal");
    assert_eq!(secret.as_str(), "hunter2");
}

#[test]
fn debug_output_never_contains_the_master_password() {
    let (_dir, path) = vault_file();
    let vault = Vault::create(path, MASTER, MIN_ROUNDS, today()).expect("create");

    let rendered = format!("{vault:?}");
    assert!(!rendered.contains(MASTER));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn create_rejects_weak_master_password() {
    let (_dir, path) = vault_file();
    let err = Vault::create(path, "weakpassword", MIN_ROUNDS, today()).unwrap_err();
    assert!(matches!(err, KeySealError::WeakPassword(_)));
}

#[test]
fn create_refuses_to_overwrite_an_existing_vault() {
    let (_dir, path) = vault_file();
    Vault::create(path.clone(), MASTER, MIN_ROUNDS, today()).expect("create");

    let err = Vault::create(path, MASTER, MIN_ROUNDS, today()).unwrap_err();
    assert!(matches!(err, KeySealError::VaultAlreadyExists(_)));
}

#[test]
fn unlock_with_wrong_password_fails_cheaply() {
    let (_dir, path) = vault_file();
    Vault::create(path.clone(), MASTER, MIN_ROUNDS, today()).expect("create");

    let err = Vault::unlock(path, "Wr0ng!Pass1").unwrap_err();
    assert!(matches!(err, KeySealError::WrongMasterPassword));
}

#[test]
fn unlock_missing_file_is_not_found() {
    let (_dir, path) = vault_file();
    let err = Vault::unlock(path, MASTER).unwrap_err();
    assert!(matches!(err, KeySealError::VaultNotFound(_)));
}

// ---------------------------------------------------------------------------
// Store invariants through the vault surface
// ---------------------------------------------------------------------------

#[test]
fn duplicate_and_malformed_ids_are_rejected() {
    let (_dir, path) = vault_file();
    let mut vault = Vault::create(path, MASTER, MIN_ROUNDS, today()).expect("create");
    vault
        .add_credential(input("svc@example.com", "s1"), today())
        .expect("add");

    assert!(matches!(
        vault
            .add_credential(input("svc@example.com", "s2"), today())
            .unwrap_err(),
        KeySealError::CredentialExists(_)
    ));
    assert!(matches!(
        vault
            .add_credential(input("not-an-email", "s2"), today())
            .unwrap_err(),
        KeySealError::InvalidIdFormat(_)
    ));
    assert!(matches!(
        vault
            .add_credential(input("other@example.com", ""), today())
            .unwrap_err(),
        KeySealError::IncompleteCredential
    ));
}

#[test]
fn update_renames_and_persists() {
    let (_dir, path) = vault_file();
    let mut vault = Vault::create(path.clone(), MASTER, MIN_ROUNDS, today()).expect("create");
    vault
        .add_credential(input("old@example.com", "s1"), today())
        .expect("add");
    vault
        .update_credential("old@example.com", input("new@example.com", "s2"), today())
        .expect("update");
    drop(vault);

    let vault = Vault::unlock(path, MASTER).expect("unlock");
    assert!(vault.read_credential("old@example.com").is_err());
    assert_eq!(
        vault.reveal_secret("new@example.com").expect("reveal").as_str(),
        "s2"
    );
}

#[test]
fn delete_removes_and_persists() {
    let (_dir, path) = vault_file();
    let mut vault = Vault::create(path.clone(), MASTER, MIN_ROUNDS, today()).expect("create");
    vault
        .add_credential(input("svc@example.com", "s"), today())
        .expect("add");
    vault.delete_credential("svc@example.com").expect("delete");
    drop(vault);

    let vault = Vault::unlock(path, MASTER).expect("unlock");
    assert_eq!(vault.credential_count(), 0);
}

#[test]
fn generated_credential_roundtrips() {
    let (_dir, path) = vault_file();
    let mut vault = Vault::create(path.clone(), MASTER, MIN_ROUNDS, today()).expect("create");

    let secret = vault
        .add_generated_credential(
            "svc@example.com".into(),
            Some("alice".into()),
            "alice@example.com".into(),
            14,
            "",
            today(),
        )
        .expect("add generated");
    drop(vault);

    let vault = Vault::unlock(path, MASTER).expect("unlock");
    assert_eq!(
        vault.reveal_secret("svc@example.com").expect("reveal").as_str(),
        secret.as_str()
    );
}

// ---------------------------------------------------------------------------
// Master password rotation
// ---------------------------------------------------------------------------

#[test]
fn rotation_rekeys_every_secret() {
    let (_dir, path) = vault_file();
    let mut vault = Vault::create(path.clone(), MASTER, MIN_ROUNDS, today()).expect("create");
    vault
        .add_credential(input("a@example.com", "alpha"), today())
        .expect("add a");
    vault
        .add_credential(input("b@example.com", "beta"), today())
        .expect("add b");

    vault
        .change_master_password(MASTER, "N3w!Master9", today())
        .expect("rotate");
    drop(vault);

    // Old password no longer unlocks; new one does and reveals both.
    assert!(matches!(
        Vault::unlock(path.clone(), MASTER).unwrap_err(),
        KeySealError::WrongMasterPassword
    ));
    let vault = Vault::unlock(path, "N3w!Master9").expect("unlock");
    assert_eq!(
        vault.reveal_secret("a@example.com").expect("reveal").as_str(),
        "alpha"
    );
    assert_eq!(
        vault.reveal_secret("b@example.com").expect("reveal").as_str(),
        "beta"
    );
}

#[test]
fn rotation_rejects_wrong_old_password_and_same_new_password() {
    let (_dir, path) = vault_file();
    let mut vault = Vault::create(path, MASTER, MIN_ROUNDS, today()).expect("create");

    assert!(matches!(
        vault
            .change_master_password("Wr0ng!Pass1", "N3w!Master9", today())
            .unwrap_err(),
        KeySealError::WrongMasterPassword
    ));
    assert!(matches!(
        vault
            .change_master_password(MASTER, MASTER, today())
            .unwrap_err(),
        KeySealError::PasswordUnchanged
    ));
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[test]
fn expiry_reporting() {
    let (_dir, path) = vault_file();
    let mut vault = Vault::create(path, MASTER, MIN_ROUNDS, today()).expect("create");
    vault
        .add_credential(input("svc@example.com", "s"), today())
        .expect("add");

    assert!(!vault.master_password_expired(today()).expect("check"));
    assert!(vault.expired_credentials(today()).is_empty());

    // Both the master password and the credential expire after 3 months.
    let later = NaiveDate::from_ymd_opt(2026, 9, 2).unwrap();
    assert!(vault.master_password_expired(later).expect("check"));
    assert_eq!(vault.expired_credentials(later), vec!["svc@example.com"]);
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[test]
fn reset_deletes_the_file() {
    let (_dir, path) = vault_file();
    let mut vault = Vault::create(path.clone(), MASTER, MIN_ROUNDS, today()).expect("create");
    vault
        .add_credential(input("svc@example.com", "s"), today())
        .expect("add");

    vault.reset().expect("reset");
    assert!(!path.exists());
}
