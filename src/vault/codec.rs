//! The vault file format.
//!
//! A vault is a single text file with four lines:
//!
//! ```text
//! line 0  keyseal-vault;1;<kdf_rounds>         version header
//! line 1  <hash>;<salt>;<dd/mm/yyyy>           master record (cleartext)
//! line 2  <salt>;<nonce>;<tag>                 bulk payload AEAD params
//! line 3  <payload>                            AES-256-GCM ciphertext
//! ```
//!
//! Binary fields are base64; dates are `day/month/year`. The decrypted
//! payload is three newline-separated blocks: credential records
//! (records joined by `|`, fields by `;`), the nonce history, and the
//! salt history. Base64 and the date format never contain the
//! delimiters; the free-text credential fields are checked for them at
//! save time.
//!
//! The master hash/salt/expiry and the payload AEAD parameters stay in
//! cleartext so a candidate password can be rejected cheaply, without
//! touching the authenticated payload. None of them is sensitive.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;

use super::credential::Credential;
use super::master::MasterRecord;
use crate::crypto::{CryptoEngine, EncryptionParams};
use crate::errors::{KeySealError, Result};

/// Magic token at the start of every vault file.
const MAGIC: &str = "keyseal-vault";

/// Current format version.
pub const CURRENT_VERSION: u32 = 1;

/// Separator between fields of one record / one header line.
const FIELD_SEP: char = ';';

/// Separator between credential records.
const RECORD_SEP: char = '|';

/// Date rendering used throughout the file.
const DATE_FMT: &str = "%d/%m/%Y";

/// Everything a vault file decodes to.
pub struct LoadedVault {
    /// Engine configured with the file's KDF rounds and with both
    /// history sets restored.
    pub engine: CryptoEngine,
    pub master: MasterRecord,
    pub credentials: Vec<Credential>,
}

impl fmt::Debug for LoadedVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedVault")
            .field("kdf_rounds", &self.engine.kdf_rounds())
            .field("master", &self.master)
            .field("credentials", &self.credentials.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

/// Serialize and write the whole vault state, overwriting any previous
/// file. The write is atomic: temp file in the same directory, then
/// rename.
pub fn save(
    path: &Path,
    master_pwd: &str,
    master: &MasterRecord,
    credentials: &[Credential],
    engine: &mut CryptoEngine,
) -> Result<()> {
    let payload = serialize_payload(credentials, engine)?;
    let (ciphertext, params) = engine.encrypt(payload.as_bytes(), master_pwd)?;

    let contents = format!(
        "{MAGIC}{FIELD_SEP}{CURRENT_VERSION}{FIELD_SEP}{rounds}\n\
         {hash}{FIELD_SEP}{salt}{FIELD_SEP}{exp}\n\
         {psalt}{FIELD_SEP}{pnonce}{FIELD_SEP}{ptag}\n\
         {body}\n",
        rounds = engine.kdf_rounds(),
        hash = BASE64.encode(&master.hash),
        salt = BASE64.encode(&master.salt),
        exp = master.expires_at.format(DATE_FMT),
        psalt = BASE64.encode(&params.salt),
        pnonce = BASE64.encode(&params.nonce),
        ptag = BASE64.encode(&params.tag),
        body = BASE64.encode(&ciphertext),
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Atomic write: temp file in the same directory, then rename.
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));
    fs::write(&tmp_path, &contents)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Remove the vault file.
pub fn delete(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(KeySealError::VaultNotFound(path.to_path_buf()));
    }
    fs::remove_file(path)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read a vault file and decode it with `candidate_pwd`.
///
/// The candidate is verified against the cleartext master hash/salt
/// *before* any decryption; a mismatch is a wrong-password error and
/// the payload is never touched. After that point an authentication
/// failure on the payload means the file is corrupt.
pub fn load(path: &Path, candidate_pwd: &str) -> Result<LoadedVault> {
    if !path.exists() {
        return Err(KeySealError::VaultNotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path)?;
    let lines: Vec<&str> = contents.lines().collect();
    if lines.len() < 4 {
        return Err(KeySealError::InvalidVaultFormat(format!(
            "expected 4 lines, found {}",
            lines.len()
        )));
    }

    let kdf_rounds = parse_header(lines[0])?;
    let master = parse_master_line(lines[1])?;
    let params = parse_params_line(lines[2])?;
    let ciphertext = decode_b64(lines[3], "payload")?;

    let mut engine = CryptoEngine::with_rounds(kdf_rounds)?;

    // Cheap rejection of a wrong password before any payload work.
    if !engine.verify_hash(candidate_pwd, &master.hash, &master.salt)? {
        return Err(KeySealError::WrongMasterPassword);
    }

    // The key is already verified, so a tag failure here means the file
    // was corrupted or tampered with.
    let payload = engine.decrypt(&ciphertext, candidate_pwd, &params)?;
    let payload = String::from_utf8(payload)
        .map_err(|_| KeySealError::InvalidVaultFormat("payload is not valid UTF-8".into()))?;

    let (credentials, nonces, salts) = parse_payload(&payload)?;
    engine.restore_history(nonces, salts);

    Ok(LoadedVault {
        engine,
        master,
        credentials,
    })
}

// ---------------------------------------------------------------------------
// Payload encoding
// ---------------------------------------------------------------------------

fn serialize_payload(credentials: &[Credential], engine: &CryptoEngine) -> Result<String> {
    let records: Vec<String> = credentials
        .iter()
        .map(serialize_credential)
        .collect::<Result<_>>()?;

    let nonce_block = encode_history(engine.nonce_history());
    let salt_block = encode_history(engine.salt_history());

    Ok(format!(
        "{}\n{}\n{}",
        records.join(&RECORD_SEP.to_string()),
        nonce_block,
        salt_block
    ))
}

fn serialize_credential(c: &Credential) -> Result<String> {
    let username = c.username.as_deref().unwrap_or("");
    for (field, value) in [("id", c.id.as_str()), ("username", username), ("email", &c.email)] {
        if value.contains(FIELD_SEP) || value.contains(RECORD_SEP) || value.contains('\n') {
            return Err(KeySealError::InvalidVaultFormat(format!(
                "credential {field} contains a reserved delimiter character"
            )));
        }
    }

    Ok([
        c.id.clone(),
        username.to_string(),
        c.email.clone(),
        BASE64.encode(&c.secret),
        BASE64.encode(&c.params.salt),
        BASE64.encode(&c.params.nonce),
        BASE64.encode(&c.params.tag),
        c.expires_at.format(DATE_FMT).to_string(),
    ]
    .join(&FIELD_SEP.to_string()))
}

fn encode_history(history: &BTreeSet<Vec<u8>>) -> String {
    history
        .iter()
        .map(|v| BASE64.encode(v))
        .collect::<Vec<_>>()
        .join(&FIELD_SEP.to_string())
}

type PayloadParts = (Vec<Credential>, BTreeSet<Vec<u8>>, BTreeSet<Vec<u8>>);

fn parse_payload(payload: &str) -> Result<PayloadParts> {
    let blocks: Vec<&str> = payload.split('\n').collect();
    if blocks.len() != 3 {
        return Err(KeySealError::InvalidVaultFormat(format!(
            "expected 3 payload blocks, found {}",
            blocks.len()
        )));
    }

    let credentials = if blocks[0].is_empty() {
        Vec::new()
    } else {
        blocks[0]
            .split(RECORD_SEP)
            .map(parse_credential)
            .collect::<Result<_>>()?
    };

    Ok((
        credentials,
        parse_history(blocks[1], "nonce history")?,
        parse_history(blocks[2], "salt history")?,
    ))
}

fn parse_credential(record: &str) -> Result<Credential> {
    let fields: Vec<&str> = record.split(FIELD_SEP).collect();
    if fields.len() != 8 {
        return Err(KeySealError::InvalidVaultFormat(format!(
            "credential record has {} fields, expected 8",
            fields.len()
        )));
    }

    let username = if fields[1].is_empty() {
        None
    } else {
        Some(fields[1].to_string())
    };

    Ok(Credential {
        id: fields[0].to_string(),
        username,
        email: fields[2].to_string(),
        secret: decode_b64(fields[3], "credential secret")?,
        params: EncryptionParams {
            salt: decode_b64(fields[4], "credential salt")?,
            nonce: decode_b64(fields[5], "credential nonce")?,
            tag: decode_b64(fields[6], "credential tag")?,
        },
        expires_at: parse_date(fields[7])?,
    })
}

fn parse_history(block: &str, what: &str) -> Result<BTreeSet<Vec<u8>>> {
    if block.is_empty() {
        return Ok(BTreeSet::new());
    }
    block
        .split(FIELD_SEP)
        .map(|v| decode_b64(v, what))
        .collect()
}

// ---------------------------------------------------------------------------
// Header parsing
// ---------------------------------------------------------------------------

fn parse_header(line: &str) -> Result<u32> {
    let fields: Vec<&str> = line.split(FIELD_SEP).collect();
    if fields.len() != 3 || fields[0] != MAGIC {
        return Err(KeySealError::InvalidVaultFormat(
            "missing keyseal-vault header".into(),
        ));
    }

    let version: u32 = fields[1]
        .parse()
        .map_err(|_| KeySealError::InvalidVaultFormat("malformed version number".into()))?;
    if version != CURRENT_VERSION {
        return Err(KeySealError::InvalidVaultFormat(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    fields[2]
        .parse()
        .map_err(|_| KeySealError::InvalidVaultFormat("malformed KDF round count".into()))
}

fn parse_master_line(line: &str) -> Result<MasterRecord> {
    let fields: Vec<&str> = line.split(FIELD_SEP).collect();
    if fields.len() != 3 {
        return Err(KeySealError::InvalidVaultFormat(
            "master record line must have 3 fields".into(),
        ));
    }
    Ok(MasterRecord {
        hash: decode_b64(fields[0], "master hash")?,
        salt: decode_b64(fields[1], "master salt")?,
        expires_at: parse_date(fields[2])?,
    })
}

fn parse_params_line(line: &str) -> Result<EncryptionParams> {
    let fields: Vec<&str> = line.split(FIELD_SEP).collect();
    if fields.len() != 3 {
        return Err(KeySealError::InvalidVaultFormat(
            "payload params line must have 3 fields".into(),
        ));
    }
    Ok(EncryptionParams {
        salt: decode_b64(fields[0], "payload salt")?,
        nonce: decode_b64(fields[1], "payload nonce")?,
        tag: decode_b64(fields[2], "payload tag")?,
    })
}

fn decode_b64(value: &str, what: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(value)
        .map_err(|e| KeySealError::InvalidVaultFormat(format!("bad base64 in {what}: {e}")))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FMT)
        .map_err(|e| KeySealError::InvalidVaultFormat(format!("bad date '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::MIN_ROUNDS;
    use crate::vault::master::MasterPasswordManager;
    use crate::vault::store::{CredentialInput, CredentialStore};
    use chrono::NaiveDate;
    use tempfile::TempDir;
    use zeroize::Zeroizing;

    const MASTER: &str = "Str0ng!Pass";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn populated() -> (CryptoEngine, MasterRecord, Vec<Credential>) {
        let mut engine = CryptoEngine::with_rounds(MIN_ROUNDS).unwrap();
        let mut manager = MasterPasswordManager::new();
        manager.set_new(&mut engine, MASTER, today()).unwrap();

        let mut store = CredentialStore::new();
        store
            .create(
                &mut engine,
                MASTER,
                CredentialInput {
                    id: "svc@example.com".into(),
                    username: Some("alice".into()),
                    email: "alice@example.com".into(),
                    secret: Zeroizing::new("hunter2".into()),
                },
                today(),
            )
            .unwrap();

        let master = manager.record().unwrap().clone();
        (engine, master, store.list_all())
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.ksv");
        let (mut engine, master, creds) = populated();

        save(&path, MASTER, &master, &creds, &mut engine).unwrap();
        let loaded = load(&path, MASTER).unwrap();

        assert_eq!(loaded.master, master);
        assert_eq!(loaded.credentials, creds);
        // The persisted history matches the snapshot taken at save time.
        assert!(loaded
            .engine
            .nonce_history()
            .contains(&creds[0].params.nonce));
        assert_eq!(loaded.engine.kdf_rounds(), MIN_ROUNDS);
    }

    #[test]
    fn wrong_password_is_rejected_before_decryption() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.ksv");
        let (mut engine, master, creds) = populated();
        save(&path, MASTER, &master, &creds, &mut engine).unwrap();

        let err = load(&path, "Wr0ng!Pass1").unwrap_err();
        // Wrong password, not a decryption failure — the payload was
        // never touched.
        assert!(matches!(err, KeySealError::WrongMasterPassword));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load(&dir.path().join("absent.ksv"), MASTER).unwrap_err();
        assert!(matches!(err, KeySealError::VaultNotFound(_)));
    }

    #[test]
    fn corrupted_payload_is_a_decryption_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.ksv");
        let (mut engine, master, creds) = populated();
        save(&path, MASTER, &master, &creds, &mut engine).unwrap();

        // Flip bytes inside the base64 payload line.
        let mut contents = std::fs::read_to_string(&path).unwrap();
        let tampered = contents.split_off(contents.len() - 10);
        contents.push_str(&tampered.chars().rev().collect::<String>());
        std::fs::write(&path, contents).unwrap();

        let err = load(&path, MASTER).unwrap_err();
        assert!(matches!(
            err,
            KeySealError::DecryptionFailed | KeySealError::InvalidVaultFormat(_)
        ));
    }

    #[test]
    fn truncated_file_is_a_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.ksv");
        std::fs::write(&path, "keyseal-vault;1;1000\n").unwrap();

        let err = load(&path, MASTER).unwrap_err();
        assert!(matches!(err, KeySealError::InvalidVaultFormat(_)));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.ksv");
        let (mut engine, master, creds) = populated();
        save(&path, MASTER, &master, &creds, &mut engine).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let bumped = contents.replacen("keyseal-vault;1;", "keyseal-vault;9;", 1);
        std::fs::write(&path, bumped).unwrap();

        let err = load(&path, MASTER).unwrap_err();
        assert!(matches!(err, KeySealError::InvalidVaultFormat(_)));
    }

    #[test]
    fn delete_removes_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.ksv");
        let (mut engine, master, creds) = populated();
        save(&path, MASTER, &master, &creds, &mut engine).unwrap();

        delete(&path).unwrap();
        assert!(!path.exists());
        assert!(matches!(
            delete(&path).unwrap_err(),
            KeySealError::VaultNotFound(_)
        ));
    }
}
