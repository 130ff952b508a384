//! Vault decryption pipeline.
//!
//! ```text
//! read salt -> PBKDF2 -> unlock store -> fetch password rows -> close store
//!   -> for each row (lazily): item key -> AES-GCM -> SHA-1 check -> ItemResult
//! ```
//!
//! Everything up to the row fetch is fatal: a failure there returns an
//! error and no results.  After that every row produces exactly one
//! `ItemResult`, whether it decrypts or not, in store row order.

use std::fmt;
use std::iter::FusedIterator;
use std::path::Path;

use zeroize::Zeroizing;

use super::format;
use super::records::PasswordField;
use super::store::{SqlCipherStore, VaultStore};
use crate::crypto::{self, integrity, DatabaseKey, IntegrityStatus, ItemKey};
use crate::errors::{Result, VaultError};
use crate::logging::{Redacted, RedactedBytes};

/// Plaintext recovered from an authenticated field.
pub struct RecoveredSecret {
    /// The decrypted secret, wiped on drop.
    pub plaintext: Zeroizing<String>,
    /// Whether the stored SHA-1 agrees with `plaintext`.
    pub integrity: IntegrityStatus,
}

impl fmt::Debug for RecoveredSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveredSecret")
            .field("plaintext", &Redacted(()))
            .field("integrity", &self.integrity)
            .finish()
    }
}

/// Result for one password field.
#[derive(Debug)]
pub struct ItemResult {
    pub uuid: String,
    pub title: String,
    /// Authenticated plaintext, or the per-item error that prevented it.
    pub outcome: Result<RecoveredSecret>,
}

impl ItemResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The recovered plaintext, if authentication succeeded.
    pub fn plaintext(&self) -> Option<&str> {
        self.outcome.as_ref().ok().map(|s| s.plaintext.as_str())
    }

    /// SHA-1 check outcome; `None` when nothing was recovered.
    pub fn integrity(&self) -> Option<IntegrityStatus> {
        self.outcome.as_ref().ok().map(|s| s.integrity)
    }

    pub fn error(&self) -> Option<&VaultError> {
        self.outcome.as_ref().err()
    }
}

/// Lazy, single-pass sequence of `ItemResult`s.
///
/// Rows are already fetched and the store is closed; each call to
/// `next` decrypts one row.  Dropping it early is always safe.
pub struct DecryptedItems {
    rows: std::vec::IntoIter<PasswordField>,
}

impl DecryptedItems {
    pub fn from_rows(rows: Vec<PasswordField>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl Iterator for DecryptedItems {
    type Item = ItemResult;

    fn next(&mut self) -> Option<ItemResult> {
        self.rows.next().map(|row| decrypt_row(&row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for DecryptedItems {}

impl FusedIterator for DecryptedItems {}

/// Decrypt one password row.  Never fails; errors land in `outcome`.
pub fn decrypt_row(row: &PasswordField) -> ItemResult {
    let outcome = recover(row);
    debug_assert!(
        outcome.as_ref().err().map_or(true, VaultError::is_item_level),
        "fatal error captured in an item result"
    );

    match &outcome {
        Ok(secret) if !secret.integrity.is_matched() => {
            tracing::warn!(item = %row.uuid, "stored SHA-1 does not match the authenticated plaintext");
        }
        Err(e) => tracing::debug!(
            item = %row.uuid,
            key = %RedactedBytes(&row.key),
            error = %e,
            "item could not be decrypted"
        ),
        Ok(_) => {}
    }

    ItemResult {
        uuid: row.uuid.clone(),
        title: row.title.clone(),
        outcome,
    }
}

fn recover(row: &PasswordField) -> Result<RecoveredSecret> {
    let item_key = ItemKey::extract(&row.key)?;
    let aad = crypto::associated_data(&row.uuid)?;
    let plaintext = crypto::decrypt_field(&item_key, &row.value, &aad)?;
    let integrity = integrity::check(plaintext.as_bytes(), &row.hash);
    Ok(RecoveredSecret {
        plaintext,
        integrity,
    })
}

/// Fetch every password row from an unlocked store.
pub fn decrypt_rows<S: VaultStore + ?Sized>(store: &S) -> Result<DecryptedItems> {
    Ok(DecryptedItems::from_rows(store.password_fields()?))
}

/// Read the salt and derive the database key for the vault at `path`.
pub fn derive_key(path: &Path, password: &[u8]) -> Result<DatabaseKey> {
    let salt = format::read_salt(path)?;
    tracing::debug!(path = %path.display(), "read vault salt");

    let key = crypto::derive_database_key(password, &salt)?;
    tracing::debug!("derived database key");
    Ok(key)
}

/// Derive the key and unlock the vault with the SQLCipher backend.
pub fn open_vault(path: &Path, password: &[u8], compatibility: u32) -> Result<SqlCipherStore> {
    let key = derive_key(path, password)?;
    SqlCipherStore::unlock(path, &key, compatibility)
}

/// Decrypt every password field of the vault at `path`.
pub fn run(path: &Path, password: &[u8], compatibility: u32) -> Result<DecryptedItems> {
    run_with(path, password, compatibility, SqlCipherStore::unlock)
}

/// Like `run`, with a caller-supplied way to unlock the store.
///
/// The store is dropped (and its connection closed) before returning.
pub fn run_with<S, F>(
    path: &Path,
    password: &[u8],
    compatibility: u32,
    unlock: F,
) -> Result<DecryptedItems>
where
    S: VaultStore,
    F: FnOnce(&Path, &DatabaseKey, u32) -> Result<S>,
{
    let key = derive_key(path, password)?;
    let store = unlock(path, &key, compatibility)?;
    drop(key);

    decrypt_rows(&store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    const UUID_A: &str = "11111111-2222-3333-4444-555555555555";
    const UUID_B: &str = "aaaaaaaa-bbbb-cccc-dddd-eeeeeeeeeeee";

    fn sealed(uuid: &str, title: &str, plaintext: &str) -> PasswordField {
        let item_key = ItemKey::from_parts([0x07u8; 32], [0x09u8; 12]);
        let aad = crypto::associated_data(uuid).unwrap();
        let mut key = item_key.key().to_vec();
        key.extend_from_slice(item_key.nonce());
        PasswordField {
            uuid: uuid.to_string(),
            title: title.to_string(),
            key,
            value: crypto::encrypt_field(&item_key, plaintext.as_bytes(), &aad).unwrap(),
            hash: integrity::sha1_hex(plaintext.as_bytes()),
        }
    }

    struct FakeStore {
        rows: Vec<PasswordField>,
        reads: Cell<usize>,
    }

    impl VaultStore for FakeStore {
        fn password_fields(&self) -> Result<Vec<PasswordField>> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.rows.clone())
        }
    }

    #[test]
    fn decrypt_row_recovers_and_matches_hash() {
        let result = decrypt_row(&sealed(UUID_A, "Mail", "1234567890"));
        assert_eq!(result.title, "Mail");
        assert_eq!(result.plaintext(), Some("1234567890"));
        assert_eq!(result.integrity(), Some(IntegrityStatus::Matched));
    }

    #[test]
    fn corrupted_hash_is_a_warning_not_an_error() {
        let mut row = sealed(UUID_A, "Mail", "1234567890");
        let flipped = if row.hash.starts_with('0') { "1" } else { "0" };
        row.hash.replace_range(0..1, flipped);

        let result = decrypt_row(&row);
        assert_eq!(result.plaintext(), Some("1234567890"));
        assert_eq!(result.integrity(), Some(IntegrityStatus::Mismatch));
    }

    #[test]
    fn short_key_blob_is_format_error() {
        let mut row = sealed(UUID_A, "Mail", "pw");
        row.key.truncate(40);

        let result = decrypt_row(&row);
        assert!(matches!(result.error(), Some(VaultError::Format(_))));
        assert!(result.integrity().is_none());
    }

    #[test]
    fn aad_from_other_item_fails_authentication() {
        let mut row = sealed(UUID_A, "Mail", "pw");
        row.uuid = UUID_B.to_string();

        let result = decrypt_row(&row);
        assert!(matches!(result.error(), Some(VaultError::Authentication)));
        assert!(result.plaintext().is_none());
    }

    #[test]
    fn failures_do_not_stop_siblings_and_order_is_kept() {
        let mut broken = sealed(UUID_B, "Broken", "x");
        broken.value = "00".into();
        let store = FakeStore {
            rows: vec![
                sealed(UUID_A, "First", "one"),
                broken,
                sealed(UUID_B, "Third", "three"),
            ],
            reads: Cell::new(0),
        };

        let items = decrypt_rows(&store).unwrap();
        assert_eq!(items.len(), 3);

        let results: Vec<ItemResult> = items.collect();
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["First", "Broken", "Third"]);
        assert!(results[0].is_ok());
        assert!(!results[1].is_ok());
        assert_eq!(results[2].plaintext(), Some("three"));
        assert_eq!(store.reads.get(), 1);
    }

    #[test]
    fn captured_errors_are_item_level() {
        let mut short_key = sealed(UUID_A, "ShortKey", "pw");
        short_key.key.truncate(40);

        let mut bad_uuid = sealed(UUID_A, "BadUuid", "pw");
        bad_uuid.uuid = "not-a-uuid".into();

        let mut tampered = sealed(UUID_A, "Tampered", "pw");
        let first = if tampered.value.starts_with('0') { "1" } else { "0" };
        tampered.value.replace_range(0..1, first);

        let mut not_hex = sealed(UUID_B, "NotHex", "pw");
        not_hex.value = "zz".into();

        for row in [short_key, bad_uuid, tampered, not_hex] {
            let result = decrypt_row(&row);
            let err = result.error().expect("row must fail");
            assert!(err.is_item_level(), "{}: {err}", result.title);
        }
    }

    #[test]
    fn caller_can_stop_early() {
        let mut items = DecryptedItems::from_rows(vec![
            sealed(UUID_A, "First", "one"),
            sealed(UUID_B, "Second", "two"),
        ]);
        assert_eq!(items.next().unwrap().plaintext(), Some("one"));
        drop(items);
    }

    #[test]
    fn unlock_failure_is_fatal_and_reads_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.enpassdb");
        std::fs::write(&path, [0u8; 64]).unwrap();

        let expected = crypto::derive_database_key(b"right password", &[0u8; 16]).unwrap();
        let store = FakeStore {
            rows: vec![sealed(UUID_A, "Mail", "pw")],
            reads: Cell::new(0),
        };

        let result = run_with(&path, b"wrong password", 3, |_, key, _| {
            if *key == expected {
                Ok(&store)
            } else {
                Err(VaultError::Unlock("key verification failed".into()))
            }
        });

        assert!(matches!(result, Err(VaultError::Unlock(_))));
        assert_eq!(store.reads.get(), 0);
    }

    #[test]
    fn short_vault_file_fails_before_unlock() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault.enpassdb");
        std::fs::write(&path, [0u8; 4]).unwrap();

        let called = Cell::new(false);
        let result = run_with(&path, b"pw", 3, |_, _, _| {
            called.set(true);
            Err::<FakeStore, _>(VaultError::Unlock("unreachable".into()))
        });

        assert!(matches!(result, Err(VaultError::Format(_))));
        assert!(!called.get());
    }
}
