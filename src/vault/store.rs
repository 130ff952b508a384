//! Encrypted database access.
//!
//! The vault body is a SQLCipher database.  Opening it follows a fixed
//! sequence: open read-only -> `PRAGMA key` with the raw hex key ->
//! `PRAGMA cipher_compatibility` -> touch `sqlite_master` to prove the
//! key works.  A wrong key surfaces at that last step as
//! `SQLITE_NOTADB`, which is reported as `VaultError::Unlock`.
//!
//! Real vaults need the `sqlcipher` cargo feature.  Without it the
//! bundled SQLite ignores the key pragmas, which is enough for plain
//! fixtures but cannot read an encrypted file.

use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row, ToSql};
use zeroize::Zeroizing;

use super::records::{render_uuid, BlobSummary, PasswordField};
use crate::crypto::DatabaseKey;
use crate::errors::{VaultError, Result};

/// `itemfield.type` value of the rows we decrypt.
pub const PASSWORD_FIELD_TYPE: &str = "password";

/// Read-only view of the rows the pipeline needs.
///
/// Implementations own the connection; the pipeline never mutates it.
pub trait VaultStore {
    /// All password fields joined with their item, in natural row order.
    fn password_fields(&self) -> Result<Vec<PasswordField>>;
}

impl<T: VaultStore + ?Sized> VaultStore for &T {
    fn password_fields(&self) -> Result<Vec<PasswordField>> {
        (**self).password_fields()
    }
}

/// An unlocked SQLCipher vault.  The connection closes on drop.
pub struct SqlCipherStore {
    conn: Connection,
}

impl SqlCipherStore {
    /// Open the database at `path` and unlock it with `key`.
    ///
    /// `compatibility` selects the SQLCipher major version the vault was
    /// written with (3 for Enpass 6).
    pub fn unlock(path: &Path, key: &DatabaseKey, compatibility: u32) -> Result<Self> {
        if !path.exists() {
            return Err(VaultError::VaultNotFound(path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| VaultError::Unlock(format!("cannot open database: {e}")))?;

        apply_key(&conn, key, compatibility)?;
        tracing::debug!(compatibility, "vault unlocked");

        Ok(Self { conn })
    }

    /// Count items and password fields.
    pub fn counts(&self) -> Result<(usize, usize)> {
        let items = self.count("SELECT count(*) FROM item", &[])?;
        let fields = self.count(
            "SELECT count(*) FROM itemfield WHERE type = ?1",
            &[&PASSWORD_FIELD_TYPE],
        )?;
        Ok((items, fields))
    }

    /// Read the blobs that only matter for format discovery.
    ///
    /// Missing tables or rows are reported as absent, not as errors.
    pub fn inspect(&self) -> Vec<BlobSummary> {
        const DISCOVERY_BLOBS: [(&str, &str); 5] = [
            ("Identity.Info", "SELECT Info FROM Identity LIMIT 1"),
            (
                "vault_info.mp",
                "SELECT mp FROM vault_info WHERE vault_uuid = 'primary'",
            ),
            (
                "vault_info.key",
                "SELECT key FROM vault_info WHERE vault_uuid = 'primary'",
            ),
            (
                "preferences.secure_settings",
                "SELECT value FROM preferences WHERE key = 'secure_settings'",
            ),
            (
                "preferences.dirty",
                "SELECT value FROM preferences WHERE key = 'dirty'",
            ),
        ];

        DISCOVERY_BLOBS
            .iter()
            .map(|&(source, sql)| {
                let content = self
                    .conn
                    .query_row(sql, [], |row| Ok(raw_content(row.get_ref(0)?)))
                    .ok()
                    .flatten();
                BlobSummary::new(source, content.as_deref())
            })
            .collect()
    }

    fn count(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row(sql, params, |row| row.get(0))
            .map_err(|e| VaultError::Store(format!("count query: {e}")))?;
        Ok(usize::try_from(n).unwrap_or(0))
    }
}

impl VaultStore for SqlCipherStore {
    fn password_fields(&self) -> Result<Vec<PasswordField>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT item.uuid, item.title, item.key, itemfield.value, itemfield.hash
                 FROM item
                 JOIN itemfield ON itemfield.item_uuid = item.uuid
                 WHERE itemfield.type = ?1
                 ORDER BY item.rowid, itemfield.rowid",
            )
            .map_err(|e| VaultError::Store(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map([PASSWORD_FIELD_TYPE], password_field_from_row)
            .map_err(|e| VaultError::Store(format!("query exec: {e}")))?;

        let mut fields = Vec::new();
        for row in rows {
            fields.push(row.map_err(|e| VaultError::Store(format!("row read: {e}")))?);
        }

        tracing::debug!(count = fields.len(), "fetched password fields");
        Ok(fields)
    }
}

/// Apply the raw key and compatibility mode, then prove the key works.
fn apply_key(conn: &Connection, key: &DatabaseKey, compatibility: u32) -> Result<()> {
    let key_hex = key.to_hex();
    let pragma = Zeroizing::new(format!("PRAGMA key = \"x'{}'\";", key_hex.as_str()));

    conn.execute_batch(&pragma)
        .map_err(|e| VaultError::Unlock(format!("failed to apply key: {e}")))?;

    conn.execute_batch(&format!("PRAGMA cipher_compatibility = {compatibility};"))
        .map_err(|e| VaultError::Unlock(format!("failed to set compatibility mode: {e}")))?;

    conn.query_row("SELECT count(*) FROM sqlite_master;", [], |row| {
        row.get::<_, i64>(0)
    })
    .map_err(|e| {
        VaultError::Unlock(format!(
            "key verification failed (is the master password correct?): {e}"
        ))
    })?;

    Ok(())
}

fn password_field_from_row(row: &Row<'_>) -> rusqlite::Result<PasswordField> {
    Ok(PasswordField {
        uuid: uuid_of(row.get_ref(0)?),
        title: text_of(row.get_ref(1)?),
        key: bytes_of(row.get_ref(2)?),
        value: text_of(row.get_ref(3)?),
        hash: text_of(row.get_ref(4)?),
    })
}

/// UUIDs are stored either as dashed text or as 16 raw bytes.
fn uuid_of(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Blob(b) => render_uuid(b).unwrap_or_else(|| hex::encode(b)),
        other => text_of(other),
    }
}

fn text_of(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(r) => r.to_string(),
        ValueRef::Null => String::new(),
    }
}

fn bytes_of(value: ValueRef<'_>) -> Vec<u8> {
    match value {
        ValueRef::Blob(b) | ValueRef::Text(b) => b.to_vec(),
        ValueRef::Integer(_) | ValueRef::Real(_) | ValueRef::Null => Vec::new(),
    }
}

fn raw_content(value: ValueRef<'_>) -> Option<Vec<u8>> {
    match value {
        ValueRef::Blob(b) | ValueRef::Text(b) => Some(b.to_vec()),
        ValueRef::Integer(_) | ValueRef::Real(_) | ValueRef::Null => None,
    }
}

#[cfg(all(test, not(feature = "sqlcipher")))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key() -> DatabaseKey {
        DatabaseKey::new([0x01u8; 32])
    }

    fn fixture(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("vault.enpassdb");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE item (uuid TEXT, title TEXT, key BLOB);
             CREATE TABLE itemfield (item_uuid TEXT, type TEXT, value TEXT, hash TEXT);
             CREATE TABLE vault_info (vault_uuid TEXT, mp BLOB, key BLOB);
             INSERT INTO vault_info VALUES ('primary', zeroblob(36), zeroblob(115));
             CREATE TABLE preferences (key TEXT, value BLOB);
             INSERT INTO preferences VALUES ('dirty', X'0a0b');
             INSERT INTO item VALUES ('b', 'Second', zeroblob(44));
             INSERT INTO item VALUES ('a', 'First', zeroblob(44));
             INSERT INTO itemfield VALUES ('a', 'username', 'x', 'y');
             INSERT INTO itemfield VALUES ('a', 'password', 'aa', 'h1');
             INSERT INTO itemfield VALUES ('b', 'password', 'bb', 'h2');",
        )
        .unwrap();
        path
    }

    #[test]
    fn unlock_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let result = SqlCipherStore::unlock(&dir.path().join("nope"), &key(), 3);
        assert!(matches!(result, Err(VaultError::VaultNotFound(_))));
    }

    #[test]
    fn unlock_garbage_file_is_unlock_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("garbage.enpassdb");
        std::fs::write(&path, vec![0x5Au8; 4096]).unwrap();

        let result = SqlCipherStore::unlock(&path, &key(), 3);
        assert!(matches!(result, Err(VaultError::Unlock(_))));
    }

    #[test]
    fn password_fields_follow_item_row_order() {
        let dir = TempDir::new().unwrap();
        let store = SqlCipherStore::unlock(&fixture(&dir), &key(), 3).unwrap();

        let fields = store.password_fields().unwrap();
        let titles: Vec<&str> = fields.iter().map(|f| f.title.as_str()).collect();
        assert_eq!(titles, ["Second", "First"]);
        assert_eq!(fields[0].key.len(), 44);
        assert_eq!(fields[1].value, "aa");
        assert_eq!(fields[1].hash, "h1");
    }

    #[test]
    fn counts_items_and_password_fields() {
        let dir = TempDir::new().unwrap();
        let store = SqlCipherStore::unlock(&fixture(&dir), &key(), 3).unwrap();
        assert_eq!(store.counts().unwrap(), (2, 2));
    }

    #[test]
    fn inspect_reports_present_and_absent_blobs() {
        let dir = TempDir::new().unwrap();
        let store = SqlCipherStore::unlock(&fixture(&dir), &key(), 3).unwrap();

        let summary = store.inspect();
        let find = |name: &str| summary.iter().find(|b| b.source == name).unwrap().len;
        assert_eq!(find("vault_info.mp"), Some(36));
        assert_eq!(find("vault_info.key"), Some(115));
        assert_eq!(find("Identity.Info"), None);
        assert_eq!(find("preferences.secure_settings"), None);

        let dirty = summary
            .iter()
            .find(|b| b.source == "preferences.dirty")
            .unwrap();
        assert_eq!(dirty.len, Some(2));
        assert_eq!(dirty.hex.as_deref(), Some("0a0b"));
    }

    #[test]
    fn blob_uuid_is_rendered_with_dashes() {
        let bytes: Vec<u8> = (0u8..16).collect();
        assert_eq!(
            uuid_of(ValueRef::Blob(&bytes)),
            "00010203-0405-0607-0809-0a0b0c0d0e0f"
        );
        assert_eq!(uuid_of(ValueRef::Text(b"abc")), "abc");
    }
}
