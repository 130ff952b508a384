//! On-disk layout of an Enpass vault file.
//!
//! ```text
//! [salt: 16 bytes][SQLCipher pages ...]
//! ```
//!
//! - **Salt**: fed to PBKDF2 together with the master password.
//! - **Body**: the encrypted database, read by SQLCipher and never
//!   parsed by hand here.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::crypto::kdf::SALT_LEN;
use crate::errors::{VaultError, Result};

/// Read the 16-byte salt at the start of the vault file.
///
/// The file handle is dropped before returning on every path.
pub fn read_salt(path: &Path) -> Result<[u8; SALT_LEN]> {
    let mut file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => VaultError::VaultNotFound(path.to_path_buf()),
        _ => VaultError::Io(e),
    })?;

    let mut salt = [0u8; SALT_LEN];
    file.read_exact(&mut salt).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => VaultError::Format(format!(
            "vault file is shorter than the {SALT_LEN}-byte salt"
        )),
        _ => VaultError::Io(e),
    })?;

    Ok(salt)
}
