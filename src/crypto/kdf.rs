//! Database key derivation using PBKDF2-HMAC-SHA512.
//!
//! The vault's SQLCipher key is derived from the master password and the
//! 16-byte salt stored at the start of the vault file.  Only the first
//! 32 bytes of PBKDF2 output are used; they are handed to the database
//! as a raw key in hex (64 characters).

use std::fmt;

use hmac::Hmac;
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{VaultError, Result};

/// Length of the salt at the start of the vault file in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the raw database key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Fixed PBKDF2 iteration count used by the vault format.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// A 32-byte SQLCipher raw key that zeroes its memory when dropped.
#[derive(Zeroize, PartialEq, Eq)]
#[zeroize(drop)]
pub struct DatabaseKey {
    bytes: [u8; KEY_LEN],
}

impl DatabaseKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Lowercase hex form expected by `PRAGMA key = "x'...'"`.
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes))
    }
}

impl fmt::Debug for DatabaseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DatabaseKey([REDACTED])")
    }
}

/// Derive the database key from a master password and the file salt.
///
/// Pure function: the same password and salt always give the same key.
/// Fails with `VaultError::Format` if `salt` is not exactly 16 bytes.
pub fn derive_database_key(password: &[u8], salt: &[u8]) -> Result<DatabaseKey> {
    if salt.len() != SALT_LEN {
        return Err(VaultError::Format(format!(
            "salt must be exactly {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }

    let mut out = [0u8; KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha512>>(password, salt, PBKDF2_ITERATIONS, &mut out)
        .map_err(|e| VaultError::CryptoBackend(format!("PBKDF2-HMAC-SHA512 failed: {e}")))?;

    let key = DatabaseKey::new(out);
    out.zeroize();
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_salt() {
        let result = derive_database_key(b"pw", &[0u8; 8]);
        assert!(matches!(result, Err(VaultError::Format(_))));
    }

    #[test]
    fn rejects_long_salt() {
        let result = derive_database_key(b"pw", &[0u8; 32]);
        assert!(matches!(result, Err(VaultError::Format(_))));
    }

    #[test]
    fn hex_form_is_64_lowercase_chars() {
        let key = DatabaseKey::new([0xABu8; KEY_LEN]);
        let hex = key.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(hex.as_str(), "ab".repeat(32));
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = DatabaseKey::new([0x11u8; KEY_LEN]);
        let printed = format!("{key:?}");
        assert!(!printed.contains("11"));
        assert!(printed.contains("REDACTED"));
    }
}
