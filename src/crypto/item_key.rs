//! Per-item key material.
//!
//! Each row of the `item` table carries a 44-byte `key` blob:
//!
//! ```text
//! [ 32-byte AES-256 key | 12-byte GCM nonce ]
//! ```
//!
//! Any other length means the database key was wrong or the vault uses a
//! layout we do not understand, so it is rejected instead of truncated.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{VaultError, Result};

/// Length of the AES-256 key part.
pub const AES_KEY_LEN: usize = 32;

/// Length of the GCM nonce part.
pub const NONCE_LEN: usize = 12;

/// Total length of an item key blob.
pub const ITEM_KEY_LEN: usize = AES_KEY_LEN + NONCE_LEN;

/// AES key and nonce split out of an item's key blob.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ItemKey {
    key: [u8; AES_KEY_LEN],
    nonce: [u8; NONCE_LEN],
}

impl ItemKey {
    /// Split a raw 44-byte key blob into key and nonce.
    pub fn extract(raw_key: &[u8]) -> Result<Self> {
        if raw_key.len() != ITEM_KEY_LEN {
            return Err(VaultError::Format(format!(
                "item key must be exactly {ITEM_KEY_LEN} bytes, got {}",
                raw_key.len()
            )));
        }

        let (key_bytes, nonce_bytes) = raw_key.split_at(AES_KEY_LEN);
        let mut key = [0u8; AES_KEY_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        key.copy_from_slice(key_bytes);
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self { key, nonce })
    }

    /// Build key material from its parts.
    pub fn from_parts(key: [u8; AES_KEY_LEN], nonce: [u8; NONCE_LEN]) -> Self {
        Self { key, nonce }
    }

    pub fn key(&self) -> &[u8; AES_KEY_LEN] {
        &self.key
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }
}

impl fmt::Debug for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ItemKey([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> Vec<u8> {
        (0u8..44).collect()
    }

    #[test]
    fn splits_key_then_nonce() {
        let raw = blob();
        let item_key = ItemKey::extract(&raw).unwrap();
        assert_eq!(&item_key.key()[..], &raw[..32]);
        assert_eq!(&item_key.nonce()[..], &raw[32..]);
    }

    #[test]
    fn rejects_every_other_length() {
        for len in [0usize, 12, 32, 43, 45, 64, 115] {
            let raw = vec![0x5Au8; len];
            let result = ItemKey::extract(&raw);
            assert!(
                matches!(result, Err(VaultError::Format(_))),
                "length {len} must be rejected"
            );
        }
    }

    #[test]
    fn debug_output_is_redacted() {
        let item_key = ItemKey::extract(&blob()).unwrap();
        assert_eq!(format!("{item_key:?}"), "ItemKey([REDACTED])");
    }
}
