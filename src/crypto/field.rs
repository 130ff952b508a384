//! AES-256-GCM decryption of item fields.
//!
//! An `itemfield.value` is hex text that decodes to:
//!
//! ```text
//! [ ciphertext | 16-byte auth tag ]
//! ```
//!
//! The key and nonce come from the owning item's key blob, and the
//! associated data is the item's UUID with the dashes removed, decoded
//! from hex.  The tag is checked before any keystream is applied, so a
//! tampered field never yields a plaintext byte.

use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce, Tag};
use zeroize::{Zeroize, Zeroizing};

use super::item_key::ItemKey;
use crate::errors::{VaultError, Result};

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Size of a decoded item UUID in bytes.
const UUID_LEN: usize = 16;

/// Derive the associated data for an item from its dashed UUID.
pub fn associated_data(uuid: &str) -> Result<Vec<u8>> {
    let compact: String = uuid.chars().filter(|c| *c != '-').collect();
    let bytes = hex::decode(&compact)
        .map_err(|e| VaultError::Format(format!("item uuid '{uuid}' is not hex: {e}")))?;

    if bytes.len() != UUID_LEN {
        return Err(VaultError::Format(format!(
            "item uuid must decode to {UUID_LEN} bytes, got {}",
            bytes.len()
        )));
    }

    Ok(bytes)
}

/// Decrypt and authenticate a hex-encoded field value.
pub fn decrypt_field(item_key: &ItemKey, hex_value: &str, aad: &[u8]) -> Result<Zeroizing<String>> {
    let mut buffer = Zeroizing::new(
        hex::decode(hex_value.trim())
            .map_err(|e| VaultError::Format(format!("field value is not hex: {e}")))?,
    );

    if buffer.len() < TAG_LEN {
        return Err(VaultError::Format(format!(
            "field value must be at least {TAG_LEN} bytes, got {}",
            buffer.len()
        )));
    }

    // Split the trailing tag off the ciphertext.
    let split = buffer.len() - TAG_LEN;
    let tag: Tag = Tag::clone_from_slice(&buffer[split..]);
    buffer.truncate(split);

    let cipher = Aes256Gcm::new(item_key.key().into());

    cipher
        .decrypt_in_place_detached(Nonce::from_slice(item_key.nonce()), aad, &mut buffer[..], &tag)
        .map_err(|_| VaultError::Authentication)?;

    // Hand the bytes to String without copying; wipe them if they are not UTF-8.
    let plaintext = std::mem::take(&mut *buffer);
    String::from_utf8(plaintext).map(Zeroizing::new).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        VaultError::Encoding
    })
}

/// Encrypt `plaintext` into the hex field layout read by `decrypt_field`.
///
/// The vault is never written to; this exists to build fixtures and to
/// check the decryptor against its inverse.
pub fn encrypt_field(item_key: &ItemKey, plaintext: &[u8], aad: &[u8]) -> Result<String> {
    let cipher = Aes256Gcm::new(item_key.key().into());

    let mut buffer = Zeroizing::new(plaintext.to_vec());
    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(item_key.nonce()), aad, &mut buffer[..])
        .map_err(|e| VaultError::CryptoBackend(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(buffer.len() + TAG_LEN);
    output.extend_from_slice(&buffer);
    output.extend_from_slice(&tag);
    Ok(hex::encode(output))
}
