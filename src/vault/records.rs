use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::logging::RedactedBytes;

/// One password field joined with its owning item.
///
/// Built from an `item` row and one of its `itemfield` rows whose `type`
/// is `password`.  The key blob and ciphertext are wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PasswordField {
    /// Item UUID in canonical dashed form.
    pub uuid: String,
    /// Human-readable item title.
    pub title: String,
    /// Raw `item.key` blob (expected: 32-byte key + 12-byte nonce).
    pub key: Vec<u8>,
    /// Hex-encoded `itemfield.value` (ciphertext + tag).
    pub value: String,
    /// Hex-encoded SHA-1 stored in `itemfield.hash`.
    pub hash: String,
}

impl fmt::Debug for PasswordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordField")
            .field("uuid", &self.uuid)
            .field("title", &self.title)
            .field("key", &RedactedBytes(&self.key))
            .field("value", &format_args!("[{} hex chars]", self.value.len()))
            .finish_non_exhaustive()
    }
}

/// A discovery-only blob, as reported by `inspect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobSummary {
    /// Where the blob lives, e.g. `vault_info.mp`.
    pub source: &'static str,
    /// Byte length, or `None` if the row or table is absent.
    pub len: Option<usize>,
    /// Lowercase hex of the content; `None` exactly when `len` is.
    pub hex: Option<String>,
}

impl BlobSummary {
    pub fn new(source: &'static str, content: Option<&[u8]>) -> Self {
        Self {
            source,
            len: content.map(<[u8]>::len),
            hex: content.map(hex::encode),
        }
    }
}

/// Render 16 raw bytes as a dashed UUID (8-4-4-4-12).
///
/// Returns `None` for any other length.
pub fn render_uuid(bytes: &[u8]) -> Option<String> {
    if bytes.len() != 16 {
        return None;
    }
    let hex = hex::encode(bytes);
    Some(format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    ))
}
