//! SHA-1 consistency check on recovered plaintext.
//!
//! Every `itemfield` row stores an unsalted SHA-1 of its plaintext.  This
//! is a weak, unauthenticated value; AES-GCM has already authenticated the
//! data by the time it is checked.  A mismatch is therefore informational
//! and is reported next to the plaintext rather than instead of it.

use serde::Serialize;
use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

/// Outcome of the SHA-1 sanity check for one recovered secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityStatus {
    /// The stored hash matches the plaintext.
    Matched,
    /// The stored hash differs from the plaintext's hash.
    Mismatch,
}

impl IntegrityStatus {
    pub fn is_matched(self) -> bool {
        self == IntegrityStatus::Matched
    }
}

/// Lowercase hex SHA-1 digest of `plaintext`.
pub fn sha1_hex(plaintext: &[u8]) -> String {
    hex::encode(Sha1::digest(plaintext))
}

/// Compare the SHA-1 of `plaintext` with `expected_hash_hex`, ignoring case.
pub fn verify(plaintext: &[u8], expected_hash_hex: &str) -> bool {
    let actual = sha1_hex(plaintext);
    let expected = expected_hash_hex.trim().to_ascii_lowercase();
    actual.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Run `verify` and map the result to an `IntegrityStatus`.
pub fn check(plaintext: &[u8], expected_hash_hex: &str) -> IntegrityStatus {
    if verify(plaintext, expected_hash_hex) {
        IntegrityStatus::Matched
    } else {
        IntegrityStatus::Mismatch
    }
}
