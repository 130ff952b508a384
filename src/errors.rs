use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while reading an Enpass vault.
///
/// Messages never carry plaintext, keys or ciphertext.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Fatal: abort before any item is processed ---
    #[error("Unable to unlock vault: {0}")]
    Unlock(String),

    #[error("Crypto backend error: {0}")]
    CryptoBackend(String),

    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault query failed: {0}")]
    Store(String),

    // --- Per-item: captured in that item's result ---
    #[error("Unexpected vault format: {0}")]
    Format(String),

    #[error("Authentication failed: ciphertext, tag or associated data was altered")]
    Authentication,

    #[error("Decrypted secret is not valid UTF-8")]
    Encoding,

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl VaultError {
    /// Returns `true` for errors scoped to a single item/field pair.
    ///
    /// These never abort the pipeline; every other variant does.
    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            VaultError::Format(_) | VaultError::Authentication | VaultError::Encoding
        )
    }
}

/// Convenience type alias for vault results.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_level_errors_are_classified() {
        assert!(VaultError::Format("short key".into()).is_item_level());
        assert!(VaultError::Authentication.is_item_level());
        assert!(VaultError::Encoding.is_item_level());
    }

    #[test]
    fn fatal_errors_are_classified() {
        assert!(!VaultError::Unlock("bad key".into()).is_item_level());
        assert!(!VaultError::CryptoBackend("no aes".into()).is_item_level());
        assert!(!VaultError::Store("no such table".into()).is_item_level());
    }
}
