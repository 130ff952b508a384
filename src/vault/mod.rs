//! Vault module — reading an Enpass vault.
//!
//! This module provides:
//! - Salt extraction from the vault file header (`format`)
//! - Row types for password fields and discovery blobs (`records`)
//! - The `VaultStore` boundary and its SQLCipher implementation (`store`)
//! - The decryption pipeline producing per-item results (`pipeline`)

pub mod format;
pub mod pipeline;
pub mod records;
pub mod store;

// Re-export the most commonly used items.
pub use pipeline::{run, run_with, DecryptedItems, ItemResult, RecoveredSecret};
pub use records::{BlobSummary, PasswordField};
pub use store::{SqlCipherStore, VaultStore};
