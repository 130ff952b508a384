//! Cryptographic primitives for reading Enpass vaults.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA512 database key derivation (`kdf`)
//! - Item key blob parsing into AES key and nonce (`item_key`)
//! - AES-256-GCM field decryption with UUID associated data (`field`)
//! - SHA-1 plaintext consistency checks (`integrity`)

pub mod field;
pub mod integrity;
pub mod item_key;
pub mod kdf;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{decrypt_field, derive_database_key, ...};
pub use field::{associated_data, decrypt_field, encrypt_field};
pub use integrity::IntegrityStatus;
pub use item_key::ItemKey;
pub use kdf::{derive_database_key, DatabaseKey};
