use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

/// Project-level configuration, loaded from `.enpassvault.toml`.
///
/// Every field has a default so the tool works without any config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file to read when `--vault` is not given.
    #[serde(default = "default_vault_path")]
    pub vault_path: String,

    /// SQLCipher compatibility mode used to unlock the vault (Enpass 6: 3).
    #[serde(default = "default_cipher_compatibility")]
    pub cipher_compatibility: u32,

    /// Show decrypted secrets instead of a mask.
    #[serde(default)]
    pub reveal: bool,

    /// Output format for `decrypt`: "table" or "json".
    #[serde(default = "default_format")]
    pub format: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_path() -> String {
    "vault.enpassdb".to_string()
}

fn default_cipher_compatibility() -> u32 {
    3
}

fn default_format() -> String {
    "table".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_path: default_vault_path(),
            cipher_compatibility: default_cipher_compatibility(),
            reveal: false,
            format: default_format(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    pub const FILE_NAME: &'static str = ".enpassvault.toml";

    /// Load settings from `<dir>/.enpassvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Load settings from an explicit file, which must exist.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path).map_err(|e| {
            VaultError::Config(format!("Failed to read {}: {e}", config_path.display()))
        })?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Resolve the vault path relative to `dir`.
    pub fn vault_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.vault_path)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=4).contains(&self.cipher_compatibility) {
            return Err(VaultError::Config(format!(
                "cipher_compatibility must be between 1 and 4 (got {})",
                self.cipher_compatibility
            )));
        }
        if !matches!(self.format.as_str(), "table" | "json") {
            return Err(VaultError::Config(format!(
                "format must be 'table' or 'json' (got '{}')",
                self.format
            )));
        }
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
