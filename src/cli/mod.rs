//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV: &str = "ENPASS_PASSWORD";

/// enpassvault CLI: read-only Enpass vault decryption.
#[derive(Parser)]
#[command(
    name = "enpassvault",
    about = "Decrypt passwords from an Enpass vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the vault file (default: from config, else vault.enpassdb)
    #[arg(long, env = "ENPASS_VAULT", global = true)]
    pub vault: Option<String>,

    /// Path to a config file (default: ./.enpassvault.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Decrypt every password field in the vault
    Decrypt {
        /// Print plaintext passwords instead of a mask
        #[arg(long)]
        reveal: bool,

        /// Output format: table (default) or json
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Show sizes of the vault's key blobs and row counts
    Inspect {
        /// Also print each blob's content as hex
        #[arg(long)]
        hex: bool,
    },

    /// Print the raw SQLCipher key for the vault
    Key,

    /// Show version
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the master password, trying in order:
/// 1. `ENPASS_PASSWORD` env var (scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Load settings from `--config`, or from `.enpassvault.toml` in the cwd.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    match &cli.config {
        Some(path) => Settings::load_from(std::path::Path::new(path)),
        None => Settings::load(&std::env::current_dir()?),
    }
}

/// Resolve the vault file: `--vault` / `ENPASS_VAULT`, else the config value.
pub fn vault_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    match &cli.vault {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(settings.vault_path(&std::env::current_dir()?)),
    }
}

/// Validate an output format name.
pub fn validate_format(format: &str) -> Result<()> {
    match format {
        "table" | "json" => Ok(()),
        other => Err(VaultError::CommandFailed(format!(
            "unknown output format '{other}', use 'table' or 'json'"
        ))),
    }
}
