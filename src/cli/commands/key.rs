//! `enpassvault key` — print the raw SQLCipher key for the vault.
//!
//! Lets the vault be opened in an external SQLCipher shell.

use console::style;

use crate::cli::output;
use crate::cli::{load_settings, prompt_password, vault_path, Cli};
use crate::errors::Result;
use crate::vault::pipeline;

/// Execute the `key` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;

    let password = prompt_password()?;
    let key = pipeline::derive_key(&path, password.as_bytes())?;
    let key_hex = key.to_hex();

    println!("{}", key_hex.as_str());
    output::tip("In a SQLCipher shell:");
    println!(
        "  {}",
        style(format!("PRAGMA key = \"x'{}'\";", key_hex.as_str())).cyan()
    );
    println!(
        "  {}",
        style(format!(
            "PRAGMA cipher_compatibility = {};",
            settings.cipher_compatibility
        ))
        .cyan()
    );

    Ok(())
}
