//! `enpassvault inspect` — report blob sizes and row counts of an unlocked vault.
//!
//! Useful when a vault from a newer Enpass release fails with format
//! errors: the sizes show whether the key layout has changed.

use crate::cli::output;
use crate::cli::{load_settings, prompt_password, vault_path, Cli};
use crate::errors::Result;
use crate::vault::pipeline;

/// Execute the `inspect` command.
pub fn execute(cli: &Cli, show_hex: bool) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;

    let password = prompt_password()?;
    let store = pipeline::open_vault(&path, password.as_bytes(), settings.cipher_compatibility)?;

    let (items, fields) = store.counts()?;
    output::info(&format!(
        "{}: {items} item(s), {fields} password field(s)",
        path.display()
    ));
    output::print_blob_table(&store.inspect(), show_hex);

    Ok(())
}
