//! `enpassvault decrypt` — decrypt every password field and print the results.

use crate::cli::output;
use crate::cli::{load_settings, prompt_password, validate_format, vault_path, Cli};
use crate::crypto::IntegrityStatus;
use crate::errors::{Result, VaultError};
use crate::vault::{self, ItemResult};

/// Execute the `decrypt` command.
pub fn execute(cli: &Cli, reveal: bool, format: Option<&str>) -> Result<()> {
    let settings = load_settings(cli)?;
    let path = vault_path(cli, &settings)?;
    let reveal = reveal || settings.reveal;
    let format = format.unwrap_or(&settings.format);

    // Check the format before asking for the password.
    validate_format(format)?;

    let password = prompt_password()?;
    let items = vault::run(&path, password.as_bytes(), settings.cipher_compatibility)?;
    let results: Vec<ItemResult> = items.collect();

    if format == "json" {
        println!("{}", output::items_json(&results, reveal)?);
    } else {
        output::print_items_table(&results, reveal);
    }

    for r in &results {
        if r.integrity() == Some(IntegrityStatus::Mismatch) {
            output::warning(&format!(
                "'{}': stored hash does not match the decrypted password",
                r.title
            ));
        }
    }

    let failed = results.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        return Err(VaultError::CommandFailed(format!(
            "{failed} of {} item(s) could not be decrypted",
            results.len()
        )));
    }

    if format != "json" {
        output::success(&format!("Decrypted {} password(s)", results.len()));
    }

    Ok(())
}
