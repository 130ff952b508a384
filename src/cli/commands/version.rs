//! `enpassvault version` — display version and enabled backends.

use console::style;

use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("enpassvault {current}");

    if cfg!(feature = "sqlcipher") {
        println!("{}", style("SQLCipher backend enabled").green());
    } else {
        println!(
            "{}",
            style("Built without SQLCipher; rebuild with `--features sqlcipher` to read real vaults")
                .yellow()
        );
    }

    Ok(())
}
