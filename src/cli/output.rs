//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;
use serde::Serialize;

use crate::crypto::IntegrityStatus;
use crate::errors::{Result, VaultError};
use crate::vault::{BlobSummary, ItemResult};

/// Fixed-width stand-in for a hidden secret (does not leak its length).
const MASK: &str = "••••••••";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// What to show in the secret column for one result.
fn secret_cell(result: &ItemResult, reveal: bool) -> String {
    match (result.plaintext(), reveal) {
        (Some(plaintext), true) => plaintext.to_string(),
        (Some(_), false) => MASK.to_string(),
        (None, _) => match result.error() {
            Some(e) => format!("error: {e}"),
            None => String::new(),
        },
    }
}

fn integrity_cell(status: Option<IntegrityStatus>) -> &'static str {
    match status {
        Some(IntegrityStatus::Matched) => "ok",
        Some(IntegrityStatus::Mismatch) => "hash mismatch",
        None => "-",
    }
}

/// Print a table of decrypted items (Title, Password, Integrity).
pub fn print_items_table(results: &[ItemResult], reveal: bool) {
    if results.is_empty() {
        info("No password fields in this vault.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Title", "Password", "Integrity"]);

    for r in results {
        table.add_row(vec![
            r.title.clone(),
            secret_cell(r, reveal),
            integrity_cell(r.integrity()).to_string(),
        ]);
    }

    println!("{table}");

    if !reveal {
        tip("Run with --reveal to show plaintext passwords.");
    }
}

#[derive(Serialize)]
struct JsonItem<'a> {
    uuid: &'a str,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    integrity: Option<IntegrityStatus>,
}

/// Render decrypted items as a JSON array.
pub fn items_json(results: &[ItemResult], reveal: bool) -> Result<String> {
    let items: Vec<JsonItem<'_>> = results
        .iter()
        .map(|r| JsonItem {
            uuid: &r.uuid,
            title: &r.title,
            password: r.plaintext().map(|_| secret_cell(r, reveal)),
            error: r.error().map(ToString::to_string),
            integrity: r.integrity(),
        })
        .collect();

    serde_json::to_string_pretty(&items).map_err(|e| VaultError::Serialization(e.to_string()))
}

/// Print a table of discovery blobs, optionally with their hex content.
pub fn print_blob_table(blobs: &[BlobSummary], show_hex: bool) {
    println!("{}", blob_table(blobs, show_hex));
}

fn blob_table(blobs: &[BlobSummary], show_hex: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec!["Source", "Bytes"];
    if show_hex {
        header.push("Hex");
    }
    table.set_header(header);

    for b in blobs {
        let mut row = vec![
            b.source.to_string(),
            b.len.map_or_else(|| "absent".to_string(), |n| n.to_string()),
        ];
        if show_hex {
            row.push(b.hex.clone().unwrap_or_default());
        }
        table.add_row(row);
    }

    table
}
