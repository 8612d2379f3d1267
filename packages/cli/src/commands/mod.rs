pub mod apply;
pub mod convert;
pub mod init;
pub mod replay;

pub use apply::{apply, ApplyArgs};
pub use convert::{convert, ConvertArgs};
pub use init::{init, InitArgs};
pub use replay::{replay, ReplayArgs};

use anyhow::{Context, Result};
use bdoc_document::Document;
use bdoc_editor::MemoryDocument;
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Read a snapshot from a JSON file
pub(crate) fn read_document(path: &Path) -> Result<Document> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    Document::from_json(&content).with_context(|| format!("Invalid document {}", path.display()))
}

/// Load a snapshot file into an in-memory store
pub(crate) fn load_target(path: &Path) -> Result<MemoryDocument> {
    let snapshot = read_document(path)?;
    MemoryDocument::from_snapshot(snapshot)
        .with_context(|| format!("Cannot load target {}", path.display()))
}

/// Write a snapshot to `output`, or to stdout when no path is given
pub(crate) fn write_document(doc: &Document, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        doc.to_json_pretty()?
    } else {
        doc.to_json()?
    };

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))?;
            eprintln!("  {} wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
