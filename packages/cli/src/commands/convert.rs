use super::{read_document, write_document};
use crate::config::Config;
use anyhow::Result;
use bdoc_common::OffsetType;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Snapshot to convert
    pub input: PathBuf,

    /// Target offset convention, "j" (code units) or "p" (code points)
    #[arg(long)]
    pub offsets: OffsetType,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn convert(args: ConvertArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut doc = read_document(&args.input)?;
    let from = doc.offset_type;

    doc.fixup(args.offsets)?;
    eprintln!(
        "  {} {} offsets {} → {}",
        "✓".green(),
        doc.annotation_count(),
        from,
        args.offsets
    );

    write_document(&doc, args.output.as_deref(), config.pretty)
}
