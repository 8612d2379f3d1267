use super::{load_target, read_document, write_document};
use crate::config::Config;
use anyhow::Result;
use bdoc_common::OffsetType;
use bdoc_editor::{ConflictPolicy, Reconciler};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Document the snapshot is merged into
    pub target: PathBuf,

    /// Snapshot to merge
    pub snapshot: PathBuf,

    /// Conflict policy for existing annotation ids (overrides config)
    #[arg(short, long)]
    pub policy: Option<ConflictPolicy>,

    /// Only merge this annotation set (repeatable)
    #[arg(long = "set", value_name = "NAME")]
    pub sets: Vec<String>,

    /// Only merge this document feature (repeatable)
    #[arg(long = "feature", value_name = "NAME")]
    pub features: Vec<String>,

    /// Offset convention of the written result, "j" or "p" (overrides config)
    #[arg(long)]
    pub offsets: Option<OffsetType>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let policy = args.policy.unwrap_or(config.conflict_policy);

    let mut target = load_target(&args.target)?;
    let snapshot = read_document(&args.snapshot)?;

    let mut reconciler = Reconciler::new().conflict_policy(policy);
    for name in &args.sets {
        reconciler = reconciler.use_annotation_set(name.as_str());
    }
    for name in &args.features {
        reconciler = reconciler.use_feature(name.as_str());
    }

    eprintln!(
        "{} {} into {} ({})",
        "🔀 Applying".bright_blue().bold(),
        args.snapshot.display(),
        args.target.display(),
        policy
    );

    let stats = reconciler.apply_snapshot(&mut target, &snapshot)?;
    info!(?stats, "Snapshot applied");
    eprintln!(
        "  {} {} features, {} added, {} merged",
        "✓".green(),
        stats.features_set,
        stats.annotations_added,
        stats.annotations_merged
    );

    let result = target.to_snapshot_as(args.offsets.unwrap_or(config.offset_type))?;
    write_document(&result, args.output.as_deref(), config.pretty)
}
