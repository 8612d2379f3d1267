use super::{load_target, write_document};
use crate::config::Config;
use anyhow::{Context, Result};
use bdoc_common::OffsetType;
use bdoc_document::ChangeLog;
use bdoc_editor::{ConflictPolicy, Reconciler};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Document the change log is replayed against
    pub target: PathBuf,

    /// Change log to replay
    pub changelog: PathBuf,

    /// Conflict policy for annotation:add on existing ids (overrides config)
    #[arg(short, long)]
    pub policy: Option<ConflictPolicy>,

    /// Offset convention of the written result, "j" or "p" (overrides config)
    #[arg(long)]
    pub offsets: Option<OffsetType>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn replay(args: ReplayArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let policy = args.policy.unwrap_or(config.conflict_policy);

    let mut target = load_target(&args.target)?;
    let content = fs::read_to_string(&args.changelog)
        .with_context(|| format!("Cannot read {}", args.changelog.display()))?;
    let log = ChangeLog::from_json(&content)
        .with_context(|| format!("Invalid change log {}", args.changelog.display()))?;

    eprintln!(
        "{} {} commands against {}",
        "⏩ Replaying".bright_blue().bold(),
        log.len(),
        args.target.display()
    );

    let stats = Reconciler::new()
        .conflict_policy(policy)
        .apply_changelog(&mut target, &log)
        .with_context(|| format!("Replay of {} failed", args.changelog.display()))?;
    eprintln!(
        "  {} {} commands applied",
        "✓".green(),
        stats.commands_applied
    );

    let result = target.to_snapshot_as(args.offsets.unwrap_or(config.offset_type))?;
    write_document(&result, args.output.as_deref(), config.pretty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdoc_document::Document;

    fn args(dir: &std::path::Path, changelog: &str) -> ReplayArgs {
        fs::write(dir.join("changes.json"), changelog).unwrap();
        ReplayArgs {
            target: dir.join("target.json"),
            changelog: dir.join("changes.json"),
            policy: None,
            offsets: None,
            output: Some(dir.join("out.json")),
        }
    }

    fn setup() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("target.json"),
            r#"{"text": "hello world", "annotation_sets": {"": {"name": "", "annotations": [
                {"id": 0, "type": "Token", "start": 0, "end": 5}
            ], "max_annid": 0}}}"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_replay_writes_result() {
        let dir = setup();
        let cwd = dir.path().display().to_string();
        let mut replay_args = args(
            dir.path(),
            r#"{"changes": [
                {"command": "annotation:add", "set": "", "id": 0, "start": 6, "end": 11, "type": "Token"},
                {"command": "feature:set", "feature": "done", "value": true}
            ], "offset_type": "p"}"#,
        );
        replay_args.policy = Some(ConflictPolicy::AddWithNewId);
        replay(replay_args, &cwd).unwrap();

        let out = Document::from_json(&fs::read_to_string(dir.path().join("out.json")).unwrap())
            .unwrap();
        let set = out.annotation_set("").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().start, 6);
        assert_eq!(out.features.unwrap()["done"], true);
    }

    #[test]
    fn test_replay_reports_missing_annotation() {
        let dir = setup();
        let cwd = dir.path().display().to_string();
        let replay_args = args(
            dir.path(),
            r#"{"changes": [{"command": "annotation:remove", "set": "", "id": 9}]}"#,
        );

        let err = replay(replay_args, &cwd).unwrap_err();
        assert!(format!("{:#}", err).contains("Not found"));
        assert!(!dir.path().join("out.json").exists());
    }
}
