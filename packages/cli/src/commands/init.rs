use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use bdoc_common::OffsetType;
use bdoc_editor::ConflictPolicy;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Default conflict policy
    #[arg(short, long, default_value = "add_with_new_id")]
    pub policy: ConflictPolicy,

    /// Default offset convention of written snapshots
    #[arg(long, default_value = "j")]
    pub offsets: OffsetType,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = Config {
        conflict_policy: args.policy,
        offset_type: args.offsets,
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    Ok(())
}
