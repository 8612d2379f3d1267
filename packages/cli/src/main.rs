mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, convert, init, replay, ApplyArgs, ConvertArgs, InitArgs, ReplayArgs};
use tracing_subscriber::EnvFilter;

/// Bdoc CLI - reconcile annotated documents from snapshots and change logs
#[derive(Parser, Debug)]
#[command(name = "bdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log reconciliation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a bdoc.config.json with default settings
    Init(InitArgs),

    /// Merge a snapshot into a target document
    Apply(ApplyArgs),

    /// Replay a change log against a target document
    Replay(ReplayArgs),

    /// Convert a snapshot's offsets between code units and code points
    Convert(ConvertArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Apply(args) => apply(args, &cwd),
        Command::Replay(args) => replay(args, &cwd),
        Command::Convert(args) => convert(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
