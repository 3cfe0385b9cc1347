//! rewind - project checkpoints for AI-assisted coding.
//!
//! This is the main entry point for the rewind CLI.

mod commands;
mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::*;
use rewind_snapshot::CheckpointManager;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "rewind")]
#[command(author, version, about = "Snapshot and restore project trees", long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up checkpoints in the project
    Setup,
    /// Create a checkpoint
    Create {
        /// Custom checkpoint name
        #[arg(short, long)]
        name: Option<String>,
        /// What this checkpoint represents
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List checkpoints, newest first
    List,
    /// Restore a checkpoint (creates an emergency backup first)
    Restore {
        /// Full or partial checkpoint name
        checkpoint: String,
        /// Show what would change without touching any file
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the development history
    Changelog,
    /// Add a custom entry to the development history
    Log {
        /// Brief description of the change
        description: String,
        /// Longer explanation
        #[arg(long)]
        details: Option<String>,
        /// Action type, e.g. REFACTOR or BUG_FIX
        #[arg(long)]
        action: Option<String>,
    },
    /// Run as MCP server on stdio
    Serve,
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Commands::Serve);
    let _log_file = init_logging(cli.verbose, serving);

    if let Commands::Version = cli.command {
        print_version();
        return Ok(());
    }

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let root = std::fs::canonicalize(&root)
        .with_context(|| format!("Project root {} is not accessible", root.display()))?;
    let manager = CheckpointManager::new(root);

    match cli.command {
        Commands::Setup => handle_setup(&manager).await,
        Commands::Create { name, description } => {
            handle_create(&manager, name, description).await
        }
        Commands::List => handle_list(&manager).await,
        Commands::Restore {
            checkpoint,
            dry_run,
        } => handle_restore(&manager, &checkpoint, dry_run).await,
        Commands::Changelog => handle_changelog(&manager).await,
        Commands::Log {
            description,
            details,
            action,
        } => handle_log(&manager, &description, details, action).await,
        Commands::Serve => run_mcp_server(Arc::new(manager)).await,
        Commands::Version => Ok(()),
    }
}

fn print_version() {
    println!("rewind {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Snapshot and restore project trees, from the CLI or over MCP.");
}
