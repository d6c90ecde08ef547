//! kognita-setup: CLI for preparing a local KognitaCore development environment
//!
//! Patches the shared package scheme so debug runs carry a DATABASE_USER
//! environment variable, and appends a SwiftLint run-script build phase to
//! the generated Xcode project.

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;

mod commands;
mod config;
mod xcode;

#[derive(Parser)]
#[command(name = "kognita-setup")]
#[command(about = "CLI helper for KognitaCore Xcode project setup", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Patch the scheme and add the lint phase in one run
    Setup {
        /// Directory containing KognitaCore.xcodeproj
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Database user to inject (defaults to the current OS user)
        #[arg(long)]
        user: Option<String>,

        /// Target receiving the lint build phase
        #[arg(long, default_value = config::DEFAULT_TARGET)]
        target: String,

        /// Show what would be done without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Inject the DATABASE_USER launch variable into the shared scheme
    Env {
        /// Directory containing KognitaCore.xcodeproj
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Database user to inject (defaults to the current OS user)
        #[arg(long)]
        user: Option<String>,

        /// Show what would be done without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Append the SwiftLint run-script build phase to the project descriptor
    Lint {
        /// Directory containing KognitaCore.xcodeproj
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Target receiving the lint build phase
        #[arg(long, default_value = config::DEFAULT_TARGET)]
        target: String,

        /// Show what would be done without making changes
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Setup {
            project_dir,
            user,
            target,
            dry_run,
        } => {
            if dry_run {
                println!("{}", "(DRY-RUN MODE - no changes will be made)".blue());
            }
            commands::setup::execute(&project_dir, user.as_deref(), &target, dry_run)?;
        }

        Commands::Env {
            project_dir,
            user,
            dry_run,
        } => {
            if dry_run {
                println!("{}", "(DRY-RUN MODE - no changes will be made)".blue());
            }
            commands::env::execute(&project_dir, user.as_deref(), dry_run)?;
        }

        Commands::Lint {
            project_dir,
            target,
            dry_run,
        } => {
            if dry_run {
                println!("{}", "(DRY-RUN MODE - no changes will be made)".blue());
            }
            commands::lint::execute(&project_dir, &target, dry_run)?;
        }
    }

    Ok(())
}
