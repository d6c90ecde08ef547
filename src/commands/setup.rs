//! Setup command - run both environment mutations in order
//!
//! The scheme is patched first; any failure there aborts the run before the
//! project descriptor is read or written.

use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

use super::{env, lint};

/// Execute the setup command
pub fn execute(project_dir: &Path, user: Option<&str>, target: &str, dry_run: bool) -> Result<()> {
    println!("{}", "Step 1: Patching shared scheme...".green());
    env::execute(project_dir, user, dry_run)?;

    println!();
    println!("{}", "Step 2: Adding SwiftLint build phase...".green());
    lint::execute(project_dir, target, dry_run)?;

    Ok(())
}
