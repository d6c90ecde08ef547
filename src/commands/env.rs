//! Env command - inject the database user into the shared scheme

use anyhow::{bail, Result};
use owo_colors::OwoColorize;
use std::path::Path;

use crate::config;
use crate::xcode::scheme::{SchemeChange, SchemeDocument, DATABASE_USER_KEY};

/// Execute the env command
///
/// `user` overrides the account name; when omitted it is looked up from the
/// environment at this outermost layer, keeping the mutation itself pure.
pub fn execute(project_dir: &Path, user: Option<&str>, dry_run: bool) -> Result<()> {
    let user = match user {
        Some(user) => user.to_string(),
        None => config::current_user()?,
    };

    let scheme_path = config::scheme_path(project_dir);
    if !scheme_path.exists() {
        bail!("Scheme not found: {}", scheme_path.display());
    }

    let mut doc = SchemeDocument::read(&scheme_path)?;
    let change = doc.ensure_debug_launch_action(&user);

    match &change {
        SchemeChange::AddedLaunchAction => println!(
            "{} Debug LaunchAction with {}={}",
            "Added:".green(),
            DATABASE_USER_KEY,
            user
        ),
        SchemeChange::AddedVariable => println!(
            "{} {}={} on the existing LaunchAction",
            "Added:".green(),
            DATABASE_USER_KEY,
            user
        ),
        SchemeChange::UpdatedVariable { previous } => println!(
            "{} {}: {} -> {}",
            "Updated:".green(),
            DATABASE_USER_KEY,
            previous,
            user
        ),
        SchemeChange::Unchanged => {
            println!("{} already set to {}", DATABASE_USER_KEY, user);
            return Ok(());
        }
    }

    if dry_run {
        println!("{}", "(DRY-RUN) No changes written.".blue());
        return Ok(());
    }

    doc.write(&scheme_path)?;
    println!("{} {}", "Wrote:".green(), scheme_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL_SCHEME: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Scheme LastUpgradeVersion="9999" version="1.3">
</Scheme>"#;

    fn project_with_scheme() -> TempDir {
        let dir = TempDir::new().unwrap();
        let schemes = dir
            .path()
            .join("KognitaCore.xcodeproj")
            .join("xcshareddata")
            .join("xcschemes");
        fs::create_dir_all(&schemes).unwrap();
        fs::write(schemes.join("KognitaCore-Package.xcscheme"), MINIMAL_SCHEME).unwrap();
        dir
    }

    #[test]
    fn test_patches_scheme_with_given_user() {
        let dir = project_with_scheme();
        execute(dir.path(), Some("testuser"), false).unwrap();

        let doc = SchemeDocument::read(&config::scheme_path(dir.path())).unwrap();
        assert_eq!(doc.database_user(), Some("testuser"));
    }

    #[test]
    fn test_second_run_is_idempotent() {
        let dir = project_with_scheme();
        execute(dir.path(), Some("testuser"), false).unwrap();
        execute(dir.path(), Some("testuser"), false).unwrap();

        let content = fs::read_to_string(config::scheme_path(dir.path())).unwrap();
        assert_eq!(content.matches("<LaunchAction").count(), 1);
    }

    #[test]
    fn test_missing_scheme_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = execute(dir.path(), Some("testuser"), false).unwrap_err();
        assert!(err.to_string().contains("Scheme not found"));
    }

    #[test]
    fn test_malformed_scheme_is_an_error() {
        let dir = project_with_scheme();
        fs::write(config::scheme_path(dir.path()), "<Scheme><broken>").unwrap();

        assert!(execute(dir.path(), Some("testuser"), false).is_err());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = project_with_scheme();
        execute(dir.path(), Some("testuser"), true).unwrap();

        let content = fs::read_to_string(config::scheme_path(dir.path())).unwrap();
        assert_eq!(content, MINIMAL_SCHEME);
    }
}
