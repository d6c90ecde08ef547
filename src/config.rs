//! Fixed project paths and environment lookups

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Target that receives the lint build phase
pub const DEFAULT_TARGET: &str = "KognitaCore";

/// Shared scheme patched with the debug launch configuration
pub fn scheme_path(project_dir: &Path) -> PathBuf {
    project_dir
        .join("KognitaCore.xcodeproj")
        .join("xcshareddata")
        .join("xcschemes")
        .join("KognitaCore-Package.xcscheme")
}

/// Project descriptor that receives the lint build phase
pub fn pbxproj_path(project_dir: &Path) -> PathBuf {
    project_dir
        .join("KognitaCore.xcodeproj")
        .join("project.pbxproj")
}

/// Account name of the invoking user, from LOGNAME/USER/USERNAME in that order.
///
/// Commands take the user name as a parameter; this lookup is only the
/// outermost fallback when no `--user` override is given.
pub fn current_user() -> Result<String> {
    ["LOGNAME", "USER", "USERNAME"]
        .iter()
        .find_map(|key| env::var(key).ok().filter(|v| !v.is_empty()))
        .context("Could not determine the current user (LOGNAME/USER/USERNAME unset)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_path_layout() {
        let path = scheme_path(Path::new("/work/kognita"));
        assert_eq!(
            path,
            PathBuf::from(
                "/work/kognita/KognitaCore.xcodeproj/xcshareddata/xcschemes/KognitaCore-Package.xcscheme"
            )
        );
    }

    #[test]
    fn test_pbxproj_path_layout() {
        let path = pbxproj_path(Path::new("."));
        assert_eq!(
            path,
            PathBuf::from("./KognitaCore.xcodeproj/project.pbxproj")
        );
    }

    #[test]
    fn test_current_user_lookup() {
        // Should not panic; most environments define at least one of the vars
        let _ = current_user();
    }
}
