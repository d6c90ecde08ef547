//! Lint command - append the SwiftLint run-script phase
//!
//! The phase runs swiftlint in check and autocorrect modes when the binary
//! is on PATH, and prints a warning with an installation pointer otherwise.

use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

use crate::config;
use crate::xcode::pbxproj::Pbxproj;

/// Script text of the injected build phase, verbatim
pub const SWIFTLINT_SCRIPT: &str = r#"
if which swiftlint >/dev/null; then
  swiftlint
  swiftlint autocorrect
else
  echo "warning: SwiftLint not installed, download from https://github.com/realm/SwiftLint"
fi
"#;

/// Execute the lint command
pub fn execute(project_dir: &Path, target: &str, dry_run: bool) -> Result<()> {
    let pbxproj_path = config::pbxproj_path(project_dir);

    let mut project = Pbxproj::load(&pbxproj_path)?;
    let phase_id = project.add_run_script(SWIFTLINT_SCRIPT, target)?;

    println!(
        "{} SwiftLint phase {} to target {}",
        "Added:".green(),
        phase_id.dimmed(),
        target
    );

    if dry_run {
        println!("{}", "(DRY-RUN) No changes written.".blue());
        return Ok(());
    }

    project.save()?;
    println!("{} {}", "Wrote:".green(), pbxproj_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MINIMAL_PBXPROJ: &str = "\
// !$*UTF8*$!
{
\tarchiveVersion = 1;
\tobjectVersion = 46;
\tobjects = {
\t\tOBJ_26 /* KognitaCore */ = {
\t\t\tisa = PBXNativeTarget;
\t\t\tbuildPhases = (
\t\t\t\tOBJ_30 /* Sources */,
\t\t\t);
\t\t\tname = KognitaCore;
\t\t};
\t\tOBJ_30 /* Sources */ = {
\t\t\tisa = PBXSourcesBuildPhase;
\t\t\tfiles = (
\t\t\t);
\t\t};
\t};
\trootObject = OBJ_1 /* Project object */;
}
";

    fn project_with_descriptor() -> TempDir {
        let dir = TempDir::new().unwrap();
        let xcodeproj = dir.path().join("KognitaCore.xcodeproj");
        fs::create_dir_all(&xcodeproj).unwrap();
        fs::write(xcodeproj.join("project.pbxproj"), MINIMAL_PBXPROJ).unwrap();
        dir
    }

    #[test]
    fn test_adds_swiftlint_phase() {
        let dir = project_with_descriptor();
        execute(dir.path(), "KognitaCore", false).unwrap();

        let content = fs::read_to_string(config::pbxproj_path(dir.path())).unwrap();
        assert!(content.contains("isa = PBXShellScriptBuildPhase;"));
        assert!(content.contains("swiftlint autocorrect"));
        assert!(content.contains(
            "echo \\\"warning: SwiftLint not installed, download from https://github.com/realm/SwiftLint\\\""
        ));
    }

    #[test]
    fn test_unknown_target_leaves_file_untouched() {
        let dir = project_with_descriptor();
        let err = execute(dir.path(), "NoSuchTarget", false).unwrap_err();
        assert!(err.to_string().contains("NoSuchTarget"));

        let content = fs::read_to_string(config::pbxproj_path(dir.path())).unwrap();
        assert_eq!(content, MINIMAL_PBXPROJ);
    }

    #[test]
    fn test_missing_descriptor_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(execute(dir.path(), "KognitaCore", false).is_err());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = project_with_descriptor();
        execute(dir.path(), "KognitaCore", true).unwrap();

        let content = fs::read_to_string(config::pbxproj_path(dir.path())).unwrap();
        assert_eq!(content, MINIMAL_PBXPROJ);
    }

    #[test]
    fn test_script_has_leading_and_trailing_newline() {
        // The phase body is a fixed snippet, surrounding newlines included
        assert!(SWIFTLINT_SCRIPT.starts_with("\nif which swiftlint"));
        assert!(SWIFTLINT_SCRIPT.ends_with("fi\n"));
    }
}
