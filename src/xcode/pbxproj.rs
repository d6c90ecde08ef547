//! Minimal project descriptor accessor
//!
//! `project.pbxproj` is edited textually at two well-defined points rather
//! than through a full model of the format: one entry appended to the named
//! target's `buildPhases` list, and one `PBXShellScriptBuildPhase` object
//! appended to the `objects` table. A small scanner skips quoted strings and
//! comments so brace and paren matching stays correct even when existing
//! script phases contain braces.
//!
//! All mutation happens on an in-memory copy; `save` writes the file once,
//! so a failed mutation leaves the descriptor on disk untouched.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

const OBJECTS_OPEN: &str = "objects = {";
const BUILD_PHASES_OPEN: &str = "buildPhases = (";

/// Comment used for the generated phase, matching the descriptor convention
/// of annotating object references with their name
const PHASE_NAME: &str = "ShellScript";

/// Failure modes of the descriptor accessor
#[derive(Debug, Error)]
pub enum PbxprojError {
    #[error("no objects table found (not a project descriptor?)")]
    MissingObjects,
    #[error("no native target named {0:?}")]
    TargetNotFound(String),
    #[error("target {0:?} has no buildPhases list")]
    MalformedTarget(String),
}

/// A loaded project descriptor
///
/// Contract: load-by-path, append a run-script phase to a named target, save.
#[derive(Debug)]
pub struct Pbxproj {
    path: PathBuf,
    content: String,
}

impl Pbxproj {
    /// Read the descriptor from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read descriptor: {}", path.display()))?;
        if !content.contains(OBJECTS_OPEN) {
            return Err(PbxprojError::MissingObjects)
                .with_context(|| format!("Failed to load descriptor: {}", path.display()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    /// Append a shell-script build phase running `script` to the native
    /// target named `target_name`. Returns the generated phase object ID.
    pub fn add_run_script(&mut self, script: &str, target_name: &str) -> Result<String> {
        let objects_open = self
            .content
            .find(OBJECTS_OPEN)
            .map(|pos| pos + OBJECTS_OPEN.len() - 1)
            .ok_or(PbxprojError::MissingObjects)?;
        let objects_close =
            matching_brace(&self.content, objects_open).ok_or(PbxprojError::MissingObjects)?;

        let (target_open, target_close) =
            self.native_target_block(objects_open, objects_close, target_name)?;

        let target_block = &self.content[target_open..=target_close];
        let phases_rel = target_block
            .find(BUILD_PHASES_OPEN)
            .ok_or_else(|| PbxprojError::MalformedTarget(target_name.to_string()))?;
        let phases_open = target_open + phases_rel + BUILD_PHASES_OPEN.len() - 1;
        let phases_close = next_delimiter(&self.content, phases_open + 1, b')')
            .ok_or_else(|| PbxprojError::MalformedTarget(target_name.to_string()))?;

        let phase_id = generate_object_id();

        // New entry goes on its own line above the closing paren when the
        // list is laid out one entry per line, inline otherwise.
        let line_start = self.content[..phases_close]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(phases_close);
        let closing_line = &self.content[line_start..phases_close];
        let (entry_pos, entry_text) = if line_start > phases_open
            && closing_line.chars().all(|c| c == ' ' || c == '\t')
        {
            (
                line_start,
                format!("{}\t{} /* {} */,\n", closing_line, phase_id, PHASE_NAME),
            )
        } else {
            (phases_close, format!("{} /* {} */, ", phase_id, PHASE_NAME))
        };

        // Phase object appended at the end of the objects table
        let object_pos = self.content[..objects_close]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(objects_close);
        let object_text = shell_script_phase_object(&phase_id, script);

        // Apply highest position first so the lower one stays valid
        let mut edits = [(entry_pos, entry_text), (object_pos, object_text)];
        edits.sort_by(|a, b| b.0.cmp(&a.0));
        for (pos, text) in &edits {
            self.content.insert_str(*pos, text);
        }

        Ok(phase_id)
    }

    /// Write the descriptor back to its original path
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, &self.content)
            .with_context(|| format!("Failed to write descriptor: {}", self.path.display()))?;
        Ok(())
    }

    #[allow(dead_code)]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Locate the `{ ... }` block of the native target named `target_name`
    /// among the top-level entries of the objects table.
    fn native_target_block(
        &self,
        objects_open: usize,
        objects_close: usize,
        target_name: &str,
    ) -> Result<(usize, usize), PbxprojError> {
        let unquoted = format!("name = {};", target_name);
        let quoted = format!("name = \"{}\";", target_name);

        let mut pos = objects_open + 1;
        while pos < objects_close {
            let open = match next_delimiter(&self.content, pos, b'{') {
                Some(open) if open < objects_close => open,
                _ => break,
            };
            let close = matching_brace(&self.content, open)
                .ok_or_else(|| PbxprojError::TargetNotFound(target_name.to_string()))?;

            let block = &self.content[open..=close];
            if block.contains("isa = PBXNativeTarget;")
                && (block.contains(&unquoted) || block.contains(&quoted))
            {
                return Ok((open, close));
            }
            pos = close + 1;
        }
        Err(PbxprojError::TargetNotFound(target_name.to_string()))
    }
}

/// Render the PBXShellScriptBuildPhase object for the objects table
fn shell_script_phase_object(id: &str, script: &str) -> String {
    format!(
        concat!(
            "\t\t{id} /* {name} */ = {{\n",
            "\t\t\tisa = PBXShellScriptBuildPhase;\n",
            "\t\t\tbuildActionMask = 2147483647;\n",
            "\t\t\tfiles = (\n",
            "\t\t\t);\n",
            "\t\t\tinputPaths = (\n",
            "\t\t\t);\n",
            "\t\t\tname = {name};\n",
            "\t\t\toutputPaths = (\n",
            "\t\t\t);\n",
            "\t\t\trunOnlyForDeploymentPostprocessing = 0;\n",
            "\t\t\tshellPath = /bin/sh;\n",
            "\t\t\tshellScript = \"{script}\";\n",
            "\t\t}};\n",
        ),
        id = id,
        name = PHASE_NAME,
        script = escape_string(script),
    )
}

/// Escape a value for a double-quoted descriptor string
fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Descriptor object IDs are 24 uppercase hex digits
fn generate_object_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..24].to_ascii_uppercase()
}

/// Bytes of the descriptor lying outside quoted strings and comments
struct StructuralBytes<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> StructuralBytes<'a> {
    fn new(content: &'a str, pos: usize) -> Self {
        Self {
            bytes: content.as_bytes(),
            pos,
        }
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }
}

impl Iterator for StructuralBytes<'_> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pos >= self.bytes.len() {
                return None;
            }
            match self.bytes[self.pos] {
                b'"' => {
                    self.pos += 1;
                    while self.pos < self.bytes.len() {
                        match self.bytes[self.pos] {
                            b'\\' => self.pos += 2,
                            b'"' => {
                                self.pos += 1;
                                break;
                            }
                            _ => self.pos += 1,
                        }
                    }
                }
                b'/' if self.peek(1) == Some(b'*') => {
                    self.pos += 2;
                    while self.pos < self.bytes.len() {
                        if self.bytes[self.pos] == b'*' && self.peek(1) == Some(b'/') {
                            self.pos += 2;
                            break;
                        }
                        self.pos += 1;
                    }
                }
                b'/' if self.peek(1) == Some(b'/') => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                byte => {
                    let item = (self.pos, byte);
                    self.pos += 1;
                    return Some(item);
                }
            }
        }
    }
}

/// Position of the brace closing the one at `open`
fn matching_brace(content: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (pos, byte) in StructuralBytes::new(content, open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                if depth == 0 {
                    return None;
                }
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
    }
    None
}

/// Next structural occurrence of `needle` at or after `from`
fn next_delimiter(content: &str, from: usize, needle: u8) -> Option<usize> {
    StructuralBytes::new(content, from)
        .find(|&(_, byte)| byte == needle)
        .map(|(pos, _)| pos)
}
