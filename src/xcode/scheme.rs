//! Scheme document mutation
//!
//! The shared scheme (KognitaCore-Package.xcscheme) is an XML document
//! describing how the package targets are built, run, and debugged. The only
//! section touched here is the `LaunchAction`: it must exist with the Debug
//! configuration and carry a `DATABASE_USER` environment variable set to the
//! invoking user's account name.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use xmltree::{Element, EmitterConfig, XMLNode};

/// Environment variable injected into the launch action
pub const DATABASE_USER_KEY: &str = "DATABASE_USER";

/// Fixed attribute set of the generated Debug launch action
const LAUNCH_ACTION_ATTRIBUTES: &[(&str, &str)] = &[
    ("buildConfiguration", "Debug"),
    (
        "selectedDebuggerIdentifier",
        "Xcode.DebuggerFoundation.Debugger.LLDB",
    ),
    (
        "selectedLauncherIdentifier",
        "Xcode.DebuggerFoundation.Launcher.LLDB",
    ),
    ("launchStyle", "0"),
    ("useCustomWorkingDirectory", "NO"),
    ("ignoresPersistentStateOnLaunch", "NO"),
    ("debugDocumentVersioning", "YES"),
    ("debugServiceExtension", "internal"),
    ("allowLocationSimulation", "YES"),
];

/// What `ensure_debug_launch_action` did to the document
#[derive(Debug, PartialEq, Eq)]
pub enum SchemeChange {
    /// No `LaunchAction` existed; a full Debug launch action was appended
    AddedLaunchAction,
    /// A `LaunchAction` existed but had no `DATABASE_USER` entry
    AddedVariable,
    /// The `DATABASE_USER` entry existed with a different value
    UpdatedVariable { previous: String },
    /// The entry already carried the requested value
    Unchanged,
}

/// A parsed scheme document, mutated in memory and written back wholesale
pub struct SchemeDocument {
    pub root: Element,
}

impl SchemeDocument {
    /// Read and parse a scheme file
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open scheme: {}", path.display()))?;
        let root = Element::parse(BufReader::new(file))
            .with_context(|| format!("Failed to parse scheme: {}", path.display()))?;
        Ok(Self { root })
    }

    /// Parse a scheme document from a string
    ///
    /// # Example
    /// ```
    /// use kognita_setup::xcode::scheme::SchemeDocument;
    ///
    /// let mut doc = SchemeDocument::parse(r#"<Scheme version="1.3"></Scheme>"#).unwrap();
    /// doc.ensure_debug_launch_action("postgres");
    /// assert_eq!(doc.database_user(), Some("postgres"));
    /// ```
    #[allow(dead_code)]
    pub fn parse(xml: &str) -> Result<Self> {
        let root = Element::parse(xml.as_bytes()).context("Failed to parse scheme document")?;
        Ok(Self { root })
    }

    /// Serialize the whole document back to `path`, overwriting it
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create scheme: {}", path.display()))?;
        let config = EmitterConfig::new().perform_indent(true);
        self.root
            .write_with_config(BufWriter::new(file), config)
            .with_context(|| format!("Failed to write scheme: {}", path.display()))?;
        Ok(())
    }

    /// Ensure the Debug `LaunchAction` exists and its `DATABASE_USER`
    /// environment variable equals `user`.
    ///
    /// Updates an existing entry in place; appends only what is absent, so
    /// repeated runs never accumulate duplicate `LaunchAction` siblings.
    pub fn ensure_debug_launch_action(&mut self, user: &str) -> SchemeChange {
        if self.root.get_child("LaunchAction").is_none() {
            self.root
                .children
                .push(XMLNode::Element(debug_launch_action(user)));
            return SchemeChange::AddedLaunchAction;
        }

        let action = match self.root.get_mut_child("LaunchAction") {
            Some(action) => action,
            None => unreachable!(),
        };
        let vars = ensure_child(action, "EnvironmentVariables");

        for node in &mut vars.children {
            let XMLNode::Element(var) = node else {
                continue;
            };
            if var.name != "EnvironmentVariable"
                || var.attributes.get("key").map(String::as_str) != Some(DATABASE_USER_KEY)
            {
                continue;
            }

            let current = var.attributes.get("value").map(String::as_str);
            let enabled = var.attributes.get("isEnabled").map(String::as_str);
            if current == Some(user) && enabled == Some("YES") {
                return SchemeChange::Unchanged;
            }

            let previous = var.attributes.get("value").cloned().unwrap_or_default();
            var.attributes.insert("value".to_string(), user.to_string());
            var.attributes.insert("isEnabled".to_string(), "YES".to_string());
            return SchemeChange::UpdatedVariable { previous };
        }

        vars.children
            .push(XMLNode::Element(environment_variable(user)));
        SchemeChange::AddedVariable
    }

    /// Current value of the `DATABASE_USER` entry, if present
    #[allow(dead_code)]
    pub fn database_user(&self) -> Option<&str> {
        let vars = self
            .root
            .get_child("LaunchAction")?
            .get_child("EnvironmentVariables")?;
        vars.children.iter().find_map(|node| match node {
            XMLNode::Element(var)
                if var.name == "EnvironmentVariable"
                    && var.attributes.get("key").map(String::as_str)
                        == Some(DATABASE_USER_KEY) =>
            {
                var.attributes.get("value").map(String::as_str)
            }
            _ => None,
        })
    }
}

/// Build the full Debug launch action subtree
fn debug_launch_action(user: &str) -> Element {
    let mut action = Element::new("LaunchAction");
    for (key, value) in LAUNCH_ACTION_ATTRIBUTES {
        action
            .attributes
            .insert((*key).to_string(), (*value).to_string());
    }

    let mut vars = Element::new("EnvironmentVariables");
    vars.children
        .push(XMLNode::Element(environment_variable(user)));
    action.children.push(XMLNode::Element(vars));
    action
}

fn environment_variable(user: &str) -> Element {
    let mut var = Element::new("EnvironmentVariable");
    var.attributes
        .insert("key".to_string(), DATABASE_USER_KEY.to_string());
    var.attributes.insert("value".to_string(), user.to_string());
    var.attributes
        .insert("isEnabled".to_string(), "YES".to_string());
    var
}

fn ensure_child<'a>(parent: &'a mut Element, name: &str) -> &'a mut Element {
    if parent.get_child(name).is_none() {
        parent.children.push(XMLNode::Element(Element::new(name)));
    }
    match parent.get_mut_child(name) {
        Some(child) => child,
        None => unreachable!(),
    }
}
