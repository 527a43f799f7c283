//! Parsed build descriptions for both schemes.
//!
//! Shape checks happen once, here: a `scripts` entry that is neither a
//! string nor a list of strings is rejected instead of being skipped at
//! query time.

use super::scheme::{scheme_for_file, BuildScheme};
use crate::error::{Result, StagingError};
use crate::fs::FileSystem;
use roxmltree::Document;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

fn deserialize_null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Value of one `scripts` entry in `project.json`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScriptCommands {
    Single(String),
    Sequence(Vec<String>),
}

impl ScriptCommands {
    pub fn lines(&self) -> Vec<&str> {
        match self {
            ScriptCommands::Single(line) => vec![line.as_str()],
            ScriptCommands::Sequence(lines) => lines.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LegacyDescription {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub scripts: BTreeMap<String, ScriptCommands>,
}

/// One `<Target>` element and the `Command` attributes found inside it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    pub name: Option<String>,
    pub after_targets: Option<String>,
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModernDescription {
    pub targets: Vec<Target>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildDescription {
    Legacy(LegacyDescription),
    Modern(ModernDescription),
}

impl BuildDescription {
    pub fn scheme(&self) -> BuildScheme {
        match self {
            BuildDescription::Legacy(_) => BuildScheme::Legacy,
            BuildDescription::Modern(_) => BuildScheme::Modern,
        }
    }

    /// Read and parse a marker file, dispatching on its name.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let scheme = scheme_for_file(file_name)
            .ok_or_else(|| StagingError::parse(path, "not a project.json or msbuild project file"))?;

        let content = fs
            .read_to_string(path)
            .map_err(|e| StagingError::io(path, e))?;

        let description = match scheme {
            BuildScheme::Legacy => BuildDescription::Legacy(
                parse_legacy(&content).map_err(|msg| StagingError::parse(path, msg))?,
            ),
            BuildScheme::Modern => BuildDescription::Modern(
                parse_modern(&content).map_err(|msg| StagingError::parse(path, msg))?,
            ),
        };

        debug!(path = %path.display(), scheme = %scheme, "Parsed build description");
        Ok(description)
    }
}

/// Visual Studio writes project files with a leading byte order mark.
fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{FEFF}').unwrap_or(content)
}

pub fn parse_legacy(content: &str) -> std::result::Result<LegacyDescription, String> {
    serde_json::from_str(strip_bom(content)).map_err(|e| e.to_string())
}

pub fn parse_modern(content: &str) -> std::result::Result<ModernDescription, String> {
    let doc = Document::parse(strip_bom(content)).map_err(|e| e.to_string())?;

    let targets = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Target")
        .map(|target| Target {
            name: target.attribute("Name").map(str::to_string),
            after_targets: target.attribute("AfterTargets").map(str::to_string),
            commands: target
                .descendants()
                .filter(|n| n.is_element() && *n != target)
                .filter_map(|n| n.attribute("Command"))
                .map(str::to_string)
                .collect(),
        })
        .collect();

    Ok(ModernDescription { targets })
}
