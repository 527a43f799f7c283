//! Classification of a project directory into one of the two description
//! schemes.

use crate::fs::FileSystem;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

pub const LEGACY_MARKER: &str = "project.json";
pub const MODERN_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

/// Which description format governs a project directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildScheme {
    /// `project.json`, run in place with `dotnet run --project`
    Legacy,
    /// `*.csproj` / `*.fsproj` / `*.vbproj`, published before launch
    Modern,
}

impl fmt::Display for BuildScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildScheme::Legacy => write!(f, "project.json"),
            BuildScheme::Modern => write!(f, "msbuild"),
        }
    }
}

/// Scheme implied by a single file name, if it is a marker at all.
pub fn scheme_for_file(file_name: &str) -> Option<BuildScheme> {
    if file_name == LEGACY_MARKER {
        return Some(BuildScheme::Legacy);
    }

    let ext = Path::new(file_name).extension()?.to_str()?;
    let stem_present = file_name.len() > ext.len() + 1;
    if stem_present && MODERN_EXTENSIONS.contains(&ext) {
        Some(BuildScheme::Modern)
    } else {
        None
    }
}

/// Classify `dir` by its direct children. `None` means neither marker is
/// present and the directory cannot be run.
///
/// A directory carrying both markers is treated as Modern: migration
/// tooling leaves `project.json` behind next to the new project file.
pub fn classify(fs: &dyn FileSystem, dir: &Path) -> Result<Option<BuildScheme>> {
    let mut legacy = false;
    let mut modern = false;

    for entry in fs.read_dir(dir)? {
        if !entry.is_file() {
            continue;
        }
        match scheme_for_file(entry.file_name()) {
            Some(BuildScheme::Legacy) => legacy = true,
            Some(BuildScheme::Modern) => modern = true,
            None => {}
        }
    }

    let scheme = match (legacy, modern) {
        (_, true) => {
            if legacy {
                warn!(
                    dir = %dir.display(),
                    "Both project.json and an msbuild project file found, using msbuild"
                );
            }
            Some(BuildScheme::Modern)
        }
        (true, false) => Some(BuildScheme::Legacy),
        (false, false) => None,
    };

    debug!(dir = %dir.display(), scheme = ?scheme, "Classified project directory");
    Ok(scheme)
}
