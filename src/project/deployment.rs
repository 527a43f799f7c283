//! `.deployment` override file.
//!
//! ```text
//! [config]
//! project=src/proj2
//! ```

use crate::error::{Result, StagingError};
use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEPLOYMENT_FILE: &str = ".deployment";

const CONFIG_SECTION: &str = "config";
const PROJECT_KEY: &str = "project";

/// Extract the `project` path from `[config]`, if any.
pub fn parse_project(content: &str) -> Option<PathBuf> {
    let mut section: Option<String> = None;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if let Some(name) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            section = Some(name.trim().to_lowercase());
            continue;
        }

        if section.as_deref() != Some(CONFIG_SECTION) {
            continue;
        }

        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };

        if !key.trim().eq_ignore_ascii_case(PROJECT_KEY) {
            continue;
        }

        let value = value.trim().trim_matches('"').replace('\\', "/");
        let value = value.trim_end_matches('/');
        if value.is_empty() {
            return None;
        }
        return Some(PathBuf::from(value));
    }

    None
}

/// Read `.deployment` at the source root. Missing file means no override.
pub fn read_override(fs: &dyn FileSystem, source_root: &Path) -> Result<Option<PathBuf>> {
    let path = source_root.join(DEPLOYMENT_FILE);
    if !fs.is_file(&path) {
        return Ok(None);
    }

    let content = fs
        .read_to_string(&path)
        .map_err(|e| StagingError::io(&path, e))?;
    let project = parse_project(&content);

    debug!(file = %path.display(), project = ?project, "Read deployment override");
    Ok(project)
}
