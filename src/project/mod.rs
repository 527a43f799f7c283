//! Source-tree side of staging: which scheme, which project, which hooks.

pub mod deployment;
pub mod description;
pub mod hooks;
pub mod locator;
pub mod scheme;

pub use description::{BuildDescription, LegacyDescription, ModernDescription, ScriptCommands};
pub use hooks::{has_hook_command, HookPhase, HookScanner};
pub use locator::{Candidate, ProjectLocator, ProjectRoot};
pub use scheme::{classify, BuildScheme};

use std::path::{Path, PathBuf};

/// `path` relative to `base`, `.` when equal. Paths
/// outside `base` are returned unchanged.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => PathBuf::from("."),
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}
