//! Picks the launch artifact out of a build output directory.
//!
//! `<name>.runtimeconfig.json` marks `<name>` as a managed entry point. A
//! bare `<name>` file next to it is a self-contained native host; otherwise
//! `<name>.dll` is run through the shared runtime.

use super::shell_quote;
use crate::error::{Result, StagingError};
use crate::fs::FileSystem;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const RUNTIME_CONFIG_SUFFIX: &str = ".runtimeconfig.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    NativeSelfContained,
    PortableManagedDll,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::NativeSelfContained => write!(f, "self-contained"),
            ArtifactKind::PortableManagedDll => write!(f, "portable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Entry point name without extension (`proj1`)
    pub name: String,
    /// File that gets launched: `proj1` or `proj1.dll`
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl Artifact {
    /// Shell command that starts the artifact from its own directory
    pub fn start_command(&self) -> String {
        match self.kind {
            ArtifactKind::NativeSelfContained => {
                shell_quote(&format!("./{}", self.name)).into_owned()
            }
            ArtifactKind::PortableManagedDll => {
                format!("dotnet {}", shell_quote(&format!("{}.dll", self.name)))
            }
        }
    }
}

pub struct ArtifactInspector<'a> {
    fs: &'a dyn FileSystem,
}

impl<'a> ArtifactInspector<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self { fs }
    }

    /// Find the single launch artifact directly under `output_dir`. A native
    /// artifact missing its executable bit gets it set.
    pub fn inspect(&self, output_dir: &Path) -> Result<Artifact> {
        match self.find(output_dir)? {
            Some(artifact) => Ok(artifact),
            None => Err(StagingError::NoRunnableArtifact(output_dir.to_path_buf())),
        }
    }

    /// Like [`inspect`](Self::inspect) but a missing directory or missing
    /// candidate is `None` rather than an error.
    pub fn find(&self, output_dir: &Path) -> Result<Option<Artifact>> {
        if !self.fs.is_dir(output_dir) {
            debug!(dir = %output_dir.display(), "Output directory does not exist");
            return Ok(None);
        }

        let entries = self
            .fs
            .read_dir(output_dir)
            .map_err(|e| StagingError::io(output_dir, e))?;

        let files: BTreeSet<&str> = entries
            .iter()
            .filter(|e| e.is_file())
            .map(|e| e.file_name())
            .collect();

        let mut candidates: Vec<(String, ArtifactKind)> = files
            .iter()
            .filter_map(|file| file.strip_suffix(RUNTIME_CONFIG_SUFFIX))
            .filter(|name| !name.is_empty())
            .filter_map(|name| {
                if files.contains(name) {
                    Some((name.to_string(), ArtifactKind::NativeSelfContained))
                } else if files.contains(format!("{}.dll", name).as_str()) {
                    Some((name.to_string(), ArtifactKind::PortableManagedDll))
                } else {
                    debug!(name, "runtimeconfig has no matching executable or dll");
                    None
                }
            })
            .collect();

        if candidates.is_empty() {
            return Ok(None);
        }

        if candidates.len() > 1 {
            warn!(
                dir = %output_dir.display(),
                candidates = ?candidates.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
                "Multiple launch candidates, using the first"
            );
        }

        let (name, kind) = candidates.remove(0);
        let path = match kind {
            ArtifactKind::NativeSelfContained => output_dir.join(&name),
            ArtifactKind::PortableManagedDll => output_dir.join(format!("{}.dll", name)),
        };

        if kind == ArtifactKind::NativeSelfContained {
            let executable = self
                .fs
                .is_executable(&path)
                .map_err(|e| StagingError::io(&path, e))?;
            if !executable {
                debug!(path = %path.display(), "Artifact lacks the executable bit");
            }
            let changed = self
                .fs
                .set_executable(&path)
                .map_err(|e| StagingError::io(&path, e))?;
            if changed {
                debug!(path = %path.display(), "Marked artifact executable");
            }
        }

        info!(artifact = %name, kind = %kind, "Found launch artifact");
        Ok(Some(Artifact { name, path, kind }))
    }
}
