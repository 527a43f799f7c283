//! Build-hook command detection.
//!
//! Answers "does any pre-build hook invoke `npm`?" for either description
//! scheme. A hook line may chain several shell commands with `&&`; a token
//! matches when it is the first word of one of those segments.

use super::description::{BuildDescription, LegacyDescription, ModernDescription, Target};
use super::scheme::scheme_for_file;
use crate::config::StagerConfig;
use crate::error::{Result, StagingError};
use crate::fs::FileSystem;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const COMMAND_SEPARATOR: &str = "&&";
const BEFORE_PUBLISH_TARGET: &str = "BeforePublish";
const AFTER_BUILD_TARGET: &str = "Build";

/// A point in the build lifecycle at which hook commands run.
///
/// Legacy descriptions key hooks by script name. Modern descriptions have a
/// single eligible phase, the targets that run as part of the managed
/// build/publish step, so the key is ignored for them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HookPhase {
    #[default]
    Precompile,
    Script(String),
}

impl HookPhase {
    pub fn legacy_key(&self) -> &str {
        match self {
            HookPhase::Precompile => "precompile",
            HookPhase::Script(name) => name,
        }
    }
}

impl From<&str> for HookPhase {
    fn from(name: &str) -> Self {
        if name == "precompile" {
            HookPhase::Precompile
        } else {
            HookPhase::Script(name.to_string())
        }
    }
}

/// True if any `&&`-separated segment of `line` starts with `token`.
pub fn line_invokes(line: &str, token: &str) -> bool {
    line.split(COMMAND_SEPARATOR)
        .any(|segment| segment.split_whitespace().next() == Some(token))
}

fn target_is_eligible(target: &Target) -> bool {
    target.name.as_deref().map(str::trim) == Some(BEFORE_PUBLISH_TARGET)
        || target.after_targets.as_deref().map(str::trim) == Some(AFTER_BUILD_TARGET)
}

fn legacy_has_command(desc: &LegacyDescription, phase: &HookPhase, token: &str) -> bool {
    desc.scripts
        .get(phase.legacy_key())
        .is_some_and(|commands| commands.lines().iter().any(|line| line_invokes(line, token)))
}

fn modern_has_command(desc: &ModernDescription, token: &str) -> bool {
    desc.targets
        .iter()
        .filter(|target| target_is_eligible(target))
        .flat_map(|target| target.commands.iter())
        .any(|line| line_invokes(line, token))
}

pub fn has_hook_command(description: &BuildDescription, phase: &HookPhase, token: &str) -> bool {
    match description {
        BuildDescription::Legacy(desc) => legacy_has_command(desc, phase, token),
        BuildDescription::Modern(desc) => modern_has_command(desc, token),
    }
}

/// Scans every build description under a source tree and ORs the answers.
pub struct HookScanner<'a> {
    fs: &'a dyn FileSystem,
    config: &'a StagerConfig,
}

impl<'a> HookScanner<'a> {
    pub fn new(fs: &'a dyn FileSystem, config: &'a StagerConfig) -> Self {
        Self { fs, config }
    }

    /// Parse every description file under `root`. A malformed file fails the
    /// whole scan.
    pub fn descriptions(&self, root: &Path) -> Result<Vec<(PathBuf, BuildDescription)>> {
        let files = self
            .fs
            .walk_files(root, self.config.max_depth, &self.config.excluded_dirs())
            .map_err(|e| StagingError::io(root, e))?;

        files
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .and_then(scheme_for_file)
                    .is_some()
            })
            .map(|path| {
                let desc = BuildDescription::load(self.fs, &path)?;
                Ok((path, desc))
            })
            .collect()
    }

    pub fn has_hook_command(&self, root: &Path, phase: &HookPhase, token: &str) -> Result<bool> {
        self.has_any_hook_command(root, phase, &[token])
    }

    pub fn has_any_hook_command(
        &self,
        root: &Path,
        phase: &HookPhase,
        tokens: &[&str],
    ) -> Result<bool> {
        let descriptions = self.descriptions(root)?;

        for (path, desc) in &descriptions {
            if let Some(token) = tokens.iter().find(|t| has_hook_command(desc, phase, t)) {
                info!(
                    file = %path.display(),
                    phase = phase.legacy_key(),
                    command = *token,
                    "Build hook invokes command"
                );
                return Ok(true);
            }
        }

        debug!(
            files = descriptions.len(),
            tokens = ?tokens,
            "No build hook invokes the requested commands"
        );
        Ok(false)
    }
}
