//! Composes project location, classification and artifact inspection into
//! the command line and environment that start the app.

use super::artifact::{Artifact, ArtifactInspector, ArtifactKind};
use super::shell_quote;
use super::sinks::{write_sinks, StagedOutput};
use crate::config::StagerConfig;
use crate::error::{Result, StagingError};
use crate::fs::FileSystem;
use crate::project::{BuildScheme, ProjectLocator, ProjectRoot};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const WEB_PROCESS: &str = "web";

/// One `export KEY=VALUE` statement. Values are literal shell text and may
/// reference variables that only exist when the script runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvExport {
    pub key: String,
    pub value: String,
}

impl EnvExport {
    fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    /// Directory, relative to the app root, to `cd` into before starting
    pub working_directory: PathBuf,
    pub command_line: String,
    pub environment: Vec<EnvExport>,
    pub process_type: String,
    pub project: Option<ProjectRoot>,
    pub artifact: Option<Artifact>,
}

impl LaunchPlan {
    pub fn env(&self, key: &str) -> Option<&str> {
        self.environment
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }
}

enum Launch {
    RunInPlace(PathBuf),
    Artifact(Artifact),
}

pub struct LaunchPlanBuilder<'a> {
    fs: &'a dyn FileSystem,
    config: &'a StagerConfig,
}

impl<'a> LaunchPlanBuilder<'a> {
    pub fn new(fs: &'a dyn FileSystem, config: &'a StagerConfig) -> Self {
        Self { fs, config }
    }

    /// Resolve the launch plan without writing any output.
    pub fn build(&self, source_root: &Path, build_output_root: &Path) -> Result<LaunchPlan> {
        let inspector = ArtifactInspector::new(self.fs);

        let project = match ProjectLocator::new(self.fs, self.config).locate(source_root) {
            Ok(project) => Some(project),
            Err(StagingError::NoProjectFound(_)) => None,
            Err(e) => return Err(e),
        };

        let (working_directory, launch) = match &project {
            Some(root) if root.scheme == BuildScheme::Legacy => {
                (PathBuf::from("."), Launch::RunInPlace(root.relative_to(source_root)))
            }
            Some(_) => {
                let publish_dir = build_output_root.join(&self.config.publish_dir);
                let artifact = inspector.inspect(&publish_dir)?;
                (self.config.publish_dir.clone(), Launch::Artifact(artifact))
            }
            None => {
                debug!(
                    dir = %build_output_root.display(),
                    "No project files, looking for published output in the app root"
                );
                match inspector.find(build_output_root)? {
                    Some(artifact) => (PathBuf::from("."), Launch::Artifact(artifact)),
                    None => return Err(StagingError::NoProjectIdentified),
                }
            }
        };

        let start = match &launch {
            Launch::RunInPlace(project_dir) => {
                let project_dir = project_dir.to_string_lossy();
                format!("dotnet run --project {}", shell_quote(&project_dir))
            }
            Launch::Artifact(artifact) => artifact.start_command(),
        };
        let command_line = format!(
            "cd {} && {}",
            shell_quote(&working_directory.to_string_lossy()),
            start
        );
        let environment = self.environment(&launch);

        info!(command = %command_line, "Computed start command");

        Ok(LaunchPlan {
            working_directory,
            command_line,
            environment,
            process_type: WEB_PROCESS.to_string(),
            project,
            artifact: match launch {
                Launch::Artifact(artifact) => Some(artifact),
                Launch::RunInPlace(_) => None,
            },
        })
    }

    /// Resolve the plan, then write the bootstrap script and process
    /// manifest under `build_output_root`. Nothing is written on failure.
    pub fn stage(&self, source_root: &Path, build_output_root: &Path) -> Result<StagedOutput> {
        let plan = self.build(source_root, build_output_root)?;
        write_sinks(self.fs, plan, build_output_root, self.config)
    }

    fn environment(&self, launch: &Launch) -> Vec<EnvExport> {
        let dotnet_root = format!("$HOME/{}", self.config.dotnet_dir);

        let mut env = vec![
            EnvExport::new("HOME", self.config.app_home.as_str()),
            EnvExport::new("PID", "$$"),
        ];

        let needs_runtime = match launch {
            Launch::RunInPlace(_) => true,
            Launch::Artifact(artifact) => artifact.kind == ArtifactKind::PortableManagedDll,
        };

        if needs_runtime {
            env.push(EnvExport::new("DOTNET_ROOT", dotnet_root.as_str()));
            env.push(EnvExport::new("PATH", format!("{}:$PATH", dotnet_root)));
        }
        if matches!(launch, Launch::RunInPlace(_)) {
            env.push(EnvExport::new("DOTNET_SKIP_FIRST_TIME_EXPERIENCE", "true"));
        }

        env.push(EnvExport::new(
            "ASPNETCORE_URLS",
            format!("http://0.0.0.0:${{{}}}", self.config.port_var),
        ));

        env
    }
}
