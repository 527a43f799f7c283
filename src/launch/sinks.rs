//! Output sinks: the bootstrap script sourced before start, and the
//! process manifest handed back to the platform.

use super::plan::LaunchPlan;
use crate::config::StagerConfig;
use crate::error::{Result, StagingError};
use crate::fs::FileSystem;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct ProcessManifest<'a> {
    default_process_types: BTreeMap<&'a str, &'a str>,
}

/// What `stage` produced
#[derive(Debug, Clone)]
pub struct StagedOutput {
    pub plan: LaunchPlan,
    pub bootstrap_path: PathBuf,
    pub manifest_path: PathBuf,
    /// Manifest contents, also written to `manifest_path`
    pub manifest: String,
}

/// One `export KEY=VALUE;` line per export, in plan order.
pub fn render_bootstrap(plan: &LaunchPlan) -> String {
    plan.environment
        .iter()
        .map(|e| format!("export {}={};\n", e.key, e.value))
        .collect()
}

pub fn render_manifest(plan: &LaunchPlan) -> std::result::Result<String, serde_yaml::Error> {
    let manifest = ProcessManifest {
        default_process_types: BTreeMap::from([(
            plan.process_type.as_str(),
            plan.command_line.as_str(),
        )]),
    };
    serde_yaml::to_string(&manifest)
}

pub fn write_sinks(
    fs: &dyn FileSystem,
    plan: LaunchPlan,
    app_root: &Path,
    config: &StagerConfig,
) -> Result<StagedOutput> {
    let bootstrap_path = app_root.join(&config.profile_script);
    let manifest_path = app_root.join(&config.release_file);

    // Render both before touching disk.
    let bootstrap = render_bootstrap(&plan);
    let manifest =
        render_manifest(&plan).map_err(|e| StagingError::io(&manifest_path, e.into()))?;

    fs.write(&bootstrap_path, &bootstrap)
        .map_err(|e| StagingError::io(&bootstrap_path, e))?;
    if let Err(e) = fs.write(&manifest_path, &manifest) {
        if let Err(cleanup) = fs.remove_file(&bootstrap_path) {
            warn!(
                path = %bootstrap_path.display(),
                error = %cleanup,
                "Failed to remove bootstrap script after manifest write failed"
            );
        }
        return Err(StagingError::io(&manifest_path, e));
    }

    info!(
        bootstrap = %bootstrap_path.display(),
        manifest = %manifest_path.display(),
        "Wrote launch configuration"
    );

    Ok(StagedOutput {
        plan,
        bootstrap_path,
        manifest_path,
        manifest,
    })
}
