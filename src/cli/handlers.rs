//! Subcommand handlers. Each returns the process exit code.

use super::commands::{DetectArgs, HooksArgs, PlanArgs};
use crate::config::StagerConfig;
use crate::detect::detect;
use crate::fs::RealFileSystem;
use crate::launch::{render_manifest, LaunchPlanBuilder};
use crate::project::{HookPhase, HookScanner};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const EXIT_OK: i32 = 0;
pub const EXIT_NEGATIVE: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;

fn load_config() -> Option<StagerConfig> {
    let config = StagerConfig::default();
    match config.validate() {
        Ok(()) => Some(config),
        Err(e) => {
            error!("{}", e);
            None
        }
    }
}

fn current_dir_or(path: Option<&PathBuf>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

pub fn handle_detect(args: &DetectArgs) -> i32 {
    let Some(config) = load_config() else {
        return EXIT_CONFIG;
    };

    let result = current_dir_or(args.path.as_ref())
        .and_then(|root| detect(&RealFileSystem::new(), &config, &root));

    match result {
        Ok(true) => {
            println!(".NET");
            EXIT_OK
        }
        Ok(false) => EXIT_NEGATIVE,
        Err(e) => {
            error!("Detection failed: {:#}", e);
            EXIT_NEGATIVE
        }
    }
}

pub fn handle_plan(args: &PlanArgs) -> i32 {
    let Some(config) = load_config() else {
        return EXIT_CONFIG;
    };

    match run_plan(args, &config) {
        Ok(manifest) => {
            print!("{}", manifest);
            EXIT_OK
        }
        Err(e) => {
            error!("{:#}", e);
            EXIT_NEGATIVE
        }
    }
}

fn run_plan(args: &PlanArgs, config: &StagerConfig) -> Result<String> {
    let source = current_dir_or(args.source.as_ref())?;
    let output = args.output.clone().unwrap_or_else(|| source.clone());

    let fs = RealFileSystem::new();
    let builder = LaunchPlanBuilder::new(&fs, config);

    if args.dry_run {
        let plan = builder.build(&source, &output)?;
        return Ok(render_manifest(&plan)?);
    }

    let staged = builder.stage(&source, &output)?;
    info!(
        bootstrap = %staged.bootstrap_path.display(),
        manifest = %staged.manifest_path.display(),
        "Staged"
    );
    Ok(staged.manifest)
}

pub fn handle_hooks(args: &HooksArgs) -> i32 {
    let Some(config) = load_config() else {
        return EXIT_CONFIG;
    };

    match run_hooks(&args.path, &args.phase, &args.tokens, &config) {
        Ok(true) => EXIT_OK,
        Ok(false) => EXIT_NEGATIVE,
        Err(e) => {
            error!("{:#}", e);
            EXIT_NEGATIVE
        }
    }
}

fn run_hooks(root: &Path, phase: &str, tokens: &[String], config: &StagerConfig) -> Result<bool> {
    let fs = RealFileSystem::new();
    let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
    let found = HookScanner::new(&fs, config).has_any_hook_command(
        root,
        &HookPhase::from(phase),
        &tokens,
    )?;
    Ok(found)
}
