use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Resolve a .NET source tree into a start command and launch configuration
#[derive(Parser, Debug)]
#[command(
    name = "netstage",
    about = "Resolve a .NET source tree into a start command and launch configuration",
    version,
    long_about = "netstage finds the project to run in a .NET source tree (project.json or \
                  MSBuild project files), decides how to start it, and writes the bootstrap \
                  script and process manifest the hosting platform expects."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Check whether a directory holds a .NET app",
        long_about = "Exits 0 when the directory holds published output or a project file \
                      with matching sources, 1 otherwise.\n\n\
                      Examples:\n  \
                      netstage detect\n  \
                      netstage detect /tmp/app"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Compute the start command and write the launch configuration",
        long_about = "Locates the project, inspects the publish output and writes the \
                      bootstrap script and process manifest. The manifest is also printed \
                      to stdout.\n\n\
                      Examples:\n  \
                      netstage plan /tmp/app\n  \
                      netstage plan /tmp/src --output /tmp/app\n  \
                      netstage plan /tmp/app --dry-run"
    )]
    Plan(PlanArgs),

    #[command(
        about = "Check whether any build hook invokes a command",
        long_about = "Exits 0 when a build hook in any project description invokes one of \
                      the given commands, 1 otherwise.\n\n\
                      Examples:\n  \
                      netstage hooks /tmp/app npm\n  \
                      netstage hooks /tmp/app npm bower --phase prepublish"
    )]
    Hooks(HooksArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(value_name = "PATH", help = "Directory to inspect (defaults to current directory)")]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct PlanArgs {
    #[arg(value_name = "SOURCE", help = "Source tree to resolve (defaults to current directory)")]
    pub source: Option<PathBuf>,

    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        help = "App root holding build output, where the launch configuration is written (defaults to SOURCE)"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Print the manifest without writing anything")]
    pub dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct HooksArgs {
    #[arg(value_name = "PATH", help = "Source tree to scan")]
    pub path: PathBuf,

    #[arg(value_name = "COMMAND", required = true, help = "Commands to look for")]
    pub tokens: Vec<String>,

    #[arg(
        long,
        value_name = "NAME",
        default_value = "precompile",
        help = "project.json scripts key to inspect"
    )]
    pub phase: String,
}
