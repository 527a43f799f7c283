//! netstage - launch configuration for .NET apps on a buildpack-style platform
//!
//! Given a source tree and the directory that holds its build output, netstage
//! decides which project to run, how to start it, and writes two files: a
//! bootstrap script of `export` statements sourced before start, and a YAML
//! process manifest naming the `web` command.
//!
//! Two project schemes are understood: `project.json` descriptions, which are
//! run in place with `dotnet run`, and MSBuild project files, whose published
//! output is started either as a self-contained executable or through
//! `dotnet <name>.dll`.
//!
//! # Example
//!
//! ```no_run
//! use netstage::{LaunchPlanBuilder, RealFileSystem, StagerConfig};
//! use std::path::Path;
//!
//! let fs = RealFileSystem::new();
//! let config = StagerConfig::default();
//! let app = Path::new("/tmp/app");
//!
//! let staged = LaunchPlanBuilder::new(&fs, &config).stage(app, app)?;
//! println!("{}", staged.plan.command_line);
//! # Ok::<(), netstage::StagingError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`project`]: locating and classifying projects, reading build hooks
//! - [`launch`]: artifact inspection, launch plans, and output files
//! - [`fs`]: filesystem seam with real and in-memory implementations

pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod fs;
pub mod launch;
pub mod project;
pub mod util;

pub use config::{ConfigError, StagerConfig};
pub use detect::detect;
pub use error::StagingError;
pub use fs::{FileSystem, MockFileSystem, RealFileSystem};
pub use launch::{Artifact, ArtifactInspector, ArtifactKind, LaunchPlan, LaunchPlanBuilder, StagedOutput};
pub use project::{BuildScheme, HookPhase, HookScanner, ProjectLocator, ProjectRoot};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
