use std::path::PathBuf;
use thiserror::Error;

/// Fatal staging failures. None of these are retried: each is a pure
/// function of the tree on disk.
#[derive(Error, Debug)]
pub enum StagingError {
    #[error("No project found: no project.json, *.csproj, *.fsproj or *.vbproj under {0}")]
    NoProjectFound(PathBuf),

    #[error(
        "Multiple projects found ({}) and no .deployment file selects one",
        display_paths(.candidates)
    )]
    AmbiguousProjectNoOverride { candidates: Vec<PathBuf> },

    #[error(".deployment names {path}, which is not a project directory")]
    InvalidOverride { path: PathBuf },

    #[error("Failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("No runnable artifact in {0}: no file has a matching *.runtimeconfig.json")]
    NoRunnableArtifact(PathBuf),

    #[error("No project could be identified to run")]
    NoProjectIdentified,

    #[error("I/O error on {path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl StagingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        StagingError::Io {
            path: path.into(),
            message: format!("{:#}", source),
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        StagingError::ParseError {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, StagingError>;
