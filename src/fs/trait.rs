//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }
}

/// Abstraction over the staging tree so resolution logic can run against
/// an in-memory tree in tests.
pub trait FileSystem: Send + Sync {
    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// List directory contents, sorted by name
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Recursively list files under `root`, skipping any directory whose
    /// name is in `excluded_dirs`. Paths are absolute and sorted.
    fn walk_files(
        &self,
        root: &Path,
        max_depth: usize,
        excluded_dirs: &[String],
    ) -> Result<Vec<PathBuf>>;

    /// Whether the owner executable bit is set
    fn is_executable(&self, path: &Path) -> Result<bool>;

    /// Add the executable bits (`+x`). Returns true if the mode changed.
    fn set_executable(&self, path: &Path) -> Result<bool>;

    /// Write a file, creating parent directories as needed
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> Result<()>;
}
