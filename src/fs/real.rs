use super::{DirEntry, FileSystem, FileType};
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries = fs::read_dir(path).context(format!("Failed to read directory {:?}", path))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = if path.is_file() {
                FileType::File
            } else if path.is_dir() {
                FileType::Directory
            } else {
                FileType::Symlink
            };

            result.push(DirEntry {
                path,
                name,
                file_type,
            });
        }

        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn walk_files(
        &self,
        root: &Path,
        max_depth: usize,
        excluded_dirs: &[String],
    ) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            anyhow::bail!("Not a directory: {:?}", root);
        }

        let excluded = excluded_dirs.to_vec();
        let mut files = Vec::new();

        for result in WalkBuilder::new(root)
            .max_depth(Some(max_depth))
            .standard_filters(false)
            .hidden(false)
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                !(is_dir && excluded.iter().any(|d| entry.file_name() == d.as_str()))
            })
            .build()
        {
            let entry = match result {
                Ok(e) => e,
                Err(err) => {
                    warn!(error = %err, "Failed to read directory entry");
                    continue;
                }
            };

            if entry.file_type().is_some_and(|t| t.is_file()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        Ok(files)
    }

    #[cfg(unix)]
    fn is_executable(&self, path: &Path) -> Result<bool> {
        use std::os::unix::fs::PermissionsExt;

        let meta = fs::metadata(path).context(format!("Failed to get metadata for {:?}", path))?;
        Ok(meta.permissions().mode() & 0o100 != 0)
    }

    #[cfg(not(unix))]
    fn is_executable(&self, path: &Path) -> Result<bool> {
        Ok(path.is_file())
    }

    #[cfg(unix)]
    fn set_executable(&self, path: &Path) -> Result<bool> {
        use std::os::unix::fs::PermissionsExt;

        let meta = fs::metadata(path).context(format!("Failed to get metadata for {:?}", path))?;
        let mut perms = meta.permissions();
        let mode = perms.mode();
        let wanted = mode | 0o111;
        if wanted == mode {
            return Ok(false);
        }

        perms.set_mode(wanted);
        fs::set_permissions(path, perms)
            .context(format!("Failed to set permissions on {:?}", path))?;
        Ok(true)
    }

    #[cfg(not(unix))]
    fn set_executable(&self, _path: &Path) -> Result<bool> {
        Ok(false)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory {:?}", parent))?;
        }
        fs::write(path, contents).context(format!("Failed to write file {:?}", path))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).context(format!("Failed to remove file {:?}", path))
    }
}
