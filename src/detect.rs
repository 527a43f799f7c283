//! Does this tree look like a .NET app at all?

use crate::config::StagerConfig;
use crate::fs::FileSystem;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

const RUNTIME_CONFIG_SUFFIX: &str = ".runtimeconfig.json";

/// Source extensions that make a project marker count, keyed by marker.
fn source_extensions(file_name: &str) -> Option<&'static [&'static str]> {
    if file_name == "project.json" {
        return Some(&["cs", "fs"]);
    }
    match Path::new(file_name).extension()?.to_str()? {
        "csproj" => Some(&["cs"]),
        "fsproj" => Some(&["fs"]),
        "vbproj" => Some(&["vb"]),
        _ => None,
    }
}

/// True when `root` holds published output (a `*.runtimeconfig.json` at the
/// top level) or a project marker with matching sources at or below it.
pub fn detect(fs: &dyn FileSystem, config: &StagerConfig, root: &Path) -> Result<bool> {
    let published = fs
        .read_dir(root)?
        .iter()
        .any(|e| e.is_file() && e.file_name().ends_with(RUNTIME_CONFIG_SUFFIX));
    if published {
        debug!(root = %root.display(), "Detected published output");
        return Ok(true);
    }

    let files = fs.walk_files(root, config.max_depth, &config.excluded_dirs())?;

    let markers: Vec<(PathBuf, &'static [&'static str])> = files
        .iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?;
            let exts = source_extensions(name)?;
            Some((path.parent()?.to_path_buf(), exts))
        })
        .collect();

    for (dir, exts) in &markers {
        let has_sources = files.iter().any(|file| {
            file.starts_with(dir)
                && file
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| exts.contains(&e))
        });
        if has_sources {
            debug!(project = %dir.display(), "Detected project with sources");
            return Ok(true);
        }
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    fn detect_mock(fs: &MockFileSystem) -> bool {
        fs.add_dir("");
        detect(fs, &StagerConfig::builtin(), Path::new("/mock")).unwrap()
    }

    #[test]
    fn test_empty_tree() {
        let fs = MockFileSystem::new();
        assert!(!detect_mock(&fs));
    }

    #[test]
    fn test_runtimeconfig_in_root() {
        let fs = MockFileSystem::new();
        fs.add_file("proj1.runtimeconfig.json", "a");
        assert!(detect_mock(&fs));
    }

    #[test]
    fn test_project_json_with_cs_in_subdir() {
        let fs = MockFileSystem::new();
        fs.add_file("project.json", "a");
        fs.add_file("sub/Program.cs", "a");
        assert!(detect_mock(&fs));
    }

    #[test]
    fn test_project_json_with_fs() {
        let fs = MockFileSystem::new();
        fs.add_file("src/proj/project.json", "a");
        fs.add_file("src/proj/Program.fs", "a");
        assert!(detect_mock(&fs));
    }

    #[test]
    fn test_project_json_without_sources() {
        let fs = MockFileSystem::new();
        fs.add_file("src/proj/project.json", "a");
        assert!(!detect_mock(&fs));
    }

    #[test]
    fn test_csproj_requires_cs() {
        let fs = MockFileSystem::new();
        fs.add_file("program.csproj", "a");
        fs.add_file("Program.fs", "a");
        assert!(!detect_mock(&fs));

        fs.add_file("sub/Program.cs", "a");
        assert!(detect_mock(&fs));
    }

    #[test]
    fn test_fsproj_and_vbproj() {
        let fs = MockFileSystem::new();
        fs.add_file("src/proj/app.fsproj", "a");
        fs.add_file("src/proj/sub/Program.fs", "a");
        assert!(detect_mock(&fs));

        let fs = MockFileSystem::new();
        fs.add_file("src/proj/app.vbproj", "a");
        fs.add_file("src/proj/Program.cs", "a");
        assert!(!detect_mock(&fs));
        fs.add_file("src/proj/Program.vb", "a");
        assert!(detect_mock(&fs));
    }

    #[test]
    fn test_sources_in_sibling_dir_do_not_count() {
        let fs = MockFileSystem::new();
        fs.add_file("src/proj/project.json", "a");
        fs.add_file("src/other/Program.cs", "a");
        assert!(!detect_mock(&fs));
    }
}
