//! Finds the one project to run in a source tree.

use super::deployment::read_override;
use super::relative_path;
use super::scheme::{classify, scheme_for_file, BuildScheme};
use crate::config::StagerConfig;
use crate::error::{Result, StagingError};
use crate::fs::FileSystem;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// The selected project directory and the scheme that governs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRoot {
    pub path: PathBuf,
    pub scheme: BuildScheme,
}

impl ProjectRoot {
    /// Path relative to `app_root`, `.` when they are the same directory
    pub fn relative_to(&self, app_root: &Path) -> PathBuf {
        relative_path(app_root, &self.path)
    }
}

/// A directory holding a marker file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub dir: PathBuf,
    pub scheme: BuildScheme,
}

pub struct ProjectLocator<'a> {
    fs: &'a dyn FileSystem,
    config: &'a StagerConfig,
}

impl<'a> ProjectLocator<'a> {
    pub fn new(fs: &'a dyn FileSystem, config: &'a StagerConfig) -> Self {
        Self { fs, config }
    }

    /// Every directory under `source_root` that holds a marker file, sorted.
    pub fn candidates(&self, source_root: &Path) -> Result<Vec<Candidate>> {
        let files = self
            .fs
            .walk_files(source_root, self.config.max_depth, &self.config.excluded_dirs())
            .map_err(|e| StagingError::io(source_root, e))?;

        let mut dirs: BTreeMap<PathBuf, BuildScheme> = BTreeMap::new();
        for file in files {
            let Some(scheme) = file
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(scheme_for_file)
            else {
                continue;
            };
            let Some(dir) = file.parent() else {
                continue;
            };

            dirs.entry(dir.to_path_buf())
                .and_modify(|existing| {
                    if scheme == BuildScheme::Modern {
                        *existing = BuildScheme::Modern;
                    }
                })
                .or_insert(scheme);
        }

        let candidates: Vec<Candidate> = dirs
            .into_iter()
            .map(|(dir, scheme)| Candidate { dir, scheme })
            .collect();

        for candidate in &candidates {
            debug!(
                dir = %candidate.dir.display(),
                scheme = %candidate.scheme,
                "Found project candidate"
            );
        }

        Ok(candidates)
    }

    pub fn locate(&self, source_root: &Path) -> Result<ProjectRoot> {
        if let Some(project) = read_override(self.fs, source_root)? {
            return self.locate_override(source_root, &project);
        }

        let candidates = self.candidates(source_root)?;

        match candidates.as_slice() {
            [] => Err(StagingError::NoProjectFound(source_root.to_path_buf())),
            [only] => {
                info!(
                    project = %relative_path(source_root, &only.dir).display(),
                    scheme = %only.scheme,
                    "Selected the only project"
                );
                Ok(ProjectRoot {
                    path: only.dir.clone(),
                    scheme: only.scheme,
                })
            }
            _ => self.choose(source_root, &candidates),
        }
    }

    fn locate_override(&self, source_root: &Path, project: &Path) -> Result<ProjectRoot> {
        let mut dir = join_within(source_root, project).ok_or_else(|| {
            StagingError::InvalidOverride {
                path: project.to_path_buf(),
            }
        })?;
        if self.fs.is_file(&dir) {
            if let Some(parent) = dir.parent() {
                dir = parent.to_path_buf();
            }
        }

        if !self.fs.is_dir(&dir) {
            return Err(StagingError::InvalidOverride {
                path: project.to_path_buf(),
            });
        }

        let scheme = classify(self.fs, &dir)
            .map_err(|e| StagingError::io(&dir, e))?
            .ok_or_else(|| StagingError::InvalidOverride {
                path: project.to_path_buf(),
            })?;

        info!(
            project = %relative_path(source_root, &dir).display(),
            scheme = %scheme,
            "Selected project from .deployment"
        );
        Ok(ProjectRoot { path: dir, scheme })
    }

    fn choose(&self, source_root: &Path, candidates: &[Candidate]) -> Result<ProjectRoot> {
        let legacy: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| c.scheme == BuildScheme::Legacy)
            .collect();

        match legacy.as_slice() {
            [only] => {
                info!(
                    project = %relative_path(source_root, &only.dir).display(),
                    "Selected the only project.json project"
                );
                Ok(ProjectRoot {
                    path: only.dir.clone(),
                    scheme: BuildScheme::Legacy,
                })
            }
            [] => {
                // msbuild projects are published to a single output
                // directory, so the artifact decides what runs.
                info!(
                    candidates = candidates.len(),
                    "Multiple msbuild projects, deferring to publish output"
                );
                Ok(ProjectRoot {
                    path: source_root.to_path_buf(),
                    scheme: BuildScheme::Modern,
                })
            }
            _ => Err(StagingError::AmbiguousProjectNoOverride {
                candidates: legacy
                    .iter()
                    .map(|c| relative_path(source_root, &c.dir))
                    .collect(),
            }),
        }
    }
}

/// Join `rel` onto `root` lexically, or `None` if the result would leave
/// `root` (absolute paths, or more `..` than there are components).
fn join_within(root: &Path, rel: &Path) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.iter().fold(root.to_path_buf(), |dir, part| dir.join(part)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    const DEPS_ONLY: &str = r#"{"dependencies": {"dep1": "whatever"}}"#;

    fn locate(fs: &MockFileSystem) -> Result<ProjectRoot> {
        let config = StagerConfig::builtin();
        ProjectLocator::new(fs, &config).locate(Path::new("/mock"))
    }

    #[test]
    fn test_single_legacy_candidate() {
        let fs = MockFileSystem::new();
        fs.add_file("foo/project.json", r#"{"commands": {"kestrel": "whatever"}}"#);

        let root = locate(&fs).unwrap();
        assert_eq!(root.path, PathBuf::from("/mock/foo"));
        assert_eq!(root.scheme, BuildScheme::Legacy);
        assert_eq!(root.relative_to(Path::new("/mock")), PathBuf::from("foo"));
    }

    #[test]
    fn test_project_at_root() {
        let fs = MockFileSystem::new();
        fs.add_file("app.csproj", "<Project />");

        let root = locate(&fs).unwrap();
        assert_eq!(root.relative_to(Path::new("/mock")), PathBuf::from("."));
        assert_eq!(root.scheme, BuildScheme::Modern);
    }

    #[test]
    fn test_override_selects_among_many() {
        let fs = MockFileSystem::new();
        fs.add_file("src/foo/project.json", DEPS_ONLY);
        fs.add_file("src/proj2/project.json", DEPS_ONLY);
        fs.add_file("src/proj3/project.json", DEPS_ONLY);
        fs.add_file(".deployment", "[config]\nproject=src/proj2");

        let root = locate(&fs).unwrap();
        assert_eq!(root.path, PathBuf::from("/mock/src/proj2"));
        assert_eq!(root.scheme, BuildScheme::Legacy);
    }

    #[test]
    fn test_override_naming_project_file() {
        let fs = MockFileSystem::new();
        fs.add_file("src/api/api.csproj", "<Project />");
        fs.add_file("src/web/web.csproj", "<Project />");
        fs.add_file(".deployment", "[config]\nproject=src/web/web.csproj");

        let root = locate(&fs).unwrap();
        assert_eq!(root.path, PathBuf::from("/mock/src/web"));
        assert_eq!(root.scheme, BuildScheme::Modern);
    }

    #[test]
    fn test_override_to_non_project() {
        let fs = MockFileSystem::new();
        fs.add_file("src/foo/project.json", DEPS_ONLY);
        fs.add_file("docs/readme.md", "");
        fs.add_file(".deployment", "[config]\nproject=docs");

        assert!(matches!(
            locate(&fs),
            Err(StagingError::InvalidOverride { .. })
        ));
    }

    #[test]
    fn test_override_to_missing_dir() {
        let fs = MockFileSystem::new();
        fs.add_file("src/foo/project.json", DEPS_ONLY);
        fs.add_file(".deployment", "[config]\nproject=src/gone");

        match locate(&fs) {
            Err(StagingError::InvalidOverride { path }) => {
                assert_eq!(path, PathBuf::from("src/gone"));
            }
            other => panic!("Expected InvalidOverride, got {:?}", other),
        }
    }

    #[test]
    fn test_override_outside_source_root() {
        let fs = MockFileSystem::new();
        fs.add_file("src/foo/project.json", DEPS_ONLY);
        fs.add_file("/elsewhere/proj/project.json", DEPS_ONLY);

        for project in ["/elsewhere/proj", "../elsewhere/proj", "src/../../elsewhere/proj"] {
            fs.add_file(".deployment", &format!("[config]\nproject={}", project));
            match locate(&fs) {
                Err(StagingError::InvalidOverride { path }) => {
                    assert_eq!(path, PathBuf::from(project));
                }
                other => panic!("Expected InvalidOverride for {}, got {:?}", project, other),
            }
        }
    }

    #[test]
    fn test_override_with_dot_segments_inside_root() {
        let fs = MockFileSystem::new();
        fs.add_file("src/foo/project.json", DEPS_ONLY);
        fs.add_file("src/bar/project.json", DEPS_ONLY);
        fs.add_file(".deployment", "[config]\nproject=./src/bar/../foo");

        let root = locate(&fs).unwrap();
        assert_eq!(root.path, PathBuf::from("/mock/src/foo"));
    }

    #[test]
    fn test_join_within() {
        let root = Path::new("/app");
        assert_eq!(
            join_within(root, Path::new("src/web")),
            Some(PathBuf::from("/app/src/web"))
        );
        assert_eq!(join_within(root, Path::new(".")), Some(PathBuf::from("/app")));
        assert_eq!(join_within(root, Path::new("../x")), None);
        assert_eq!(join_within(root, Path::new("/x")), None);
    }

    #[test]
    fn test_no_candidates() {
        let fs = MockFileSystem::new();
        fs.add_file("Program.cs", "");

        assert!(matches!(locate(&fs), Err(StagingError::NoProjectFound(_))));
    }

    #[test]
    fn test_multiple_legacy_without_override_is_ambiguous() {
        let fs = MockFileSystem::new();
        fs.add_file("src/a/project.json", DEPS_ONLY);
        fs.add_file("src/b/project.json", DEPS_ONLY);

        match locate(&fs) {
            Err(StagingError::AmbiguousProjectNoOverride { candidates }) => {
                assert_eq!(
                    candidates,
                    vec![PathBuf::from("src/a"), PathBuf::from("src/b")]
                );
            }
            other => panic!("Expected AmbiguousProjectNoOverride, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_prefers_single_legacy() {
        let fs = MockFileSystem::new();
        fs.add_file("src/old/project.json", DEPS_ONLY);
        fs.add_file("src/lib/lib.csproj", "<Project />");

        let root = locate(&fs).unwrap();
        assert_eq!(root.path, PathBuf::from("/mock/src/old"));
        assert_eq!(root.scheme, BuildScheme::Legacy);
    }

    #[test]
    fn test_multiple_modern_defers_to_publish_output() {
        let fs = MockFileSystem::new();
        fs.add_file("src/web/web.csproj", "<Project />");
        fs.add_file("test/web.tests/web.tests.csproj", "<Project />");

        let root = locate(&fs).unwrap();
        assert_eq!(root.path, PathBuf::from("/mock"));
        assert_eq!(root.scheme, BuildScheme::Modern);
    }

    #[test]
    fn test_candidates_ignore_build_output() {
        let fs = MockFileSystem::new();
        fs.add_file("app/app.csproj", "<Project />");
        fs.add_file("app/bin/Debug/app.csproj", "<Project />");
        fs.add_file(".cloudfoundry/dotnet_publish/project.json", "{}");

        let config = StagerConfig::builtin();
        let candidates = ProjectLocator::new(&fs, &config)
            .candidates(Path::new("/mock"))
            .unwrap();

        assert_eq!(
            candidates,
            vec![Candidate {
                dir: PathBuf::from("/mock/app"),
                scheme: BuildScheme::Modern,
            }]
        );
    }

    #[test]
    fn test_candidates_merge_markers_in_same_dir() {
        let fs = MockFileSystem::new();
        fs.add_file("app/project.json", "{}");
        fs.add_file("app/app.csproj", "<Project />");

        let config = StagerConfig::builtin();
        let candidates = ProjectLocator::new(&fs, &config)
            .candidates(Path::new("/mock"))
            .unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].scheme, BuildScheme::Modern);
    }
}
