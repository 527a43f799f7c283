use super::{DirEntry, FileSystem, FileType};
use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone)]
pub struct MockEntry {
    pub content: Option<String>,
    pub file_type: FileType,
    pub mode: u32,
}

pub struct MockFileSystem {
    files: RwLock<BTreeMap<PathBuf, MockEntry>>,
    root: PathBuf,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::with_root(PathBuf::from("/mock"))
    }

    pub fn with_root(root: PathBuf) -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        self.insert_file(path.as_ref(), content, 0o644);
    }

    pub fn add_executable(&self, path: impl AsRef<Path>, content: &str) {
        self.insert_file(path.as_ref(), content, 0o755);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let path = self.normalize_path(path.as_ref());
        let mut files = self.write_lock();

        Self::ensure_parents(&mut files, &path);
    }

    /// Permission bits of an entry, for assertions
    pub fn mode(&self, path: impl AsRef<Path>) -> Option<u32> {
        let path = self.normalize_path(path.as_ref());
        self.read_lock().get(&path).map(|e| e.mode)
    }

    fn insert_file(&self, path: &Path, content: &str, mode: u32) {
        let path = self.normalize_path(path);
        let mut files = self.write_lock();

        if let Some(parent) = path.parent() {
            Self::ensure_parents(&mut files, parent);
        }

        files.insert(
            path,
            MockEntry {
                content: Some(content.to_string()),
                file_type: FileType::File,
                mode,
            },
        );
    }

    fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    fn ensure_parents(files: &mut BTreeMap<PathBuf, MockEntry>, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            files.entry(current.clone()).or_insert(MockEntry {
                content: None,
                file_type: FileType::Directory,
                mode: 0o755,
            });
        }
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.files.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, BTreeMap<PathBuf, MockEntry>> {
        self.files.write().unwrap_or_else(|e| e.into_inner())
    }

    fn file_entry(&self, path: &Path) -> Result<MockEntry> {
        let path = self.normalize_path(path);
        match self.read_lock().get(&path) {
            Some(entry) if entry.file_type == FileType::File => Ok(entry.clone()),
            Some(_) => Err(anyhow!("Not a file: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.read_lock().contains_key(&path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.read_lock()
            .get(&path)
            .is_some_and(|e| e.file_type == FileType::Directory)
    }

    fn is_file(&self, path: &Path) -> bool {
        let path = self.normalize_path(path);
        self.read_lock()
            .get(&path)
            .is_some_and(|e| e.file_type == FileType::File)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.file_entry(path)?
            .content
            .ok_or_else(|| anyhow!("Not a file: {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let path = self.normalize_path(path);
        let files = self.read_lock();

        if !files.get(&path).is_some_and(|e| e.file_type == FileType::Directory) {
            return Err(anyhow!("Directory not found: {:?}", path));
        }

        let entries = files
            .iter()
            .filter(|(file_path, _)| file_path.parent() == Some(path.as_path()))
            .map(|(file_path, entry)| DirEntry {
                path: file_path.clone(),
                name: file_path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                file_type: entry.file_type,
            })
            .collect();

        Ok(entries)
    }

    fn walk_files(
        &self,
        root: &Path,
        max_depth: usize,
        excluded_dirs: &[String],
    ) -> Result<Vec<PathBuf>> {
        let root = self.normalize_path(root);
        if !self.is_dir(&root) {
            return Err(anyhow!("Not a directory: {:?}", root));
        }

        let files = self.read_lock();
        let walked = files
            .iter()
            .filter(|(_, entry)| entry.file_type == FileType::File)
            .filter_map(|(path, _)| {
                let rel = path.strip_prefix(&root).ok()?;
                let components: Vec<_> = rel.components().collect();
                if components.len() > max_depth {
                    return None;
                }
                let in_excluded = components[..components.len().saturating_sub(1)]
                    .iter()
                    .any(|c| excluded_dirs.iter().any(|d| c.as_os_str() == d.as_str()));
                (!in_excluded).then(|| path.clone())
            })
            .collect();

        Ok(walked)
    }

    fn is_executable(&self, path: &Path) -> Result<bool> {
        Ok(self.file_entry(path)?.mode & 0o100 != 0)
    }

    fn set_executable(&self, path: &Path) -> Result<bool> {
        let path = self.normalize_path(path);
        let mut files = self.write_lock();
        let entry = files
            .get_mut(&path)
            .ok_or_else(|| anyhow!("File not found: {:?}", path))?;

        let wanted = entry.mode | 0o111;
        let changed = wanted != entry.mode;
        entry.mode = wanted;
        Ok(changed)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        let normalized = self.normalize_path(path);
        {
            let files = self.read_lock();
            if let Some(blocker) = normalized
                .ancestors()
                .skip(1)
                .find(|a| files.get(*a).is_some_and(|e| e.file_type == FileType::File))
            {
                return Err(anyhow!("Not a directory: {:?}", blocker));
            }
        }
        self.insert_file(path, contents, 0o644);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let path = self.normalize_path(path);
        let mut files = self.write_lock();
        match files.get(&path) {
            Some(entry) if entry.file_type == FileType::File => {
                files.remove(&path);
                Ok(())
            }
            Some(_) => Err(anyhow!("Not a file: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_file() {
        let fs = MockFileSystem::new();
        fs.add_file("project.json", "{}");

        assert!(fs.exists(Path::new("/mock/project.json")));
        assert!(fs.is_file(Path::new("/mock/project.json")));
        assert_eq!(fs.mode("project.json"), Some(0o644));
    }

    #[test]
    fn test_parent_directories_created() {
        let fs = MockFileSystem::new();
        fs.add_file("src/app/app.csproj", "<Project />");

        assert!(fs.is_dir(Path::new("/mock/src")));
        assert!(fs.is_dir(Path::new("/mock/src/app")));
        assert!(fs.is_file(Path::new("/mock/src/app/app.csproj")));
    }

    #[test]
    fn test_read_dir_lists_direct_children_only() {
        let fs = MockFileSystem::new();
        fs.add_file("proj1.dll", "a");
        fs.add_file("sub/proj2.dll", "a");

        let entries = fs.read_dir(Path::new("/mock")).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.file_name()).collect();

        assert_eq!(names, vec!["proj1.dll", "sub"]);
    }

    #[test]
    fn test_walk_files_skips_excluded() {
        let fs = MockFileSystem::new();
        fs.add_file("src/app/app.csproj", "<Project />");
        fs.add_file("src/app/obj/app.csproj", "<Project />");

        let files = fs
            .walk_files(Path::new("/mock"), 10, &["obj".to_string()])
            .unwrap();

        assert_eq!(files, vec![PathBuf::from("/mock/src/app/app.csproj")]);
    }

    #[test]
    fn test_write_below_a_file_fails() {
        let fs = MockFileSystem::new();
        fs.add_file(".cloudfoundry", "not a dir");

        assert!(fs
            .write(Path::new("/mock/.cloudfoundry/release.yml"), "web: x")
            .is_err());
        assert!(!fs.exists(Path::new("/mock/.cloudfoundry/release.yml")));
    }

    #[test]
    fn test_remove_file() {
        let fs = MockFileSystem::new();
        fs.add_file("startup.sh", "export HOME=/app;");
        fs.add_dir("dir");

        fs.remove_file(Path::new("startup.sh")).unwrap();
        assert!(!fs.exists(Path::new("/mock/startup.sh")));
        assert!(fs.remove_file(Path::new("startup.sh")).is_err());
        assert!(fs.remove_file(Path::new("dir")).is_err());
    }

    #[test]
    fn test_set_executable() {
        let fs = MockFileSystem::new();
        fs.add_file("proj1", "a");

        assert!(!fs.is_executable(Path::new("proj1")).unwrap());
        assert!(fs.set_executable(Path::new("proj1")).unwrap());
        assert!(!fs.set_executable(Path::new("proj1")).unwrap());
        assert_eq!(fs.mode("proj1"), Some(0o755));
    }
}
