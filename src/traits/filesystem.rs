use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Trait for filesystem operations to enable testing with mocks
pub trait FileSystem: Send + Sync {
    /// Read file contents as string
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Write string contents to file, replacing any previous contents
    fn write(&self, path: &Path, contents: &str) -> Result<()>;

    /// Create directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Mark a file as executable by its owner (no-op where unsupported)
    fn set_executable(&self, path: &Path) -> Result<()>;

    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;
}

/// Real filesystem implementation using std::fs
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create parent directory: {:?}", parent))?;
        }

        std::fs::write(path, contents).with_context(|| format!("Failed to write file: {:?}", path))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {:?}", path))
    }

    #[cfg(unix)]
    fn set_executable(&self, path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut permissions = std::fs::metadata(path)
            .with_context(|| format!("Failed to read permissions: {:?}", path))?
            .permissions();
        permissions.set_mode(0o755);

        std::fs::set_permissions(path, permissions)
            .with_context(|| format!("Failed to set permissions: {:?}", path))
    }

    #[cfg(not(unix))]
    fn set_executable(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Mock filesystem implementation for testing (in-memory)
#[allow(dead_code)]
pub struct MockFileSystem {
    files: Arc<RwLock<HashMap<PathBuf, String>>>,
    directories: Arc<RwLock<HashSet<PathBuf>>>,
    executables: Arc<RwLock<HashSet<PathBuf>>>,
    failing_writes: Arc<RwLock<HashSet<PathBuf>>>,
}

#[allow(dead_code)]
impl MockFileSystem {
    /// Create new empty mock filesystem
    pub fn new() -> Self {
        Self {
            files: Arc::new(RwLock::new(HashMap::new())),
            directories: Arc::new(RwLock::new(HashSet::new())),
            executables: Arc::new(RwLock::new(HashSet::new())),
            failing_writes: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Make every subsequent write to `path` fail
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing_writes.write().unwrap().insert(path.into());
    }

    /// Get captured file contents for testing assertions
    pub fn get_file_contents(&self, path: &Path) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    /// Check if file was written
    pub fn has_file(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }

    /// Check if file was marked executable
    pub fn is_executable(&self, path: &Path) -> bool {
        self.executables.read().unwrap().contains(path)
    }

    /// List all files in mock filesystem
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.files.read().unwrap().keys().cloned().collect();
        files.sort();
        files
    }
}

impl Default for MockFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .with_context(|| format!("File not found in mock filesystem: {:?}", path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if self.failing_writes.read().unwrap().contains(path) {
            anyhow::bail!("Simulated write failure: {:?}", path);
        }

        // Ensure all parent directories exist in mock (recursively)
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }

        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut directories = self.directories.write().unwrap();
        directories.insert(path.to_path_buf());

        // Also add parent directories
        let mut current = path;
        while let Some(parent) = current.parent() {
            directories.insert(parent.to_path_buf());
            current = parent;
        }

        Ok(())
    }

    fn set_executable(&self, path: &Path) -> Result<()> {
        if !self.has_file(path) {
            anyhow::bail!("File not found in mock filesystem: {:?}", path);
        }

        self.executables.write().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.directories.read().unwrap().contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_write_creates_parents() {
        let fs = MockFileSystem::new();
        let path = PathBuf::from("/out/modules/kms/main.tf");

        fs.write(&path, "resource {}").unwrap();

        assert!(fs.is_dir(Path::new("/out/modules/kms")));
        assert!(fs.is_dir(Path::new("/out")));
        assert_eq!(fs.read_to_string(&path).unwrap(), "resource {}");
    }

    #[test]
    fn test_mock_set_executable_requires_file() {
        let fs = MockFileSystem::new();
        let path = PathBuf::from("/out/import-keys.sh");

        assert!(fs.set_executable(&path).is_err());

        fs.write(&path, "#!/bin/bash\n").unwrap();
        fs.set_executable(&path).unwrap();
        assert!(fs.is_executable(&path));
    }

    #[test]
    fn test_mock_failing_write() {
        let fs = MockFileSystem::new();
        let path = PathBuf::from("/out/main.tf");
        fs.fail_writes_to(&path);

        assert!(fs.write(&path, "x").is_err());
        assert!(!fs.has_file(&path));
    }

    #[cfg(unix)]
    #[test]
    fn test_real_set_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("import-keys.sh");
        let fs = RealFileSystem;

        fs.write(&path, "#!/bin/bash\n").unwrap();
        fs.set_executable(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
