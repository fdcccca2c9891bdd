//! File-backed state store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Result, StateStore, StoreError};

/// Stores the document as a JSON file.
///
/// Writes go to a sibling temporary file that is then renamed over the
/// target, so a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store for the given file path. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for FileStore {
    fn get(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn set(&self, document: &str) -> Result<()> {
        let write_error = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }

        let temp = self.temp_path();
        fs::write(&temp, document).map_err(write_error)?;
        fs::rename(&temp, &self.path).map_err(write_error)?;

        tracing::debug!("State written to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn test_set_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/state.json");
        let store = FileStore::new(&path);

        store.set("{\"theme\":\"dark\"}").unwrap();

        assert!(path.exists());
        assert_eq!(store.get().unwrap().as_deref(), Some("{\"theme\":\"dark\"}"));
    }

    #[test]
    fn test_set_replaces_document_and_cleans_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));

        store.set("{\"a\":1}").unwrap();
        store.set("{\"a\":2}").unwrap();

        assert_eq!(store.get().unwrap().as_deref(), Some("{\"a\":2}"));
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn test_read_error_on_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let err = store.get().unwrap_err();
        assert!(err.is_io_error());
    }
}
