//! Persistent state store.
//!
//! The dashboard keeps one JSON document. A store only knows how to fetch
//! and replace that document as a string; merging lives in the reconciler.
//!
//! - `FileStore`: JSON file on disk, replaced atomically
//! - `MemoryStore`: shared in-memory blob for tests

mod error;
mod file;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use error::{Result, StoreError};
pub use file::FileStore;

/// Trait for single-document storage backends.
pub trait StateStore {
    /// Returns the stored document, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self) -> Result<Option<String>>;

    /// Replaces the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, document: &str) -> Result<()>;
}

/// In-memory store for testing.
///
/// Clones share the same document, so a test can inspect what the engine
/// wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Arc<Mutex<Option<String>>>,
    writes: Arc<AtomicUsize>,
    should_fail: Arc<AtomicBool>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a document.
    #[must_use]
    pub fn with_document(document: impl Into<String>) -> Self {
        let store = Self::new();
        *store.lock() = Some(document.into());
        store
    }

    /// Makes every subsequent read and write fail.
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Returns the current document.
    #[must_use]
    pub fn document(&self) -> Option<String> {
        self.lock().clone()
    }

    /// Returns the current document parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Option<serde_json::Value> {
        self.document()
            .and_then(|doc| serde_json::from_str(&doc).ok())
    }

    /// Returns how many times the document was written.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.document.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn failure() -> std::io::Error {
        std::io::Error::other("memory store configured to fail")
    }
}

impl StateStore for MemoryStore {
    fn get(&self) -> Result<Option<String>> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Read {
                path: PathBuf::from(":memory:"),
                source: Self::failure(),
            });
        }
        Ok(self.document())
    }

    fn set(&self, document: &str) -> Result<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                path: PathBuf::from(":memory:"),
                source: Self::failure(),
            });
        }
        *self.lock() = Some(document.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
