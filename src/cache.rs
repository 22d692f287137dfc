//! Per-file parse cache, invalidated when a file's modification time or length changes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use dashmap::DashMap;
use tree_sitter::Language;

use crate::error::BindFailure;
use crate::locator::SourceDocument;

/// Parsed documents shared between bind attempts.
#[derive(Default)]
pub struct DocumentCache {
    /// Cached documents by path as given by the caller.
    entries: DashMap<PathBuf, CacheEntry>,
}

/// A cached document and the file stamp it was parsed from.
struct CacheEntry {
    /// The parsed document.
    document: Arc<SourceDocument>,
    /// Modification time and length when the document was read.
    stamp: FileStamp,
}

/// What has to stay the same for a cached parse to be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    /// File length in bytes.
    len: u64,
    /// Last modification time, if the platform reports one.
    modified: Option<SystemTime>,
}

impl DocumentCache {
    /// An empty cache.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Drop the cached parse of one file.
    pub fn invalidate(&self, path: &Path) {
        self.entries.remove(path);
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Return the cached parse of `path` if the file is unchanged, otherwise
    /// parse it again and replace the entry.
    ///
    /// The stamp is taken before reading, so an edit that races the read is
    /// picked up by the next call.
    ///
    /// # Errors
    ///
    /// Returns the failures of [`SourceDocument::open`], and `BindFailure::Io`
    /// if the file's metadata can't be read.
    pub fn load(
        &self,
        path: &Path,
        language: &Language,
        max_file_size: u64,
    ) -> Result<Arc<SourceDocument>, BindFailure> {
        let metadata = std::fs::metadata(path).map_err(|source| {
            return BindFailure::Io { file: path.to_path_buf(), source };
        })?;
        let stamp = FileStamp { len: metadata.len(), modified: metadata.modified().ok() };

        if let Some(entry) = self.entries.get(path)
            && entry.stamp == stamp
        {
            tracing::debug!(file = %path.display(), "parse cache hit");
            return Ok(Arc::clone(&entry.document));
        }

        // The shard guard is released here; parsing holds no lock.
        let document = Arc::new(SourceDocument::open(path, language, max_file_size)?);
        tracing::debug!(file = %path.display(), "parse cache refreshed");

        self.entries.insert(
            path.to_path_buf(),
            CacheEntry { document: Arc::clone(&document), stamp },
        );
        return Ok(document);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn csharp() -> Language {
        return tree_sitter_c_sharp::LANGUAGE.into();
    }

    #[test]
    fn unchanged_file_reuses_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.cs");
        std::fs::write(&path, "class A { void M() { } }").unwrap();

        let cache = DocumentCache::new();
        let first = cache.load(&path, &csharp(), 1024).unwrap();
        let second = cache.load(&path, &csharp(), 1024).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn edited_file_is_reparsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.cs");
        std::fs::write(&path, "class A { void M() { } }").unwrap();

        let cache = DocumentCache::new();
        let first = cache.load(&path, &csharp(), 1024).unwrap();

        // Different length, so the stamp changes even on coarse mtime clocks.
        std::thread::sleep(Duration::from_millis(10));
        std::fs::write(&path, "class A {\n    void M() { }\n    void N() { }\n}\n").unwrap();

        let second = cache.load(&path, &csharp(), 1024).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.line_count(), 5);
    }

    #[test]
    fn invalidate_drops_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.cs");
        std::fs::write(&path, "class A { }").unwrap();

        let cache = DocumentCache::new();
        cache.load(&path, &csharp(), 1024).unwrap();
        cache.invalidate(&path);
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_loads_share_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.cs");
        std::fs::write(&path, "class A {\n    void M() { }\n}\n").unwrap();

        let cache = DocumentCache::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let document = cache.load(&path, &csharp(), 1024).unwrap();
                    assert_eq!(document.line_count(), 4);
                });
            }
        });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn missing_file_is_io_failure() {
        let cache = DocumentCache::new();
        let result = cache.load(Path::new("does/not/exist.cs"), &csharp(), 1024);
        assert!(matches!(result, Err(BindFailure::Io { .. })));
    }
}
