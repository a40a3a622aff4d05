//! Centralized artifact content access for rules.
//!
//! Instead of each rule independently reading the filesystem, rules
//! receive an `ArtifactProvider` that supplies cached content. This
//! enables easy mocking in tests and a single point of control for I/O.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Trait for supplying artifact contents to rules.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// rayon's parallel rule execution.
pub trait ArtifactProvider: Send + Sync {
    /// Read (or return cached) file content. `None` when the artifact
    /// is absent or unreadable; how that is interpreted is each rule's
    /// own contract.
    fn content(&self, path: &Path) -> Option<Arc<String>>;

    /// Files directly or transitively under `dir` with the given
    /// extension (without the leading dot), in sorted order.
    fn files_under(&self, dir: &Path, ext: &str) -> Vec<PathBuf>;
}

/// Real implementation backed by the filesystem with a concurrent
/// read-once cache.
pub struct FsArtifacts {
    cache: DashMap<PathBuf, Option<Arc<String>>>,
}

impl FsArtifacts {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }
}

impl Default for FsArtifacts {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactProvider for FsArtifacts {
    fn content(&self, path: &Path) -> Option<Arc<String>> {
        if let Some(cached) = self.cache.get(path) {
            return cached.clone();
        }
        let loaded = std::fs::read_to_string(path).ok().map(Arc::new);
        self.cache.insert(path.to_path_buf(), loaded.clone());
        loaded
    }

    fn files_under(&self, dir: &Path, ext: &str) -> Vec<PathBuf> {
        let mut out = Vec::new();
        collect_files(dir, ext, &mut out);
        out.sort();
        out
    }
}

fn collect_files(dir: &Path, ext: &str, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, ext, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            out.push(path);
        }
    }
}

// ---------------------------------------------------------------------------
// Test-only mock
// ---------------------------------------------------------------------------

#[cfg(test)]
pub struct MockArtifacts {
    contents: std::collections::HashMap<PathBuf, Arc<String>>,
}

#[cfg(test)]
impl MockArtifacts {
    /// Build a mock from `(path, content)` pairs. Paths are used as
    /// given so tests can match the paths a resolver fixture produced.
    pub fn new(entries: Vec<(&str, &str)>) -> Self {
        let mut contents = std::collections::HashMap::with_capacity(entries.len());
        for (path, body) in entries {
            contents.insert(PathBuf::from(path), Arc::new(body.to_string()));
        }
        Self { contents }
    }
}

#[cfg(test)]
impl ArtifactProvider for MockArtifacts {
    fn content(&self, path: &Path) -> Option<Arc<String>> {
        self.contents.get(path).cloned()
    }

    fn files_under(&self, dir: &Path, ext: &str) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = self
            .contents
            .keys()
            .filter(|p| {
                p.starts_with(dir) && p.extension().and_then(|e| e.to_str()) == Some(ext)
            })
            .cloned()
            .collect();
        out.sort();
        out
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
