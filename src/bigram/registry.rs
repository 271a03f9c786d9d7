//! In-process digest to path registry

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use super::models::Digest;

/// Maps a content digest to every path registered with that content.
///
/// Append-only: paths are never removed, and a digest that is present maps
/// to at least one path.
#[derive(Debug, Default)]
pub struct PathRegistry {
    paths: HashMap<Digest, BTreeSet<PathBuf>>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: &Path, digest: Digest) {
        self.paths
            .entry(digest)
            .or_default()
            .insert(path.to_path_buf());
    }

    /// All paths registered under `digest`; empty when there are none.
    pub fn lookup(&self, digest: &Digest) -> BTreeSet<PathBuf> {
        self.paths.get(digest).cloned().unwrap_or_default()
    }
}
