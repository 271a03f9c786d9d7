//! Storage backends for bigram records and path registrations.
//!
//! - [`MemoryStore`]: process-local, gone when dropped
//! - [`PersistentStore`]: SQLite file (or in-memory database for tests)
//!
//! Both reject a record whose (first, second, docid, offset) tuple is
//! already stored with [`BigramError::DuplicateRecord`].
//!
//! [`BigramError::DuplicateRecord`]: super::error::BigramError::DuplicateRecord

mod memory;
mod sqlite;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::error::Result;
use super::models::{CodePoint, Digest, Record};

pub use memory::MemoryStore;
pub use sqlite::PersistentStore;

/// Storage capability consumed by [`Dictionary`](super::Dictionary).
pub trait Driver {
    /// Store one record. It is visible to `lookup` as soon as this returns.
    fn add(&mut self, record: Record) -> Result<()>;

    /// Store several records.
    ///
    /// The default adds them one by one and keeps those stored before a
    /// failure. Both built-in stores override it so that on error none of
    /// the batch is kept.
    fn add_batch(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.add(record.clone())?;
        }
        Ok(())
    }

    /// Every stored record with this exact bigram, across all documents.
    fn lookup(&self, first: CodePoint, second: CodePoint) -> Result<BTreeSet<Record>>;

    /// Append a path registration for `digest`.
    fn register_path(&mut self, path: &Path, digest: Digest) -> Result<()>;

    /// All paths registered under `digest`; empty when there are none.
    fn lookup_digest(&self, digest: &Digest) -> Result<BTreeSet<PathBuf>>;

    /// Number of stored records.
    fn len(&self) -> Result<u64>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
