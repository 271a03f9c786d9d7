//! Process-local record store

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use log::trace;

use super::Driver;
use crate::bigram::error::{BigramError, Result};
use crate::bigram::models::{CodePoint, Digest, Position, Record};
use crate::bigram::registry::PathRegistry;

/// Keeps records in an ordered set, so one bigram is one contiguous range.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: BTreeSet<Record>,
    paths: PathRegistry,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Driver for MemoryStore {
    fn add(&mut self, record: Record) -> Result<()> {
        if self.records.contains(&record) {
            return Err(BigramError::DuplicateRecord(record));
        }
        self.records.insert(record);
        Ok(())
    }

    fn add_batch(&mut self, records: &[Record]) -> Result<()> {
        let mut seen = BTreeSet::new();
        for record in records {
            if self.records.contains(record) || !seen.insert(record) {
                return Err(BigramError::DuplicateRecord(record.clone()));
            }
        }
        self.records.extend(records.iter().cloned());
        Ok(())
    }

    fn lookup(&self, first: CodePoint, second: CodePoint) -> Result<BTreeSet<Record>> {
        // The empty doc id at offset 0 sorts before every position.
        let start = Record::new(first, second, Position::new(String::new(), 0));
        let found: BTreeSet<Record> = self
            .records
            .range(start..)
            .take_while(|r| r.first() == first && r.second() == second)
            .cloned()
            .collect();
        trace!("Memory lookup ({}, {}): {} records", first, second, found.len());
        Ok(found)
    }

    fn register_path(&mut self, path: &Path, digest: Digest) -> Result<()> {
        self.paths.register(path, digest);
        Ok(())
    }

    fn lookup_digest(&self, digest: &Digest) -> Result<BTreeSet<PathBuf>> {
        Ok(self.paths.lookup(digest))
    }

    fn len(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }
}
