//! Core bigram index module

pub mod driver;
pub mod error;
pub mod hasher;
pub mod models;
mod disassembler;
mod registry;

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use log::{debug, info, trace};

use driver::{Driver, MemoryStore};
use disassembler::trim_line_terminator;
use models::*;
pub use disassembler::disassemble;
pub use error::{BigramError, Result};
pub use registry::PathRegistry;

/// Bigram index over a [`Driver`]: ingestion and exact substring search.
///
/// Every adjacent pair of code points in a document is stored with the byte
/// offset of its first code point. A query matches at a position only when
/// all of its own pairs line up at that same start position.
pub struct Dictionary {
    driver: Box<dyn Driver>,
}

impl Default for Dictionary {
    /// A dictionary backed by a fresh [`MemoryStore`].
    fn default() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl Dictionary {
    pub fn new(driver: impl Driver + 'static) -> Self {
        Self {
            driver: Box::new(driver),
        }
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Store a single record as is.
    pub fn add(&mut self, record: Record) -> Result<()> {
        self.driver.add(record)
    }

    pub fn lookup(&self, first: CodePoint, second: CodePoint) -> Result<BTreeSet<Record>> {
        self.driver.lookup(first, second)
    }

    /// Index `text` under `doc_id`.
    ///
    /// Each pair is stored at `base_offset` plus the byte offset of its first
    /// code point. Returns the number of records stored.
    ///
    /// # Errors
    /// - [`BigramError::Decoding`] if `text` is not valid UTF-8; nothing is stored
    /// - [`BigramError::DuplicateRecord`] if any pair is already indexed at
    ///   that position; nothing from this call is stored
    pub fn add_text(
        &mut self,
        doc_id: &str,
        text: impl AsRef<[u8]>,
        base_offset: u64,
    ) -> Result<usize> {
        let chars = disassemble(text.as_ref())?;
        let records = chars
            .windows(2)
            .map(|pair| {
                let (first, offset) = pair[0];
                let (second, _) = pair[1];
                let offset = base_offset
                    .checked_add(offset as u64)
                    .ok_or(BigramError::OffsetOverflow(base_offset))?;
                Ok(Record::new(first, second, Position::new(doc_id, offset)))
            })
            .collect::<Result<Vec<Record>>>()?;

        self.driver.add_batch(&records)?;
        Ok(records.len())
    }

    /// Index a stream line by line under `doc_id`.
    ///
    /// The running offset grows by each line's byte length without its
    /// terminator. Pairs spanning a line break are not indexed, so a query
    /// never matches across lines. Lines already stored stay stored if a
    /// later line fails.
    ///
    /// # Errors
    /// - [`BigramError::Decoding`] with the byte offset of the bad sequence
    ///   within the whole stream, line terminators included
    pub fn add_stream<R: BufRead>(&mut self, doc_id: &str, mut reader: R) -> Result<usize> {
        let mut offset = 0u64;
        let mut stream_pos = 0usize;
        let mut total = 0;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = trim_line_terminator(&buf);
            total += match self.add_text(doc_id, line, offset) {
                Ok(stored) => stored,
                Err(BigramError::Decoding { offset: in_line }) => {
                    return Err(BigramError::Decoding {
                        offset: stream_pos + in_line,
                    });
                }
                Err(e) => return Err(e),
            };
            offset += line.len() as u64;
            stream_pos += buf.len();
        }
        debug!("Indexed {} records for document {}", total, doc_id);
        Ok(total)
    }

    /// Index a file under its content digest and register its path.
    ///
    /// Content whose digest already has a registered path is not indexed
    /// again; only the new path registration is added.
    ///
    /// The digest ignores where line breaks fall, so `"ab\ncd"` and `"abcd"`
    /// share one. Whichever is added second is treated as already indexed and
    /// is searched through the first file's records: `"bc"` matches neither.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<Digest> {
        let path = path.as_ref();
        let digest = hasher::digest_file(path)?;

        if self.driver.lookup_digest(&digest)?.is_empty() {
            info!("Indexing {} as {}", path.display(), digest);
            let file = File::open(path)?;
            self.add_stream(&digest.to_hex(), BufReader::new(file))?;
        } else {
            info!("Content of {} already indexed as {}", path.display(), digest);
        }

        self.driver.register_path(path, digest)?;
        Ok(digest)
    }

    pub fn register_path(&mut self, path: &Path, digest: Digest) -> Result<()> {
        self.driver.register_path(path, digest)
    }

    pub fn lookup_digest(&self, digest: &Digest) -> Result<BTreeSet<PathBuf>> {
        self.driver.lookup_digest(digest)
    }

    /// Resolve a search hit to the source lines it occurs on.
    ///
    /// The document id is read as a content digest, and every path registered
    /// for it is re-read line by line, using the same running offset as
    /// [`Dictionary::add_stream`]. Each entry is `(path, line number, line)`,
    /// with line numbers starting at 1. Documents not added as files (doc id
    /// not a digest, or no registered path) resolve to nothing. A registered
    /// path whose content no longer reaches the offset is skipped.
    pub fn locate(&self, position: &Position) -> Result<Vec<(PathBuf, usize, String)>> {
        let Ok(digest) = Digest::from_hex(position.doc_id()) else {
            return Ok(Vec::new());
        };

        let mut found = Vec::new();
        for path in self.driver.lookup_digest(&digest)? {
            let mut reader = BufReader::new(File::open(&path)?);
            let mut start = 0u64;
            let mut stream_pos = 0usize;
            let mut line_no = 0;
            let mut buf = Vec::new();
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf)? == 0 {
                    break;
                }
                line_no += 1;
                let line = trim_line_terminator(&buf);
                let end = start + line.len() as u64;
                if position.offset() < end {
                    let text = std::str::from_utf8(line).map_err(|e| BigramError::Decoding {
                        offset: stream_pos + e.valid_up_to(),
                    })?;
                    trace!("{} found at {}:{}", position, path.display(), line_no);
                    found.push((path.clone(), line_no, text.to_string()));
                    break;
                }
                start = end;
                stream_pos += buf.len();
            }
        }
        Ok(found)
    }

    /// Find every position where `query` occurs exactly.
    ///
    /// For each pair of the query, every stored occurrence votes for the
    /// start position the query would need for that occurrence to belong to
    /// it. Positions receiving a vote from every pair are matches. Queries
    /// shorter than two code points match nothing.
    ///
    /// Results are sorted by document id, then offset, without duplicates.
    pub fn search(&self, query: impl AsRef<[u8]>) -> Result<Vec<Position>> {
        let chars = disassemble(query.as_ref())?;
        if chars.len() < 2 {
            return Ok(Vec::new());
        }

        let mut cache: HashMap<(CodePoint, CodePoint), BTreeSet<Record>> = HashMap::new();
        let mut tally: BTreeMap<Position, usize> = BTreeMap::new();

        for pair in chars.windows(2) {
            let (first, query_offset) = pair[0];
            let (second, _) = pair[1];
            let query_offset = query_offset as u64;

            let records = match cache.entry((first, second)) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => entry.insert(self.driver.lookup(first, second)?),
            };
            trace!(
                "Pair ({}, {}) at {}: {} occurrences",
                first,
                second,
                query_offset,
                records.len()
            );

            for record in records.iter() {
                // An occurrence closer to the document start than the pair is
                // to the query start cannot be part of a match.
                let Some(start) = record.position().offset().checked_sub(query_offset) else {
                    continue;
                };
                *tally
                    .entry(Position::new(record.position().doc_id(), start))
                    .or_insert(0) += 1;
            }
        }

        let required = chars.len() - 1;
        let candidates = tally.len();
        let matches: Vec<Position> = tally
            .into_iter()
            .filter(|(_, votes)| *votes == required)
            .map(|(position, _)| position)
            .collect();

        debug!(
            "Search: {} pairs, {} candidates, {} matches",
            required,
            candidates,
            matches.len()
        );
        Ok(matches)
    }
}
