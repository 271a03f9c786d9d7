//! # bigram-search
//!
//! Exact substring search over a bigram inverted index.
//!
//! Documents are decoded into Unicode code points and every adjacent pair is
//! stored with its byte offset. A query matches where all of its own pairs
//! line up at one start position. Records live in a [`MemoryStore`] or in a
//! SQLite-backed [`PersistentStore`]; files are identified by a SHA-1 of
//! their content, so identical files share one set of index entries.
pub mod bigram;

// Re-export the main types for convenience
pub use bigram::{
    disassemble,
    driver::{Driver, MemoryStore, PersistentStore},
    hasher::{digest_file, digest_reader},
    models::{CodePoint, Digest, Position, Record},
    BigramError,
    Dictionary,
    PathRegistry,
    Result,
};
