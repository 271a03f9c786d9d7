//! Value types shared by the index, the stores and the search.

use std::fmt;

use super::error::{BigramError, Result};

/// A decoded Unicode scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodePoint(u32);

impl CodePoint {
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<char> for CodePoint {
    fn from(c: char) -> Self {
        Self(c as u32)
    }
}

impl fmt::Display for CodePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location of one bigram occurrence: a document id and a byte offset.
///
/// Ordered by document id, then by ascending offset.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    doc_id: String,
    offset: u64,
}

impl Position {
    pub fn new(doc_id: impl Into<String>, offset: u64) -> Self {
        Self {
            doc_id: doc_id.into(),
            offset,
        }
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({:?}, {})", self.doc_id, self.offset)
    }
}

/// `first` immediately followed by `second` at `position`.
///
/// Ordered by `first`, then `second`, then `position`, so every record of
/// one bigram forms a contiguous range in an ordered set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Record {
    first: CodePoint,
    second: CodePoint,
    position: Position,
}

impl Record {
    pub fn new(
        first: impl Into<CodePoint>,
        second: impl Into<CodePoint>,
        position: Position,
    ) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            position,
        }
    }

    pub fn first(&self) -> CodePoint {
        self.first
    }

    pub fn second(&self) -> CodePoint {
        self.second
    }

    pub fn position(&self) -> &Position {
        &self.position
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({}, {}, {})", self.first, self.second, self.position)
    }
}

/// SHA-1 of a document's content, used as its identity.
///
/// The raw 20 bytes are canonical; [`Digest::to_hex`] is the only textual
/// form, and it is what ends up in `Position::doc_id` and in stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; Digest::LEN]);

impl Digest {
    pub const LEN: usize = 20;

    pub fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Lowercase hex rendering, 40 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse the 40-character hex rendering back into a digest.
    pub fn from_hex(text: &str) -> Result<Self> {
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(text, &mut bytes)
            .map_err(|e| BigramError::InvalidDigest(format!("{:?}: {}", text, e)))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
