//! UTF-8 decoding into (code point, byte offset) pairs

use super::error::{BigramError, Result};
use super::models::CodePoint;

/// Decode `text` strictly as UTF-8.
///
/// Each entry carries the byte offset at which the code point's encoding
/// starts, not its index in the sequence. Overlong forms, surrogates,
/// truncated sequences and stray continuation bytes are rejected with
/// [`BigramError::Decoding`]; nothing is substituted.
pub fn disassemble(text: &[u8]) -> Result<Vec<(CodePoint, usize)>> {
    let decoded = std::str::from_utf8(text).map_err(|e| BigramError::Decoding {
        offset: e.valid_up_to(),
    })?;

    Ok(decoded
        .char_indices()
        .map(|(offset, c)| (CodePoint::from(c), offset))
        .collect())
}

/// Strip one trailing `\n` or `\r\n` from a line read with `read_until`.
pub(crate) fn trim_line_terminator(line: &[u8]) -> &[u8] {
    match line.strip_suffix(b"\n") {
        Some(line) => line.strip_suffix(b"\r").unwrap_or(line),
        None => line,
    }
}
