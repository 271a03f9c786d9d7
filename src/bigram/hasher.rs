//! Content digests used as document identity

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use log::debug;
use sha1::{Digest as _, Sha1};

use super::disassembler::trim_line_terminator;
use super::error::Result;
use super::models::Digest;

/// Hash a file's content line by line.
///
/// Line terminators are not fed to the hash, so `a\nb` and `a\r\nb` share a
/// digest. The path itself plays no part in the result.
pub fn digest_file(path: impl AsRef<Path>) -> Result<Digest> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let digest = digest_reader(BufReader::new(file))?;
    debug!("Digest of {}: {}", path.display(), digest);
    Ok(digest)
}

/// Hash everything `reader` yields, line by line, excluding terminators.
pub fn digest_reader<R: BufRead>(mut reader: R) -> Result<Digest> {
    let mut hasher = Sha1::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        hasher.update(trim_line_terminator(&line));
    }
    Ok(Digest::from_bytes(hasher.finalize().into()))
}
