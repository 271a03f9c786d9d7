//! SQLite-backed record store

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use log::{debug, info, trace};
use rusqlite::{params, Connection, ErrorCode};

use super::Driver;
use crate::bigram::error::{BigramError, Result};
use crate::bigram::models::{CodePoint, Digest, Position, Record};

const SCHEMA_SQL: &str = r#"
-- One row per bigram occurrence; the key doubles as the lookup index.
CREATE TABLE IF NOT EXISTS dictionary (
    first INTEGER,
    second INTEGER,
    docid TEXT,
    position INTEGER,
    PRIMARY KEY(first, second, docid, position)
);

-- Append-only log of path registrations, docid is the hex digest.
CREATE TABLE IF NOT EXISTS path_map (
    path TEXT,
    docid TEXT
);

CREATE INDEX IF NOT EXISTS idx_path_map_docid ON path_map(docid);
"#;

const INSERT_RECORD_SQL: &str =
    "INSERT INTO dictionary (first, second, docid, position) VALUES (?1, ?2, ?3, ?4)";

const LOOKUP_SQL: &str =
    "SELECT docid, position FROM dictionary WHERE first = ?1 AND second = ?2";

/// Durable store in a single SQLite database.
///
/// All access goes through one connection. Inserts reuse a cached prepared
/// statement instead of re-parsing SQL per record.
pub struct PersistentStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl PersistentStore {
    /// Open (or create) the database at `path` and make sure both tables exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening bigram store: {}", path.display());
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory bigram store");
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn, path: None })
    }

    /// The database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn insert_record(conn: &Connection, record: &Record) -> Result<()> {
    let offset = record.position().offset();
    let position = i64::try_from(offset).map_err(|_| BigramError::OffsetOverflow(offset))?;

    let mut stmt = conn.prepare_cached(INSERT_RECORD_SQL)?;
    match stmt.execute(params![
        i64::from(record.first().value()),
        i64::from(record.second().value()),
        record.position().doc_id(),
        position,
    ]) {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(BigramError::DuplicateRecord(record.clone()))
        }
        Err(e) => Err(e.into()),
    }
}

impl Driver for PersistentStore {
    fn add(&mut self, record: Record) -> Result<()> {
        insert_record(&self.conn, &record)
    }

    fn add_batch(&mut self, records: &[Record]) -> Result<()> {
        // Dropping the transaction on error rolls the whole batch back.
        let tx = self.conn.transaction()?;
        for record in records {
            insert_record(&tx, record)?;
        }
        tx.commit()?;
        trace!("Committed batch of {} records", records.len());
        Ok(())
    }

    fn lookup(&self, first: CodePoint, second: CodePoint) -> Result<BTreeSet<Record>> {
        let mut stmt = self.conn.prepare_cached(LOOKUP_SQL)?;
        let rows = stmt
            .query_map(
                params![i64::from(first.value()), i64::from(second.value())],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut found = BTreeSet::new();
        for (doc_id, position) in rows {
            let offset = u64::try_from(position).map_err(|_| BigramError::InvalidColumn {
                column: "position",
                value: position,
            })?;
            found.insert(Record::new(first, second, Position::new(doc_id, offset)));
        }
        trace!("SQLite lookup ({}, {}): {} records", first, second, found.len());
        Ok(found)
    }

    fn register_path(&mut self, path: &Path, digest: Digest) -> Result<()> {
        let text = path
            .to_str()
            .ok_or_else(|| BigramError::NonUtf8Path(path.to_path_buf()))?;
        self.conn
            .prepare_cached("INSERT INTO path_map (path, docid) VALUES (?1, ?2)")?
            .execute(params![text, digest.to_hex()])?;
        Ok(())
    }

    fn lookup_digest(&self, digest: &Digest) -> Result<BTreeSet<PathBuf>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT path FROM path_map WHERE docid = ?1")?;
        let paths = stmt
            .query_map(params![digest.to_hex()], |row| row.get::<_, String>(0))?
            .map(|row| row.map(PathBuf::from))
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(paths)
    }

    fn len(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM dictionary", [], |row| row.get(0))?;
        u64::try_from(count).map_err(|_| BigramError::InvalidColumn {
            column: "count",
            value: count,
        })
    }
}
