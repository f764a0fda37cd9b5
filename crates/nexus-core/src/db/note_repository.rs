//! Note collection storage

#![allow(clippy::cast_possible_wrap)] // SQLite stores positions as i64

use crate::error::{Error, Result};
use crate::models::Note;
use rusqlite::{params, Connection};

use super::sync_repository::{LedgerUpdate, SqliteSyncRepository, SyncRepository};

/// Whole-collection storage for notes
///
/// Higher layers compute the complete new collection in memory and persist
/// it wholesale, so there is no per-record write primitive.
pub trait NoteRepository {
    /// Read every stored note in collection order
    fn read_all(&self) -> Result<Vec<Note>>;

    /// Atomically clear and rewrite the collection
    fn replace_all(&self, notes: &[Note]) -> Result<()>;

    /// Rewrite the collection and apply `ledger` in one transaction
    fn replace_all_with_ledger(&self, notes: &[Note], ledger: &LedgerUpdate) -> Result<()>;
}

/// `SQLite` implementation of `NoteRepository`
pub struct SqliteNoteRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteNoteRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn read_all(&self) -> Result<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM notes ORDER BY position ASC")?;

        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        payloads
            .iter()
            .map(|payload| serde_json::from_str::<Note>(payload).map_err(Error::from))
            .collect()
    }

    fn replace_all(&self, notes: &[Note]) -> Result<()> {
        self.replace_all_with_ledger(notes, &LedgerUpdate::default())
    }

    fn replace_all_with_ledger(&self, notes: &[Note], ledger: &LedgerUpdate) -> Result<()> {
        // Rolls back on drop if any statement fails
        let tx = self.conn.unchecked_transaction()?;
        if !ledger.is_empty() {
            SqliteSyncRepository::new(&tx).apply_ledger(ledger)?;
        }
        write_rows(&tx, notes)?;
        tx.commit()?;
        Ok(())
    }
}

fn write_rows(conn: &Connection, notes: &[Note]) -> Result<()> {
    conn.execute("DELETE FROM notes", [])?;
    let mut stmt = conn
        .prepare("INSERT INTO notes (id, position, updated_at, data) VALUES (?1, ?2, ?3, ?4)")?;
    for (position, note) in notes.iter().enumerate() {
        stmt.execute(params![
            note.id.as_str(),
            position as i64,
            note.updated_at.to_rfc3339(),
            serde_json::to_string(note)?,
        ])?;
    }
    Ok(())
}
