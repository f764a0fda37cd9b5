//! Local sync bookkeeping: pending remote deletes, pending uploads and the
//! conflict log

#![allow(clippy::cast_possible_wrap)] // SQLite uses i64 for LIMIT

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::error::{Error, Result};
use crate::models::{ConflictWinner, NoteId, SyncConflict};

/// Ledger changes that must commit together with a note collection rewrite
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerUpdate {
    /// Tombstones to record, with the stamp the delete happened at
    pub deletes: Vec<(NoteId, DateTime<Utc>)>,
    /// Tombstones that no longer apply
    pub cleared_deletes: Vec<NoteId>,
    /// Note versions the remote has not confirmed yet
    pub uploads: Vec<(NoteId, DateTime<Utc>)>,
    /// Uploads the remote already holds (or superseded)
    pub cleared_uploads: Vec<NoteId>,
}

impl LedgerUpdate {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty()
            && self.cleared_deletes.is_empty()
            && self.uploads.is_empty()
            && self.cleared_uploads.is_empty()
    }
}

/// Storage for state the reconciliation engine keeps between runs
pub trait SyncRepository {
    /// Remember that a note was deleted locally and the remote delete is outstanding
    fn add_pending_delete(&self, note_id: &NoteId, deleted_at: DateTime<Utc>) -> Result<()>;

    /// Forget a pending delete (remote delete landed, or a newer remote edit won)
    fn remove_pending_delete(&self, note_id: &NoteId) -> Result<()>;

    /// All outstanding deletes keyed by note id
    fn pending_deletes(&self) -> Result<HashMap<NoteId, DateTime<Utc>>>;

    /// Local versions awaiting remote confirmation, keyed by note id
    fn pending_uploads(&self) -> Result<HashMap<NoteId, DateTime<Utc>>>;

    /// Forget a pending upload once a version at least as new as
    /// `landed` reached the remote; newer local edits stay pending
    fn confirm_upload(&self, note_id: &NoteId, landed: DateTime<Utc>) -> Result<()>;

    /// Apply ledger changes without opening a transaction of its own
    fn apply_ledger(&self, update: &LedgerUpdate) -> Result<()>;

    /// Append resolved conflicts to the log
    fn record_conflicts(&self, conflicts: &[SyncConflict]) -> Result<()>;

    /// Most recent conflicts, newest first
    fn list_conflicts(&self, limit: usize) -> Result<Vec<SyncConflict>>;
}

/// `SQLite` implementation of `SyncRepository`
pub struct SqliteSyncRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSyncRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SyncRepository for SqliteSyncRepository<'_> {
    fn add_pending_delete(&self, note_id: &NoteId, deleted_at: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO pending_deletes (note_id, deleted_at) VALUES (?, ?)",
            params![note_id.as_str(), deleted_at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn remove_pending_delete(&self, note_id: &NoteId) -> Result<()> {
        self.conn.execute(
            "DELETE FROM pending_deletes WHERE note_id = ?",
            params![note_id.as_str()],
        )?;
        Ok(())
    }

    fn pending_deletes(&self) -> Result<HashMap<NoteId, DateTime<Utc>>> {
        read_stamps(self.conn, "SELECT note_id, deleted_at FROM pending_deletes")
    }

    fn pending_uploads(&self) -> Result<HashMap<NoteId, DateTime<Utc>>> {
        read_stamps(self.conn, "SELECT note_id, updated_at FROM pending_uploads")
    }

    fn confirm_upload(&self, note_id: &NoteId, landed: DateTime<Utc>) -> Result<()> {
        let pending = self.pending_uploads()?;
        if pending.get(note_id).is_some_and(|stamp| *stamp <= landed) {
            self.conn.execute(
                "DELETE FROM pending_uploads WHERE note_id = ?",
                params![note_id.as_str()],
            )?;
        }
        Ok(())
    }

    fn apply_ledger(&self, update: &LedgerUpdate) -> Result<()> {
        for (id, deleted_at) in &update.deletes {
            self.add_pending_delete(id, *deleted_at)?;
            // A deleted note has nothing left to upload
            self.conn.execute(
                "DELETE FROM pending_uploads WHERE note_id = ?",
                params![id.as_str()],
            )?;
        }
        for id in &update.cleared_deletes {
            self.remove_pending_delete(id)?;
        }
        for id in &update.cleared_uploads {
            self.conn.execute(
                "DELETE FROM pending_uploads WHERE note_id = ?",
                params![id.as_str()],
            )?;
        }
        for (id, updated_at) in &update.uploads {
            self.conn.execute(
                "INSERT OR REPLACE INTO pending_uploads (note_id, updated_at) VALUES (?, ?)",
                params![id.as_str(), updated_at.to_rfc3339()],
            )?;
        }
        Ok(())
    }

    fn record_conflicts(&self, conflicts: &[SyncConflict]) -> Result<()> {
        if conflicts.is_empty() {
            return Ok(());
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO sync_conflicts (
                    note_id,
                    local_updated_at,
                    remote_updated_at,
                    resolved_at,
                    winner
                ) VALUES (?, ?, ?, ?, ?)",
            )?;
            for conflict in conflicts {
                stmt.execute(params![
                    conflict.note_id.as_str(),
                    conflict.local_updated_at.to_rfc3339(),
                    conflict.remote_updated_at.to_rfc3339(),
                    conflict.resolved_at.to_rfc3339(),
                    conflict.winner.as_str(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn list_conflicts(&self, limit: usize) -> Result<Vec<SyncConflict>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, note_id, local_updated_at, remote_updated_at, resolved_at, winner
             FROM sync_conflicts
             ORDER BY id DESC
             LIMIT ?",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, note_id, local, remote, resolved, winner)| -> Result<SyncConflict> {
                Ok(SyncConflict {
                    id,
                    note_id: NoteId::from(note_id),
                    local_updated_at: parse_instant(&local)?,
                    remote_updated_at: parse_instant(&remote)?,
                    resolved_at: parse_instant(&resolved)?,
                    winner: if winner == "local" {
                        ConflictWinner::Local
                    } else {
                        ConflictWinner::Remote
                    },
                })
            })
            .collect()
    }
}

fn read_stamps(conn: &Connection, sql: &str) -> Result<HashMap<NoteId, DateTime<Utc>>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|(note_id, stamp)| -> Result<(NoteId, DateTime<Utc>)> {
            Ok((NoteId::from(note_id), parse_instant(&stamp)?))
        })
        .collect()
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|error| Error::Database(format!("invalid stored timestamp '{value}': {error}")))
}
