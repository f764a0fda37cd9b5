//! Note reconciliation and the mutation pipeline.
//!
//! Every mutation reads the current collection, computes the next one in
//! memory, persists it (awaited) and then queues the remote push.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Notebook;
use crate::db::LedgerUpdate;
use crate::export::{parse_backup, render_backup};
use crate::models::{Note, NoteId, SyncConflict};
use crate::remote::RemoteRow;
use crate::sync::{bootstrap_uploads, reconcile, sort_for_display, PushJob};
use crate::util::next_sync_stamp;
use crate::{Error, Result};

/// How a sync pass ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// No remote configured
    LocalOnly,
    /// Remote fetch or bootstrap upload failed; local snapshot returned
    RemoteUnavailable,
    Reconciled,
}

/// Result of a sync pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub outcome: SyncOutcome,
    /// The authoritative collection, most recently updated first
    #[serde(skip)]
    pub notes: Vec<Note>,
    /// Notes uploaded before the first reconciliation against this remote
    pub bootstrapped: usize,
    pub pushed: usize,
    pub dropped: usize,
    pub redeleted: usize,
    pub conflicts: usize,
    /// Whether the local collection was rewritten
    pub local_written: bool,
}

impl SyncReport {
    fn local(outcome: SyncOutcome, mut notes: Vec<Note>) -> Self {
        sort_for_display(&mut notes);
        Self {
            outcome,
            notes,
            bootstrapped: 0,
            pushed: 0,
            dropped: 0,
            redeleted: 0,
            conflicts: 0,
            local_written: false,
        }
    }
}

/// Bulk import strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// The backup becomes the whole collection
    Replace,
    /// Only ids not already present are added
    Merge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records added or replaced from the backup
    pub imported: usize,
    /// Records removed because the backup did not contain them
    pub removed: usize,
    /// Size of the resulting collection
    pub total: usize,
}

impl Notebook {
    /// Load the authoritative note collection, reconciling with the remote
    /// when sync is enabled. Remote failures fall back to the local copy.
    pub async fn load_notes(&self) -> Result<Vec<Note>> {
        Ok(self.sync_notes().await?.notes)
    }

    /// Run one reconciliation pass and report what it did
    pub async fn sync_notes(&self) -> Result<SyncReport> {
        let local = self.store.read_notes().await?;

        let Some(remote) = self.remote() else {
            return Ok(SyncReport::local(SyncOutcome::LocalOnly, local));
        };

        // Let queued writes land first so the fetch sees them
        self.pushes.flush().await;

        let mut remote_notes = match remote.fetch_notes().await {
            Ok(notes) => notes,
            Err(error) => {
                tracing::warn!("Remote fetch failed, using local notes: {}", error);
                return Ok(SyncReport::local(SyncOutcome::RemoteUnavailable, local));
            }
        };

        let mut bootstrapped = 0;
        let settings = self.store.load_settings().await?;
        if !settings.remote_bootstrapped {
            let uploads = bootstrap_uploads(&local, &remote_notes);
            if !uploads.is_empty() {
                let rows: Vec<RemoteRow> = uploads.iter().map(RemoteRow::from).collect();
                if let Err(error) = remote.upsert_notes(&rows).await {
                    tracing::warn!("Initial upload to remote failed, using local notes: {}", error);
                    return Ok(SyncReport::local(SyncOutcome::RemoteUnavailable, local));
                }
                tracing::info!("Uploaded {} local notes to the new remote", uploads.len());
            }
            bootstrapped = uploads.len();
            let uploaded: HashSet<&NoteId> = uploads.iter().map(|note| &note.id).collect();
            remote_notes.retain(|note| !uploaded.contains(&note.id));
            remote_notes.extend(uploads);
        }

        let now = Utc::now();
        let pending_deletes = self.store.pending_deletes().await?;
        let pending_uploads = self.store.pending_uploads().await?;
        let plan = reconcile(&local, &remote_notes, &pending_deletes, &pending_uploads, now);

        let ledger = LedgerUpdate {
            cleared_deletes: plan.cleared_deletes.clone(),
            uploads: upload_stamps(&plan.to_push),
            cleared_uploads: plan.cleared_uploads.clone(),
            ..LedgerUpdate::default()
        };
        if plan.local_changed {
            self.store.commit_notes(&plan.merged, &ledger).await?;
        } else if !ledger.is_empty() {
            self.store.apply_ledger(&ledger).await?;
        }
        self.store.record_conflicts(&plan.conflicts).await?;
        self.store
            .update_settings(|settings| {
                settings.last_sync = Some(now);
                settings.remote_bootstrapped = true;
            })
            .await?;

        if !plan.to_push.is_empty() {
            self.pushes
                .enqueue(remote.clone(), PushJob::UpsertNotes(plan.to_push.clone()));
        }
        for id in &plan.redeletes {
            self.pushes.enqueue(remote.clone(), PushJob::DeleteNote(id.clone()));
        }

        tracing::info!(
            "Sync complete: {} notes, {} pushed, {} dropped, {} conflicts",
            plan.merged.len(),
            plan.to_push.len(),
            plan.dropped.len(),
            plan.conflicts.len()
        );

        Ok(SyncReport {
            outcome: SyncOutcome::Reconciled,
            bootstrapped,
            pushed: plan.to_push.len(),
            dropped: plan.dropped.len(),
            redeleted: plan.redeletes.len(),
            conflicts: plan.conflicts.len(),
            local_written: plan.local_changed,
            notes: plan.merged,
        })
    }

    /// Local read model, most recently updated first, without touching the remote
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let mut notes = self.store.read_notes().await?;
        sort_for_display(&mut notes);
        Ok(notes)
    }

    pub async fn get_note(&self, id: &NoteId) -> Result<Note> {
        self.store
            .read_notes()
            .await?
            .into_iter()
            .find(|note| note.id == *id)
            .ok_or_else(|| Error::NotFound(format!("note {id}")))
    }

    /// Create or update a note; returns the stored version
    pub async fn save_note(&self, mut note: Note) -> Result<Note> {
        if note.id.is_blank() {
            return Err(Error::InvalidInput("note id must not be empty".to_string()));
        }
        if note.category.trim().is_empty() {
            return Err(Error::InvalidInput("note category must not be empty".to_string()));
        }

        let mut notes = self.store.read_notes().await?;
        let mut ledger = LedgerUpdate::default();
        match notes.iter().position(|existing| existing.id == note.id) {
            Some(index) => {
                note.created_at = notes[index].created_at;
                note.updated_at = next_sync_stamp(Some(notes[index].updated_at));
                notes[index] = note.clone();
            }
            None => {
                note.updated_at = next_sync_stamp(None);
                notes.insert(0, note.clone());
                // Re-creating a deleted id supersedes its tombstone
                ledger.cleared_deletes.push(note.id.clone());
            }
        }
        ledger.uploads = upload_stamps(std::slice::from_ref(&note));

        self.store.commit_notes(&notes, &ledger).await?;
        tracing::debug!("Saved note {}", note.id);
        self.push(PushJob::UpsertNotes(vec![note.clone()]));
        Ok(note)
    }

    /// Delete a note locally and queue the remote delete
    pub async fn delete_note(&self, id: &NoteId) -> Result<()> {
        let mut notes = self.store.read_notes().await?;
        let index = notes
            .iter()
            .position(|note| note.id == *id)
            .ok_or_else(|| Error::NotFound(format!("note {id}")))?;
        let removed = notes.remove(index);

        let ledger = LedgerUpdate {
            deletes: vec![tombstone(&removed)],
            ..LedgerUpdate::default()
        };
        self.store.commit_notes(&notes, &ledger).await?;
        tracing::debug!("Deleted note {}", id);
        self.push(PushJob::DeleteNote(id.clone()));
        Ok(())
    }

    /// Flip one checklist entry
    pub async fn toggle_item(&self, note_id: &NoteId, item_id: &str) -> Result<Note> {
        self.update_note(note_id, |note| {
            let item = note
                .items
                .iter_mut()
                .find(|item| item.id == item_id)
                .ok_or_else(|| Error::NotFound(format!("item {item_id}")))?;
            item.completed = !item.completed;
            Ok(())
        })
        .await
    }

    pub async fn set_pinned(&self, note_id: &NoteId, pinned: bool) -> Result<Note> {
        self.update_note(note_id, |note| {
            note.is_pinned = pinned;
            Ok(())
        })
        .await
    }

    /// Latch a reminder as delivered so it fires only once
    pub async fn mark_reminder_notified(&self, note_id: &NoteId) -> Result<Note> {
        self.update_note(note_id, |note| {
            let reminder = note.reminder.as_mut().ok_or_else(|| {
                Error::InvalidInput(format!("note {note_id} has no reminder"))
            })?;
            reminder.notified = true;
            Ok(())
        })
        .await
    }

    /// Apply `change` to one stored note through the update path
    async fn update_note<F>(&self, note_id: &NoteId, change: F) -> Result<Note>
    where
        F: FnOnce(&mut Note) -> Result<()> + Send,
    {
        let mut notes = self.store.read_notes().await?;
        let note = notes
            .iter_mut()
            .find(|note| note.id == *note_id)
            .ok_or_else(|| Error::NotFound(format!("note {note_id}")))?;

        change(note)?;
        note.updated_at = next_sync_stamp(Some(note.updated_at));
        let updated = note.clone();

        let ledger = LedgerUpdate {
            uploads: upload_stamps(std::slice::from_ref(&updated)),
            ..LedgerUpdate::default()
        };
        self.store.commit_notes(&notes, &ledger).await?;
        self.push(PushJob::UpsertNotes(vec![updated.clone()]));
        Ok(updated)
    }

    /// Render the full local collection as a backup document
    pub async fn export_notes(&self) -> Result<String> {
        let notes = self.list_notes().await?;
        Ok(render_backup(&notes)?)
    }

    /// Import a backup document; the payload is validated before any change
    pub async fn import_notes(&self, payload: &str, mode: ImportMode) -> Result<ImportSummary> {
        let incoming = parse_backup(payload)?;
        let current = self.store.read_notes().await?;

        let (notes, imported, removed) = match mode {
            ImportMode::Replace => {
                let keep: HashSet<&NoteId> = incoming.iter().map(|note| &note.id).collect();
                let removed: Vec<&Note> = current
                    .iter()
                    .filter(|note| !keep.contains(&note.id))
                    .collect();
                let imported = incoming.len();
                (incoming, imported, removed)
            }
            ImportMode::Merge => {
                let existing: HashSet<&NoteId> = current.iter().map(|note| &note.id).collect();
                let mut notes: Vec<Note> = incoming
                    .into_iter()
                    .filter(|note| !existing.contains(&note.id))
                    .collect();
                let imported = notes.len();
                notes.extend(current.iter().cloned());
                (notes, imported, Vec::new())
            }
        };

        let ledger = LedgerUpdate {
            deletes: removed.iter().map(|note| tombstone(note)).collect(),
            cleared_deletes: notes.iter().map(|note| note.id.clone()).collect(),
            uploads: upload_stamps(&notes),
            cleared_uploads: Vec::new(),
        };
        self.store.commit_notes(&notes, &ledger).await?;
        tracing::info!(
            "Imported {} notes ({} removed, {} total)",
            imported,
            removed.len(),
            notes.len()
        );

        self.push(PushJob::UpsertNotes(notes.clone()));
        for note in &removed {
            self.push(PushJob::DeleteNote(note.id.clone()));
        }

        Ok(ImportSummary {
            imported,
            removed: removed.len(),
            total: notes.len(),
        })
    }

    /// Most recent reconciliation conflicts, newest first
    pub async fn list_conflicts(&self, limit: usize) -> Result<Vec<SyncConflict>> {
        self.store.list_conflicts(limit).await
    }
}

fn upload_stamps(notes: &[Note]) -> Vec<(NoteId, DateTime<Utc>)> {
    notes
        .iter()
        .map(|note| (note.id.clone(), note.updated_at))
        .collect()
}

/// Tombstone stamped no earlier than the note's own clock, so a remote row
/// written by a fast clock still reads as older than the delete
fn tombstone(note: &Note) -> (NoteId, DateTime<Utc>) {
    (note.id.clone(), next_sync_stamp(Some(note.updated_at)))
}
