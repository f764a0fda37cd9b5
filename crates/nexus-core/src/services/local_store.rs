//! Async façade over the on-device database.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::db::{
    CategoryRepository, Database, LedgerUpdate, NoteRepository, SettingsRepository,
    SqliteCategoryRepository, SqliteNoteRepository, SqliteSettingsRepository,
    SqliteSyncRepository, SyncRepository,
};
use crate::models::{AppSettings, CategoryConfig, Note, NoteId, SyncConflict};
use crate::Result;

/// Thread-safe handle to the local store; every call is serialized.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
    db_path: Option<PathBuf>,
}

impl LocalStore {
    /// Open (creating if needed) the store at the given filesystem path.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let db = Database::open(&db_path)?;
        tracing::debug!("Opened local store at {}", db_path.display());
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            db_path: Some(db_path),
        })
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Arc::new(Mutex::new(Database::open_in_memory()?)),
            db_path: None,
        })
    }

    /// Filesystem path, `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub async fn read_notes(&self) -> Result<Vec<Note>> {
        let db = self.db.lock().await;
        SqliteNoteRepository::new(db.connection()).read_all()
    }

    /// Atomically replace the whole note collection
    pub async fn replace_notes(&self, notes: &[Note]) -> Result<()> {
        let db = self.db.lock().await;
        SqliteNoteRepository::new(db.connection()).replace_all(notes)
    }

    /// Replace the collection and apply the sync ledger changes atomically
    pub async fn commit_notes(&self, notes: &[Note], ledger: &LedgerUpdate) -> Result<()> {
        let db = self.db.lock().await;
        SqliteNoteRepository::new(db.connection()).replace_all_with_ledger(notes, ledger)
    }

    /// Apply sync ledger changes that come without a collection rewrite
    pub async fn apply_ledger(&self, ledger: &LedgerUpdate) -> Result<()> {
        let db = self.db.lock().await;
        let tx = db.connection().unchecked_transaction()?;
        SqliteSyncRepository::new(&tx).apply_ledger(ledger)?;
        tx.commit()?;
        Ok(())
    }

    pub async fn read_categories(&self) -> Result<Vec<CategoryConfig>> {
        let db = self.db.lock().await;
        SqliteCategoryRepository::new(db.connection()).read_all()
    }

    pub async fn replace_categories(&self, categories: &[CategoryConfig]) -> Result<()> {
        let db = self.db.lock().await;
        SqliteCategoryRepository::new(db.connection()).replace_all(categories)
    }

    pub async fn load_settings(&self) -> Result<AppSettings> {
        let db = self.db.lock().await;
        SqliteSettingsRepository::new(db.connection()).load()
    }

    /// Read-modify-write of the settings under one lock
    pub async fn update_settings<F>(&self, update: F) -> Result<AppSettings>
    where
        F: FnOnce(&mut AppSettings) + Send,
    {
        let db = self.db.lock().await;
        let repo = SqliteSettingsRepository::new(db.connection());
        let mut settings = repo.load()?;
        update(&mut settings);
        repo.save(&settings)?;
        Ok(settings)
    }

    pub async fn remove_pending_delete(&self, note_id: &NoteId) -> Result<()> {
        let db = self.db.lock().await;
        SqliteSyncRepository::new(db.connection()).remove_pending_delete(note_id)
    }

    pub async fn pending_deletes(&self) -> Result<HashMap<NoteId, DateTime<Utc>>> {
        let db = self.db.lock().await;
        SqliteSyncRepository::new(db.connection()).pending_deletes()
    }

    pub async fn pending_uploads(&self) -> Result<HashMap<NoteId, DateTime<Utc>>> {
        let db = self.db.lock().await;
        SqliteSyncRepository::new(db.connection()).pending_uploads()
    }

    /// Mark the version stamped `landed` as held by the remote
    pub async fn confirm_upload(&self, note_id: &NoteId, landed: DateTime<Utc>) -> Result<()> {
        let db = self.db.lock().await;
        SqliteSyncRepository::new(db.connection()).confirm_upload(note_id, landed)
    }

    pub async fn record_conflicts(&self, conflicts: &[SyncConflict]) -> Result<()> {
        let db = self.db.lock().await;
        SqliteSyncRepository::new(db.connection()).record_conflicts(conflicts)
    }

    pub async fn list_conflicts(&self, limit: usize) -> Result<Vec<SyncConflict>> {
        let db = self.db.lock().await;
        SqliteSyncRepository::new(db.connection()).list_conflicts(limit)
    }
}
