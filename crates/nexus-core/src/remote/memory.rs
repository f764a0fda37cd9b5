//! In-process remote store.
//!
//! Behaves like a remote dataset (id-keyed upserts, true deletes, one
//! category document) and supports injected failures and latency so the
//! sync paths can be exercised without a network.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::{RemoteConnector, RemoteError, RemoteResult, RemoteRow, RemoteStore};
use crate::models::{CategoryConfig, Note, NoteId, RemoteConfig};

#[derive(Default)]
struct MemoryState {
    rows: BTreeMap<NoteId, RemoteRow>,
    categories: Vec<CategoryConfig>,
    fail_fetch: bool,
    fail_writes: bool,
    fail_probe: bool,
    write_delays: VecDeque<Duration>,
    upsert_calls: usize,
    deleted_ids: Vec<NoteId>,
}

/// Shared handle to an in-memory remote dataset
#[derive(Clone, Default)]
pub struct MemoryRemoteStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock only happens in a failing test
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Seed notes directly, bypassing call accounting
    pub fn insert_notes(&self, notes: &[Note]) {
        let mut state = self.state();
        for note in notes {
            state.rows.insert(note.id.clone(), RemoteRow::from(note));
        }
    }

    /// Remove a note directly, as another device would
    pub fn remove_note(&self, id: &NoteId) {
        self.state().rows.remove(id);
    }

    /// Current remote notes ordered by id
    pub fn notes(&self) -> Vec<Note> {
        self.state()
            .rows
            .values()
            .map(|row| row.data.clone())
            .collect()
    }

    pub fn note(&self, id: &NoteId) -> Option<Note> {
        self.state().rows.get(id).map(|row| row.data.clone())
    }

    pub fn categories(&self) -> Vec<CategoryConfig> {
        self.state().categories.clone()
    }

    pub fn set_categories(&self, categories: Vec<CategoryConfig>) {
        self.state().categories = categories;
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.state().fail_fetch = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    pub fn set_fail_probe(&self, fail: bool) {
        self.state().fail_probe = fail;
    }

    /// Delay the next write call by `delay` (queued per call)
    pub fn push_write_delay(&self, delay: Duration) {
        self.state().write_delays.push_back(delay);
    }

    /// Number of note upsert calls received
    pub fn upsert_calls(&self) -> usize {
        self.state().upsert_calls
    }

    /// Ids of delete calls received, in arrival order
    pub fn deleted_ids(&self) -> Vec<NoteId> {
        self.state().deleted_ids.clone()
    }

    /// Claim this write's latency and failure outcome in call order
    async fn begin_write(&self) -> RemoteResult<()> {
        let (delay, fail) = {
            let mut state = self.state();
            (state.write_delays.pop_front(), state.fail_writes)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            Err(RemoteError::Api("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn upsert_notes(&self, rows: &[RemoteRow]) -> RemoteResult<()> {
        self.state().upsert_calls += 1;
        self.begin_write().await?;
        let mut state = self.state();
        for row in rows {
            state.rows.insert(row.id.clone(), row.clone());
        }
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> RemoteResult<()> {
        self.state().deleted_ids.push(id.clone());
        self.begin_write().await?;
        self.state().rows.remove(id);
        Ok(())
    }

    async fn fetch_notes(&self) -> RemoteResult<Vec<Note>> {
        if self.state().fail_fetch {
            return Err(RemoteError::Api("injected fetch failure".to_string()));
        }
        Ok(self.notes())
    }

    async fn upsert_categories(&self, categories: &[CategoryConfig]) -> RemoteResult<()> {
        self.begin_write().await?;
        self.state().categories = categories.to_vec();
        Ok(())
    }

    async fn fetch_categories(&self) -> RemoteResult<Vec<CategoryConfig>> {
        if self.state().fail_fetch {
            return Err(RemoteError::Api("injected fetch failure".to_string()));
        }
        Ok(self.categories())
    }

    async fn probe(&self) -> RemoteResult<()> {
        if self.state().fail_probe {
            Err(RemoteError::Api("injected probe failure".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Connector handing out one shared `MemoryRemoteStore`
pub struct MemoryConnector {
    store: MemoryRemoteStore,
    connects: AtomicUsize,
}

impl MemoryConnector {
    pub const fn new(store: MemoryRemoteStore) -> Self {
        Self {
            store,
            connects: AtomicUsize::new(0),
        }
    }

    /// How many connections were built
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl RemoteConnector for MemoryConnector {
    fn connect(&self, config: &RemoteConfig) -> RemoteResult<Arc<dyn RemoteStore>> {
        if config.url.trim().is_empty() {
            return Err(RemoteError::InvalidConfiguration(
                "url must not be empty".to_string(),
            ));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(self.store.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn upsert_overwrites_and_delete_removes() {
        let store = MemoryRemoteStore::new();
        let mut note = Note::new("work", "v1");
        store
            .upsert_notes(&[RemoteRow::from(&note)])
            .await
            .unwrap();

        note.title = "v2".to_string();
        store
            .upsert_notes(&[RemoteRow::from(&note)])
            .await
            .unwrap();
        assert_eq!(store.fetch_notes().await.unwrap(), vec![note.clone()]);

        store.delete_note(&note.id).await.unwrap();
        assert!(store.fetch_notes().await.unwrap().is_empty());
        assert_eq!(store.deleted_ids(), vec![note.id]);
        assert_eq!(store.upsert_calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn injected_failures_surface_as_errors() {
        let store = MemoryRemoteStore::new();
        store.set_fail_fetch(true);
        store.set_fail_writes(true);
        store.set_fail_probe(true);

        assert!(store.fetch_notes().await.is_err());
        assert!(store.fetch_categories().await.is_err());
        assert!(store.probe().await.is_err());

        let note = Note::new("work", "lost");
        assert!(store.upsert_notes(&[RemoteRow::from(&note)]).await.is_err());
        store.set_fail_fetch(false);
        assert!(store.fetch_notes().await.unwrap().is_empty());
    }
}
