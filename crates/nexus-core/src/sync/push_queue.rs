//! Background remote pushes.
//!
//! Every push runs as its own task. Jobs sharing a sequencing key (one
//! note, or the category collection) run in the order they were enqueued;
//! jobs with disjoint keys run concurrently.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{watch, Notify};

use crate::models::{CategoryConfig, Note, NoteId};
use crate::remote::{RemoteRow, RemoteStore};
use crate::services::LocalStore;

const CATEGORIES_KEY: &str = "categories";

/// One remote write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushJob {
    UpsertNotes(Vec<Note>),
    DeleteNote(NoteId),
    UpsertCategories(Vec<CategoryConfig>),
}

impl PushJob {
    fn keys(&self) -> Vec<String> {
        match self {
            Self::UpsertNotes(notes) => notes.iter().map(|note| note_key(&note.id)).collect(),
            Self::DeleteNote(id) => vec![note_key(id)],
            Self::UpsertCategories(_) => vec![CATEGORIES_KEY.to_string()],
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Self::UpsertNotes(notes) if notes.is_empty())
    }

    fn describe(&self) -> String {
        match self {
            Self::UpsertNotes(notes) => format!("upsert of {} note(s)", notes.len()),
            Self::DeleteNote(id) => format!("delete of note {id}"),
            Self::UpsertCategories(categories) => {
                format!("upsert of {} categories", categories.len())
            }
        }
    }
}

fn note_key(id: &NoteId) -> String {
    format!("note:{id}")
}

/// Latest job per key: its sequence number and completion signal
type Tails = HashMap<String, (u64, watch::Receiver<bool>)>;

struct QueueState {
    store: LocalStore,
    tails: Mutex<Tails>,
    next_seq: AtomicU64,
    in_flight: AtomicUsize,
    idle: Notify,
}

/// Fire-and-forget push queue with per-key ordering
#[derive(Clone)]
pub struct PushQueue {
    state: Arc<QueueState>,
}

impl PushQueue {
    /// `store` receives the bookkeeping for pushes that land
    pub fn new(store: LocalStore) -> Self {
        Self {
            state: Arc::new(QueueState {
                store,
                tails: Mutex::new(HashMap::new()),
                next_seq: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
                idle: Notify::new(),
            }),
        }
    }

    /// Spawn `job` against `remote` without waiting for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, remote: Arc<dyn RemoteStore>, job: PushJob) {
        if job.is_empty() {
            return;
        }

        let seq = self.state.next_seq.fetch_add(1, Ordering::SeqCst);
        let (done_tx, done_rx) = watch::channel(false);
        let keys = job.keys();

        // Capture predecessors now so issuance order, not scheduling order,
        // decides what runs first
        let predecessors: Vec<watch::Receiver<bool>> = {
            let mut tails = lock_tails(&self.state.tails);
            keys.iter()
                .filter_map(|key| {
                    tails
                        .insert(key.clone(), (seq, done_rx.clone()))
                        .map(|(_, previous)| previous)
                })
                .collect()
        };
        drop(done_rx);

        self.state.in_flight.fetch_add(1, Ordering::SeqCst);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            for mut previous in predecessors {
                // A dropped sender means the predecessor is gone either way
                let _ = previous.wait_for(|done| *done).await;
            }

            run_job(&state.store, remote.as_ref(), job).await;

            let _ = done_tx.send(true);
            {
                let mut tails = lock_tails(&state.tails);
                for key in &keys {
                    if tails.get(key).is_some_and(|(tail_seq, _)| *tail_seq == seq) {
                        tails.remove(key);
                    }
                }
            }

            if state.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
                state.idle.notify_waiters();
            }
        });
    }

    /// Wait until every enqueued job has finished
    pub async fn flush(&self) {
        loop {
            let idle = self.state.idle.notified();
            if self.state.in_flight.load(Ordering::SeqCst) == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Jobs spawned and not yet finished
    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }
}

fn lock_tails(tails: &Mutex<Tails>) -> MutexGuard<'_, Tails> {
    tails.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_job(store: &LocalStore, remote: &dyn RemoteStore, job: PushJob) {
    let description = job.describe();
    let outcome = match job {
        PushJob::UpsertNotes(notes) => {
            let rows: Vec<RemoteRow> = notes.iter().map(RemoteRow::from).collect();
            let outcome = remote.upsert_notes(&rows).await;
            if outcome.is_ok() {
                for note in &notes {
                    if let Err(error) = store.confirm_upload(&note.id, note.updated_at).await {
                        tracing::warn!("Failed to confirm upload of {}: {}", note.id, error);
                    }
                }
            }
            outcome
        }
        PushJob::DeleteNote(id) => {
            let outcome = remote.delete_note(&id).await;
            if outcome.is_ok() {
                if let Err(error) = store.remove_pending_delete(&id).await {
                    tracing::warn!("Failed to clear pending delete for {}: {}", id, error);
                }
            }
            outcome
        }
        PushJob::UpsertCategories(categories) => remote.upsert_categories(&categories).await,
    };

    match outcome {
        Ok(()) => tracing::debug!("Remote {} completed", description),
        Err(error) => tracing::warn!("Remote {} failed: {}", description, error),
    }
}
