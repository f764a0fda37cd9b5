//! Application services shared by every front end.
//!
//! `Notebook` owns the local store, the active remote connection and the
//! push queue. Its operations live in the sibling modules, grouped by the
//! collection they touch.

mod categories;
mod local_store;
mod notes;
mod settings;

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::remote::{connect_if_enabled, RemoteConnector, RemoteStore, RestConnector};
use crate::sync::{PushJob, PushQueue};
use crate::Result;

pub use local_store::LocalStore;
pub use notes::{ImportMode, ImportSummary, SyncOutcome, SyncReport};

type SharedConnection = Arc<RwLock<Option<Arc<dyn RemoteStore>>>>;

/// Offline-first notes context: local store, remote connection, push queue.
#[derive(Clone)]
pub struct Notebook {
    store: LocalStore,
    remote: SharedConnection,
    connector: Arc<dyn RemoteConnector>,
    pushes: PushQueue,
}

impl Notebook {
    /// Open the store at `db_path` and connect over REST when sync is enabled.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let store = LocalStore::open_path(db_path).await?;
        Self::with_connector(store, Arc::new(RestConnector)).await
    }

    /// In-memory store with the given connector (primarily for tests).
    pub async fn open_in_memory(connector: Arc<dyn RemoteConnector>) -> Result<Self> {
        let store = LocalStore::open_in_memory().await?;
        Self::with_connector(store, connector).await
    }

    /// Build the context over an existing store.
    ///
    /// A saved config that no longer yields a connection leaves the
    /// notebook in local-only mode rather than failing.
    pub async fn with_connector(
        store: LocalStore,
        connector: Arc<dyn RemoteConnector>,
    ) -> Result<Self> {
        let settings = store.load_settings().await?;
        let connection = match connect_if_enabled(connector.as_ref(), settings.enabled_remote()) {
            Ok(connection) => connection,
            Err(error) => {
                tracing::warn!("Remote sync unavailable, running local-only: {}", error);
                None
            }
        };

        if connection.is_some() {
            tracing::info!("Remote sync enabled");
        } else {
            tracing::debug!("Running in local-only mode");
        }

        Ok(Self {
            pushes: PushQueue::new(store.clone()),
            store,
            remote: Arc::new(RwLock::new(connection)),
            connector,
        })
    }

    /// The underlying local store
    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    /// The active remote connection, if sync is enabled
    pub fn remote(&self) -> Option<Arc<dyn RemoteStore>> {
        self.remote
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_remote_connected(&self) -> bool {
        self.remote().is_some()
    }

    /// Wait for every background push to finish
    pub async fn flush(&self) {
        self.pushes.flush().await;
    }

    fn swap_remote(&self, connection: Option<Arc<dyn RemoteStore>>) {
        *self.remote.write().unwrap_or_else(PoisonError::into_inner) = connection;
    }

    /// Queue a push on the current connection; a no-op when local-only
    fn push(&self, job: PushJob) {
        if let Some(remote) = self.remote() {
            self.pushes.enqueue(remote, job);
        }
    }
}
