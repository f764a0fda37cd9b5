//! Remote store capability.
//!
//! The remote dataset is reached through the `RemoteStore` trait so the
//! reconciliation engine and the mutation pipeline never depend on a
//! concrete transport. Connections are explicit objects built by a
//! `RemoteConnector` from the saved `RemoteConfig`.

mod memory;
mod rest;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CategoryConfig, Note, NoteId, RemoteConfig};

pub use memory::{MemoryConnector, MemoryRemoteStore};
pub use rest::{RestConnector, RestRemoteStore};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Remote HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Remote API error: {0}")]
    Api(String),
    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Row shape written to the remote notes dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRow {
    pub id: NoteId,
    pub updated_at: DateTime<Utc>,
    /// The full note record
    pub data: Note,
}

impl From<&Note> for RemoteRow {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            updated_at: note.updated_at,
            data: note.clone(),
        }
    }
}

/// Operations the remote dataset offers
///
/// Every write is an idempotent upsert or delete keyed by id, so pushes
/// completing out of order cannot corrupt the remote state.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert or overwrite rows by id
    async fn upsert_notes(&self, rows: &[RemoteRow]) -> RemoteResult<()>;

    /// Remove a note row
    async fn delete_note(&self, id: &NoteId) -> RemoteResult<()>;

    /// Fetch every note; an empty dataset is `Ok(vec![])`
    async fn fetch_notes(&self) -> RemoteResult<Vec<Note>>;

    /// Overwrite the whole category collection stored under one key
    async fn upsert_categories(&self, categories: &[CategoryConfig]) -> RemoteResult<()>;

    /// Fetch the category collection; empty when never written
    async fn fetch_categories(&self) -> RemoteResult<Vec<CategoryConfig>>;

    /// Cheap round trip proving url and key are usable
    async fn probe(&self) -> RemoteResult<()>;
}

/// Builds remote connections from saved configuration
pub trait RemoteConnector: Send + Sync {
    fn connect(&self, config: &RemoteConfig) -> RemoteResult<Arc<dyn RemoteStore>>;
}

/// Build a connection when the config is enabled
///
/// A disabled or missing config yields `None` without touching the connector.
pub fn connect_if_enabled(
    connector: &dyn RemoteConnector,
    config: Option<&RemoteConfig>,
) -> RemoteResult<Option<Arc<dyn RemoteStore>>> {
    match config {
        Some(config) if config.enabled => connector.connect(config).map(Some),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_row_mirrors_note() {
        let note = Note::new("work", "Ship it");
        let row = RemoteRow::from(&note);
        assert_eq!(row.id, note.id);
        assert_eq!(row.updated_at, note.updated_at);
        assert_eq!(row.data, note);
    }

    #[test]
    fn disabled_config_does_not_connect() {
        let connector = MemoryConnector::new(MemoryRemoteStore::new());
        let config = RemoteConfig {
            enabled: false,
            ..RemoteConfig::new("https://xyz.supabase.co", "anon")
        };

        assert!(connect_if_enabled(&connector, Some(&config))
            .unwrap()
            .is_none());
        assert!(connect_if_enabled(&connector, None).unwrap().is_none());
        assert_eq!(connector.connect_count(), 0);
    }
}
