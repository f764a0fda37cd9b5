//! Database layer for Nexus Notes

mod category_repository;
mod connection;
mod migrations;
mod note_repository;
mod settings_repository;
mod sync_repository;

pub use category_repository::{CategoryRepository, SqliteCategoryRepository};
pub use connection::Database;
pub use note_repository::{NoteRepository, SqliteNoteRepository};
pub use settings_repository::{SettingsRepository, SqliteSettingsRepository};
pub use sync_repository::{LedgerUpdate, SqliteSyncRepository, SyncRepository};
