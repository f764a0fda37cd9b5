//! nexus-core - Core library for Nexus Notes
//!
//! This crate contains the note models, the on-device store, the remote
//! store capability and the offline-first reconciliation engine used by
//! every Nexus Notes front end.

pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod reminders;
pub mod remote;
pub mod search;
pub mod services;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{AppSettings, CategoryConfig, Note, NoteId, SyncConflict};
pub use services::Notebook;
