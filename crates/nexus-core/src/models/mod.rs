//! Data models for Nexus Notes

mod category;
mod note;
mod settings;
mod sync_conflict;

pub use category::{
    default_categories, validate_categories, CategoryColor, CategoryConfig, CategoryIcon,
};
pub use note::{AttachmentKind, MediaAttachment, Note, NoteId, NoteItem, Reminder};
pub use settings::{AppSettings, RemoteConfig};
pub use sync_conflict::{ConflictWinner, SyncConflict};
