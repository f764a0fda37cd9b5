pub mod add;
pub mod categories;
pub mod common;
pub mod completions;
pub mod delete;
pub mod export;
pub mod import;
pub mod list;
pub mod pin;
pub mod reminders;
pub mod remote;
pub mod settings;
pub mod show;
pub mod sync;
pub mod toggle;
