use std::env;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use nexus_core::models::NoteItem;
use nexus_core::{Note, Notebook, SyncConflict};
use serde::Serialize;

use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub category: String,
    pub title: String,
    pub preview: String,
    pub pinned: bool,
    pub items_done: usize,
    pub items_total: usize,
    pub updated_at: String,
    pub relative_time: String,
}

#[derive(Debug, Serialize)]
pub struct SyncConflictItem {
    pub id: i64,
    pub note_id: String,
    pub local_updated_at: String,
    pub remote_updated_at: String,
    pub resolved_at: String,
    pub winner: String,
}

pub async fn open_notebook(db_path: &Path) -> Result<Notebook, CliError> {
    Ok(Notebook::open_path(db_path).await?)
}

/// Resolve a full note id or a unique id prefix against the local store
pub async fn resolve_note(query: &str, notebook: &Notebook) -> Result<Note, CliError> {
    let query = normalize_note_identifier(query)?;
    let notes = notebook.list_notes().await?;

    if let Some(note) = notes.iter().find(|note| note.id.as_str() == query) {
        return Ok(note.clone());
    }

    let matches: Vec<&Note> = notes
        .iter()
        .filter(|note| note.id.as_str().starts_with(&query))
        .collect();

    match matches.as_slice() {
        [] => Err(CliError::NoteNotFound(query)),
        [note] => Ok((*note).clone()),
        several => Err(CliError::AmbiguousId(format!(
            "ID prefix '{query}' is ambiguous; matches: {}",
            several
                .iter()
                .take(3)
                .map(|note| short_id(note.id.as_str()))
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// Resolve a checklist item by full id or unique prefix
pub fn resolve_item<'a>(note: &'a Note, query: &str) -> Result<&'a NoteItem, CliError> {
    let query = query.trim();
    if let Some(item) = note.item(query) {
        return Ok(item);
    }

    let matches: Vec<&NoteItem> = note
        .items
        .iter()
        .filter(|item| !query.is_empty() && item.id.starts_with(query))
        .collect();

    match matches.as_slice() {
        [] => Err(CliError::ItemNotFound(query.to_string())),
        [item] => Ok(item),
        _ => Err(CliError::AmbiguousId(format!(
            "Item prefix '{query}' matches {} entries",
            matches.len()
        ))),
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

pub fn format_note_lines(notes: &[&Note]) -> Vec<String> {
    let now = Utc::now();
    notes
        .iter()
        .map(|note| {
            let pin = if note.is_pinned { "*" } else { " " };
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.updated_at, now);
            let checklist = if note.items.is_empty() {
                String::new()
            } else {
                format!("  [{}/{}]", note.completed_items(), note.items.len())
            };
            format!(
                "{:<13} {pin} {:<10} {preview:<40}  {relative_time}{checklist}",
                short_id(note.id.as_str()),
                note.category
            )
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        category: note.category.clone(),
        title: note.title.clone(),
        preview: note_preview(note, 80),
        pinned: note.is_pinned,
        items_done: note.completed_items(),
        items_total: note.items.len(),
        updated_at: note.updated_at.to_rfc3339(),
        relative_time: format_relative_time(note.updated_at, Utc::now()),
    }
}

/// Multi-line human rendering of one note
pub fn format_note_details(note: &Note) -> Vec<String> {
    let mut lines = vec![
        format!("id:        {}", note.id),
        format!("title:     {}", note.title),
    ];
    match note.subcategory.as_deref() {
        Some(subcategory) => lines.push(format!("category:  {} / {subcategory}", note.category)),
        None => lines.push(format!("category:  {}", note.category)),
    }
    if note.is_pinned {
        lines.push("pinned:    yes".to_string());
    }
    if let Some(date) = note.scheduled_date {
        lines.push(format!("scheduled: {date}"));
    }
    if let Some(reminder) = note.reminder.as_ref() {
        let state = match (reminder.enabled, reminder.notified) {
            (false, _) => "disabled",
            (true, true) => "delivered",
            (true, false) => "pending",
        };
        lines.push(format!(
            "reminder:  {} ({state})",
            format_timestamp(reminder.datetime)
        ));
    }
    lines.push(format!("created:   {}", format_timestamp(note.created_at)));
    lines.push(format!("updated:   {}", format_timestamp(note.updated_at)));
    if !note.attachments.is_empty() {
        lines.push(format!("media:     {} attachment(s)", note.attachments.len()));
    }
    if !note.content.trim().is_empty() {
        lines.push(String::new());
        lines.extend(note.content.lines().map(str::to_string));
    }
    if !note.items.is_empty() {
        lines.push(String::new());
        for item in &note.items {
            let mark = if item.completed { "x" } else { " " };
            lines.push(format!("[{mark}] {}  {}", item.text, item.id));
        }
    }
    lines
}

pub fn sync_conflict_to_item(conflict: &SyncConflict) -> SyncConflictItem {
    SyncConflictItem {
        id: conflict.id,
        note_id: conflict.note_id.to_string(),
        local_updated_at: conflict.local_updated_at.to_rfc3339(),
        remote_updated_at: conflict.remote_updated_at.to_rfc3339(),
        resolved_at: conflict.resolved_at.to_rfc3339(),
        winner: conflict.winner.as_str().to_string(),
    }
}

pub fn format_sync_conflict_lines(conflicts: &[SyncConflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            format!(
                "{}  {:<6}  note={}  local={} remote={}",
                format_timestamp(conflict.resolved_at),
                conflict.winner.as_str(),
                conflict.note_id,
                conflict.local_updated_at.to_rfc3339(),
                conflict.remote_updated_at.to_rfc3339()
            )
        })
        .collect()
}

pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = note.title_preview(usize::MAX);
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = (now - timestamp).num_milliseconds().max(0);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("NEXUS_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nexus-notes")
        .join("nexus.db")
}
