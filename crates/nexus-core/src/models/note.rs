//! Note model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque note identifier, the primary key in both stores.
///
/// Newly created notes get a UUID v7 (time-sortable); identifiers coming
/// from backups or other devices are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Borrow the identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is blank
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One checklist entry. Position in `Note::items` is the display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteItem {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

impl NoteItem {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            text: text.into(),
            completed: false,
        }
    }
}

/// Kind of inline media attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Audio,
}

/// Media blob stored inline with its note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAttachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    /// Base64-encoded payload
    pub data: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    /// Speech-to-text result for audio attachments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
}

/// Optional reminder attached to a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub enabled: bool,
    pub datetime: DateTime<Utc>,
    /// One-shot latch set by the notification collaborator, never by the user.
    pub notified: bool,
}

impl Reminder {
    #[must_use]
    pub const fn at(datetime: DateTime<Utc>) -> Self {
        Self {
            enabled: true,
            datetime,
            notified: false,
        }
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Category id; not enforced as a foreign key
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub items: Vec<NoteItem>,
    #[serde(default)]
    pub attachments: Vec<MediaAttachment>,
    #[serde(default)]
    pub is_pinned: bool,
    /// Due date, independent of any reminder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder: Option<Reminder>,
    /// Creation timestamp, immutable
    pub created_at: DateTime<Utc>,
    /// Sync clock: bumped by every mutation
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a new empty note in the given category
    #[must_use]
    pub fn new(category: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::new(),
            category: category.into(),
            subcategory: None,
            title: title.into(),
            content: String::new(),
            items: Vec::new(),
            attachments: Vec::new(),
            is_pinned: false,
            scheduled_date: None,
            reminder: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the body text
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Append a checklist entry
    #[must_use]
    pub fn with_item(mut self, text: impl Into<String>) -> Self {
        self.items.push(NoteItem::new(text));
        self
    }

    /// Find a checklist entry by id
    #[must_use]
    pub fn item(&self, item_id: &str) -> Option<&NoteItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Number of completed checklist entries
    #[must_use]
    pub fn completed_items(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    /// Get title as preview, falling back to the first content line
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        let title = self.title.trim();
        let source = if title.is_empty() {
            self.content.lines().next().unwrap_or("")
        } else {
            title
        };
        source.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_id_unique() {
        let id1 = NoteId::new();
        let id2 = NoteId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_note_new() {
        let note = Note::new("work", "Standup");
        assert_eq!(note.category, "work");
        assert_eq!(note.title, "Standup");
        assert!(note.items.is_empty());
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_serializes_camel_case_fields() {
        let mut note = Note::new("work", "Plan").with_item("write tests");
        note.scheduled_date = NaiveDate::from_ymd_opt(2025, 12, 15);
        let value = serde_json::to_value(&note).unwrap();

        assert!(value.get("updatedAt").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("isPinned").is_some());
        assert_eq!(value["scheduledDate"], "2025-12-15");
        assert_eq!(value["items"][0]["text"], "write tests");
        assert!(value.get("reminder").is_none());
    }

    #[test]
    fn test_deserializes_minimal_record() {
        let json = r#"{
            "id": "1702640000000",
            "category": "gaming",
            "title": "Zelda",
            "content": "find the last shrine",
            "createdAt": "2025-12-15T10:00:00Z",
            "updatedAt": "2025-12-15T10:00:00Z"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();

        assert_eq!(note.id.as_str(), "1702640000000");
        assert!(note.items.is_empty());
        assert!(note.attachments.is_empty());
        assert!(!note.is_pinned);
    }

    #[test]
    fn test_attachment_kind_uses_type_field() {
        let json = r#"{
            "id": "a1",
            "type": "audio",
            "data": "UklGRg==",
            "mimeType": "audio/webm",
            "createdAt": "2025-12-15T10:00:00Z"
        }"#;
        let attachment: MediaAttachment = serde_json::from_str(json).unwrap();
        assert_eq!(attachment.kind, AttachmentKind::Audio);
        assert_eq!(attachment.transcription, None);
    }

    #[test]
    fn test_title_preview() {
        let note = Note::new("work", "").with_content("First line\nSecond line");
        assert_eq!(note.title_preview(50), "First line");
        assert_eq!(note.title_preview(5), "First");

        let titled = Note::new("work", "Groceries");
        assert_eq!(titled.title_preview(50), "Groceries");
    }
}
