//! Backup documents: a top-level JSON array of notes.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::Value;

use crate::models::Note;
use crate::{Error, Result};

/// Render notes as a pretty-printed backup document.
pub fn render_backup(notes: &[Note]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(notes)
}

/// Parse and validate a backup document.
///
/// The whole payload is checked before anything is returned: it must be
/// an array, every element must be a note with a non-empty id, and ids
/// must be unique.
pub fn parse_backup(payload: &str) -> Result<Vec<Note>> {
    let document: Value = serde_json::from_str(payload)
        .map_err(|error| Error::InvalidImport(format!("not valid JSON: {error}")))?;

    let Value::Array(records) = document else {
        return Err(Error::InvalidImport(
            "expected a JSON array of notes".to_string(),
        ));
    };

    let mut seen = HashSet::with_capacity(records.len());
    let mut notes = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let note: Note = serde_json::from_value(record)
            .map_err(|error| Error::InvalidImport(format!("record {index}: {error}")))?;
        if note.id.is_blank() {
            return Err(Error::InvalidImport(format!("record {index}: empty id")));
        }
        if !seen.insert(note.id.clone()) {
            return Err(Error::InvalidImport(format!(
                "record {index}: duplicate id {}",
                note.id
            )));
        }
        notes.push(note);
    }

    Ok(notes)
}

/// Default file name for a backup taken on `date`
#[must_use]
pub fn suggested_backup_file_name(date: NaiveDate) -> String {
    format!("NexusNotes_Backup_{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn rejects_non_array_payloads() {
        for payload in [r#"{"id":"1"}"#, "42", "\"notes\"", "not json"] {
            assert!(matches!(
                parse_backup(payload),
                Err(Error::InvalidImport(_))
            ));
        }
    }

    #[test]
    fn rejects_arrays_with_non_note_records() {
        let note = Note::new("work", "valid");
        let valid = serde_json::to_value(&note).unwrap();
        let payload = serde_json::to_string(&vec![valid, serde_json::json!({"title": 3})]).unwrap();

        let error = parse_backup(&payload).unwrap_err();
        assert!(error.to_string().contains("record 1"));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let note = Note::new("work", "twice");
        let payload = render_backup(&[note.clone(), note]).unwrap();
        assert!(matches!(
            parse_backup(&payload),
            Err(Error::InvalidImport(_))
        ));
    }

    #[test]
    fn older_backups_default_missing_fields() {
        let payload = r#"[{
            "id": "legacy-1",
            "category": "work",
            "title": "Old",
            "content": "from an older release",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }]"#;

        let notes = parse_backup(payload).unwrap();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].items.is_empty());
        assert!(notes[0].attachments.is_empty());
        assert!(!notes[0].is_pinned);
    }

    #[test]
    fn empty_array_is_a_valid_backup() {
        assert!(parse_backup("[]").unwrap().is_empty());
    }

    #[test]
    fn rendered_backup_parses_back() {
        let notes = vec![
            Note::new("work", "first").with_item("step"),
            Note::new("personal", "second").with_content("body"),
        ];
        let rendered = render_backup(&notes).unwrap();
        assert_eq!(parse_backup(&rendered).unwrap(), notes);
    }

    #[test]
    fn suggested_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 15).unwrap();
        assert_eq!(
            suggested_backup_file_name(date),
            "NexusNotes_Backup_2025-12-15.json"
        );
    }
}
