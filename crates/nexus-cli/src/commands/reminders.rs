use chrono::Utc;
use nexus_core::reminders::due_reminders;
use nexus_core::Notebook;

use crate::commands::common::{format_timestamp, short_id};
use crate::error::CliError;

pub async fn run_reminders_due(mark: bool, notebook: &Notebook) -> Result<(), CliError> {
    let notes = notebook.load_notes().await?;
    let due = due_reminders(&notes, Utc::now());

    if due.is_empty() {
        println!("No reminders due.");
        return Ok(());
    }

    for note in &due {
        let when = note
            .reminder
            .as_ref()
            .map_or_else(String::new, |reminder| format_timestamp(reminder.datetime));
        println!("{:<13}  {}  {}", short_id(note.id.as_str()), when, note.title);
    }

    if mark {
        for note in &due {
            notebook.mark_reminder_notified(&note.id).await?;
        }
        println!("Marked {} reminder(s) as delivered", due.len());
    }
    Ok(())
}
