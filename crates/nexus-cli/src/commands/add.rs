use chrono::{DateTime, NaiveDate, Utc};
use nexus_core::models::Reminder;
use nexus_core::{Note, Notebook};

use crate::error::CliError;

pub struct AddArgs {
    pub title: String,
    pub content: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub items: Vec<String>,
    pub date: Option<NaiveDate>,
    pub remind: Option<DateTime<Utc>>,
}

pub fn build_note(args: AddArgs) -> Result<Note, CliError> {
    let title = args.title.trim();
    if title.is_empty() {
        return Err(CliError::EmptyTitle);
    }

    let mut note = Note::new(args.category.trim(), title);
    if let Some(content) = args.content {
        note = note.with_content(content.trim());
    }
    for item in args.items.iter().map(|item| item.trim()).filter(|item| !item.is_empty()) {
        note = note.with_item(item);
    }
    note.subcategory = args
        .subcategory
        .map(|subcategory| subcategory.trim().to_string())
        .filter(|subcategory| !subcategory.is_empty());
    note.scheduled_date = args.date;
    note.reminder = args.remind.map(Reminder::at);
    Ok(note)
}

pub async fn run_add(args: AddArgs, notebook: &Notebook) -> Result<(), CliError> {
    let note = notebook.save_note(build_note(args)?).await?;
    println!("{}", note.id);
    Ok(())
}
