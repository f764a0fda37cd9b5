use nexus_core::Notebook;

use crate::commands::common::{resolve_item, resolve_note};
use crate::error::CliError;

pub async fn run_toggle(note_id: &str, item_id: &str, notebook: &Notebook) -> Result<(), CliError> {
    let note = resolve_note(note_id, notebook).await?;
    let item_id = resolve_item(&note, item_id)?.id.clone();

    let updated = notebook.toggle_item(&note.id, &item_id).await?;
    if let Some(item) = updated.item(&item_id) {
        let mark = if item.completed { "x" } else { " " };
        println!("[{mark}] {}", item.text);
    }
    Ok(())
}
