use nexus_core::search::filter_notes;
use nexus_core::Notebook;

use crate::commands::common::{format_note_lines, note_to_list_item, NoteListItem};
use crate::error::CliError;

pub async fn run_list(
    category: Option<&str>,
    query: Option<&str>,
    limit: usize,
    as_json: bool,
    notebook: &Notebook,
) -> Result<(), CliError> {
    let notes = notebook.load_notes().await?;
    let mut matching = filter_notes(&notes, category, query);
    matching.truncate(limit);

    if as_json {
        let json_items = matching
            .iter()
            .map(|note| note_to_list_item(note))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else if matching.is_empty() {
        println!("No notes found.");
    } else {
        for line in format_note_lines(&matching) {
            println!("{line}");
        }
    }

    Ok(())
}
