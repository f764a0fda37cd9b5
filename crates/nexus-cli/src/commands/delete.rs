use nexus_core::Notebook;

use crate::commands::common::resolve_note;
use crate::error::CliError;

pub async fn run_delete(id: &str, notebook: &Notebook) -> Result<(), CliError> {
    let note = resolve_note(id, notebook).await?;
    notebook.delete_note(&note.id).await?;
    println!("{}", note.id);
    Ok(())
}
