use nexus_core::Notebook;

use crate::commands::common::resolve_note;
use crate::error::CliError;

pub async fn run_pin(id: &str, pinned: bool, notebook: &Notebook) -> Result<(), CliError> {
    let note = resolve_note(id, notebook).await?;
    let updated = notebook.set_pinned(&note.id, pinned).await?;
    println!("{}", updated.id);
    Ok(())
}
