use nexus_core::Notebook;

use crate::commands::common::{format_note_details, resolve_note};
use crate::error::CliError;

pub async fn run_show(id: &str, as_json: bool, notebook: &Notebook) -> Result<(), CliError> {
    let note = resolve_note(id, notebook).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        for line in format_note_details(&note) {
            println!("{line}");
        }
    }
    Ok(())
}
