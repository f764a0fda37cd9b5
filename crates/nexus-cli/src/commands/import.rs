use std::path::Path;

use nexus_core::services::ImportMode;
use nexus_core::Notebook;

use crate::error::CliError;

pub async fn run_import(path: &Path, replace: bool, notebook: &Notebook) -> Result<(), CliError> {
    let payload = std::fs::read_to_string(path)?;
    let mode = if replace {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };

    let summary = notebook.import_notes(&payload, mode).await?;
    println!(
        "Imported {} notes ({} removed, {} total)",
        summary.imported, summary.removed, summary.total
    );
    Ok(())
}
