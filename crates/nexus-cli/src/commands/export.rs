use std::path::{Path, PathBuf};

use chrono::Local;
use nexus_core::export::suggested_backup_file_name;
use nexus_core::Notebook;

use crate::error::CliError;

/// Directories receive a dated backup file name
pub fn resolve_export_path(output_path: &Path) -> PathBuf {
    if output_path.is_dir() {
        output_path.join(suggested_backup_file_name(Local::now().date_naive()))
    } else {
        output_path.to_path_buf()
    }
}

pub async fn run_export(output_path: Option<&Path>, notebook: &Notebook) -> Result<(), CliError> {
    let rendered = notebook.export_notes().await?;

    if let Some(path) = output_path {
        let path = resolve_export_path(path);
        std::fs::write(&path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
