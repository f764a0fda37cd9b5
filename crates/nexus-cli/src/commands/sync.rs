use nexus_core::services::SyncOutcome;
use nexus_core::Notebook;

use crate::commands::common::{format_sync_conflict_lines, sync_conflict_to_item, SyncConflictItem};
use crate::error::CliError;

pub async fn run_sync(notebook: &Notebook) -> Result<(), CliError> {
    if !notebook.is_remote_connected() {
        return Err(CliError::SyncNotConfigured);
    }

    let report = notebook.sync_notes().await?;
    match report.outcome {
        SyncOutcome::Reconciled => {
            println!(
                "Sync completed: {} notes, {} pushed, {} removed, {} conflicts",
                report.notes.len(),
                report.pushed,
                report.dropped,
                report.conflicts
            );
            if report.bootstrapped > 0 {
                println!("Uploaded {} local notes to the remote", report.bootstrapped);
            }
        }
        SyncOutcome::RemoteUnavailable => {
            println!(
                "Remote unavailable; {} local notes kept unchanged",
                report.notes.len()
            );
        }
        SyncOutcome::LocalOnly => return Err(CliError::SyncNotConfigured),
    }
    Ok(())
}

pub async fn run_sync_conflicts(
    limit: usize,
    as_json: bool,
    notebook: &Notebook,
) -> Result<(), CliError> {
    let conflicts = notebook.list_conflicts(limit).await?;

    if as_json {
        let json_items = conflicts
            .iter()
            .map(sync_conflict_to_item)
            .collect::<Vec<SyncConflictItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No sync conflicts recorded.");
        return Ok(());
    }

    for line in format_sync_conflict_lines(&conflicts) {
        println!("{line}");
    }
    Ok(())
}
