//! Nexus CLI - offline-first notes from the terminal
//!
//! Every command works against the local store; when remote sync is
//! configured, reads reconcile first and writes are pushed in the
//! background before the process exits.

mod cli;
mod commands;
mod error;


use clap::Parser;

use crate::cli::{
    CategoryCommands, Cli, Commands, ReminderCommands, RemoteCommands, SettingsCommands,
    SyncCommands,
};
use crate::commands::add::{run_add, AddArgs};
use crate::commands::categories::{run_categories_list, run_categories_set};
use crate::commands::common::{open_notebook, resolve_db_path};
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::export::run_export;
use crate::commands::import::run_import;
use crate::commands::list::run_list;
use crate::commands::pin::run_pin;
use crate::commands::reminders::run_reminders_due;
use crate::commands::remote::{run_remote_disable, run_remote_set, run_remote_status};
use crate::commands::settings::{run_dark_mode, run_notifications};
use crate::commands::show::run_show;
use crate::commands::sync::{run_sync, run_sync_conflicts};
use crate::commands::toggle::run_toggle;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "nexus=info".parse::<tracing_subscriber::filter::Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let db_path = resolve_db_path(cli.db_path);
    let notebook = open_notebook(&db_path).await?;

    let result = dispatch(cli.command, &notebook).await;
    // Background pushes must finish before the runtime shuts down
    notebook.flush().await;
    result
}

async fn dispatch(command: Commands, notebook: &nexus_core::Notebook) -> Result<(), CliError> {
    match command {
        Commands::Add {
            title,
            content,
            category,
            subcategory,
            items,
            date,
            remind,
        } => {
            let args = AddArgs {
                title,
                content,
                category,
                subcategory,
                items,
                date,
                remind,
            };
            run_add(args, notebook).await
        }
        Commands::List {
            category,
            query,
            limit,
            json,
        } => run_list(category.as_deref(), query.as_deref(), limit, json, notebook).await,
        Commands::Show { id, json } => run_show(&id, json, notebook).await,
        Commands::Toggle { note_id, item_id } => run_toggle(&note_id, &item_id, notebook).await,
        Commands::Delete { id } => run_delete(&id, notebook).await,
        Commands::Pin { id } => run_pin(&id, true, notebook).await,
        Commands::Unpin { id } => run_pin(&id, false, notebook).await,
        Commands::Sync { command } => match command {
            Some(SyncCommands::Conflicts { limit, json }) => {
                run_sync_conflicts(limit, json, notebook).await
            }
            None => run_sync(notebook).await,
        },
        Commands::Export { output } => run_export(output.as_deref(), notebook).await,
        Commands::Import { path, replace } => run_import(&path, replace, notebook).await,
        Commands::Categories { command } => match command {
            CategoryCommands::List { json } => run_categories_list(json, notebook).await,
            CategoryCommands::Set { path } => run_categories_set(&path, notebook).await,
        },
        Commands::Remote { command } => match command {
            RemoteCommands::Set { url, key } => run_remote_set(&url, &key, notebook).await,
            RemoteCommands::Disable => run_remote_disable(notebook).await,
            RemoteCommands::Status => run_remote_status(notebook).await,
        },
        Commands::Settings { command } => match command {
            SettingsCommands::DarkMode { state } => run_dark_mode(state, notebook).await,
            SettingsCommands::Notifications { state } => {
                run_notifications(state, notebook).await
            }
        },
        Commands::Reminders { command } => match command {
            ReminderCommands::Due { mark } => run_reminders_due(mark, notebook).await,
        },
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
    }
}
