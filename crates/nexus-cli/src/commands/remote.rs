use nexus_core::models::RemoteConfig;
use nexus_core::Notebook;

use crate::commands::common::format_timestamp;
use crate::error::CliError;

pub async fn run_remote_set(url: &str, key: &str, notebook: &Notebook) -> Result<(), CliError> {
    notebook
        .save_remote_config(RemoteConfig::new(url.trim(), key.trim()))
        .await?;
    println!("Remote sync enabled for {}", url.trim());
    Ok(())
}

pub async fn run_remote_disable(notebook: &Notebook) -> Result<(), CliError> {
    notebook.disable_remote().await?;
    println!("Remote sync disabled");
    Ok(())
}

pub async fn run_remote_status(notebook: &Notebook) -> Result<(), CliError> {
    for line in remote_status_lines(notebook).await? {
        println!("{line}");
    }
    Ok(())
}

pub async fn remote_status_lines(notebook: &Notebook) -> Result<Vec<String>, CliError> {
    let settings = notebook.load_settings().await?;
    let mut lines = Vec::new();

    match settings.remote_config.as_ref() {
        Some(config) => {
            let state = if config.enabled { "enabled" } else { "disabled" };
            lines.push(format!("sync:         {state}"));
            lines.push(format!("url:          {}", config.url));
        }
        None => lines.push("sync:         not configured".to_string()),
    }
    lines.push(format!(
        "last sync:    {}",
        settings
            .last_sync
            .map_or_else(|| "never".to_string(), format_timestamp)
    ));
    if settings.enabled_remote().is_some() {
        let bootstrap = if settings.remote_bootstrapped {
            "done"
        } else {
            "pending"
        };
        lines.push(format!("first upload: {bootstrap}"));
    }
    Ok(lines)
}
