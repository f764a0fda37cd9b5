use nexus_core::Notebook;

use crate::cli::Switch;
use crate::error::CliError;

const fn label(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

pub async fn run_dark_mode(state: Switch, notebook: &Notebook) -> Result<(), CliError> {
    let settings = notebook.set_dark_mode(state.is_on()).await?;
    println!("Dark mode {}", label(settings.dark_mode));
    Ok(())
}

pub async fn run_notifications(state: Switch, notebook: &Notebook) -> Result<(), CliError> {
    let settings = notebook.set_notifications(state.is_on()).await?;
    println!("Notifications {}", label(settings.notifications_enabled));
    Ok(())
}
