use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "nexus")]
#[command(about = "Offline-first notes with optional remote sync")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note title
        title: String,
        /// Body text
        #[arg(long)]
        content: Option<String>,
        /// Category id
        #[arg(long, default_value = "personal")]
        category: String,
        /// Free-text subcategory (e.g. a game name)
        #[arg(long)]
        subcategory: Option<String>,
        /// Checklist entry (repeatable)
        #[arg(long = "item", value_name = "TEXT")]
        items: Vec<String>,
        /// Scheduled date (YYYY-MM-DD)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
        /// Reminder instant (RFC 3339)
        #[arg(long, value_name = "RFC3339")]
        remind: Option<DateTime<Utc>>,
    },
    /// List notes, most recently updated first
    List {
        /// Only notes in this category
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive text filter
        #[arg(short, long)]
        query: Option<String>,
        /// Number of notes to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one note in full
    Show {
        /// Note ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Toggle a checklist entry
    Toggle {
        /// Note ID or unique ID prefix
        note_id: String,
        /// Item ID or unique ID prefix
        item_id: String,
    },
    /// Delete an existing note
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Pin a note
    Pin {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Unpin a note
    Unpin {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Reconcile local notes with the remote store
    Sync {
        #[command(subcommand)]
        command: Option<SyncCommands>,
    },
    /// Write a JSON backup of every note
    Export {
        /// Output file or directory (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Import a JSON backup
    Import {
        /// Backup file
        path: PathBuf,
        /// Replace the whole collection instead of adding new notes only
        #[arg(long)]
        replace: bool,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Configure the remote store
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
    /// Change local preferences
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Inspect reminders
    Reminders {
        #[command(subcommand)]
        command: ReminderCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Subcommand)]
pub enum SyncCommands {
    /// List recently resolved sync conflicts
    Conflicts {
        /// Number of conflicts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Show the category collection
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the category collection from a JSON file
    Set {
        /// JSON array of {id, label, icon, color}
        path: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum RemoteCommands {
    /// Enable sync against a remote project
    Set {
        /// Remote project URL
        #[arg(long, env = "NEXUS_REMOTE_URL", value_name = "URL")]
        url: String,
        /// Remote API key
        #[arg(long, env = "NEXUS_REMOTE_KEY", value_name = "KEY", hide_env_values = true)]
        key: String,
    },
    /// Disable sync, keeping the saved URL and key
    Disable,
    /// Show remote configuration and last sync
    Status,
}

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Dark theme preference
    DarkMode {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Reminder notifications
    Notifications {
        #[arg(value_enum)]
        state: Switch,
    },
}

#[derive(Subcommand)]
pub enum ReminderCommands {
    /// List reminders due in the last few minutes
    Due {
        /// Mark listed reminders as delivered
        #[arg(long)]
        mark: bool,
    },
}
