//! Settings repository implementation

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::models::{AppSettings, RemoteConfig};

/// Trait for settings storage operations
pub trait SettingsRepository {
    /// Load settings from the database
    fn load(&self) -> Result<AppSettings>;

    /// Save settings to the database
    fn save(&self, settings: &AppSettings) -> Result<()>;
}

/// `SQLite` implementation of `SettingsRepository`
pub struct SqliteSettingsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSettingsRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn load(&self) -> Result<AppSettings> {
        let mut settings = AppSettings::default();

        if let Some(value) = self.get_setting("dark_mode")? {
            settings.dark_mode = parse_flag(&value);
        }

        if let Some(value) = self.get_setting("last_sync")? {
            settings.last_sync = DateTime::parse_from_rfc3339(&value)
                .ok()
                .map(|instant| instant.with_timezone(&Utc));
        }

        if let Some(value) = self.get_setting("remote_config")? {
            match serde_json::from_str::<RemoteConfig>(&value) {
                Ok(config) => settings.remote_config = Some(config),
                Err(error) => tracing::warn!("Ignoring unreadable remote config: {error}"),
            }
        }

        if let Some(value) = self.get_setting("notifications_enabled")? {
            settings.notifications_enabled = parse_flag(&value);
        }

        if let Some(value) = self.get_setting("remote_bootstrapped")? {
            settings.remote_bootstrapped = parse_flag(&value);
        }

        Ok(settings)
    }

    fn save(&self, settings: &AppSettings) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let repo = SqliteSettingsRepository::new(&tx);

        repo.set_setting("dark_mode", flag(settings.dark_mode))?;
        match settings.last_sync {
            Some(last_sync) => repo.set_setting("last_sync", &last_sync.to_rfc3339())?,
            None => repo.remove_setting("last_sync")?,
        }
        match &settings.remote_config {
            Some(config) => repo.set_setting("remote_config", &serde_json::to_string(config)?)?,
            None => repo.remove_setting("remote_config")?,
        }
        repo.set_setting("notifications_enabled", flag(settings.notifications_enabled))?;
        repo.set_setting("remote_bootstrapped", flag(settings.remote_bootstrapped))?;

        tx.commit()?;
        Ok(())
    }
}

impl SqliteSettingsRepository<'_> {
    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_setting(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?", params![key])?;
        Ok(())
    }
}

const fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_load_default_settings() {
        let db = setup();
        let repo = SqliteSettingsRepository::new(db.connection());

        let settings = repo.load().unwrap();
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_save_and_load_settings() {
        let db = setup();
        let repo = SqliteSettingsRepository::new(db.connection());

        let settings = AppSettings {
            dark_mode: false,
            last_sync: Some(Utc::now()),
            remote_config: Some(RemoteConfig::new("https://xyz.supabase.co", "anon")),
            notifications_enabled: true,
            remote_bootstrapped: true,
        };

        repo.save(&settings).unwrap();
        assert_eq!(repo.load().unwrap(), settings);
    }

    #[test]
    fn test_clearing_remote_config() {
        let db = setup();
        let repo = SqliteSettingsRepository::new(db.connection());

        let mut settings = AppSettings {
            remote_config: Some(RemoteConfig::new("https://xyz.supabase.co", "anon")),
            ..AppSettings::default()
        };
        repo.save(&settings).unwrap();

        settings.remote_config = None;
        repo.save(&settings).unwrap();
        assert!(repo.load().unwrap().remote_config.is_none());
    }
}
