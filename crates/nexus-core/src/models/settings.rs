//! Application settings model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Connection parameters for the remote store
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RemoteConfig {
    /// Base URL of the remote project (e.g., `https://xyz.supabase.co`)
    pub url: String,
    /// API key sent with every request
    pub key: String,
    /// Whether sync runs at all
    pub enabled: bool,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            enabled: true,
        }
    }

    /// Whether both config objects point at the same remote dataset
    #[must_use]
    pub fn same_target(&self, other: &Self) -> bool {
        self.url.trim_end_matches('/') == other.url.trim_end_matches('/') && self.key == other.key
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("key", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Application settings (local only, never synced)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub dark_mode: bool,
    /// Last successful remote fetch
    pub last_sync: Option<DateTime<Utc>>,
    pub remote_config: Option<RemoteConfig>,
    pub notifications_enabled: bool,
    /// Whether the initial upload for the current remote has completed
    pub remote_bootstrapped: bool,
}

impl AppSettings {
    /// The remote config, if sync is switched on
    #[must_use]
    pub fn enabled_remote(&self) -> Option<&RemoteConfig> {
        self.remote_config.as_ref().filter(|config| config.enabled)
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            last_sync: None,
            remote_config: None,
            notifications_enabled: false,
            remote_bootstrapped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = AppSettings::default();
        assert!(settings.dark_mode);
        assert!(settings.enabled_remote().is_none());
    }

    #[test]
    fn remote_config_debug_redacts_key() {
        let config = RemoteConfig::new("https://xyz.supabase.co", "secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn disabled_remote_is_not_enabled() {
        let settings = AppSettings {
            remote_config: Some(RemoteConfig {
                enabled: false,
                ..RemoteConfig::new("https://xyz.supabase.co", "k")
            }),
            ..AppSettings::default()
        };
        assert!(settings.enabled_remote().is_none());
    }

    #[test]
    fn same_target_ignores_trailing_slash() {
        let a = RemoteConfig::new("https://xyz.supabase.co/", "k");
        let b = RemoteConfig::new("https://xyz.supabase.co", "k");
        assert!(a.same_target(&b));
        assert!(!a.same_target(&RemoteConfig::new("https://xyz.supabase.co", "other")));
    }
}
