//! Local-only settings and remote configuration.

use super::Notebook;
use crate::models::{AppSettings, RemoteConfig};
use crate::{Error, Result};

impl Notebook {
    pub async fn load_settings(&self) -> Result<AppSettings> {
        self.store.load_settings().await
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<AppSettings> {
        self.store
            .update_settings(|settings| settings.dark_mode = enabled)
            .await
    }

    pub async fn set_notifications(&self, enabled: bool) -> Result<AppSettings> {
        self.store
            .update_settings(|settings| settings.notifications_enabled = enabled)
            .await
    }

    /// Save the remote configuration and swap the active connection.
    ///
    /// An enabled config must pass a connectivity probe first. On failure
    /// nothing is persisted and the current connection stays in place.
    pub async fn save_remote_config(&self, config: RemoteConfig) -> Result<AppSettings> {
        if !config.enabled {
            let settings = self
                .store
                .update_settings(|settings| settings.remote_config = Some(config))
                .await?;
            self.swap_remote(None);
            tracing::info!("Remote sync disabled");
            return Ok(settings);
        }

        let connection = self
            .connector
            .connect(&config)
            .map_err(|error| Error::RemoteProbe(error.to_string()))?;
        connection
            .probe()
            .await
            .map_err(|error| Error::RemoteProbe(error.to_string()))?;

        let settings = self
            .store
            .update_settings(|settings| {
                let same_remote = settings
                    .enabled_remote()
                    .is_some_and(|previous| previous.same_target(&config));
                if !same_remote {
                    settings.remote_bootstrapped = false;
                }
                settings.remote_config = Some(config);
            })
            .await?;

        // Pushes already queued keep the connection they captured
        self.swap_remote(Some(connection));
        tracing::info!("Remote sync enabled");
        Ok(settings)
    }

    /// Turn sync off, keeping url and key for later
    pub async fn disable_remote(&self) -> Result<AppSettings> {
        let settings = self
            .store
            .update_settings(|settings| {
                if let Some(config) = settings.remote_config.as_mut() {
                    config.enabled = false;
                }
            })
            .await?;
        self.swap_remote(None);
        tracing::info!("Remote sync disabled");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::remote::{MemoryConnector, MemoryRemoteStore};

    #[tokio::test(flavor = "multi_thread")]
    async fn toggles_persist() {
        let connector = Arc::new(MemoryConnector::new(MemoryRemoteStore::new()));
        let notebook = Notebook::open_in_memory(connector).await.unwrap();

        notebook.set_dark_mode(false).await.unwrap();
        notebook.set_notifications(true).await.unwrap();

        let settings = notebook.load_settings().await.unwrap();
        assert!(!settings.dark_mode);
        assert!(settings.notifications_enabled);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_probe_keeps_sync_disabled() {
        let remote = MemoryRemoteStore::new();
        remote.set_fail_probe(true);
        let notebook = Notebook::open_in_memory(Arc::new(MemoryConnector::new(remote)))
            .await
            .unwrap();

        let result = notebook
            .save_remote_config(RemoteConfig::new("https://xyz.supabase.co", "anon"))
            .await;

        assert!(matches!(result, Err(Error::RemoteProbe(_))));
        assert!(!notebook.is_remote_connected());
        assert!(notebook
            .load_settings()
            .await
            .unwrap()
            .remote_config
            .is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn new_target_resets_bootstrap_and_disable_keeps_credentials() {
        let notebook = Notebook::open_in_memory(Arc::new(MemoryConnector::new(
            MemoryRemoteStore::new(),
        )))
        .await
        .unwrap();

        notebook
            .save_remote_config(RemoteConfig::new("https://one.supabase.co", "anon"))
            .await
            .unwrap();
        notebook
            .store()
            .update_settings(|settings| settings.remote_bootstrapped = true)
            .await
            .unwrap();

        let same = notebook
            .save_remote_config(RemoteConfig::new("https://one.supabase.co/", "anon"))
            .await
            .unwrap();
        assert!(same.remote_bootstrapped);

        let other = notebook
            .save_remote_config(RemoteConfig::new("https://two.supabase.co", "anon"))
            .await
            .unwrap();
        assert!(!other.remote_bootstrapped);
        assert!(notebook.is_remote_connected());

        let disabled = notebook.disable_remote().await.unwrap();
        let config = disabled.remote_config.unwrap();
        assert!(!config.enabled);
        assert_eq!(config.url, "https://two.supabase.co");
        assert!(!notebook.is_remote_connected());
    }
}
