//! Category collection: whole-collection replace, remote copy preferred.

use super::Notebook;
use crate::models::{default_categories, validate_categories, CategoryConfig};
use crate::sync::PushJob;
use crate::Result;

impl Notebook {
    /// Load categories, preferring a non-empty remote collection.
    ///
    /// Falls back to the local collection, or the built-in defaults when
    /// nothing is stored yet, and pushes that to the remote when connected.
    pub async fn load_categories(&self) -> Result<Vec<CategoryConfig>> {
        let local = self.store.read_categories().await?;

        if let Some(remote) = self.remote() {
            match remote.fetch_categories().await {
                Ok(categories) if !categories.is_empty() => {
                    if categories != local {
                        self.store.replace_categories(&categories).await?;
                        tracing::debug!("Adopted {} remote categories", categories.len());
                    }
                    return Ok(categories);
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!("Remote category fetch failed, using local: {}", error);
                    return self.local_or_default(local).await;
                }
            }
        }

        let categories = self.local_or_default(local).await?;
        self.push(PushJob::UpsertCategories(categories.clone()));
        Ok(categories)
    }

    /// Validate and store the whole collection, then push it
    pub async fn save_categories(
        &self,
        categories: Vec<CategoryConfig>,
    ) -> Result<Vec<CategoryConfig>> {
        validate_categories(&categories)?;
        self.store.replace_categories(&categories).await?;
        tracing::debug!("Saved {} categories", categories.len());
        self.push(PushJob::UpsertCategories(categories.clone()));
        Ok(categories)
    }

    async fn local_or_default(&self, local: Vec<CategoryConfig>) -> Result<Vec<CategoryConfig>> {
        if !local.is_empty() {
            return Ok(local);
        }
        let defaults = default_categories();
        self.store.replace_categories(&defaults).await?;
        Ok(defaults)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{CategoryColor, CategoryIcon};
    use crate::remote::{MemoryConnector, MemoryRemoteStore};
    use crate::Error;
    use pretty_assertions::assert_eq;

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_store_yields_persisted_defaults() {
        let connector = Arc::new(MemoryConnector::new(MemoryRemoteStore::new()));
        let notebook = Notebook::open_in_memory(connector).await.unwrap();

        let categories = notebook.load_categories().await.unwrap();

        assert_eq!(categories, default_categories());
        assert_eq!(
            notebook.store().read_categories().await.unwrap(),
            default_categories()
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn save_rejects_invalid_collection() {
        let connector = Arc::new(MemoryConnector::new(MemoryRemoteStore::new()));
        let notebook = Notebook::open_in_memory(connector).await.unwrap();

        let result = notebook.save_categories(Vec::new()).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let duplicate =
            CategoryConfig::new("work", "Work", CategoryIcon::Briefcase, CategoryColor::Blue);
        let result = notebook
            .save_categories(vec![duplicate.clone(), duplicate])
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert!(notebook.store().read_categories().await.unwrap().is_empty());
    }
}
