//! REST client for a PostgREST-style remote dataset (e.g. Supabase).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{RemoteConnector, RemoteError, RemoteResult, RemoteRow, RemoteStore};
use crate::models::{CategoryConfig, Note, NoteId, RemoteConfig};
use crate::util::{compact_text, is_http_url, normalize_text_option};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const NOTES_TABLE: &str = "notes";
const CONFIG_TABLE: &str = "app_config";
const CATEGORIES_KEY: &str = "categories";

#[derive(Clone)]
pub struct RestRemoteStore {
    base_url: String,
    key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for RestRemoteStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RestRemoteStore")
            .field("base_url", &self.base_url)
            .field("key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl RestRemoteStore {
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        let base_url = normalize_base_url(&config.url)?;
        let key = normalize_text_option(Some(config.key.clone())).ok_or_else(|| {
            RemoteError::InvalidConfiguration("key must not be empty".to_string())
        })?;

        Ok(Self {
            base_url,
            key,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn send(request: reqwest::RequestBuilder) -> RemoteResult<reqwest::Response> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::Api(parse_api_error(status, &body)))
    }
}

#[derive(Debug, Deserialize)]
struct NoteDataRow {
    data: Note,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConfigRow<T> {
    key: String,
    data: T,
}

#[async_trait]
impl RemoteStore for RestRemoteStore {
    async fn upsert_notes(&self, rows: &[RemoteRow]) -> RemoteResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let request = self
            .request(reqwest::Method::POST, &self.table_url(NOTES_TABLE))
            .query(&[("on_conflict", "id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows);
        Self::send(request).await?;
        tracing::debug!("Upserted {} note rows", rows.len());
        Ok(())
    }

    async fn delete_note(&self, id: &NoteId) -> RemoteResult<()> {
        let url = format!(
            "{}?id=eq.{}",
            self.table_url(NOTES_TABLE),
            urlencoding::encode(id.as_str())
        );
        Self::send(self.request(reqwest::Method::DELETE, &url)).await?;
        Ok(())
    }

    async fn fetch_notes(&self) -> RemoteResult<Vec<Note>> {
        let request = self
            .request(reqwest::Method::GET, &self.table_url(NOTES_TABLE))
            .query(&[("select", "data")]);
        let rows = Self::send(request)
            .await?
            .json::<Vec<NoteDataRow>>()
            .await
            .map_err(|error| RemoteError::InvalidPayload(error.to_string()))?;
        Ok(rows.into_iter().map(|row| row.data).collect())
    }

    async fn upsert_categories(&self, categories: &[CategoryConfig]) -> RemoteResult<()> {
        let row = ConfigRow {
            key: CATEGORIES_KEY.to_string(),
            data: categories,
        };
        let request = self
            .request(reqwest::Method::POST, &self.table_url(CONFIG_TABLE))
            .query(&[("on_conflict", "key")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[row]);
        Self::send(request).await?;
        Ok(())
    }

    async fn fetch_categories(&self) -> RemoteResult<Vec<CategoryConfig>> {
        let key_filter = format!("eq.{CATEGORIES_KEY}");
        let request = self
            .request(reqwest::Method::GET, &self.table_url(CONFIG_TABLE))
            .query(&[("select", "key,data"), ("key", key_filter.as_str())]);
        let rows = Self::send(request)
            .await?
            .json::<Vec<ConfigRow<Vec<CategoryConfig>>>>()
            .await
            .map_err(|error| RemoteError::InvalidPayload(error.to_string()))?;
        Ok(rows.into_iter().next().map(|row| row.data).unwrap_or_default())
    }

    async fn probe(&self) -> RemoteResult<()> {
        let request = self
            .request(reqwest::Method::GET, &self.table_url(NOTES_TABLE))
            .query(&[("select", "id"), ("limit", "1")]);
        Self::send(request).await?;
        Ok(())
    }
}

/// Default connector producing `RestRemoteStore` connections
#[derive(Debug, Clone, Copy, Default)]
pub struct RestConnector;

impl RemoteConnector for RestConnector {
    fn connect(&self, config: &RemoteConfig) -> RemoteResult<Arc<dyn RemoteStore>> {
        Ok(Arc::new(RestRemoteStore::new(config)?))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: &str) -> RemoteResult<String> {
    let url = normalize_text_option(Some(raw.to_string())).ok_or_else(|| {
        RemoteError::InvalidConfiguration("url must not be empty".to_string())
    })?;
    if is_http_url(&url) {
        Ok(url.trim_end_matches('/').to_string())
    } else {
        Err(RemoteError::InvalidConfiguration(
            "url must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url("").is_err());
        assert!(normalize_base_url("xyz.supabase.co").is_err());
        assert_eq!(
            normalize_base_url(" https://xyz.supabase.co/ ").unwrap(),
            "https://xyz.supabase.co"
        );
    }

    #[test]
    fn new_requires_key() {
        let config = RemoteConfig::new("https://xyz.supabase.co", "  ");
        assert!(RestRemoteStore::new(&config).is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let store =
            RestRemoteStore::new(&RemoteConfig::new("https://xyz.supabase.co", "secret")).unwrap();
        let debug = format!("{store:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn parse_api_error_prefers_message_field() {
        let message = parse_api_error(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid API key"}"#,
        );
        assert_eq!(message, "Invalid API key (401)");
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
    }

    #[test]
    fn table_urls_are_rooted_at_rest_api() {
        let store =
            RestRemoteStore::new(&RemoteConfig::new("https://xyz.supabase.co/", "anon")).unwrap();
        assert_eq!(
            store.table_url(NOTES_TABLE),
            "https://xyz.supabase.co/rest/v1/notes"
        );
    }
}
