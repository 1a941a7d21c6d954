//! Content fetcher for the remote CMS endpoint
//!
//! One request per language: `GET {base}/{lang}/{site}`, authenticated
//! with HTTP Basic and an API key header. The endpoint wraps the
//! useful payload in an envelope; the fetcher unwraps it and hands the
//! orchestrator a plain [`ContentSnapshot`].

use std::future::Future;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::SyncConfig;
use crate::mock::mock_snapshot;
use crate::types::ContentSnapshot;

/// Source of per-language content payloads.
///
/// The orchestrator only depends on this trait, so tests substitute
/// scripted sources without a network.
pub trait ContentSource: Send + Sync {
    /// Fetches the full payload for one language.
    fn fetch_content(
        &self,
        lang: &str,
    ) -> impl Future<Output = Result<ContentSnapshot, FetchError>> + Send;
}

/// Envelope returned by the CMS: `{ meta, data: { lang, site, data: … } }`.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    data: SitePayload,
}

#[derive(Debug, Deserialize)]
struct SitePayload {
    #[allow(dead_code)]
    lang: String,
    data: ContentSnapshot,
}

/// Production fetcher backed by reqwest.
pub struct HttpContentSource {
    client: reqwest::Client,
    base_url: String,
    site: String,
    auth: Option<(String, String)>,
    api_key: Option<String>,
}

impl HttpContentSource {
    /// Builds a fetcher from config. The HTTP timeout is baked into
    /// the client so every request is bounded.
    pub fn new(config: &SyncConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(format!(
                "Kiosync/{}",
                option_env!("CARGO_PKG_VERSION").unwrap_or("0.1.0")
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.clone(),
            site: config.site.clone(),
            auth: config
                .auth
                .as_ref()
                .map(|a| (a.user.clone(), a.pass.clone())),
            api_key: config.api_key.clone(),
        })
    }

    fn content_url(&self, lang: &str) -> String {
        format!("{}/{}/{}", self.base_url, lang, self.site)
    }
}

impl ContentSource for HttpContentSource {
    async fn fetch_content(&self, lang: &str) -> Result<ContentSnapshot, FetchError> {
        let url = self.content_url(lang);
        debug!(%url, "fetching content");

        let mut request = self.client.get(&url);
        if let Some((user, pass)) = &self.auth {
            request = request.basic_auth(user, Some(pass));
        }
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status().as_u16()));
        }

        let envelope: ApiEnvelope = response.json().await?;
        Ok(envelope.data.data)
    }
}

/// Mock fetcher: always answers with built-in content.
///
/// Used in mock mode and as the bottom of the fallback chain when no
/// cache exists.
#[derive(Debug, Default, Clone)]
pub struct MockContentSource;

impl ContentSource for MockContentSource {
    async fn fetch_content(&self, lang: &str) -> Result<ContentSnapshot, FetchError> {
        Ok(mock_snapshot(lang))
    }
}

/// Default wiring: HTTP against the CMS, or built-in mock content
/// when `use_mock_data` is set (dev without an API).
pub enum DefaultContentSource {
    Http(HttpContentSource),
    Mock(MockContentSource),
}

impl DefaultContentSource {
    /// Chooses the source according to config.
    pub fn new(config: &SyncConfig) -> Result<Self, FetchError> {
        if config.use_mock_data {
            Ok(Self::Mock(MockContentSource))
        } else {
            Ok(Self::Http(HttpContentSource::new(config)?))
        }
    }
}

impl ContentSource for DefaultContentSource {
    async fn fetch_content(&self, lang: &str) -> Result<ContentSnapshot, FetchError> {
        match self {
            Self::Http(source) => source.fetch_content(lang).await,
            Self::Mock(source) => source.fetch_content(lang).await,
        }
    }
}

/// Errors that can occur while fetching content
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-2xx response
    #[error("HTTP error: {0}")]
    HttpStatus(u16),

    /// Network/request/body error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Envelope did not parse
    #[error("Malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
