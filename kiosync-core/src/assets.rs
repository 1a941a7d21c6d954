// SPDX-FileCopyrightText: 2026 Kiosync Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Asset store: remote media URLs → locally cached files
//!
//! Files are named by a content-addressed scheme: the SHA-256 of the
//! URL path, truncated to 16 hex characters, plus the URL's extension.
//! The name is a pure function of the URL, so existence on disk is the
//! only "already downloaded" index the store needs. All languages
//! share one flat asset directory; orphan collection therefore always
//! considers every language's snapshot.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::changes::detect_changes;
use crate::config::SyncConfig;
use crate::fetcher::FetchError;
use crate::types::{ContentSnapshot, MediaReference, MultiLanguageSnapshot};

/// Downloads raw bytes from a media URL.
///
/// Seam for tests: fakes count downloads and serve canned bytes.
pub trait RemoteFetch: Send + Sync {
    /// Performs an authenticated GET and returns the body.
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Platform capability turning a local file path into an
/// application-servable URL. Not reimplemented here; the default
/// mirrors the webview asset protocol.
pub trait LocalUrlScheme: Send + Sync {
    /// Converts a downloaded file's path to a displayable URL.
    fn to_local_url(&self, path: &Path) -> String;

    /// True if the URL already uses the local scheme.
    fn is_local(&self, url: &str) -> bool;

    /// Recovers the file name from a local URL (trailing segment).
    fn file_name<'a>(&self, url: &'a str) -> Option<&'a str> {
        if !self.is_local(url) {
            return None;
        }
        url.rsplit('/').next().filter(|name| !name.is_empty())
    }
}

/// Default local scheme: `asset://localhost/{path}`.
#[derive(Debug, Default, Clone)]
pub struct AssetProtocol;

const ASSET_SCHEME_PREFIX: &str = "asset://";

impl LocalUrlScheme for AssetProtocol {
    fn to_local_url(&self, path: &Path) -> String {
        let path = path.to_string_lossy().replace('\\', "/");
        format!("asset://localhost/{}", path.trim_start_matches('/'))
    }

    fn is_local(&self, url: &str) -> bool {
        url.starts_with(ASSET_SCHEME_PREFIX)
    }
}

/// Production byte fetcher backed by reqwest, sharing the content
/// endpoint's auth headers.
pub struct HttpFetch {
    client: reqwest::Client,
    auth: Option<(String, String)>,
    api_key: Option<String>,
}

impl HttpFetch {
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
            auth: config
                .auth
                .as_ref()
                .map(|a| (a.user.clone(), a.pass.clone())),
            api_key: config.api_key.clone(),
        })
    }
}

impl RemoteFetch for HttpFetch {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut request = self.client.get(url);
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
        Ok(response.bytes().await?.to_vec())
    }
}

/// Deterministic local file name for a media URL.
///
/// Contract: `hash16(url_path) + "." + extension`, where `hash16` is
/// the first 16 hex characters (64 bits) of SHA-256. Collisions in a
/// cache of a few thousand files are vanishingly unlikely and accepted;
/// a collision would serve the wrong image, never corrupt state.
/// Unparsable URLs hash the whole string and default to `.jpg`.
pub fn asset_file_name(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            let path = parsed.path();
            let last_segment = path.rsplit('/').next().unwrap_or("");
            let extension = last_segment
                .rsplit_once('.')
                .map(|(_, ext)| ext)
                .filter(|ext| !ext.is_empty())
                .unwrap_or("jpg");
            format!("{}.{}", hash16(path), extension)
        }
        Err(_) => format!("asset-{}.jpg", hash16(url)),
    }
}

fn hash16(input: &str) -> String {
    let digest = ring::digest::digest(&ring::digest::SHA256, input.as_bytes());
    hex::encode(&digest.as_ref()[..8])
}

/// Maps remote media URLs to files in a flat local directory and
/// rewrites entity media references to local URLs.
pub struct AssetStore<F, S = AssetProtocol> {
    assets_dir: PathBuf,
    fetch: F,
    scheme: S,
}

impl<F: RemoteFetch> AssetStore<F> {
    /// Opens the store with the default local URL scheme.
    pub fn new(assets_dir: &Path, fetch: F) -> Result<Self, AssetError> {
        Self::with_scheme(assets_dir, fetch, AssetProtocol)
    }
}

impl<F: RemoteFetch, S: LocalUrlScheme> AssetStore<F, S> {
    /// Opens the store, creating the asset directory if needed.
    pub fn with_scheme(assets_dir: &Path, fetch: F, scheme: S) -> Result<Self, AssetError> {
        fs::create_dir_all(assets_dir)?;
        Ok(Self {
            assets_dir: assets_dir.to_path_buf(),
            fetch,
            scheme,
        })
    }

    /// The flat directory holding downloaded files.
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Resolves assets for every language, downloading only media of
    /// changed or new entities and substituting cached copies for the
    /// rest, then garbage-collects files no language references.
    pub async fn resolve_multi(
        &self,
        mut fresh: MultiLanguageSnapshot,
        cached: Option<&MultiLanguageSnapshot>,
    ) -> MultiLanguageSnapshot {
        for (lang, snapshot) in fresh.iter_mut() {
            let cached_snapshot = cached.and_then(|multi| multi.get(lang));
            self.resolve_language(lang, snapshot, cached_snapshot).await;
        }

        self.cleanup_orphans(&fresh);
        fresh
    }

    /// Per-language pass: detect, download deltas, merge with cache.
    async fn resolve_language(
        &self,
        lang: &str,
        fresh: &mut ContentSnapshot,
        cached: Option<&ContentSnapshot>,
    ) {
        let changes = detect_changes(fresh, cached);

        // No changes and a resolved snapshot on hand: reuse it whole.
        if !changes.has_changes {
            if let Some(cached) = cached {
                debug!(lang, "no changes, substituting cached snapshot");
                *fresh = cached.clone();
                return;
            }
        }

        info!(
            lang,
            new_circuits = changes.circuits.new.len(),
            changed_circuits = changes.circuits.changed.len(),
            new_events = changes.events.new.len(),
            changed_events = changes.events.changed.len(),
            removed = changes.circuits.removed.len() + changes.events.removed.len(),
            "resolving assets for changed entities"
        );

        let cached_circuits: HashMap<i64, _> = cached
            .map(|c| c.circuits.iter().map(|circuit| (circuit.id, circuit)).collect())
            .unwrap_or_default();
        let cached_events: HashMap<i64, _> = cached
            .map(|c| c.events.iter().map(|event| (event.id, event)).collect())
            .unwrap_or_default();

        for circuit in fresh.circuits.iter_mut() {
            if changes.circuits.is_dirty(circuit.id) {
                if let Some(image) = &mut circuit.image {
                    self.resolve_media(image).await;
                }
                for step in circuit.steps.iter_mut() {
                    for image in step.images.iter_mut() {
                        self.resolve_media(image).await;
                    }
                }
            } else if let Some(cached_circuit) = cached_circuits.get(&circuit.id) {
                *circuit = (*cached_circuit).clone();
            }
        }

        for event in fresh.events.iter_mut() {
            if changes.events.is_dirty(event.id) {
                if let Some(image) = &mut event.image {
                    self.resolve_media(image).await;
                }
                for image in event.images.iter_mut() {
                    self.resolve_media(image).await;
                }
            } else if let Some(cached_event) = cached_events.get(&event.id) {
                *event = (*cached_event).clone();
            }
        }
    }

    /// Resolves every URL of one media reference in place.
    async fn resolve_media(&self, media: &mut MediaReference) {
        let mut urls = Vec::new();
        media.visit_urls(|url| urls.push(url.to_string()));

        let mut resolved = HashMap::with_capacity(urls.len());
        for url in urls {
            let local = self.resolve_asset(&url).await;
            resolved.insert(url, local);
        }

        media.rewrite_urls(|url| {
            resolved
                .get(url)
                .cloned()
                .unwrap_or_else(|| url.to_string())
        });
    }

    /// Maps one URL to a local URL, downloading at most once.
    ///
    /// Already-local URLs pass through untouched, which makes re-entry
    /// from cached substitution paths idempotent. On any network or
    /// filesystem error the original remote URL is returned so the UI
    /// can still render it online.
    pub async fn resolve_asset(&self, url: &str) -> String {
        if url.is_empty() || self.scheme.is_local(url) {
            return url.to_string();
        }

        let file_name = asset_file_name(url);
        let local_path = self.assets_dir.join(&file_name);

        if local_path.exists() {
            debug!(file_name, "asset cache hit");
        } else {
            debug!(file_name, url, "downloading asset");
            let bytes = match self.fetch.fetch_bytes(url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(url, error = %e, "asset download failed, keeping remote URL");
                    return url.to_string();
                }
            };
            if let Err(e) = fs::write(&local_path, &bytes) {
                warn!(url, error = %e, "asset write failed, keeping remote URL");
                return url.to_string();
            }
        }

        self.scheme.to_local_url(&local_path)
    }

    /// Deletes every file in the asset directory not referenced by any
    /// language's snapshot. URLs still on their remote scheme are
    /// treated as not-yet-downloaded and contribute nothing.
    pub fn cleanup_orphans(&self, multi: &MultiLanguageSnapshot) {
        let referenced = self.referenced_file_names(multi);

        let entries = match fs::read_dir(&self.assets_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "cannot list asset directory, skipping cleanup");
                return;
            }
        };

        let mut deleted = 0usize;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if referenced.contains(name) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => deleted += 1,
                Err(e) => warn!(file = name, error = %e, "failed to delete orphaned asset"),
            }
        }

        if deleted > 0 {
            info!(deleted, "orphaned assets removed");
        }
    }

    /// Collects local file names referenced across all languages.
    fn referenced_file_names(&self, multi: &MultiLanguageSnapshot) -> HashSet<String> {
        let mut names = HashSet::new();
        let mut collect = |media: &MediaReference| {
            media.visit_urls(|url| {
                if let Some(name) = self.scheme.file_name(url) {
                    names.insert(name.to_string());
                }
            });
        };

        for snapshot in multi.values() {
            for circuit in &snapshot.circuits {
                if let Some(image) = &circuit.image {
                    collect(image);
                }
                for step in &circuit.steps {
                    for image in &step.images {
                        collect(image);
                    }
                }
            }
            for event in &snapshot.events {
                if let Some(image) = &event.image {
                    collect(image);
                }
                for image in &event.images {
                    collect(image);
                }
            }
        }

        names
    }
}

/// Errors that can occur while opening the asset store
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
