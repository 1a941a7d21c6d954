// SPDX-FileCopyrightText: 2026 Kiosync Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync orchestrator
//!
//! Drives the end-to-end cycle: load snapshot, fetch fresh content for
//! every configured language, resolve assets for the deltas, merge
//! with cached entities, garbage-collect, persist, publish. The same
//! entry point serves the periodic timer and manual refresh; an
//! in-flight guard keeps concurrent cycles off the shared snapshot.

use std::sync::{Arc, RwLock};

use futures_util::future::join_all;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::assets::{AssetError, AssetStore, HttpFetch, LocalUrlScheme, RemoteFetch};
use crate::changes::detect_changes;
use crate::config::SyncConfig;
use crate::events::{EventDispatcher, SyncEvent};
use crate::fetcher::{ContentSource, DefaultContentSource, FetchError};
use crate::mock::mock_multi;
use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::types::{ContentSnapshot, MultiLanguageSnapshot};

/// Where the engine currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    LoadingCache,
    Fetching,
    ResolvingAssets,
    Persisting,
    Ready,
    /// A step after cache load failed; published data stands.
    ErrorRecovered,
}

impl SyncPhase {
    /// True once the engine has something published for the UI.
    pub fn is_ready(&self) -> bool {
        matches!(self, SyncPhase::Ready | SyncPhase::ErrorRecovered)
    }
}

/// Result of one sync cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The cycle ran to completion.
    Completed {
        /// Languages whose content changed.
        changed_languages: Vec<String>,
    },
    /// Another cycle was already in flight.
    Skipped,
    /// Every language's fetch failed; published state was kept.
    Recovered {
        /// Error description.
        error: String,
    },
}

/// Orchestrates the sync cycle over explicit service objects.
pub struct SyncOrchestrator<S, F, L = crate::assets::AssetProtocol> {
    config: SyncConfig,
    source: S,
    assets: AssetStore<F, L>,
    snapshots: SnapshotStore,
    events: Arc<EventDispatcher>,
    published: RwLock<MultiLanguageSnapshot>,
    phase: RwLock<SyncPhase>,
    // Serializes cycles; a second caller skips instead of queueing.
    cycle_guard: tokio::sync::Mutex<()>,
}

impl SyncOrchestrator<DefaultContentSource, HttpFetch> {
    /// Production wiring: content source and asset fetcher built from
    /// the same config. `use_mock_data` swaps the CMS for built-in
    /// content.
    pub fn from_config(config: SyncConfig) -> Result<Self, SyncError> {
        let source = DefaultContentSource::new(&config)?;
        let snapshots = SnapshotStore::new(&config.cache_dir)?;
        let assets = AssetStore::new(&snapshots.assets_dir(), HttpFetch::new(&config)?)?;
        Ok(Self::new(config, source, assets, snapshots))
    }
}

impl<S, F, L> SyncOrchestrator<S, F, L>
where
    S: ContentSource,
    F: RemoteFetch,
    L: LocalUrlScheme,
{
    /// Assembles an orchestrator from explicit services.
    pub fn new(
        config: SyncConfig,
        source: S,
        assets: AssetStore<F, L>,
        snapshots: SnapshotStore,
    ) -> Self {
        Self {
            config,
            source,
            assets,
            snapshots,
            events: Arc::new(EventDispatcher::new()),
            published: RwLock::new(MultiLanguageSnapshot::new()),
            phase: RwLock::new(SyncPhase::Idle),
            cycle_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Startup: publish the persisted snapshot (or mock content) for a
    /// fast first paint, then run one sync cycle.
    pub async fn start(&self) -> SyncOutcome {
        self.set_phase(SyncPhase::LoadingCache);

        let cached = if self.config.enable_cache {
            self.snapshots.read()
        } else {
            None
        };

        match cached {
            Some(snapshot) => {
                let languages = snapshot.keys().cloned().collect();
                self.publish_all(snapshot);
                self.events.dispatch(SyncEvent::CacheLoaded {
                    languages,
                    from_cache: true,
                });
            }
            None => {
                let mock = mock_multi(&self.config.languages);
                // Seed the cache so the next launch paints from disk.
                if self.config.enable_cache {
                    if let Err(e) = self.snapshots.write(&mock) {
                        warn!(error = %e, "failed to seed cache with mock content");
                    }
                }
                self.events.dispatch(SyncEvent::CacheLoaded {
                    languages: self.config.languages.clone(),
                    from_cache: false,
                });
                self.publish_all(mock);
            }
        }

        self.set_phase(SyncPhase::Ready);
        self.sync_now().await
    }

    /// Runs one sync cycle. Entry point for both the periodic timer
    /// and manual refresh; concurrent callers are skipped, never
    /// interleaved on the shared snapshot.
    pub async fn sync_now(&self) -> SyncOutcome {
        let Ok(_guard) = self.cycle_guard.try_lock() else {
            info!("sync cycle already running, skipping");
            self.events.dispatch(SyncEvent::SyncSkipped);
            return SyncOutcome::Skipped;
        };

        self.events.dispatch(SyncEvent::SyncStarted);
        self.set_phase(SyncPhase::Fetching);

        let cached = if self.config.enable_cache {
            self.snapshots.read()
        } else {
            None
        };

        // Fan-out: one independent fetch per language. A failed
        // language falls back to its cached copy below instead of
        // aborting the cycle.
        let fetches = self.config.languages.iter().map(|lang| {
            let lang = lang.clone();
            async move {
                let result = self.source.fetch_content(&lang).await;
                (lang, result)
            }
        });

        let mut fresh = MultiLanguageSnapshot::new();
        let mut failures: Vec<(String, String)> = Vec::new();
        for (lang, result) in join_all(fetches).await {
            match result {
                Ok(snapshot) => {
                    fresh.insert(lang, snapshot);
                }
                Err(e) => {
                    warn!(lang, error = %e, "language fetch failed");
                    failures.push((lang, e.to_string()));
                }
            }
        }

        if fresh.is_empty() {
            let error = failures
                .iter()
                .map(|(lang, e)| format!("{lang}: {e}"))
                .collect::<Vec<_>>()
                .join("; ");
            warn!(error, "every language fetch failed, keeping published state");
            self.set_phase(SyncPhase::ErrorRecovered);
            self.events.dispatch(SyncEvent::SyncRecovered {
                error: error.clone(),
            });
            return SyncOutcome::Recovered { error };
        }

        // Failed languages keep their last good snapshot so nothing is
        // silently dropped and their assets survive garbage collection.
        for (lang, _) in &failures {
            let fallback = cached
                .as_ref()
                .and_then(|multi| multi.get(lang))
                .cloned()
                .or_else(|| self.language(lang));
            if let Some(snapshot) = fallback {
                fresh.insert(lang.clone(), snapshot);
            }
        }

        let mut changed_languages: Vec<String> = Vec::new();
        for (lang, snapshot) in &fresh {
            let cached_snapshot = cached.as_ref().and_then(|multi| multi.get(lang));
            if detect_changes(snapshot, cached_snapshot).has_changes {
                changed_languages.push(lang.clone());
            }
        }

        self.set_phase(SyncPhase::ResolvingAssets);
        let resolved = if self.config.enable_cache {
            self.assets.resolve_multi(fresh, cached.as_ref()).await
        } else {
            fresh
        };

        // Publish one language at a time; each is fully resolved.
        for (lang, snapshot) in &resolved {
            self.publish_language(lang, snapshot.clone());
            self.events.dispatch(SyncEvent::LanguagePublished {
                lang: lang.clone(),
                changed: changed_languages.contains(lang),
            });
        }

        self.set_phase(SyncPhase::Persisting);
        if self.config.enable_cache {
            if let Err(e) = self.snapshots.write(&resolved) {
                // Logged only: the in-memory state is already good.
                warn!(error = %e, "failed to persist snapshot");
            }
        }

        self.set_phase(SyncPhase::Ready);
        info!(changed = changed_languages.len(), "sync cycle completed");
        self.events.dispatch(SyncEvent::SyncCompleted {
            changed_languages: changed_languages.clone(),
        });
        SyncOutcome::Completed { changed_languages }
    }

    /// Re-fetches on the configured interval, forever. Ticks that
    /// land while a cycle is still running are skipped by the guard.
    pub async fn run_periodic(&self) {
        let mut interval = tokio::time::interval(self.config.refresh_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick fires immediately; start() already synced.
        interval.tick().await;
        loop {
            interval.tick().await;
            self.sync_now().await;
        }
    }

    /// Current published snapshot for one language.
    pub fn language(&self, lang: &str) -> Option<ContentSnapshot> {
        self.published
            .read()
            .ok()
            .and_then(|published| published.get(lang).cloned())
    }

    /// Copy of everything currently published.
    pub fn published(&self) -> MultiLanguageSnapshot {
        self.published
            .read()
            .map(|published| published.clone())
            .unwrap_or_default()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SyncPhase {
        self.phase.read().map(|phase| *phase).unwrap_or(SyncPhase::Idle)
    }

    /// Dispatcher for subscribing to sync events.
    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// The snapshot store backing this orchestrator.
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// The configuration in use.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn publish_all(&self, snapshot: MultiLanguageSnapshot) {
        if let Ok(mut published) = self.published.write() {
            *published = snapshot;
        }
    }

    fn publish_language(&self, lang: &str, snapshot: ContentSnapshot) {
        if let Ok(mut published) = self.published.write() {
            published.insert(lang.to_string(), snapshot);
        }
    }

    fn set_phase(&self, phase: SyncPhase) {
        if let Ok(mut current) = self.phase.write() {
            *current = phase;
        }
    }
}

/// Errors that can occur while wiring the engine
#[derive(Debug, Error)]
pub enum SyncError {
    /// Content fetcher construction failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Snapshot store could not be opened
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Asset store could not be opened
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),
}
