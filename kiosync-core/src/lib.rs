// SPDX-FileCopyrightText: 2026 Kiosync Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Kiosync Core Library
//!
//! Offline-first content and asset synchronization engine for tourism
//! kiosks and tablets. Fetches multi-language circuit/event payloads
//! from a CMS, detects fine-grained changes against the last persisted
//! snapshot, downloads only the media of changed entities, rewrites
//! media references to local URLs and garbage-collects files no
//! language references anymore. Every failure degrades to the last
//! good state; nothing in this crate is fatal to the host application.

pub mod assets;
pub mod changes;
pub mod config;
pub mod events;
pub mod fetcher;
pub mod mock;
pub mod orchestrator;
pub mod snapshot;
pub mod types;

pub use assets::{
    asset_file_name, AssetError, AssetProtocol, AssetStore, HttpFetch, LocalUrlScheme, RemoteFetch,
};
pub use changes::{detect_changes, ChangeReport, ChangeSet};
pub use config::{BasicAuth, SyncConfig};
pub use events::{CallbackHandler, EventDispatcher, EventHandler, SyncEvent};
pub use fetcher::{
    ContentSource, DefaultContentSource, FetchError, HttpContentSource, MockContentSource,
};
pub use mock::{mock_multi, mock_snapshot};
pub use orchestrator::{SyncError, SyncOrchestrator, SyncOutcome, SyncPhase};
pub use snapshot::{SnapshotError, SnapshotStore};
pub use types::{
    CircuitEntity, ContentSnapshot, EntryDates, EventEntity, GeoCoordinates, HomeData, ImageSet,
    MediaMeta, MediaReference, MultiLanguageSnapshot, NextStepInfo, OptimizedImages, OriginalImage,
    StepEntity,
};
