// SPDX-FileCopyrightText: 2026 Kiosync Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content data model
//!
//! These types mirror the payload served by the kiosk CMS endpoint.
//! Entity identity is the numeric `id`; slugs change across languages
//! and edits and must never be used to correlate entities between
//! snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All content for one language at one sync point.
///
/// A snapshot is created at fetch time, compared against its
/// predecessor, mutated only to rewrite media URLs to local ones,
/// then persisted. It is superseded (never edited) by the next cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    /// Home page singleton
    pub home: HomeData,
    /// Events list
    #[serde(default)]
    pub events: Vec<EventEntity>,
    /// Circuits list
    #[serde(default)]
    pub circuits: Vec<CircuitEntity>,
}

/// The persisted unit: language code → snapshot.
///
/// All languages share one physical asset cache, so orphan collection
/// always runs against the whole map.
pub type MultiLanguageSnapshot = BTreeMap<String, ContentSnapshot>;

/// Home page data with its version marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeData {
    pub id: i64,
    pub slug: String,
    /// Version marker; a differing value means the home page changed.
    #[serde(rename = "lastUpdate")]
    pub last_update: i64,
    pub title: String,
    #[serde(default)]
    pub inspirational_text: String,
}

/// Creation/update/publication timestamps shared by all entities.
///
/// `updated` is the per-entity version used by change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDates {
    pub created: i64,
    pub updated: i64,
    pub posted: i64,
}

/// An event entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEntity {
    pub id: i64,
    #[serde(default)]
    pub url: Option<String>,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub entry_type: String,
    pub dates: EntryDates,
    /// Main illustration, when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaReference>,
    /// Additional gallery images
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<MediaReference>,
}

/// A circuit entry with its ordered steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircuitEntity {
    pub id: i64,
    #[serde(default)]
    pub url: Option<String>,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub entry_type: String,
    pub dates: EntryDates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaReference>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepEntity>,
}

/// One step of a circuit. Steps have no identity of their own; they
/// live and die with their circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEntity {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub main_text: String,
    #[serde(default)]
    pub essentials: Option<String>,
    #[serde(default)]
    pub estimated_time: String,
    #[serde(default)]
    pub activity_type: Vec<String>,
    #[serde(default)]
    pub seasons: Vec<String>,
    #[serde(default)]
    pub map: GeoCoordinates,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<MediaReference>,
    #[serde(default)]
    pub next_step: NextStepInfo,
}

/// Step location on the map.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoordinates {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// How to reach the next step.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NextStepInfo {
    #[serde(default)]
    pub transportation: Vec<String>,
    #[serde(default)]
    pub time: i64,
}

/// A logical image with every deliverable rendition.
///
/// Each URL in the set resolves independently to a local file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MediaMeta>,
    #[serde(default)]
    pub images: ImageSet,
}

/// Display metadata attached to a media reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// URL variants of one image.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<OriginalImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized: Option<OptimizedImages>,
}

/// The unprocessed upload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OriginalImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub sizes: ImageSizes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_point: Option<FocalPoint>,
}

/// Pixel dimensions of the original upload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageSizes {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Focal point as fractions of width/height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FocalPoint {
    pub x: f64,
    pub y: f64,
}

/// Size-keyed rendition maps ("480", "960", ... → URL).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptimizedImages {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub standard: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub webp: BTreeMap<String, String>,
}

impl MediaReference {
    /// Visits every URL in the reference, replacing each with the
    /// closure's return value. Used to rewrite remote URLs to local
    /// ones after download.
    pub fn rewrite_urls<F>(&mut self, mut rewrite: F)
    where
        F: FnMut(&str) -> String,
    {
        if let Some(original) = &mut self.images.original {
            if let Some(url) = &original.url {
                original.url = Some(rewrite(url));
            }
        }
        if let Some(optimized) = &mut self.images.optimized {
            for url in optimized.standard.values_mut() {
                *url = rewrite(url);
            }
            for url in optimized.webp.values_mut() {
                *url = rewrite(url);
            }
        }
    }

    /// Visits every URL in the reference read-only.
    pub fn visit_urls<F>(&self, mut visit: F)
    where
        F: FnMut(&str),
    {
        if let Some(original) = &self.images.original {
            if let Some(url) = &original.url {
                visit(url);
            }
        }
        if let Some(optimized) = &self.images.optimized {
            for url in optimized.standard.values() {
                visit(url);
            }
            for url in optimized.webp.values() {
                visit(url);
            }
        }
    }
}
