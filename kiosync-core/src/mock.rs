//! Built-in mock content
//!
//! Serves as the last fallback when neither the network nor the local
//! snapshot can provide data, and as the whole data source in
//! mock mode (dev without an API). Compiled into the binary.

use std::collections::BTreeMap;

use crate::types::{
    CircuitEntity, ContentSnapshot, EntryDates, EventEntity, GeoCoordinates, HomeData, ImageSet,
    MediaMeta, MediaReference, NextStepInfo, OriginalImage, StepEntity,
};

/// Mock snapshot for one language.
///
/// Titles are kept language-tagged so a kiosk in mock mode is visibly
/// running on placeholder data.
pub fn mock_snapshot(lang: &str) -> ContentSnapshot {
    ContentSnapshot {
        home: HomeData {
            id: 1,
            slug: "home".to_string(),
            last_update: 0,
            title: format!("Welcome [{lang}]"),
            inspirational_text: "Explore the coast, one circuit at a time.".to_string(),
        },
        events: vec![mock_event(lang)],
        circuits: vec![mock_circuit(lang)],
    }
}

/// Mock snapshots for every configured language.
pub fn mock_multi(languages: &[String]) -> BTreeMap<String, ContentSnapshot> {
    languages
        .iter()
        .map(|lang| (lang.clone(), mock_snapshot(lang)))
        .collect()
}

fn mock_event(lang: &str) -> EventEntity {
    EventEntity {
        id: 9001,
        url: None,
        title: format!("Harbour festival [{lang}]"),
        slug: "harbour-festival".to_string(),
        entry_type: "event".to_string(),
        dates: EntryDates {
            created: 0,
            updated: 0,
            posted: 0,
        },
        image: Some(placeholder_media("Harbour festival")),
        images: Vec::new(),
    }
}

fn mock_circuit(lang: &str) -> CircuitEntity {
    CircuitEntity {
        id: 9101,
        url: None,
        title: format!("Lighthouse walk [{lang}]"),
        slug: "lighthouse-walk".to_string(),
        entry_type: "circuit".to_string(),
        dates: EntryDates {
            created: 0,
            updated: 0,
            posted: 0,
        },
        image: Some(placeholder_media("Lighthouse walk")),
        description: Some("A short walk along the waterfront.".to_string()),
        steps: vec![StepEntity {
            title: "The old lighthouse".to_string(),
            description: None,
            main_text: "Built in 1830, still lit every night.".to_string(),
            essentials: None,
            estimated_time: "20 min".to_string(),
            activity_type: vec!["walk".to_string()],
            seasons: vec!["summer".to_string()],
            map: GeoCoordinates {
                latitude: Some(48.143),
                longitude: Some(-69.716),
            },
            images: Vec::new(),
            next_step: NextStepInfo::default(),
        }],
    }
}

fn placeholder_media(title: &str) -> MediaReference {
    MediaReference {
        meta: Some(MediaMeta {
            title: Some(title.to_string()),
        }),
        images: ImageSet {
            // No URLs: nothing to download in mock mode.
            original: Some(OriginalImage::default()),
            optimized: None,
        },
    }
}
