// SPDX-FileCopyrightText: 2026 Kiosync Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Change detection between a fresh snapshot and the cached one
//!
//! Classifies every top-level entity as new, changed, unchanged or
//! removed, using `id` as identity and `dates.updated` as the version.
//! Pure comparison, no I/O; callers decide what to download or reuse.

use std::collections::HashMap;

use tracing::warn;

use crate::types::{ContentSnapshot, EntryDates};

/// Per-collection classification result. All fields hold entity ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReport {
    /// Present in fresh, absent from cache
    pub new: Vec<i64>,
    /// Present in both, `dates.updated` differs
    pub changed: Vec<i64>,
    /// Present in both, same version
    pub unchanged: Vec<i64>,
    /// Present in cache, absent from fresh
    pub removed: Vec<i64>,
}

impl ChangeReport {
    /// True if the entity needs its assets (re)resolved.
    pub fn is_dirty(&self, id: i64) -> bool {
        self.new.contains(&id) || self.changed.contains(&id)
    }

    fn has_changes(&self) -> bool {
        !self.new.is_empty() || !self.changed.is_empty() || !self.removed.is_empty()
    }
}

/// Result of comparing two snapshots of the same language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Home version marker differs
    pub home_changed: bool,
    /// Circuit classification
    pub circuits: ChangeReport,
    /// Event classification
    pub events: ChangeReport,
    /// Anything at all differs between the snapshots
    pub has_changes: bool,
}

/// Compares a freshly fetched snapshot against the cached one.
///
/// With no cached snapshot every entity is new and `has_changes` is
/// unconditionally true. Unchanged entities are expected to be
/// substituted by the caller with their cached copy, which already
/// carries resolved local media URLs.
pub fn detect_changes(fresh: &ContentSnapshot, cached: Option<&ContentSnapshot>) -> ChangeSet {
    let Some(cached) = cached else {
        return ChangeSet {
            home_changed: true,
            circuits: ChangeReport {
                new: dedup_ids("circuits", fresh.circuits.iter().map(|c| c.id)),
                ..Default::default()
            },
            events: ChangeReport {
                new: dedup_ids("events", fresh.events.iter().map(|e| e.id)),
                ..Default::default()
            },
            has_changes: true,
        };
    };

    let home_changed = fresh.home.last_update != cached.home.last_update;

    let circuits = classify(
        "circuits",
        fresh.circuits.iter().map(|c| (c.id, &c.dates)),
        cached.circuits.iter().map(|c| (c.id, &c.dates)),
    );
    let events = classify(
        "events",
        fresh.events.iter().map(|e| (e.id, &e.dates)),
        cached.events.iter().map(|e| (e.id, &e.dates)),
    );

    let has_changes = home_changed || circuits.has_changes() || events.has_changes();

    ChangeSet {
        home_changed,
        circuits,
        events,
        has_changes,
    }
}

/// Classifies one collection by id and version timestamp.
fn classify<'a>(
    collection: &str,
    fresh: impl Iterator<Item = (i64, &'a EntryDates)>,
    cached: impl Iterator<Item = (i64, &'a EntryDates)>,
) -> ChangeReport {
    let cached_versions = index_versions(collection, cached);
    let fresh_versions = index_versions(collection, fresh);

    let mut report = ChangeReport::default();

    for (id, updated) in &fresh_versions {
        match cached_versions.iter().find(|(cid, _)| cid == id) {
            None => report.new.push(*id),
            Some((_, cached_updated)) if cached_updated != updated => report.changed.push(*id),
            Some(_) => report.unchanged.push(*id),
        }
    }

    report.removed = cached_versions
        .iter()
        .filter(|(id, _)| !fresh_versions.iter().any(|(fid, _)| fid == id))
        .map(|(id, _)| *id)
        .collect();
    report.removed.sort_unstable();

    report
}

/// Indexes `(id, updated)` pairs preserving payload order. A duplicate
/// id is a data contract violation: logged, last occurrence wins.
fn index_versions<'a>(
    collection: &str,
    entries: impl Iterator<Item = (i64, &'a EntryDates)>,
) -> Vec<(i64, i64)> {
    let mut order: Vec<i64> = Vec::new();
    let mut versions: HashMap<i64, i64> = HashMap::new();
    for (id, dates) in entries {
        if versions.insert(id, dates.updated).is_some() {
            warn!(collection, id, "duplicate entity id, keeping last occurrence");
        } else {
            order.push(id);
        }
    }
    order
        .into_iter()
        .map(|id| (id, versions[&id]))
        .collect()
}

fn dedup_ids(collection: &str, ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut unique = Vec::new();
    for id in ids {
        if unique.contains(&id) {
            warn!(collection, id, "duplicate entity id, keeping last occurrence");
        } else {
            unique.push(id);
        }
    }
    unique
}

impl ChangeSet {
    /// Ids of circuits whose assets must be (re)resolved.
    pub fn dirty_circuit_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.circuits.new.iter().chain(&self.circuits.changed).copied()
    }

    /// Ids of events whose assets must be (re)resolved.
    pub fn dirty_event_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.events.new.iter().chain(&self.events.changed).copied()
    }
}
