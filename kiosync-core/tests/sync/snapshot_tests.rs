// SPDX-FileCopyrightText: 2026 Kiosync Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the local snapshot store

use std::fs;

use tempfile::TempDir;

use kiosync_core::types::MultiLanguageSnapshot;
use kiosync_core::SnapshotStore;

use crate::common::{circuit, event, media, snapshot};

fn two_language_snapshot() -> MultiLanguageSnapshot {
    let mut fr = snapshot(100);
    let mut c = circuit(1, 50);
    c.image = Some(media("https://cdn.example/fr/lighthouse.jpg"));
    fr.circuits.push(c);
    fr.events.push(event(2, 60));

    let mut en = snapshot(100);
    en.circuits.push(circuit(1, 50));

    let mut multi = MultiLanguageSnapshot::new();
    multi.insert("fr".to_string(), fr);
    multi.insert("en".to_string(), en);
    multi
}

#[test]
fn write_then_read_roundtrips() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path()).unwrap();

    let multi = two_language_snapshot();
    store.write(&multi).unwrap();

    let loaded = store.read().unwrap();
    assert_eq!(loaded, multi);
    assert!(store.exists());
}

#[test]
fn write_fully_replaces_previous_snapshot() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path()).unwrap();

    store.write(&two_language_snapshot()).unwrap();

    // Second write drops a language entirely; no merging at this layer.
    let mut smaller = MultiLanguageSnapshot::new();
    smaller.insert("fr".to_string(), snapshot(200));
    store.write(&smaller).unwrap();

    let loaded = store.read().unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(!loaded.contains_key("en"));
    assert_eq!(loaded["fr"].home.last_update, 200);
}

#[test]
fn clear_removes_snapshot_but_keeps_assets() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path()).unwrap();
    store.write(&two_language_snapshot()).unwrap();

    fs::create_dir_all(store.assets_dir()).unwrap();
    fs::write(store.assets_dir().join("cafe.jpg"), b"img").unwrap();

    store.clear().unwrap();
    assert!(!store.exists());
    assert!(store.read().is_none());
    assert!(store.assets_dir().join("cafe.jpg").exists());
}

#[test]
fn clear_all_removes_assets_too() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path()).unwrap();
    store.write(&two_language_snapshot()).unwrap();

    fs::create_dir_all(store.assets_dir()).unwrap();
    fs::write(store.assets_dir().join("cafe.jpg"), b"img").unwrap();

    store.clear_all().unwrap();
    assert!(!store.exists());
    assert!(!store.assets_dir().exists());
}

#[test]
fn clear_on_empty_store_is_ok() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path()).unwrap();
    store.clear().unwrap();
    store.clear_all().unwrap();
}

#[test]
fn corrupt_file_degrades_to_none() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path()).unwrap();
    fs::write(temp.path().join("snapshot.json"), b"][ nonsense").unwrap();
    assert!(store.read().is_none());
}
