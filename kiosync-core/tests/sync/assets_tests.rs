// SPDX-FileCopyrightText: 2026 Kiosync Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the asset store
//!
//! Covers idempotent resolution, delta-only downloads, cached entity
//! substitution and orphan garbage collection across languages.

use std::fs;

use tempfile::TempDir;

use kiosync_core::types::MultiLanguageSnapshot;
use kiosync_core::{asset_file_name, AssetStore};

use crate::common::{
    circuit, event, media, media_with_variants, snapshot, step_with_images, FailingFetch, FakeFetch,
};

#[tokio::test]
async fn resolve_asset_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let fetch = FakeFetch::default();
    let store = AssetStore::new(temp.path(), fetch.clone()).unwrap();

    let url = "https://cdn.example/media/photo.jpg";
    let first = store.resolve_asset(url).await;
    let second = store.resolve_asset(url).await;

    assert_eq!(first, second);
    assert!(first.starts_with("asset://"));
    assert_eq!(fetch.download_count(), 1);
}

#[tokio::test]
async fn local_urls_pass_through_untouched() {
    let temp = TempDir::new().unwrap();
    let fetch = FakeFetch::default();
    let store = AssetStore::new(temp.path(), fetch.clone()).unwrap();

    let local = "asset://localhost/cache/assets/deadbeef.jpg";
    assert_eq!(store.resolve_asset(local).await, local);
    assert_eq!(fetch.download_count(), 0);
}

#[tokio::test]
async fn existing_file_is_reused_not_redownloaded() {
    let temp = TempDir::new().unwrap();
    let fetch = FakeFetch::default();
    let store = AssetStore::new(temp.path(), fetch.clone()).unwrap();

    // A file from a prior unrelated run, already under the
    // deterministic name.
    let url = "https://cdn.example/media/reused.jpg";
    fs::write(temp.path().join(asset_file_name(url)), b"old bytes").unwrap();

    let resolved = store.resolve_asset(url).await;
    assert!(resolved.starts_with("asset://"));
    assert_eq!(fetch.download_count(), 0);
}

#[tokio::test]
async fn failed_download_falls_back_to_remote_url() {
    let temp = TempDir::new().unwrap();
    let store = AssetStore::new(temp.path(), FailingFetch).unwrap();

    let url = "https://cdn.example/media/unreachable.jpg";
    assert_eq!(store.resolve_asset(url).await, url);
    // Nothing half-written on disk.
    assert!(!temp.path().join(asset_file_name(url)).exists());
}

#[tokio::test]
async fn resolve_media_covers_all_variants() {
    let temp = TempDir::new().unwrap();
    let fetch = FakeFetch::default();
    let store = AssetStore::new(temp.path(), fetch.clone()).unwrap();

    let mut fresh = snapshot(100);
    let mut c = circuit(1, 100);
    c.image = Some(media_with_variants("https://cdn.example/media/hero"));
    fresh.circuits.push(c);

    let mut multi = MultiLanguageSnapshot::new();
    multi.insert("fr".to_string(), fresh);

    let resolved = store.resolve_multi(multi, None).await;

    // original + standard + webp
    assert_eq!(fetch.download_count(), 3);
    let image = resolved["fr"].circuits[0].image.as_ref().unwrap();
    let mut local = 0;
    image.visit_urls(|url| {
        assert!(url.starts_with("asset://"), "unresolved url: {url}");
        local += 1;
    });
    assert_eq!(local, 3);
}

#[tokio::test]
async fn unchanged_entity_is_substituted_from_cache_without_downloads() {
    let temp = TempDir::new().unwrap();
    let fetch = FakeFetch::default();
    let store = AssetStore::new(temp.path(), fetch.clone()).unwrap();

    // Cached circuit 1 already carries a resolved local URL.
    let mut cached_fr = snapshot(100);
    let mut cached_circuit = circuit(1, 100);
    cached_circuit.image = Some(media("asset://localhost/assets/already-local.jpg"));
    cached_fr.circuits.push(cached_circuit);
    let mut cached = MultiLanguageSnapshot::new();
    cached.insert("fr".to_string(), cached_fr);

    // Fresh payload: circuit 1 unchanged (remote URL as served by the
    // CMS) plus a brand new circuit 2.
    let mut fresh_fr = snapshot(100);
    let mut c1 = circuit(1, 100);
    c1.image = Some(media("https://cdn.example/media/one.jpg"));
    fresh_fr.circuits.push(c1);
    let mut c2 = circuit(2, 200);
    c2.image = Some(media("https://cdn.example/media/two.jpg"));
    fresh_fr.circuits.push(c2);
    let mut fresh = MultiLanguageSnapshot::new();
    fresh.insert("fr".to_string(), fresh_fr);

    let resolved = store.resolve_multi(fresh, Some(&cached)).await;

    // Circuit 1 is the cached copy, untouched; only circuit 2's media
    // was downloaded.
    let c1 = &resolved["fr"].circuits[0];
    assert_eq!(
        c1.image.as_ref().unwrap().images.original.as_ref().unwrap().url.as_deref(),
        Some("asset://localhost/assets/already-local.jpg")
    );
    assert_eq!(fetch.downloads_of("https://cdn.example/media/one.jpg"), 0);
    assert_eq!(fetch.downloads_of("https://cdn.example/media/two.jpg"), 1);
}

#[tokio::test]
async fn no_changes_substitutes_whole_cached_snapshot() {
    let temp = TempDir::new().unwrap();
    let fetch = FakeFetch::default();
    let store = AssetStore::new(temp.path(), fetch.clone()).unwrap();

    let mut cached_fr = snapshot(100);
    let mut cached_circuit = circuit(1, 100);
    cached_circuit.image = Some(media("asset://localhost/assets/resolved.jpg"));
    cached_fr.circuits.push(cached_circuit);
    cached_fr.events.push(event(5, 50));
    let mut cached = MultiLanguageSnapshot::new();
    cached.insert("fr".to_string(), cached_fr.clone());

    // Fresh is version-identical but still carries remote URLs.
    let mut fresh_fr = snapshot(100);
    let mut c = circuit(1, 100);
    c.image = Some(media("https://cdn.example/media/resolved-remote.jpg"));
    fresh_fr.circuits.push(c);
    fresh_fr.events.push(event(5, 50));
    let mut fresh = MultiLanguageSnapshot::new();
    fresh.insert("fr".to_string(), fresh_fr);

    let resolved = store.resolve_multi(fresh, Some(&cached)).await;

    assert_eq!(resolved["fr"], cached_fr);
    assert_eq!(fetch.download_count(), 0);
}

#[tokio::test]
async fn cleanup_deletes_orphans_and_keeps_referenced_files() {
    let temp = TempDir::new().unwrap();
    let fetch = FakeFetch::default();
    let store = AssetStore::new(temp.path(), fetch.clone()).unwrap();

    let url = "https://cdn.example/media/keep-me.jpg";
    let mut fr = snapshot(100);
    let mut c = circuit(1, 100);
    c.steps.push(step_with_images(vec![media(url)]));
    fr.circuits.push(c);
    let mut fresh = MultiLanguageSnapshot::new();
    fresh.insert("fr".to_string(), fr);

    // Stray file from an earlier snapshot, referenced by nobody.
    fs::write(temp.path().join("0123456789abcdef.jpg"), b"orphan").unwrap();

    let resolved = store.resolve_multi(fresh, None).await;

    // GC safety: every referenced file exists on disk.
    let image = &resolved["fr"].circuits[0].steps[0].images[0];
    image.visit_urls(|u| {
        let name = u.rsplit('/').next().unwrap();
        assert!(temp.path().join(name).exists(), "referenced file missing: {name}");
    });

    // The orphan is gone.
    assert!(!temp.path().join("0123456789abcdef.jpg").exists());
}

#[tokio::test]
async fn removed_entity_assets_are_collected() {
    let temp = TempDir::new().unwrap();
    let fetch = FakeFetch::default();
    let store = AssetStore::new(temp.path(), fetch.clone()).unwrap();

    // Cycle 1: circuit 3 exists and its asset is downloaded.
    let url = "https://cdn.example/media/circuit3.jpg";
    let mut fr = snapshot(100);
    let mut c = circuit(3, 100);
    c.image = Some(media(url));
    fr.circuits.push(c);
    let mut multi = MultiLanguageSnapshot::new();
    multi.insert("fr".to_string(), fr);

    let first = store.resolve_multi(multi, None).await;
    let asset_path = temp.path().join(asset_file_name(url));
    assert!(asset_path.exists());

    // Cycle 2: the CMS no longer serves circuit 3.
    let mut fr2 = snapshot(100);
    fr2.home.last_update = 200; // home bumped alongside the removal
    let mut fresh = MultiLanguageSnapshot::new();
    fresh.insert("fr".to_string(), fr2);

    let _second = store.resolve_multi(fresh, Some(&first)).await;
    assert!(!asset_path.exists(), "asset of removed circuit survived GC");
}

#[tokio::test]
async fn assets_referenced_by_another_language_survive_gc() {
    let temp = TempDir::new().unwrap();
    let fetch = FakeFetch::default();
    let store = AssetStore::new(temp.path(), fetch.clone()).unwrap();

    let shared_url = "https://cdn.example/media/shared.jpg";
    let en_only_url = "https://cdn.example/media/english.jpg";

    let mut fr = snapshot(100);
    let mut fr_c = circuit(1, 100);
    fr_c.image = Some(media(shared_url));
    fr.circuits.push(fr_c);

    let mut en = snapshot(100);
    let mut en_c = circuit(1, 100);
    en_c.image = Some(media(en_only_url));
    en.circuits.push(en_c);

    let mut multi = MultiLanguageSnapshot::new();
    multi.insert("fr".to_string(), fr);
    multi.insert("en".to_string(), en);

    let first = store.resolve_multi(multi, None).await;

    // Next cycle changes only fr; en is version-identical.
    let mut fresh = first.clone();
    {
        let fr = fresh.get_mut("fr").unwrap();
        fr.home.last_update = 200;
    }
    let _second = store.resolve_multi(fresh, Some(&first)).await;

    assert!(temp.path().join(asset_file_name(en_only_url)).exists());
    assert!(temp.path().join(asset_file_name(shared_url)).exists());
}
