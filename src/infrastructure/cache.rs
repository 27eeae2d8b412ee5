//! Durable cache stores.
//!
//! [`CacheStore`] mirrors an in-memory payload to a JSON file with the
//! epoch it was fetched at. Durability is an optimization, not a
//! correctness requirement: every read or write failure is logged and
//! absorbed, degrading to "no cache". Two concurrent refreshes of the same
//! store can race on the file; the last write wins. The runtime dispatches
//! tool calls sequentially, so this does not happen in practice, but
//! nothing here prevents it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::models::Variant;

/// On-disk shape of a cache file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry<T> {
    payload: T,
    fetched_at: DateTime<Utc>,
}

/// A payload mirrored to `<dir>/<name>.json`.
///
/// Load at startup, check freshness per call, write through on refresh.
#[derive(Debug)]
pub struct CacheStore<T> {
    path: PathBuf,
    state: Option<CacheEntry<T>>,
}

impl<T> CacheStore<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(format!("{name}.json")),
            state: None,
        }
    }

    /// Populate memory state from the file. Missing or corrupt files leave
    /// the state empty; this never fails.
    pub fn load(&mut self) {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no cache file loaded");
                return;
            }
        };
        match serde_json::from_str::<CacheEntry<T>>(&raw) {
            Ok(entry) => {
                tracing::debug!(path = %self.path.display(), "cache file loaded");
                self.state = Some(entry);
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding corrupt cache file");
            }
        }
    }

    /// True iff a value exists and its age is strictly below the TTL.
    /// A zero TTL is never fresh.
    pub fn is_fresh(&self, ttl_secs: u64) -> bool {
        self.is_fresh_at(ttl_secs, Utc::now())
    }

    /// Freshness against an explicit clock; `is_fresh` with `now`.
    pub fn is_fresh_at(&self, ttl_secs: u64, now: DateTime<Utc>) -> bool {
        let Some(entry) = &self.state else {
            return false;
        };
        let Ok(ttl_ms) = i64::try_from(ttl_secs.saturating_mul(1000)) else {
            return true;
        };
        (now - entry.fetched_at).num_milliseconds() < ttl_ms
    }

    /// The cached payload, if any, regardless of freshness.
    pub fn get(&self) -> Option<&T> {
        self.state.as_ref().map(|entry| &entry.payload)
    }

    /// Replace the payload, stamping it with the current time, and write
    /// through to disk best-effort.
    pub fn put(&mut self, payload: T) {
        self.state = Some(CacheEntry {
            payload,
            fetched_at: Utc::now(),
        });
        self.save();
    }

    fn save(&self) {
        let Some(entry) = &self.state else { return };
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(path = %self.path.display(), error = %e, "cache directory not created");
                return;
            }
        }
        match serde_json::to_string(entry) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "cache file not written");
                }
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cache payload not serialized");
            }
        }
    }
}

/// On-disk shape of one per-feature variant file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VariantCacheEntry {
    variants: Vec<Variant>,
}

/// Per-feature variant files under `<dir>/<feature_id>.json`.
///
/// No TTL: variants are assumed stable for a feature's lifetime, and only
/// explicit deletion invalidates an entry.
#[derive(Debug, Clone)]
pub struct VariantFileStore {
    dir: PathBuf,
}

impl VariantFileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, feature_id: u64) -> PathBuf {
        self.dir.join(format!("{feature_id}.json"))
    }

    /// The stored variants for a feature; `None` on a missing or corrupt
    /// file. Never fails.
    pub fn read(&self, feature_id: u64) -> Option<Vec<Variant>> {
        let raw = fs::read_to_string(self.path(feature_id)).ok()?;
        match serde_json::from_str::<VariantCacheEntry>(&raw) {
            Ok(entry) => Some(entry.variants),
            Err(e) => {
                tracing::warn!(feature_id, error = %e, "discarding corrupt variant file");
                None
            }
        }
    }

    /// Best-effort write-through; failures are logged and swallowed.
    pub fn write(&self, feature_id: u64, variants: &[Variant]) {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::warn!(feature_id, error = %e, "variant directory not created");
            return;
        }
        let entry = VariantCacheEntry {
            variants: variants.to_vec(),
        };
        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(e) = fs::write(self.path(feature_id), json) {
                    tracing::warn!(feature_id, error = %e, "variant file not written");
                }
            }
            Err(e) => {
                tracing::warn!(feature_id, error = %e, "variant entry not serialized");
            }
        }
    }
}

/// In-process variant map shared by resolutions within one process.
pub type VariantMemory = HashMap<u64, Vec<Variant>>;
