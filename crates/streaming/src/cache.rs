use std::collections::{BTreeMap, BTreeSet};

use foundation::math::precision::stable_total_cmp_f64;
use foundation::time::{Time, ms_to_secs};

use crate::config::StreamingConfig;
use crate::key::TileKey;

/// A decoded tile owned by the cache.
///
/// Dropping an entry disposes its resource.
#[derive(Debug, Clone, PartialEq)]
pub struct TileEntry<T> {
    pub key: TileKey,
    pub resource: T,
    pub last_used_at: Time,
    /// Set the first sweep the tile was not wanted; cleared when it is.
    pub pending_removal_at: Option<Time>,
}

/// Bounded, churn-resistant cache of decoded tiles.
///
/// Notes on determinism:
/// - Entries are keyed in a `BTreeMap` for stable traversal order.
/// - Capacity eviction is LRU by `last_used_at`, with a tie-break by key.
/// - Tiles that leave the view are kept for a cooldown before eviction, so
///   panning back and forth does not refetch them.
#[derive(Debug)]
pub struct TileCache<T> {
    limit: usize,
    cooldown_s: f64,
    entries: BTreeMap<TileKey, TileEntry<T>>,
}

impl<T> TileCache<T> {
    pub fn new(limit: usize, cooldown_ms: u64) -> Self {
        Self {
            limit,
            cooldown_s: ms_to_secs(cooldown_ms),
            entries: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &StreamingConfig) -> Self {
        Self::new(config.tile_cache_limit, config.tile_unload_cooldown_ms)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &TileKey) -> Option<&T> {
        self.entries.get(key).map(|e| &e.resource)
    }

    pub fn entry(&self, key: &TileKey) -> Option<&TileEntry<T>> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &TileKey> {
        self.entries.keys()
    }

    /// Store a freshly loaded tile, then enforce capacity.
    ///
    /// Returns evicted entries, including a replaced entry for the same key.
    pub fn insert(&mut self, key: TileKey, resource: T, now: Time) -> Vec<TileEntry<T>> {
        let entry = TileEntry {
            key: key.clone(),
            resource,
            last_used_at: now,
            pending_removal_at: None,
        };
        let mut evicted: Vec<TileEntry<T>> = self.entries.insert(key.clone(), entry).into_iter().collect();
        evicted.extend(self.enforce_capacity(Some(&key)));
        evicted
    }

    /// Mark `retained` tiles as in use and start or finish the cooldown of
    /// everything else.
    pub fn sweep(&mut self, retained: &BTreeSet<TileKey>, now: Time) -> Vec<TileEntry<T>> {
        let mut expired: Vec<TileKey> = Vec::new();
        for (key, entry) in self.entries.iter_mut() {
            if retained.contains(key) {
                entry.last_used_at = now;
                entry.pending_removal_at = None;
                continue;
            }
            match entry.pending_removal_at {
                None => entry.pending_removal_at = Some(now),
                Some(since) if now.since(since) > self.cooldown_s => expired.push(key.clone()),
                Some(_) => {}
            }
        }

        let mut evicted: Vec<TileEntry<T>> = expired
            .iter()
            .filter_map(|k| self.entries.remove(k))
            .collect();
        evicted.extend(self.enforce_capacity(None));
        evicted
    }

    /// Remove every entry whose key matches `pred`, in key order.
    pub fn evict_where<F>(&mut self, mut pred: F) -> Vec<TileEntry<T>>
    where
        F: FnMut(&TileKey) -> bool,
    {
        let doomed: Vec<TileKey> = self.entries.keys().filter(|k| pred(k)).cloned().collect();
        doomed
            .iter()
            .filter_map(|k| self.entries.remove(k))
            .collect()
    }

    pub fn clear(&mut self) -> Vec<TileEntry<T>> {
        std::mem::take(&mut self.entries).into_values().collect()
    }

    fn enforce_capacity(&mut self, protected: Option<&TileKey>) -> Vec<TileEntry<T>> {
        let mut evicted: Vec<TileEntry<T>> = Vec::new();
        while self.entries.len() > self.limit {
            let pick = |exclude: Option<&TileKey>| {
                self.entries
                    .iter()
                    .filter(|(k, _)| exclude.is_none_or(|p| p != *k))
                    .min_by(|(ka, ea), (kb, eb)| {
                        stable_total_cmp_f64(ea.last_used_at.0, eb.last_used_at.0)
                            .then_with(|| ka.cmp(kb))
                    })
                    .map(|(k, _)| k.clone())
            };

            // Prefer not to evict the entry just inserted, but allow it if it
            // is the only one left (zero capacity).
            let Some(key) = pick(protected).or_else(|| pick(None)) else {
                break;
            };
            if let Some(entry) = self.entries.remove(&key) {
                evicted.push(entry);
            }
        }
        evicted
    }
}
