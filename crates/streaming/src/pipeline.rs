use std::collections::{BTreeMap, BTreeSet};

use foundation::ids::SceneId;
use foundation::time::Time;
use runtime::metrics::Metrics;
use tracing::{debug, warn};

use crate::cache::{TileCache, TileEntry};
use crate::config::StreamingConfig;
use crate::key::TileKey;
use crate::request::{Generation, LoadTicket};
use crate::scheduler::TileLoadScheduler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileLoadError {
    Fetch { url: String, message: String },
    Status { url: String, status: u16 },
    Decode { message: String },
}

impl std::fmt::Display for TileLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TileLoadError::Fetch { url, message } => write!(f, "fetch failed: {url}: {message}"),
            TileLoadError::Status { url, status } => write!(f, "http status {status}: {url}"),
            TileLoadError::Decode { message } => write!(f, "decode failed: {message}"),
        }
    }
}

impl std::error::Error for TileLoadError {}

/// A scene the streamer is loading tiles for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSlot {
    pub scene_id: SceneId,
    pub generation: Generation,
}

/// What happened to a finished load.
#[derive(Debug)]
pub enum TileOutcome<T> {
    /// Inserted into the cache. `evicted` lists entries pushed out to make room.
    Stored {
        key: TileKey,
        evicted: Vec<TileEntry<T>>,
    },
    Failed {
        key: TileKey,
        error: TileLoadError,
    },
    /// The requesting scene activation is gone; the result was dropped.
    Stale { key: TileKey },
}

impl<T> TileOutcome<T> {
    pub fn key(&self) -> &TileKey {
        match self {
            TileOutcome::Stored { key, .. }
            | TileOutcome::Failed { key, .. }
            | TileOutcome::Stale { key } => key,
        }
    }
}

/// Tracks completion of a fixed batch of tiles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadProgress {
    total: usize,
    outstanding: BTreeSet<TileKey>,
}

impl LoadProgress {
    pub fn new(keys: impl IntoIterator<Item = TileKey>) -> Self {
        let outstanding: BTreeSet<TileKey> = keys.into_iter().collect();
        Self {
            total: outstanding.len(),
            outstanding,
        }
    }

    /// Marks `key` as settled (loaded, failed or already cached).
    ///
    /// Returns `true` if it belonged to the batch and was still outstanding.
    pub fn settle(&mut self, key: &TileKey) -> bool {
        self.outstanding.remove(key)
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_done(&self) -> bool {
        self.outstanding.is_empty()
    }

    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let done = self.total - self.outstanding.len();
        ((done * 100) / self.total) as u8
    }
}

/// Tile streaming for the active scene and, during a transition, the
/// scene being preloaded.
///
/// Every dispatched load carries a [`LoadTicket`]. A result is only stored
/// if its scene is still live under the same generation.
#[derive(Debug)]
pub struct TileStreamer<T> {
    config: StreamingConfig,
    scheduler: TileLoadScheduler,
    cache: TileCache<T>,
    active: Option<SceneSlot>,
    preload: Option<SceneSlot>,
    last_generation: Generation,
    /// Tiles that failed for the current generation of their scene; not
    /// retried until the scene is entered again.
    failed: BTreeMap<TileKey, Generation>,
    metrics: Metrics,
}

impl<T> TileStreamer<T> {
    pub fn new(config: StreamingConfig) -> Self {
        Self {
            scheduler: TileLoadScheduler::new(config.max_concurrent_tile_loads),
            cache: TileCache::from_config(&config),
            config,
            active: None,
            preload: None,
            last_generation: Generation::default(),
            failed: BTreeMap::new(),
            metrics: Metrics::new(),
        }
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    pub fn cache(&self) -> &TileCache<T> {
        &self.cache
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn active(&self) -> Option<&SceneSlot> {
        self.active.as_ref()
    }

    pub fn preloading(&self) -> Option<&SceneSlot> {
        self.preload.as_ref()
    }

    pub fn in_flight_len(&self) -> usize {
        self.scheduler.in_flight_len()
    }

    pub fn queued_len(&self) -> usize {
        self.scheduler.queued_len()
    }

    fn live_generation(&self, scene: &SceneId) -> Option<Generation> {
        [self.active.as_ref(), self.preload.as_ref()]
            .into_iter()
            .flatten()
            .find(|s| &s.scene_id == scene)
            .map(|s| s.generation)
    }

    pub fn is_live(&self, ticket: &LoadTicket) -> bool {
        self.live_generation(&ticket.key.scene_id) == Some(ticket.generation)
    }

    fn bump_generation(&mut self) -> Generation {
        self.last_generation = self.last_generation.next();
        self.last_generation
    }

    /// Drop queued requests and cached tiles of `scene`.
    fn retire(&mut self, scene: &SceneId) -> Vec<TileEntry<T>> {
        let cancelled = self.scheduler.cancel_where(|k| &k.scene_id == scene);
        self.failed.retain(|k, _| &k.scene_id != scene);
        let evicted = self.cache.evict_where(|k| &k.scene_id == scene);
        debug!(
            "retired scene {scene}: {} queued requests dropped, {} tiles evicted",
            cancelled.len(),
            evicted.len()
        );
        self.count_evicted(evicted.len());
        evicted
    }

    fn count_evicted(&mut self, n: usize) {
        if n > 0 {
            self.metrics.inc_counter("tiles.evicted", n as u64);
        }
        self.metrics.set_gauge("tiles.cached", self.cache.len() as i64);
    }

    /// Make `scene` the active scene.
    ///
    /// A scene that was being preloaded keeps its generation, cached tiles
    /// and queued requests. The previous active scene and any other
    /// preload are retired; their entries are returned for disposal.
    pub fn activate(&mut self, scene: SceneId) -> (Generation, Vec<TileEntry<T>>) {
        if let Some(active) = &self.active
            && active.scene_id == scene
        {
            return (active.generation, Vec::new());
        }

        let promoted = match self.preload.take() {
            Some(slot) if slot.scene_id == scene => Some(slot),
            Some(other) => {
                self.preload = Some(other);
                None
            }
            None => None,
        };

        let mut evicted = Vec::new();
        if let Some(old) = self.active.take() {
            evicted.extend(self.retire(&old.scene_id));
        }
        if let Some(other) = self.preload.take() {
            evicted.extend(self.retire(&other.scene_id));
        }

        let slot = match promoted {
            Some(slot) => slot,
            None => SceneSlot {
                generation: self.bump_generation(),
                scene_id: scene,
            },
        };
        let generation = slot.generation;
        self.active = Some(slot);
        (generation, evicted)
    }

    /// Start loading tiles for `scene` alongside the active one.
    ///
    /// Replaces (and retires) a previous preload of another scene.
    pub fn begin_preload(&mut self, scene: SceneId) -> (Generation, Vec<TileEntry<T>>) {
        if let Some(g) = self.live_generation(&scene) {
            return (g, Vec::new());
        }
        let evicted = self.abandon_preload();
        let generation = self.bump_generation();
        self.preload = Some(SceneSlot {
            scene_id: scene,
            generation,
        });
        (generation, evicted)
    }

    pub fn abandon_preload(&mut self) -> Vec<TileEntry<T>> {
        match self.preload.take() {
            Some(slot) => self.retire(&slot.scene_id),
            None => Vec::new(),
        }
    }

    /// Ask for a tile of a live scene.
    ///
    /// Returns `true` if a new request was queued. Cached, pending and
    /// already-failed tiles are not requested again.
    pub fn request(&mut self, key: TileKey, priority: u32) -> bool {
        let Some(generation) = self.live_generation(&key.scene_id) else {
            return false;
        };
        if self.failed.get(&key) == Some(&generation) {
            return false;
        }
        let cached = self.cache.contains(&key);
        self.scheduler.schedule(key, priority, cached)
    }

    pub fn is_settled(&self, key: &TileKey) -> bool {
        self.cache.contains(key)
            || self
                .live_generation(&key.scene_id)
                .is_some_and(|g| self.failed.get(key) == Some(&g))
    }

    pub fn is_pending(&self, key: &TileKey) -> bool {
        self.scheduler.is_pending(key)
    }

    /// Start queued loads up to the concurrency limit.
    pub fn dispatch(&mut self) -> Vec<LoadTicket> {
        let mut tickets = Vec::new();
        let mut keys = self.scheduler.dispatch();
        while !keys.is_empty() {
            let mut released = false;
            for key in keys {
                match self.live_generation(&key.scene_id) {
                    Some(generation) => tickets.push(LoadTicket::new(key, generation)),
                    None => {
                        self.scheduler.release(&key);
                        released = true;
                    }
                }
            }
            keys = if released {
                self.scheduler.dispatch()
            } else {
                Vec::new()
            };
        }
        self.metrics
            .set_gauge("tiles.in_flight", self.scheduler.in_flight_len() as i64);
        tickets
    }

    /// Hand back the result of a dispatched load.
    ///
    /// Frees the load slot; call [`TileStreamer::dispatch`] afterwards to
    /// start the next request.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<T, TileLoadError>,
        now: Time,
    ) -> TileOutcome<T> {
        self.scheduler.release(&ticket.key);
        self.metrics
            .set_gauge("tiles.in_flight", self.scheduler.in_flight_len() as i64);

        if !self.is_live(&ticket) {
            self.metrics.inc_counter("tiles.discarded_stale", 1);
            debug!("discarding stale tile {}", ticket.key);
            // Same scene entered again: the new visit still wants the tile.
            if self.live_generation(&ticket.key.scene_id).is_some() {
                let cached = self.cache.contains(&ticket.key);
                self.scheduler.schedule(ticket.key.clone(), 0, cached);
            }
            return TileOutcome::Stale { key: ticket.key };
        }

        match result {
            Ok(resource) => {
                let evicted = self.cache.insert(ticket.key.clone(), resource, now);
                self.metrics.inc_counter("tiles.loaded", 1);
                self.count_evicted(evicted.len());
                TileOutcome::Stored {
                    key: ticket.key,
                    evicted,
                }
            }
            Err(error) => {
                warn!("tile {} failed: {error}", ticket.key);
                self.metrics.inc_counter("tiles.failed", 1);
                self.failed.insert(ticket.key.clone(), ticket.generation);
                TileOutcome::Failed {
                    key: ticket.key,
                    error,
                }
            }
        }
    }

    /// Cooldown sweep over the cache.
    pub fn sweep(&mut self, retained: &BTreeSet<TileKey>, now: Time) -> Vec<TileEntry<T>> {
        let evicted = self.cache.sweep(retained, now);
        self.count_evicted(evicted.len());
        evicted
    }

    /// Drop everything: queued requests, cache, scenes.
    pub fn reset(&mut self) -> Vec<TileEntry<T>> {
        self.scheduler.cancel_where(|_| true);
        self.active = None;
        self.preload = None;
        self.failed.clear();
        let evicted = self.cache.clear();
        self.count_evicted(evicted.len());
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::TileCoord;
    use pretty_assertions::assert_eq;

    fn key(scene: &str, col: u32) -> TileKey {
        TileKey::new(SceneId::from(scene), 0, TileCoord::equirect(col, 0))
    }

    fn streamer(limit: usize) -> TileStreamer<u32> {
        TileStreamer::new(StreamingConfig {
            max_concurrent_tile_loads: limit,
            ..StreamingConfig::default()
        })
    }

    #[test]
    fn stores_results_for_live_scene() {
        let mut s = streamer(6);
        s.activate(SceneId::from("lobby"));
        assert!(s.request(key("lobby", 0), 0));
        assert!(!s.request(key("lobby", 0), 0), "already queued");
        assert!(!s.request(key("hall", 0), 0), "scene not live");

        let tickets = s.dispatch();
        assert_eq!(tickets.len(), 1);
        let outcome = s.complete(tickets[0].clone(), Ok(7), Time(0.1));
        assert!(matches!(outcome, TileOutcome::Stored { .. }));
        assert_eq!(s.cache().get(&key("lobby", 0)), Some(&7));
        assert_eq!(s.metrics().counter("tiles.loaded"), 1);
        assert!(!s.request(key("lobby", 0), 0), "cached");
    }

    #[test]
    fn results_from_a_left_scene_are_discarded() {
        let mut s = streamer(6);
        s.activate(SceneId::from("lobby"));
        s.request(key("lobby", 0), 0);
        let tickets = s.dispatch();

        s.activate(SceneId::from("hall"));
        let outcome = s.complete(tickets[0].clone(), Ok(1), Time(0.5));
        assert!(matches!(outcome, TileOutcome::Stale { .. }));
        assert!(!s.cache().contains(&key("lobby", 0)));
        assert_eq!(s.metrics().counter("tiles.discarded_stale"), 1);
        assert_eq!(s.in_flight_len(), 0);
    }

    #[test]
    fn revisiting_a_scene_invalidates_old_generation() {
        let mut s = streamer(6);
        let (g1, _) = s.activate(SceneId::from("lobby"));
        s.request(key("lobby", 0), 0);
        let old = s.dispatch();

        s.activate(SceneId::from("hall"));
        let (g2, _) = s.activate(SceneId::from("lobby"));
        assert!(g2 > g1);

        assert!(matches!(
            s.complete(old[0].clone(), Ok(1), Time(0.5)),
            TileOutcome::Stale { .. }
        ));
        // Requeued for the new visit.
        let again = s.dispatch();
        assert_eq!(again, vec![LoadTicket::new(key("lobby", 0), g2)]);
    }

    #[test]
    fn preload_is_promoted_with_its_tiles() {
        let mut s = streamer(6);
        s.activate(SceneId::from("lobby"));
        let (g, _) = s.begin_preload(SceneId::from("hall"));
        s.request(key("hall", 0), 0);
        let tickets = s.dispatch();
        s.complete(tickets[0].clone(), Ok(3), Time(1.0));

        let (active_gen, evicted) = s.activate(SceneId::from("hall"));
        assert_eq!(active_gen, g);
        assert!(evicted.is_empty());
        assert!(s.cache().contains(&key("hall", 0)));
        assert!(s.preloading().is_none());
    }

    #[test]
    fn failures_are_counted_and_not_retried() {
        let mut s = streamer(6);
        s.activate(SceneId::from("lobby"));
        s.request(key("lobby", 0), 0);
        let tickets = s.dispatch();
        let outcome = s.complete(
            tickets[0].clone(),
            Err(TileLoadError::Status {
                url: "u".to_string(),
                status: 404,
            }),
            Time(0.2),
        );
        assert!(matches!(outcome, TileOutcome::Failed { .. }));
        assert_eq!(s.metrics().counter("tiles.failed"), 1);
        assert!(s.is_settled(&key("lobby", 0)));
        assert!(!s.request(key("lobby", 0), 0));
    }

    #[test]
    fn dispatch_respects_concurrency_limit() {
        let mut s = streamer(2);
        s.activate(SceneId::from("lobby"));
        for col in 0..5 {
            s.request(key("lobby", col), col);
        }
        let first = s.dispatch();
        assert_eq!(first.len(), 2);
        assert!(s.dispatch().is_empty());
        s.complete(first[0].clone(), Ok(0), Time(0.0));
        assert_eq!(s.dispatch().len(), 1);
        assert_eq!(s.in_flight_len(), 2);
    }

    #[test]
    fn progress_counts_settled_keys() {
        let mut p = LoadProgress::new([key("a", 0), key("a", 1), key("a", 2), key("a", 3)]);
        assert_eq!(p.percent(), 0);
        assert!(p.settle(&key("a", 1)));
        assert!(!p.settle(&key("a", 1)));
        assert!(!p.settle(&key("b", 0)));
        assert_eq!(p.percent(), 25);
        for col in [0, 2, 3] {
            p.settle(&key("a", col));
        }
        assert!(p.is_done());
        assert_eq!(LoadProgress::default().percent(), 100);
    }
}
