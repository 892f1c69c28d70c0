use std::collections::BTreeSet;

use runtime::budget::SlotBudget;

use crate::key::TileKey;
use crate::queue::StreamingQueue;

/// Bounded-concurrency tile load scheduler.
///
/// Requests wait in a priority queue; at most `limit` loads are in flight.
/// In-flight loads are never aborted, only queued requests can be dropped.
#[derive(Debug)]
pub struct TileLoadScheduler {
    queue: StreamingQueue,
    in_flight: BTreeSet<TileKey>,
    limit: usize,
}

impl TileLoadScheduler {
    pub fn new(limit: usize) -> Self {
        Self {
            queue: StreamingQueue::new(),
            in_flight: BTreeSet::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_empty()
    }

    pub fn is_in_flight(&self, key: &TileKey) -> bool {
        self.in_flight.contains(key)
    }

    /// Queued or in flight.
    pub fn is_pending(&self, key: &TileKey) -> bool {
        self.queue.contains(key) || self.in_flight.contains(key)
    }

    /// Enqueue a request unless the tile is cached, queued or in flight.
    ///
    /// Returns `true` if a new request was queued.
    pub fn schedule(&mut self, key: TileKey, priority: u32, cached: bool) -> bool {
        if cached || self.in_flight.contains(&key) {
            return false;
        }
        // The queue is unbounded, so submission only declines duplicates.
        matches!(self.queue.try_submit(key, priority), Ok(Some(_)))
    }

    /// Start as many queued loads as there are free slots, most urgent
    /// first. Returns the keys to fetch.
    pub fn dispatch(&mut self) -> Vec<TileKey> {
        let mut budget = SlotBudget::free_slots(self.limit, self.in_flight.len());
        let mut started = Vec::new();
        while let Some((key, _priority)) = self.queue.pop_next(&mut budget) {
            self.in_flight.insert(key.clone());
            started.push(key);
        }
        started
    }

    /// Free the slot held by `key` without starting anything.
    pub fn release(&mut self, key: &TileKey) -> bool {
        self.in_flight.remove(key)
    }

    /// A load finished (successfully or not): free its slot and start the
    /// next ones.
    pub fn complete(&mut self, key: &TileKey) -> Vec<TileKey> {
        self.release(key);
        self.dispatch()
    }

    /// Drop queued requests matching `pred`. In-flight loads are untouched.
    pub fn cancel_where<F>(&mut self, pred: F) -> Vec<TileKey>
    where
        F: FnMut(&TileKey) -> bool,
    {
        self.queue.cancel_where(pred)
    }
}

#[cfg(test)]
mod tests {
    use super::TileLoadScheduler;
    use crate::key::{TileCoord, TileKey};
    use foundation::ids::SceneId;

    fn key(col: u32) -> TileKey {
        TileKey::new(SceneId::from("lobby"), 1, TileCoord::equirect(col, 0))
    }

    #[test]
    fn schedule_skips_cached_queued_and_in_flight() {
        let mut s = TileLoadScheduler::new(1);
        assert!(!s.schedule(key(0), 0, true));
        assert!(s.schedule(key(0), 0, false));
        assert!(!s.schedule(key(0), 0, false));
        assert_eq!(s.dispatch(), vec![key(0)]);
        assert!(!s.schedule(key(0), 0, false));
        assert!(s.is_pending(&key(0)));
    }

    #[test]
    fn concurrency_never_exceeds_limit() {
        let mut s = TileLoadScheduler::new(2);
        for col in 0..10 {
            s.schedule(key(col), col, false);
        }
        let mut running = s.dispatch();
        assert_eq!(running, vec![key(0), key(1)]);

        let mut finished = 0;
        while let Some(done) = running.first().cloned() {
            running.remove(0);
            assert!(s.in_flight_len() <= 2);
            running.extend(s.complete(&done));
            assert!(s.in_flight_len() <= 2);
            finished += 1;
        }
        assert_eq!(finished, 10);
        assert!(s.is_idle());
    }

    #[test]
    fn dispatch_follows_priority() {
        let mut s = TileLoadScheduler::new(1);
        s.schedule(key(5), 9, false);
        s.schedule(key(6), 2, false);
        assert_eq!(s.dispatch(), vec![key(6)]);
        assert!(s.dispatch().is_empty(), "no free slot");
        assert_eq!(s.complete(&key(6)), vec![key(5)]);
    }

    #[test]
    fn cancel_leaves_in_flight_loads() {
        let mut s = TileLoadScheduler::new(1);
        s.schedule(key(0), 0, false);
        s.schedule(key(1), 1, false);
        s.dispatch();
        let dropped = s.cancel_where(|_| true);
        assert_eq!(dropped, vec![key(1)]);
        assert!(s.is_in_flight(&key(0)));
        assert!(s.complete(&key(0)).is_empty());
    }
}
