use std::collections::BTreeSet;

use runtime::budget::SlotBudget;
use runtime::work_queue::{WorkId, WorkQueue, WorkQueueFull};

use crate::key::TileKey;

/// Pending tile requests, most urgent first. A key is queued at most once.
#[derive(Debug, Default)]
pub struct StreamingQueue {
    inner: WorkQueue<TileKey>,
    queued: BTreeSet<TileKey>,
}

impl StreamingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.queued.contains(key)
    }

    /// Enqueue `key`. Returns `Ok(None)` if it was already queued.
    pub fn try_submit(
        &mut self,
        key: TileKey,
        priority: u32,
    ) -> Result<Option<WorkId>, WorkQueueFull> {
        if self.queued.contains(&key) {
            return Ok(None);
        }
        let id = self.inner.try_push(priority, key.clone())?;
        self.queued.insert(key);
        Ok(Some(id))
    }

    /// Drops every queued key matching `pred`, in queue order.
    pub fn cancel_where<F>(&mut self, pred: F) -> Vec<TileKey>
    where
        F: FnMut(&TileKey) -> bool,
    {
        let removed = self.inner.cancel_where(pred);
        for key in &removed {
            self.queued.remove(key);
        }
        removed
    }

    pub fn pop_next(&mut self, budget: &mut SlotBudget) -> Option<(TileKey, u32)> {
        let (_id, priority, key) = self.inner.pop_next(budget)?;
        self.queued.remove(&key);
        Some((key, priority))
    }
}

#[cfg(test)]
mod tests {
    use super::StreamingQueue;
    use crate::key::{TileCoord, TileKey};
    use foundation::ids::SceneId;
    use runtime::budget::SlotBudget;

    fn key(scene: &str, col: u32) -> TileKey {
        TileKey::new(SceneId::from(scene), 0, TileCoord::equirect(col, 0))
    }

    #[test]
    fn duplicate_keys_are_ignored() {
        let mut q = StreamingQueue::new();
        assert!(matches!(q.try_submit(key("a", 1), 3), Ok(Some(_))));
        assert!(matches!(q.try_submit(key("a", 1), 0), Ok(None)));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn respects_budget_and_priority() {
        let mut q = StreamingQueue::new();
        q.try_submit(key("a", 1), 5).unwrap();
        q.try_submit(key("a", 2), 1).unwrap();

        let mut budget = SlotBudget::new(0);
        assert!(q.pop_next(&mut budget).is_none());
        assert_eq!(q.len(), 2);

        let mut budget = SlotBudget::new(1);
        assert_eq!(q.pop_next(&mut budget), Some((key("a", 2), 1)));
        assert!(q.pop_next(&mut budget).is_none());
        assert!(!q.contains(&key("a", 2)));
        assert!(q.contains(&key("a", 1)));
    }

    #[test]
    fn cancel_where_forgets_keys() {
        let mut q = StreamingQueue::new();
        q.try_submit(key("old", 1), 0).unwrap();
        q.try_submit(key("new", 1), 0).unwrap();
        let removed = q.cancel_where(|k| k.scene_id.as_str() == "old");
        assert_eq!(removed, vec![key("old", 1)]);
        assert!(!q.contains(&key("old", 1)));
        assert!(matches!(q.try_submit(key("old", 1), 0), Ok(Some(_))));
    }
}
