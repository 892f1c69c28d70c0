//! Priority queue for pending loads.
//!
//! Items pop in `(priority, id)` order: smaller priority values first, and
//! insertion order among equals. Cancelling never reorders what is left.

use std::collections::BTreeMap;

use crate::budget::SlotBudget;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WorkQueueFull {
    pub max_len: usize,
}

impl std::fmt::Display for WorkQueueFull {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "work queue full ({} pending)", self.max_len)
    }
}

impl std::error::Error for WorkQueueFull {}

#[derive(Debug)]
pub struct WorkQueue<T> {
    next_id: u64,
    items: BTreeMap<(u32, WorkId), T>,
    max_len: Option<usize>,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            items: BTreeMap::new(),
            max_len: None,
        }
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue that refuses new items once `max_len` are pending.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn try_push(&mut self, priority: u32, payload: T) -> Result<WorkId, WorkQueueFull> {
        if let Some(max_len) = self.max_len
            && self.items.len() >= max_len
        {
            return Err(WorkQueueFull { max_len });
        }
        let id = WorkId(self.next_id);
        self.next_id += 1;
        self.items.insert((priority, id), payload);
        Ok(id)
    }

    /// Removes every item whose payload matches `pred`, returned in queue
    /// order.
    pub fn cancel_where<F>(&mut self, mut pred: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let doomed: Vec<(u32, WorkId)> = self
            .items
            .iter()
            .filter(|(_, payload)| pred(payload))
            .map(|(slot, _)| *slot)
            .collect();
        doomed
            .into_iter()
            .filter_map(|slot| self.items.remove(&slot))
            .collect()
    }

    /// Pops the most urgent item if `budget` still has a slot for it.
    pub fn pop_next(&mut self, budget: &mut SlotBudget) -> Option<(WorkId, u32, T)> {
        if self.items.is_empty() || !budget.take() {
            return None;
        }
        let ((priority, id), payload) = self.items.pop_first()?;
        Some((id, priority, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::{WorkQueue, WorkQueueFull};
    use crate::budget::SlotBudget;

    fn drain<T>(q: &mut WorkQueue<T>) -> Vec<T> {
        let mut budget = SlotBudget::new(usize::MAX);
        std::iter::from_fn(|| q.pop_next(&mut budget).map(|(_, _, v)| v)).collect()
    }

    #[test]
    fn urgent_first_then_oldest() {
        let mut q = WorkQueue::new();
        for (p, v) in [(3, "near"), (0, "center-a"), (10, "far"), (0, "center-b")] {
            q.try_push(p, v).unwrap();
        }
        assert_eq!(drain(&mut q), vec!["center-a", "center-b", "near", "far"]);
    }

    #[test]
    fn cancel_by_predicate() {
        let mut q = WorkQueue::new();
        q.try_push(1, ("hall", 2)).unwrap();
        q.try_push(0, ("lobby", 3)).unwrap();
        q.try_push(1, ("hall", 4)).unwrap();
        q.try_push(5, ("lobby", 5)).unwrap();

        let removed = q.cancel_where(|(scene, _)| *scene == "lobby");
        assert_eq!(removed, vec![("lobby", 3), ("lobby", 5)]);
        assert_eq!(drain(&mut q), vec![("hall", 2), ("hall", 4)]);
    }

    #[test]
    fn full_queue_rejects() {
        let mut q = WorkQueue::with_max_len(2);
        q.try_push(0, 'a').unwrap();
        q.try_push(0, 'b').unwrap();
        assert_eq!(q.try_push(0, 'c'), Err(WorkQueueFull { max_len: 2 }));
    }

    #[test]
    fn pop_needs_a_slot() {
        let mut q = WorkQueue::new();
        q.try_push(0, "a").unwrap();
        q.try_push(0, "b").unwrap();

        let mut none = SlotBudget::new(0);
        assert!(q.pop_next(&mut none).is_none());

        let mut one = SlotBudget::new(1);
        assert_eq!(q.pop_next(&mut one).map(|(_, _, v)| v), Some("a"));
        assert!(q.pop_next(&mut one).is_none());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn empty_queue_keeps_budget() {
        let mut q: WorkQueue<u8> = WorkQueue::new();
        let mut budget = SlotBudget::new(1);
        assert!(q.pop_next(&mut budget).is_none());
        assert_eq!(budget.remaining(), 1);
    }
}
