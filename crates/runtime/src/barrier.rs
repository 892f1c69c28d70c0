use std::collections::BTreeSet;

/// Join point for a fixed set of independent tasks.
///
/// Each task arrives at most once; the barrier opens when every expected
/// task has arrived. Arrivals from tasks that were not expected, and
/// repeated arrivals, are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barrier<T: Ord> {
    waiting: BTreeSet<T>,
    arrived: BTreeSet<T>,
}

impl<T: Ord + Clone> Barrier<T> {
    pub fn new(tasks: impl IntoIterator<Item = T>) -> Self {
        Self {
            waiting: tasks.into_iter().collect(),
            arrived: BTreeSet::new(),
        }
    }

    /// Records `task` as finished.
    ///
    /// Returns `true` only on the arrival that opens the barrier.
    pub fn arrive(&mut self, task: T) -> bool {
        if !self.waiting.remove(&task) {
            return false;
        }
        self.arrived.insert(task);
        self.waiting.is_empty()
    }

    pub fn has_arrived(&self, task: &T) -> bool {
        self.arrived.contains(task)
    }

    pub fn is_open(&self) -> bool {
        self.waiting.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Barrier;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
    enum Task {
        Preload,
        Animation,
    }

    #[test]
    fn opens_after_both_tasks_in_any_order() {
        let mut b = Barrier::new([Task::Preload, Task::Animation]);
        assert!(!b.arrive(Task::Animation));
        assert!(!b.is_open());
        assert!(b.arrive(Task::Preload));
        assert!(b.is_open());
        assert!(b.has_arrived(&Task::Preload));
    }

    #[test]
    fn repeated_arrival_is_counted_once() {
        let mut b = Barrier::new([Task::Preload, Task::Animation]);
        assert!(!b.arrive(Task::Preload));
        assert!(!b.arrive(Task::Preload));
        assert!(!b.is_open());
        assert!(b.has_arrived(&Task::Preload));
        assert!(!b.has_arrived(&Task::Animation));
        assert!(b.arrive(Task::Animation));
        assert!(!b.arrive(Task::Animation));
    }
}
