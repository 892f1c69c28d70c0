/// Slots a single dispatch pass may hand out.
///
/// Built from the size of a bounded pool and how much of it is busy; each
/// started load takes one slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SlotBudget {
    remaining: usize,
}

impl SlotBudget {
    pub fn new(slots: usize) -> Self {
        Self { remaining: slots }
    }

    pub fn free_slots(limit: usize, in_use: usize) -> Self {
        Self::new(limit.saturating_sub(in_use))
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Takes one slot if any is left.
    pub fn take(&mut self) -> bool {
        match self.remaining.checked_sub(1) {
            Some(rest) => {
                self.remaining = rest;
                true
            }
            None => false,
        }
    }
}
