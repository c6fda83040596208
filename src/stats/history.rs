//! Bounded undo history for the click counter.
//!
//! Only the most recent operations are kept. Pushing onto a full history
//! evicts the oldest entry; the evicted click stays counted, it just can no
//! longer be undone.

use chrono::{DateTime, Local};
use std::collections::VecDeque;

use crate::attributes::Attribute;

/// Default number of undoable clicks.
pub const DEFAULT_CAPACITY: usize = 20;

/// One recorded click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecentOperation {
    /// When the click happened
    pub at: DateTime<Local>,
    /// Attribute that was counted
    pub attribute: Attribute,
}

/// Most recent operations, oldest first.
#[derive(Debug, Clone)]
pub struct RecentOperations {
    ops: VecDeque<RecentOperation>,
    capacity: usize,
}

impl Default for RecentOperations {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl RecentOperations {
    /// Creates an empty history holding at most `capacity` entries (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ops: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records a click now. Returns the evicted oldest entry when full.
    pub fn push(&mut self, attribute: Attribute) -> Option<RecentOperation> {
        self.push_at(attribute, Local::now())
    }

    /// Records a click with an explicit timestamp.
    pub fn push_at(
        &mut self,
        attribute: Attribute,
        at: DateTime<Local>,
    ) -> Option<RecentOperation> {
        let evicted = if self.ops.len() == self.capacity {
            self.ops.pop_front()
        } else {
            None
        };
        self.ops.push_back(RecentOperation { at, attribute });
        evicted
    }

    /// Removes and returns the newest entry.
    pub fn pop(&mut self) -> Option<RecentOperation> {
        self.ops.pop_back()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsStore;

    #[test]
    fn test_pop_returns_newest_first() {
        let mut history = RecentOperations::default();
        history.push(Attribute::CritRate);
        history.push(Attribute::CritDamage);

        assert_eq!(history.pop().unwrap().attribute, Attribute::CritDamage);
        assert_eq!(history.pop().unwrap().attribute, Attribute::CritRate);
        assert!(history.pop().is_none());
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        let mut history = RecentOperations::with_capacity(3);
        assert!(history.push(Attribute::CritRate).is_none());
        assert!(history.push(Attribute::CritDamage).is_none());
        assert!(history.push(Attribute::HpFlat).is_none());

        let evicted = history.push(Attribute::HpPercent).unwrap();
        assert_eq!(evicted.attribute, Attribute::CritRate);
        assert_eq!(history.len(), 3);

        let order: Vec<Attribute> =
            std::iter::from_fn(|| history.pop()).map(|op| op.attribute).collect();
        assert_eq!(
            order,
            vec![Attribute::HpPercent, Attribute::HpFlat, Attribute::CritDamage]
        );
    }

    #[test]
    fn test_default_capacity() {
        let mut history = RecentOperations::default();
        for _ in 0..25 {
            history.push(Attribute::SkillDamage);
        }
        assert_eq!(history.len(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut history = RecentOperations::with_capacity(0);
        assert!(history.push(Attribute::CritRate).is_none());
        assert_eq!(history.len(), 1);
        assert_eq!(history.push(Attribute::CritDamage).unwrap().attribute, Attribute::CritRate);
    }

    #[test]
    fn test_click_then_undo_restores_store() {
        let mut store = StatsStore::new();
        let mut history = RecentOperations::default();
        store.increment(Attribute::EnergyRegen, 2);
        let before = store.clone();

        history.push(Attribute::EnergyRegen);
        store.increment(Attribute::EnergyRegen, 1);

        let op = history.pop().unwrap();
        store.decrement(op.attribute, 1);
        assert_eq!(store, before);
    }
}
