//! Replacement bookkeeping shared by the paging and virtual memory engines.
//!
//! The tracker only knows keys and ticks. It never owns frames; callers load a
//! key when they place it, touch it on every hit, and remove it when the unit
//! leaves memory for any reason.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::error::Result;
use crate::policy::ReplacementPolicy;

/// Load order, last access and access frequency for every resident key.
#[derive(Debug, Clone)]
pub struct ReplacementTracker<K> {
    load_order: VecDeque<K>,
    last_access: HashMap<K, u64>,
    frequency: HashMap<K, u64>,
}

impl<K: Clone + Eq + Hash> ReplacementTracker<K> {
    pub fn new() -> Self {
        ReplacementTracker {
            load_order: VecDeque::new(),
            last_access: HashMap::new(),
            frequency: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.load_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.load_order.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.last_access.contains_key(key)
    }

    /// Register a newly resident key at the tail of the load order.
    pub fn record_load(&mut self, key: K, tick: u64) {
        if self.contains(&key) {
            self.remove(&key);
        }
        self.load_order.push_back(key.clone());
        self.last_access.insert(key.clone(), tick);
        self.frequency.insert(key, 1);
    }

    /// Touch a resident key. Returns false (and changes nothing) for unknown keys.
    pub fn record_access(&mut self, key: &K, tick: u64) -> bool {
        match (self.last_access.get_mut(key), self.frequency.get_mut(key)) {
            (Some(last), Some(count)) => {
                *last = tick;
                *count += 1;
                true
            }
            _ => false,
        }
    }

    /// Pick the key `policy` would evict, or `None` when nothing is tracked.
    pub fn select_victim(&self, policy: ReplacementPolicy) -> Option<K> {
        self.select_victim_where(policy, |_| true)
    }

    /// Like [`select_victim`](Self::select_victim), restricted to keys accepted by `eligible`.
    ///
    /// Candidates are scanned in load order and the first minimum wins, so equal
    /// ranks always resolve to the earliest load.
    pub fn select_victim_where<F>(&self, policy: ReplacementPolicy, eligible: F) -> Option<K>
    where
        F: Fn(&K) -> bool,
    {
        let mut candidates = self.load_order.iter().filter(|key| eligible(key));
        let victim = match policy {
            ReplacementPolicy::Fifo => candidates.next(),
            ReplacementPolicy::Lru => candidates.min_by_key(|key| self.last_access_of(key)),
            ReplacementPolicy::Lfu => {
                candidates.min_by_key(|key| (self.frequency_of(key), self.last_access_of(key)))
            }
        };
        victim.cloned()
    }

    /// Select a victim for a policy given by name, e.g. from user input.
    pub fn select_victim_named(&self, policy: &str) -> Result<Option<K>> {
        Ok(self.select_victim(policy.parse()?))
    }

    /// Drop every trace of `key`. Returns whether it was tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        let tracked = self.last_access.remove(key).is_some();
        self.frequency.remove(key);
        if let Some(pos) = self.load_order.iter().position(|k| k == key) {
            self.load_order.remove(pos);
        }
        tracked
    }

    pub fn clear(&mut self) {
        self.load_order.clear();
        self.last_access.clear();
        self.frequency.clear();
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.frequency.get(key).copied()
    }

    pub fn last_access(&self, key: &K) -> Option<u64> {
        self.last_access.get(key).copied()
    }

    /// Resident keys, oldest load first.
    pub fn load_order(&self) -> impl Iterator<Item = &K> {
        self.load_order.iter()
    }

    fn last_access_of(&self, key: &K) -> u64 {
        self.last_access.get(key).copied().unwrap_or_default()
    }

    fn frequency_of(&self, key: &K) -> u64 {
        self.frequency.get(key).copied().unwrap_or_default()
    }
}

impl<K: Clone + Eq + Hash> Default for ReplacementTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;

    fn loaded(keys: &[u32]) -> ReplacementTracker<u32> {
        let mut tracker = ReplacementTracker::new();
        for (tick, &key) in keys.iter().enumerate() {
            tracker.record_load(key, tick as u64);
        }
        tracker
    }

    #[test]
    fn test_empty_tracker_has_no_victim() {
        let tracker: ReplacementTracker<u32> = ReplacementTracker::new();
        for policy in ReplacementPolicy::ALL {
            assert_eq!(tracker.select_victim(policy), None);
        }
    }

    #[test]
    fn test_record_load_initial_state() {
        let tracker = loaded(&[7]);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.frequency(&7), Some(1));
        assert_eq!(tracker.last_access(&7), Some(0));
    }

    #[test]
    fn test_fifo_ignores_recency() {
        let mut tracker = loaded(&[1, 2, 3]);
        tracker.record_access(&1, 10);
        tracker.record_access(&1, 11);
        assert_eq!(tracker.select_victim(ReplacementPolicy::Fifo), Some(1));
    }

    #[test]
    fn test_lru_picks_least_recent() {
        let mut tracker = loaded(&[1, 2, 3]);
        tracker.record_access(&1, 10);
        tracker.record_access(&3, 11);
        assert_eq!(tracker.select_victim(ReplacementPolicy::Lru), Some(2));
    }

    #[test]
    fn test_lru_ties_resolve_to_load_order() {
        let mut tracker = ReplacementTracker::new();
        tracker.record_load('a', 5);
        tracker.record_load('b', 5);
        tracker.record_load('c', 5);
        assert_eq!(tracker.select_victim(ReplacementPolicy::Lru), Some('a'));
    }

    #[test]
    fn test_lfu_picks_least_frequent() {
        let mut tracker = loaded(&[1, 2, 3]);
        tracker.record_access(&1, 4);
        tracker.record_access(&2, 5);
        assert_eq!(tracker.select_victim(ReplacementPolicy::Lfu), Some(3));
    }

    #[test]
    fn test_lfu_tie_broken_by_lru() {
        let mut tracker = loaded(&[1, 2, 3]);
        // all at frequency 2; key 2 was touched first
        tracker.record_access(&2, 10);
        tracker.record_access(&3, 11);
        tracker.record_access(&1, 12);
        assert_eq!(tracker.select_victim(ReplacementPolicy::Lfu), Some(2));
    }

    #[test]
    fn test_record_access_unknown_key_is_noop() {
        let mut tracker = loaded(&[1]);
        assert!(!tracker.record_access(&9, 3));
        assert!(!tracker.contains(&9));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_remove_clears_all_structures() {
        let mut tracker = loaded(&[1, 2, 3]);
        assert!(tracker.remove(&1));
        assert!(!tracker.contains(&1));
        assert_eq!(tracker.frequency(&1), None);
        assert_eq!(tracker.last_access(&1), None);
        assert_eq!(tracker.load_order().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert!(!tracker.remove(&1));
    }

    #[test]
    fn test_reload_moves_key_to_tail() {
        let mut tracker = loaded(&[1, 2]);
        tracker.record_access(&1, 5);
        tracker.record_load(1, 6);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.frequency(&1), Some(1));
        assert_eq!(tracker.select_victim(ReplacementPolicy::Fifo), Some(2));
    }

    #[test]
    fn test_select_victim_where_skips_ineligible() {
        let tracker = loaded(&[1, 2, 3, 4]);
        let victim = tracker.select_victim_where(ReplacementPolicy::Fifo, |k| k % 2 == 0);
        assert_eq!(victim, Some(2));
        let none = tracker.select_victim_where(ReplacementPolicy::Lru, |_| false);
        assert_eq!(none, None);
    }

    #[test]
    fn test_select_victim_named() {
        let tracker = loaded(&[4, 5]);
        assert_eq!(tracker.select_victim_named("fifo"), Ok(Some(4)));
        assert_eq!(
            tracker.select_victim_named("random"),
            Err(SimError::UnknownPolicy("random".to_string()))
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Load(u8),
            Access(u8),
            Remove(u8),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..8).prop_map(Op::Load),
                (0u8..8).prop_map(Op::Access),
                (0u8..8).prop_map(Op::Remove),
            ]
        }

        fn replay(ops: &[Op]) -> ReplacementTracker<u8> {
            let mut tracker = ReplacementTracker::new();
            for (tick, op) in ops.iter().enumerate() {
                match *op {
                    Op::Load(k) => tracker.record_load(k, tick as u64),
                    Op::Access(k) => {
                        tracker.record_access(&k, tick as u64);
                    }
                    Op::Remove(k) => {
                        tracker.remove(&k);
                    }
                }
            }
            tracker
        }

        proptest! {
            /// Identical histories must produce identical victims.
            #[test]
            fn prop_selection_is_deterministic(ops in prop::collection::vec(op(), 0..64)) {
                let first = replay(&ops);
                let second = replay(&ops);
                for policy in ReplacementPolicy::ALL {
                    prop_assert_eq!(first.select_victim(policy), second.select_victim(policy));
                }
            }

            /// Queue and maps always describe the same key set.
            #[test]
            fn prop_structures_stay_consistent(ops in prop::collection::vec(op(), 0..64)) {
                let tracker = replay(&ops);
                let queued: Vec<u8> = tracker.load_order().copied().collect();
                let mut unique = queued.clone();
                unique.sort_unstable();
                unique.dedup();
                prop_assert_eq!(unique.len(), queued.len());
                for key in &queued {
                    prop_assert!(tracker.frequency(key).is_some());
                    prop_assert!(tracker.last_access(key).is_some());
                }
                prop_assert_eq!(tracker.last_access.len(), queued.len());
                prop_assert_eq!(tracker.frequency.len(), queued.len());
            }

            /// A non-empty tracker always yields a tracked victim.
            #[test]
            fn prop_victim_is_resident(ops in prop::collection::vec(op(), 1..64)) {
                let tracker = replay(&ops);
                for policy in ReplacementPolicy::ALL {
                    match tracker.select_victim(policy) {
                        Some(victim) => prop_assert!(tracker.contains(&victim)),
                        None => prop_assert!(tracker.is_empty()),
                    }
                }
            }
        }
    }
}
