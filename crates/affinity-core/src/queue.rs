//! Decrease-key priority queue.
//!
//! A binary min-heap stored in a `Vec`, plus a map from key to heap slot.
//! The map makes `contains`, `change_priority` and `remove` cheap, which is
//! what the ranking traversal needs for both its frontier and its result.
//!
//! Every swap goes through [`PriorityQueue::swap`], the only place that
//! touches both the array and the position map, so the two never drift.

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// A min-priority queue where each key appears at most once.
#[derive(Debug, Clone)]
pub struct PriorityQueue<K, P> {
    heap: Vec<(K, P)>,
    positions: HashMap<K, usize>,
}

impl<K, P> Default for PriorityQueue<K, P>
where
    K: Eq + Hash + Clone + Debug,
    P: PartialOrd + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> PriorityQueue<K, P>
where
    K: Eq + Hash + Clone + Debug,
    P: PartialOrd + Copy,
{
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Creates an empty queue with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts a new key.
    ///
    /// Fails with [`Error::AlreadyExists`] if the key is already queued;
    /// duplicates are never merged silently.
    pub fn insert(&mut self, key: K, priority: P) -> Result<()> {
        if self.positions.contains_key(&key) {
            return Err(Error::AlreadyExists(format!("{key:?}")));
        }
        let slot = self.heap.len();
        self.positions.insert(key.clone(), slot);
        self.heap.push((key, priority));
        self.sift_up(slot);
        Ok(())
    }

    /// Moves an existing key to a new priority, up or down.
    pub fn change_priority(&mut self, key: &K, priority: P) -> Result<()> {
        let slot = *self
            .positions
            .get(key)
            .ok_or_else(|| Error::NotFound(format!("{key:?}")))?;
        self.heap[slot].1 = priority;
        // Only one of these moves the entry; the other is a no-op.
        let slot = self.sift_up(slot);
        self.sift_down(slot);
        Ok(())
    }

    /// Inserts `key`, or lowers its priority if `priority` is not larger
    /// than the stored one. Returns `true` if the queue changed.
    pub fn insert_or_decrease(&mut self, key: K, priority: P) -> bool {
        match self.priority_of(&key) {
            None => {
                let inserted = self.insert(key, priority);
                debug_assert!(inserted.is_ok());
                true
            }
            Some(current) if !(priority > current) => {
                let changed = self.change_priority(&key, priority);
                debug_assert!(changed.is_ok());
                true
            }
            Some(_) => false,
        }
    }

    /// Removes and returns the minimum-priority entry.
    pub fn pop(&mut self) -> Result<(K, P)> {
        if self.heap.is_empty() {
            return Err(Error::EmptyCollection);
        }
        Ok(self.remove_slot(0))
    }

    /// Returns the minimum-priority entry without removing it.
    pub fn peek(&self) -> Result<(&K, P)> {
        self.heap
            .first()
            .map(|(key, priority)| (key, *priority))
            .ok_or(Error::EmptyCollection)
    }

    /// Removes an arbitrary key, returning its priority.
    pub fn remove(&mut self, key: &K) -> Option<P> {
        let slot = *self.positions.get(key)?;
        Some(self.remove_slot(slot).1)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    pub fn priority_of(&self, key: &K) -> Option<P> {
        self.positions.get(key).map(|&slot| self.heap[slot].1)
    }

    /// Number of queued entries.
    pub fn size(&self) -> usize {
        self.heap.len()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Ascending-priority snapshot of every entry.
    ///
    /// Works on a copy, so the live queue is untouched and each call is
    /// computed from scratch.
    pub fn ordered_view(&self) -> Vec<(K, P)> {
        let mut entries = self.heap.clone();
        entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        entries
    }

    /// Iterates entries in heap order (not sorted).
    pub fn iter(&self) -> impl Iterator<Item = (&K, P)> + '_ {
        self.heap.iter().map(|(key, priority)| (key, *priority))
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.positions.clear();
    }

    fn remove_slot(&mut self, slot: usize) -> (K, P) {
        let (key, priority) = self.heap.swap_remove(slot);
        self.positions.remove(&key);
        if slot < self.heap.len() {
            // The former last entry now sits in `slot`.
            if let Some(position) = self.positions.get_mut(&self.heap[slot].0) {
                *position = slot;
            }
            let slot = self.sift_up(slot);
            self.sift_down(slot);
        }
        (key, priority)
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.heap[a].1.partial_cmp(&self.heap[b].1) == Some(Ordering::Less)
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        for slot in [a, b] {
            if let Some(position) = self.positions.get_mut(&self.heap[slot].0) {
                *position = slot;
            }
        }
    }

    /// Returns the slot the entry ended up in.
    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        assert_eq!(self.heap.len(), self.positions.len());
        for (slot, (key, _)) in self.heap.iter().enumerate() {
            assert_eq!(self.positions[key], slot);
            if slot > 0 {
                assert!(!self.less(slot, (slot - 1) / 2), "heap order broken at {slot}");
            }
        }
    }
}
