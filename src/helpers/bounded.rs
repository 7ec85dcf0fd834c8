//! Rolling window with FIFO eviction

use std::collections::VecDeque;

/// Keeps at most `limit` items, dropping the oldest first
#[derive(Clone, Debug)]
pub struct RollingWindow<T> {
    limit: usize,
    items: VecDeque<T>,
}

impl<T> RollingWindow<T> {
    /// A limit of 0 keeps nothing
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            items: VecDeque::with_capacity(limit),
        }
    }

    /// Append `value`; returns whatever fell out of the window
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.limit == 0 {
            return Some(value);
        }
        let evicted = (self.items.len() >= self.limit)
            .then(|| self.items.pop_front())
            .flatten();
        self.items.push_back(value);
        evicted
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> RollingWindow<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}
