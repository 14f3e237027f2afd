//! First-seen-order deduplication used for aperture and drill tool tables

use std::collections::HashMap;
use std::hash::Hash;

/// Assigns each distinct value a stable ordinal in insertion order.
///
/// The first distinct value gets 0, the second 1, and so on. Re-inserting a
/// value returns the ordinal it was given the first time.
#[derive(Debug, Clone)]
pub struct UniqueSet<T> {
    items: Vec<T>,
    indexes: HashMap<T, usize>,
}

impl<T> Default for UniqueSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            indexes: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> UniqueSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: T) -> usize {
        if let Some(&index) = self.indexes.get(&item) {
            return index;
        }

        let index = self.items.len();
        self.indexes.insert(item.clone(), index);
        self.items.push(item);
        index
    }

    pub fn index(&self, item: &T) -> Option<usize> {
        self.indexes.get(item).copied()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.indexes.contains_key(item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct values with their ordinals, in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.items.iter().enumerate()
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for UniqueSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

/// A length with a canonical, hashable representation.
///
/// Values are rounded to a nanometre-scale grid so that results of equivalent
/// arithmetic (`0.1 + 0.2` vs `0.3`) compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dimension(i64);

impl Dimension {
    const SCALE: f64 = 1e9;

    pub fn new(value: f64) -> Self {
        Self((value * Self::SCALE).round() as i64)
    }

    pub fn value(self) -> f64 {
        self.0 as f64 / Self::SCALE
    }
}

impl From<f64> for Dimension {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}
