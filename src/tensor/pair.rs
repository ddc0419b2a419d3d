//! Coordinate/value pairs for bulk sparse I/O.

use std::cmp::Ordering;
use std::ops::{Deref, DerefMut};

/// A global coordinate and the value stored there.
///
/// Pairs compare by coordinate only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pair<T> {
    /// Column-major global coordinate.
    pub k: usize,
    /// Value.
    pub d: T,
}

impl<T> Pair<T> {
    pub fn new(k: usize, d: T) -> Self {
        Self { k, d }
    }
}

impl<T> PartialEq for Pair<T> {
    fn eq(&self, other: &Self) -> bool {
        self.k == other.k
    }
}

impl<T> Eq for Pair<T> {}

impl<T> PartialOrd for Pair<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Pair<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.k.cmp(&other.k)
    }
}

impl<T> From<(usize, T)> for Pair<T> {
    fn from((k, d): (usize, T)) -> Self {
        Self { k, d }
    }
}

/// An unordered batch of [`Pair`]s.
#[derive(Debug, Clone, Default)]
pub struct PairSet<T> {
    pairs: Vec<Pair<T>>,
}

impl<T> PairSet<T> {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Pairs with the given coordinates and default values, ready for a read.
    pub fn at(coords: &[usize]) -> Self
    where
        T: Default,
    {
        coords.iter().map(|&k| Pair::new(k, T::default())).collect()
    }

    pub fn push(&mut self, k: usize, d: T) {
        self.pairs.push(Pair::new(k, d));
    }

    /// Sort by ascending coordinate.
    pub fn sort(&mut self) {
        self.pairs.sort_by_key(|p| p.k);
    }

    pub fn into_vec(self) -> Vec<Pair<T>> {
        self.pairs
    }
}

impl<T> Deref for PairSet<T> {
    type Target = [Pair<T>];

    fn deref(&self) -> &[Pair<T>] {
        &self.pairs
    }
}

impl<T> DerefMut for PairSet<T> {
    fn deref_mut(&mut self) -> &mut [Pair<T>] {
        &mut self.pairs
    }
}

impl<T> FromIterator<Pair<T>> for PairSet<T> {
    fn from_iter<I: IntoIterator<Item = Pair<T>>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

impl<T> From<Vec<Pair<T>>> for PairSet<T> {
    fn from(pairs: Vec<Pair<T>>) -> Self {
        Self { pairs }
    }
}

impl<T> IntoIterator for PairSet<T> {
    type Item = Pair<T>;
    type IntoIter = std::vec::IntoIter<Pair<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.into_iter()
    }
}
