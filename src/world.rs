//! Process groups that tensors are distributed over.
//!
//! A [`World`] names a set of ranks. Every tensor holds a handle to the world
//! it lives in; handles are cheap clones of one shared descriptor, so dropping
//! a tensor never tears its world down.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(0);

/// How the rank set of one world relates to another's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorldRelation {
    /// Same ranks.
    Equal,
    /// Every rank of `self` belongs to `other`.
    Subset,
    /// Every rank of `other` belongs to `self`.
    Superset,
    /// Different roots or overlapping-but-incomparable rank sets.
    Unrelated,
}

struct WorldInner {
    id: u64,
    root: u64,
    ranks: Vec<usize>,
    name: Option<String>,
}

/// Handle to a group of cooperating processes.
///
/// # Example
///
/// ```rust
/// use ctf::{World, WorldRelation};
///
/// let world = World::new(4).unwrap();
/// let sub = world.subworld(&[0, 2]).unwrap();
///
/// assert_eq!(sub.nproc(), 2);
/// assert_eq!(sub.relation(&world), WorldRelation::Subset);
/// assert_eq!(world.relation(&sub), WorldRelation::Superset);
/// ```
#[derive(Clone)]
pub struct World {
    inner: Arc<WorldInner>,
}

impl World {
    /// Create a root world of `nproc` ranks.
    pub fn new(nproc: usize) -> Result<Self> {
        if nproc == 0 {
            return Err(Error::InvalidArgument(
                "a world needs at least one rank".into(),
            ));
        }
        let id = NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed);
        Ok(Self {
            inner: Arc::new(WorldInner {
                id,
                root: id,
                ranks: (0..nproc).collect(),
                name: None,
            }),
        })
    }

    /// A single-rank root world.
    pub fn single() -> Self {
        let id = NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            inner: Arc::new(WorldInner {
                id,
                root: id,
                ranks: vec![0],
                name: None,
            }),
        }
    }

    /// Split off the world made of `ranks`, which must all belong to `self`.
    pub fn subworld(&self, ranks: &[usize]) -> Result<Self> {
        if ranks.is_empty() {
            return Err(Error::InvalidArgument(
                "a subworld needs at least one rank".into(),
            ));
        }
        let set: BTreeSet<usize> = ranks.iter().copied().collect();
        if set.len() != ranks.len() {
            return Err(Error::InvalidArgument(format!(
                "duplicate ranks in {ranks:?}"
            )));
        }
        if let Some(r) = set.iter().find(|r| self.inner.ranks.binary_search(r).is_err()) {
            return Err(Error::InvalidArgument(format!(
                "rank {r} does not belong to the parent world"
            )));
        }
        Ok(Self {
            inner: Arc::new(WorldInner {
                id: NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed),
                root: self.inner.root,
                ranks: set.into_iter().collect(),
                name: None,
            }),
        })
    }

    /// Same world under a new handle carrying `name`.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(WorldInner {
                id: self.inner.id,
                root: self.inner.root,
                ranks: self.inner.ranks.clone(),
                name: Some(name.into()),
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    #[inline]
    pub fn nproc(&self) -> usize {
        self.inner.ranks.len()
    }

    /// Ranks in ascending order.
    #[inline]
    pub fn ranks(&self) -> &[usize] {
        &self.inner.ranks
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Relation of `self` to `other`.
    pub fn relation(&self, other: &World) -> WorldRelation {
        if self.inner.root != other.inner.root {
            return WorldRelation::Unrelated;
        }
        if self.inner.id == other.inner.id || self.inner.ranks == other.inner.ranks {
            return WorldRelation::Equal;
        }
        let contains = |outer: &[usize], inner: &[usize]| {
            inner.iter().all(|r| outer.binary_search(r).is_ok())
        };
        if contains(&other.inner.ranks, &self.inner.ranks) {
            WorldRelation::Subset
        } else if contains(&self.inner.ranks, &other.inner.ranks) {
            WorldRelation::Superset
        } else {
            WorldRelation::Unrelated
        }
    }
}

impl PartialEq for World {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for World {}

impl Default for World {
    fn default() -> Self {
        Self::single()
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("nproc", &self.nproc())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relations() {
        let world = World::new(4).unwrap();
        let a = world.subworld(&[0, 1]).unwrap();
        let b = world.subworld(&[2, 3]).unwrap();
        let c = a.subworld(&[1]).unwrap();

        assert_eq!(world.relation(&world.clone()), WorldRelation::Equal);
        assert_eq!(a.relation(&world), WorldRelation::Subset);
        assert_eq!(world.relation(&c), WorldRelation::Superset);
        assert_eq!(a.relation(&b), WorldRelation::Unrelated);
        assert_eq!(c.relation(&a), WorldRelation::Subset);
    }

    #[test]
    fn test_distinct_roots_unrelated() {
        let x = World::new(2).unwrap();
        let y = World::new(2).unwrap();
        assert_eq!(x.relation(&y), WorldRelation::Unrelated);
        assert_ne!(x, y);
    }

    #[test]
    fn test_subworld_validation() {
        let world = World::new(3).unwrap();
        assert!(world.subworld(&[]).is_err());
        assert!(world.subworld(&[0, 0]).is_err());
        assert!(world.subworld(&[5]).is_err());
        assert_eq!(world.subworld(&[2, 0]).unwrap().ranks(), &[0, 2]);
        assert!(World::new(0).is_err());
    }

    #[test]
    fn test_name_keeps_identity() {
        let world = World::new(2).unwrap();
        let named = world.clone().with_name("comm");
        assert_eq!(named, world);
        assert_eq!(named.name(), Some("comm"));
    }
}
