//! A generic ordered index over record handles.
//!
//! Every entity's comparator is, in this model, just the key type `K`'s
//! natural `Ord` impl — composite keys are plain tuples, and the
//! "expirydate desc" tiebreaker pervasive in temporal soft-delete entities
//! is expressed by storing the key with a [`std::cmp::Reverse`]-wrapped
//! expiry field rather than by a bespoke comparator function.
//!
//! Two distinct rows can legitimately compare equal on every declared key
//! field (e.g. two rows superseded in the same microsecond). The slab
//! handle is folded into the map key as a final tiebreaker so insertion
//! order still produces a total order without requiring a custom
//! comparator wrapper type.

use std::collections::BTreeMap;
use std::ops::Bound;

/// An ordered set of `(key, handle)` pairs, supporting the find/next/prev
/// family of lookups used throughout the store.
#[derive(Debug, Clone)]
pub struct Index<K: Ord + Clone> {
    tree: BTreeMap<(K, usize), ()>,
}

impl<K: Ord + Clone> Default for Index<K> {
    fn default() -> Self {
        Self { tree: BTreeMap::new() }
    }
}

impl<K: Ord + Clone> Index<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, handle: usize) {
        self.tree.insert((key, handle), ());
    }

    pub fn remove(&mut self, key: &K, handle: usize) -> bool {
        self.tree.remove(&(key.clone(), handle)).is_some()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Exact match: the first entry whose key equals `key`, regardless of
    /// handle. At most one should exist for keys that include enough
    /// fields to be naturally unique (e.g. a current-row probe).
    pub fn find(&self, key: &K) -> Option<usize> {
        self.tree
            .range((key.clone(), usize::MIN)..=(key.clone(), usize::MAX))
            .next()
            .map(|((_, h), ())| *h)
    }

    /// The least entry with key ≥ `key`.
    pub fn find_after(&self, key: &K) -> Option<(K, usize)> {
        self.tree
            .range((key.clone(), usize::MIN)..)
            .next()
            .map(|((k, h), ())| (k.clone(), *h))
    }

    /// The greatest entry with key ≤ `key`.
    pub fn find_before(&self, key: &K) -> Option<(K, usize)> {
        self.tree
            .range(..=(key.clone(), usize::MAX))
            .next_back()
            .map(|((k, h), ())| (k.clone(), *h))
    }

    /// The least entry strictly greater than `(key, handle)` — used to
    /// continue a `find_after` walk from the previously returned entry.
    pub fn next_after(&self, key: &K, handle: usize) -> Option<(K, usize)> {
        self.tree
            .range((Bound::Excluded((key.clone(), handle)), Bound::Unbounded))
            .next()
            .map(|((k, h), ())| (k.clone(), *h))
    }

    /// The greatest entry strictly less than `(key, handle)` — used to
    /// continue a `find_before` walk from the previously returned entry.
    pub fn prev_before(&self, key: &K, handle: usize) -> Option<(K, usize)> {
        self.tree
            .range((Bound::Unbounded, Bound::Excluded((key.clone(), handle))))
            .next_back()
            .map(|((k, h), ())| (k.clone(), *h))
    }

    /// All entries in ascending order, for tests and diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.tree.keys().map(|(k, h)| (k, *h))
    }
}
