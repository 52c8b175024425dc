//! Layered storage for registries and resolution state
//!
//! Every scope owns one `Layer` and points at its parent's. Reads fall
//! through to the parent chain; writes only ever land in the own layer,
//! so nothing a descendant does is visible to an ancestor.

use ahash::RandomState;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A stored value together with the order its name was first written in this layer
struct Slot<V> {
    order: u64,
    value: V,
}

/// One layer of a name-keyed map with an optional parent layer.
///
/// Uses `DashMap` with `ahash`; values are cloned out on read so no shard
/// guard is ever held while a caller recurses back into the map.
pub(crate) struct Layer<V> {
    entries: DashMap<String, Slot<V>, RandomState>,
    parent: Option<Arc<Layer<V>>>,
    next_order: AtomicU64,
    depth: u32,
}

impl<V: Clone> Layer<V> {
    /// Create a root layer.
    ///
    /// Uses 8 shards: registries rarely hold more than a few dozen names and
    /// new layers are created for every scope.
    #[inline]
    pub fn root() -> Arc<Self> {
        Arc::new(Self::with_parent(None))
    }

    /// Create a child layer on top of `self`.
    #[inline]
    pub fn child(self: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self::with_parent(Some(Arc::clone(self))))
    }

    fn with_parent(parent: Option<Arc<Layer<V>>>) -> Self {
        let depth = parent.as_ref().map_or(0, |p| p.depth + 1);
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            ),
            parent,
            next_order: AtomicU64::new(0),
            depth,
        }
    }

    /// Write into the own layer. A name keeps the position of its first write.
    pub fn insert(&self, name: &str, value: V) {
        if let Some(mut slot) = self.entries.get_mut(name) {
            slot.value = value;
            return;
        }
        let order = self.next_order.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(name.to_owned(), Slot { order, value });
    }

    /// Remove a name from the own layer only.
    #[inline]
    pub fn remove_own(&self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Look up a name in the own layer only.
    #[inline]
    pub fn get_own(&self, name: &str) -> Option<V> {
        self.entries.get(name).map(|slot| slot.value.clone())
    }

    /// Look up a name, walking the parent chain.
    ///
    /// Returns the value from the nearest layer that has it.
    pub fn get(&self, name: &str) -> Option<V> {
        let mut current = Some(self);
        while let Some(layer) = current {
            if let Some(value) = layer.get_own(name) {
                return Some(value);
            }
            current = layer.parent.as_deref();
        }
        None
    }

    /// Check whether any layer in the chain holds the name.
    pub fn contains(&self, name: &str) -> bool {
        let mut current = Some(self);
        while let Some(layer) = current {
            if layer.entries.contains_key(name) {
                return true;
            }
            current = layer.parent.as_deref();
        }
        false
    }

    /// Names of the own layer in first-write order.
    pub fn own_names(&self) -> Vec<String> {
        let mut names: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|entry| (entry.value().order, entry.key().clone()))
            .collect();
        names.sort_unstable_by_key(|(order, _)| *order);
        names.into_iter().map(|(_, name)| name).collect()
    }

    /// Every visible name: own layer first, then each ancestor, each name once.
    pub fn names(&self) -> Vec<String> {
        let mut seen = HashSet::with_hasher(RandomState::new());
        let mut names = Vec::new();
        let mut current = Some(self);
        while let Some(layer) = current {
            for name in layer.own_names() {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
            current = layer.parent.as_deref();
        }
        names
    }

    /// Parent layer, if any
    #[inline]
    pub fn parent(&self) -> Option<&Arc<Layer<V>>> {
        self.parent.as_ref()
    }

    /// Check whether `self` appears in the parent chain of `other` (strictly above it).
    pub fn is_ancestor_of(self: &Arc<Self>, other: &Arc<Self>) -> bool {
        let mut current = other.parent.as_ref();
        while let Some(layer) = current {
            if Arc::ptr_eq(self, layer) {
                return true;
            }
            current = layer.parent.as_ref();
        }
        false
    }

    /// Number of names in the own layer
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the own layer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distance from the root layer (0 = root)
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl<V> std::fmt::Debug for Layer<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("count", &self.entries.len())
            .field("depth", &self.depth)
            .finish()
    }
}
