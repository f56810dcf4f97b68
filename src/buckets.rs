//! Buckets: the structural layer of the table.
//!
//! Owns the array of optional chains and the entry count, and implements
//! the put path together with load-factor growth. Knows nothing about
//! reentrancy or views; `ChainedHashTable` wraps it with those.

use crate::chain::Chain;
use crate::entry::Entry;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};

/// Bucket count of a fresh table, and of a table after `clear`.
pub const DEFAULT_CAPACITY: usize = 101;

/// Maximum `len / capacity` before a new-key insertion triggers growth.
pub const LOAD_THRESHOLD: f64 = 1.5;

#[derive(Debug, Clone)]
pub(crate) struct Buckets<K, V> {
    slots: Vec<Option<Chain<K, V>>>,
    len: usize,
}

impl<K, V> Buckets<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn slots(&self) -> &[Option<Chain<K, V>>] {
        &self.slots
    }

    pub(crate) fn index_of(&self, hash: u64) -> usize {
        (hash % self.slots.len() as u64) as usize
    }

    pub(crate) fn over_threshold(&self) -> bool {
        self.len as f64 > LOAD_THRESHOLD * self.slots.len() as f64
    }

    #[cfg(test)]
    pub(crate) fn chain(&self, bucket: usize) -> Option<&Chain<K, V>> {
        self.slots.get(bucket)?.as_ref()
    }

    pub(crate) fn chain_mut(&mut self, bucket: usize) -> Option<&mut Chain<K, V>> {
        self.slots.get_mut(bucket)?.as_mut()
    }

    /// Detach the entry at (`bucket`, `pos`). A chain left empty reverts
    /// the bucket to `None`.
    pub(crate) fn remove_at(&mut self, bucket: usize, pos: usize) -> Option<Entry<K, V>> {
        let slot = self.slots.get_mut(bucket)?;
        let chain = slot.as_mut()?;
        let entry = chain.remove(pos)?;
        if chain.is_empty() {
            *slot = None;
        }
        self.len -= 1;
        Some(entry)
    }

    #[cfg(test)]
    pub(crate) fn chain_lengths_sum(&self) -> usize {
        self.slots.iter().flatten().map(Chain::len).sum()
    }
}

impl<K, V> Buckets<K, V>
where
    K: Eq + Hash,
{
    pub(crate) fn find<Q, S>(&self, hasher: &S, q: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        S: BuildHasher,
    {
        let idx = self.index_of(hasher.hash_one(q));
        self.slots[idx].as_ref()?.find(q)
    }

    pub(crate) fn find_mut<Q, S>(&mut self, hasher: &S, q: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        S: BuildHasher,
    {
        let idx = self.index_of(hasher.hash_one(q));
        self.slots[idx].as_mut()?.find_mut(q)
    }

    /// The put path. Replaces the value of an existing key without touching
    /// the count; otherwise inserts at the chain's front and grows the
    /// array once the load threshold is exceeded.
    ///
    /// `K: Hash` runs once per call, and `K: Eq` only during the duplicate
    /// scan; both happen before anything is modified.
    pub(crate) fn put<S: BuildHasher>(&mut self, hasher: &S, key: K, value: V) -> Option<V> {
        let hash = hasher.hash_one(&key);
        let idx = self.index_of(hash);
        if let Some(entry) = self.slots[idx].as_mut().and_then(|c| c.find_mut(&key)) {
            return Some(entry.set_value(value));
        }
        self.slots[idx]
            .get_or_insert_with(Chain::new)
            .push_front(Entry::new(key, value, hash));
        self.len += 1;
        if self.over_threshold() {
            self.rehash();
        }
        None
    }
}

impl<K, V> Buckets<K, V> {
    /// Rebuild at `2 * capacity + 1` buckets, placing every entry by its
    /// stored hash.
    ///
    /// Keys are already unique, so entries go straight to the front of their
    /// new chain with no `Eq` scan; no user code runs here. Growth happens
    /// right after the count first exceeds `1.5 * capacity`, so at most
    /// `floor(1.5 * C) + 1` entries land in `2C + 1` buckets whose threshold
    /// is `3C + 1.5`.
    fn rehash(&mut self) {
        let old_capacity = self.capacity();
        let new_capacity = old_capacity * 2 + 1;
        let old_slots = core::mem::replace(
            &mut self.slots,
            (0..new_capacity).map(|_| None).collect(),
        );
        for entry in old_slots.into_iter().flatten().flat_map(Chain::into_entries) {
            let idx = self.index_of(entry.hash);
            self.slots[idx]
                .get_or_insert_with(Chain::new)
                .push_front(entry);
        }
        debug_assert_eq!(
            self.slots.iter().flatten().map(Chain::len).sum::<usize>(),
            self.len,
            "entry lost while rehashing"
        );
        debug_assert!(!self.over_threshold());
        log::debug!(
            "rehashed {} entries: {} -> {} buckets",
            self.len,
            old_capacity,
            new_capacity
        );
    }
}
