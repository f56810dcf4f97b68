//! Chain: the collision list behind one bucket.
//!
//! Entries are kept newest-first. A chain stored in the table is never
//! empty; the table drops the whole bucket back to `None` once the last
//! entry leaves.

use crate::entry::Entry;
use core::borrow::Borrow;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub(crate) struct Chain<K, V> {
    entries: VecDeque<Entry<K, V>>,
}

impl<K, V> Chain<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push_front(&mut self, entry: Entry<K, V>) {
        self.entries.push_front(entry);
    }

    pub(crate) fn find<Q>(&self, q: &Q) -> Option<&Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.entries.iter().find(|e| e.key.borrow() == q)
    }

    pub(crate) fn find_mut<Q>(&mut self, q: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.entries.iter_mut().find(|e| e.key.borrow() == q)
    }

    pub(crate) fn get(&self, pos: usize) -> Option<&Entry<K, V>> {
        self.entries.get(pos)
    }

    pub(crate) fn get_mut(&mut self, pos: usize) -> Option<&mut Entry<K, V>> {
        self.entries.get_mut(pos)
    }

    /// Detach the entry at `pos`; later entries shift down by one.
    pub(crate) fn remove(&mut self, pos: usize) -> Option<Entry<K, V>> {
        self.entries.remove(pos)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entry<K, V>> {
        self.entries.iter()
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = Entry<K, V>> {
        self.entries.into_iter()
    }
}
