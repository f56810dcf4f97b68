//! EntrySet: live view over a table's entries.

use crate::buckets::Buckets;
use crate::cursor::{EntryCursor, Iter};

/// A view backed by the table it came from. Its length is read from the
/// table on every call, and removals through its cursor remove from the
/// table.
pub struct EntrySet<'a, K, V> {
    buckets: &'a mut Buckets<K, V>,
}

impl<'a, K, V> EntrySet<'a, K, V> {
    pub(crate) fn new(buckets: &'a mut Buckets<K, V>) -> Self {
        Self { buckets }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.len() == 0
    }

    /// The removal-capable traversal.
    pub fn cursor(&mut self) -> EntryCursor<'_, K, V> {
        EntryCursor::new(&mut *self.buckets)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&*self.buckets)
    }

    /// True if the view holds an entry with this key and an equal value.
    pub fn contains(&self, key: &K, value: &V) -> bool
    where
        K: Eq,
        V: PartialEq,
    {
        self.iter().any(|(k, v)| k == key && v == value)
    }

    /// Keep only the entries for which `keep` returns true; returns how
    /// many were removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut cursor = self.cursor();
        let mut removed = 0;
        while cursor.has_next() {
            let drop_it = match cursor.next() {
                Ok((k, v)) => !keep(k, v),
                Err(_) => break,
            };
            if drop_it && cursor.remove().is_ok() {
                removed += 1;
            }
        }
        removed
    }
}

impl<'a, 'b, K, V> IntoIterator for &'b EntrySet<'a, K, V> {
    type Item = (&'b K, &'b V);
    type IntoIter = Iter<'b, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
