//! Cross-bucket traversal.
//!
//! `Position` is the one place that knows how to walk the bucket array:
//! finish the current chain, then skip forward over absent buckets to the
//! next populated one. Two front ends share it:
//! - `Iter`: read-only, a plain `Iterator`.
//! - `EntryCursor`: mutable, with explicit `has_next`/`next`/`remove` and
//!   the state checks that go with them.

use crate::buckets::Buckets;
use crate::chain::Chain;
use crate::error::TableError;
use core::iter::FusedIterator;

/// Where a traversal stands. Starts before bucket 0.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Position {
    /// Bucket whose chain is being walked, if any.
    current: Option<usize>,
    /// First bucket not yet examined.
    next_bucket: usize,
    /// Offset in the current chain of the next entry to yield.
    offset: usize,
}

impl Position {
    /// True if another entry remains; moves onto the next populated bucket
    /// when the current chain is used up.
    pub(crate) fn has_next<K, V>(&mut self, slots: &[Option<Chain<K, V>>]) -> bool {
        if let Some(b) = self.current {
            if matches!(&slots[b], Some(chain) if self.offset < chain.len()) {
                return true;
            }
        }
        while self.next_bucket < slots.len() {
            let b = self.next_bucket;
            self.next_bucket += 1;
            if matches!(&slots[b], Some(chain) if !chain.is_empty()) {
                self.current = Some(b);
                self.offset = 0;
                return true;
            }
        }
        self.current = None;
        false
    }

    /// Claim the next entry's (bucket, offset) and step past it.
    pub(crate) fn advance<K, V>(&mut self, slots: &[Option<Chain<K, V>>]) -> Option<(usize, usize)> {
        if !self.has_next(slots) {
            return None;
        }
        let b = self.current?;
        let at = self.offset;
        self.offset += 1;
        Some((b, at))
    }

    /// The entry at `(bucket, at)` was removed; if that chain is still the
    /// one being walked, its successor now occupies `at` and is yielded next.
    fn step_back_to(&mut self, bucket: usize, at: usize) {
        if self.current == Some(bucket) {
            self.offset = at;
        }
    }
}

/// Read-only traversal in bucket order, yielding `(&K, &V)`.
pub struct Iter<'a, K, V> {
    slots: &'a [Option<Chain<K, V>>],
    pos: Position,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(buckets: &'a Buckets<K, V>) -> Self {
        Self {
            slots: buckets.slots(),
            pos: Position::default(),
            remaining: buckets.len(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            pos: self.pos,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slots = self.slots;
        let (b, at) = self.pos.advance(slots)?;
        let entry = slots[b].as_ref()?.get(at)?;
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Mutable traversal that can remove the entry it last yielded.
///
/// The cursor borrows the table's storage exclusively, so the table cannot
/// be cleared, grown or dropped while a cursor is alive. A stale cursor is
/// rejected at compile time:
///
/// ```compile_fail
/// use chained_hashtable::ChainedHashTable;
///
/// let mut t = ChainedHashTable::new();
/// t.put("a", 1);
/// let mut cursor = t.cursor();
/// t.clear();
/// let _ = cursor.next();
/// ```
///
/// Used within its borrow, it walks and edits the table:
///
/// ```
/// use chained_hashtable::ChainedHashTable;
///
/// let mut t = ChainedHashTable::new();
/// t.put("a", 1);
/// t.put("b", 2);
/// let mut cursor = t.cursor();
/// while cursor.has_next() {
///     let (k, _) = cursor.next().unwrap();
///     if *k == "a" {
///         cursor.remove().unwrap();
///     }
/// }
/// assert_eq!(t.len(), 1);
/// assert_eq!(t.get("b"), Some(&2));
/// ```
pub struct EntryCursor<'a, K, V> {
    buckets: &'a mut Buckets<K, V>,
    pos: Position,
    last: Option<(usize, usize)>,
}

impl<'a, K, V> EntryCursor<'a, K, V> {
    pub(crate) fn new(buckets: &'a mut Buckets<K, V>) -> Self {
        Self {
            buckets,
            pos: Position::default(),
            last: None,
        }
    }

    /// True if `next` would yield an entry.
    pub fn has_next(&mut self) -> bool {
        self.pos.has_next(self.buckets.slots())
    }

    /// Yield the next entry, with its value writable in place.
    ///
    /// Fails with `TableError::Exhausted` once every entry has been
    /// yielded; the cursor stays exhausted afterwards.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<(&K, &mut V), TableError> {
        let (b, at) = self
            .pos
            .advance(self.buckets.slots())
            .ok_or(TableError::Exhausted)?;
        self.last = Some((b, at));
        let entry = self
            .buckets
            .chain_mut(b)
            .and_then(|chain| chain.get_mut(at))
            .ok_or(TableError::Exhausted)?;
        Ok((&entry.key, &mut entry.value))
    }

    /// Remove the entry most recently yielded by `next` and hand it back.
    ///
    /// Fails with `TableError::IllegalState` if nothing was yielded since
    /// the cursor was created or since the previous removal.
    pub fn remove(&mut self) -> Result<(K, V), TableError> {
        let (b, at) = self.last.ok_or(TableError::IllegalState)?;
        let entry = self
            .buckets
            .remove_at(b, at)
            .ok_or(TableError::IllegalState)?;
        self.last = None;
        self.pos.step_back_to(b, at);
        Ok(entry.into_pair())
    }

    /// Entries currently in the table (not the number left to visit).
    pub fn table_len(&self) -> usize {
        self.buckets.len()
    }
}
