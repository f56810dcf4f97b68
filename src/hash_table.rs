//! ChainedHashTable: public map API over `Buckets`, with a debug reentrancy
//! check around every operation that calls user `Hash`/`Eq` code.

use crate::buckets::{Buckets, DEFAULT_CAPACITY};
use crate::cursor::{EntryCursor, Iter};
use crate::entry_set::EntrySet;
use crate::error::{Operation, TableError};
use crate::reentrancy::ReentrancyCheck;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, BuildHasherDefault, Hash, Hasher};
use hashbrown::HashSet;
use std::collections::hash_map::DefaultHasher;

/// Default hash builder. Unkeyed, so placement and iteration order repeat
/// from run to run within one build. `DefaultHasher`'s algorithm may change
/// between Rust releases, so the order is not stable across toolchains.
pub type FixedState = BuildHasherDefault<DefaultHasher>;

pub struct ChainedHashTable<K, V, S = FixedState> {
    hasher: S,
    buckets: Buckets<K, V>,
    reentrancy: ReentrancyCheck,
}

impl<K, V> ChainedHashTable<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V, S> Default for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ChainedHashTable<K, V, S> {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.len() == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.buckets.len() as f64 / self.buckets.capacity() as f64
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Entries in bucket order; each chain newest first.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.buckets)
    }

    /// Drop every entry and go back to `DEFAULT_CAPACITY` buckets, whatever
    /// the table had grown to.
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter();
        log::trace!(
            "clear: dropping {} entries, {} -> {} buckets",
            self.buckets.len(),
            self.buckets.capacity(),
            DEFAULT_CAPACITY
        );
        self.buckets = Buckets::with_capacity(DEFAULT_CAPACITY);
    }

    /// Live view of the entries. Removing through its cursor removes from
    /// this table.
    pub fn entry_set(&mut self) -> EntrySet<'_, K, V> {
        EntrySet::new(&mut self.buckets)
    }

    #[cfg(test)]
    pub(crate) fn buckets_for_test(&self) -> &Buckets<K, V> {
        &self.buckets
    }

    /// Shortcut for `entry_set().cursor()`.
    pub fn cursor(&mut self) -> EntryCursor<'_, K, V> {
        EntryCursor::new(&mut self.buckets)
    }

    /// Not provided: bulk insertion always fails with
    /// `TableError::Unsupported` and leaves the table untouched.
    pub fn put_all<I>(&mut self, _entries: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Err(TableError::Unsupported(Operation::PutAll))
    }

    /// Not provided: a values collection always fails with
    /// `TableError::Unsupported`.
    pub fn values(&self) -> Result<Vec<&V>, TableError> {
        Err(TableError::Unsupported(Operation::Values))
    }

    /// True if some entry holds a value equal to `value`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let _g = self.reentrancy.enter();
        self.iter().any(|(_, v)| v == value)
    }
}

impl<K, V, S> ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            buckets: Buckets::with_capacity(DEFAULT_CAPACITY),
            reentrancy: ReentrancyCheck::new(),
        }
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.buckets.find(&self.hasher, q).map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.buckets
            .find_mut(&self.hasher, q)
            .map(|e| &mut e.value)
    }

    /// Insert or replace. Returns the previous value for `key`, if any.
    ///
    /// A new key may grow the table to `2 * capacity + 1` buckets once
    /// `len` exceeds `LOAD_THRESHOLD * capacity`; replacing a value never
    /// does.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        self.buckets.put(&self.hasher, key, value)
    }

    /// Remove `key` and return its value.
    ///
    /// The key is located by walking the entry cursor from the first
    /// bucket, so this costs O(len) rather than O(chain).
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let _g = self.reentrancy.enter();
        let mut cursor = EntryCursor::new(&mut self.buckets);
        while cursor.has_next() {
            let hit = matches!(cursor.next(), Ok((k, _)) if k.borrow() == q);
            if hit {
                return cursor.remove().ok().map(|(_, v)| v);
            }
        }
        None
    }

    /// Full traversal comparing keys.
    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let _g = self.reentrancy.enter();
        self.iter().any(|(k, _)| k.borrow() == q)
    }

    /// Snapshot of the keys; later changes to the table do not show up in it.
    pub fn key_set(&self) -> HashSet<K>
    where
        K: Clone,
    {
        let _g = self.reentrancy.enter();
        let mut keys = HashSet::with_capacity(self.len());
        keys.extend(self.iter().map(|(k, _)| k.clone()));
        keys
    }

    /// `1` plus the wrapping sum of every key's hash. Independent of
    /// iteration order and of the values.
    pub fn hash_code(&self) -> u64 {
        let _g = self.reentrancy.enter();
        self.iter()
            .fold(1u64, |acc, (k, _)| acc.wrapping_add(self.hasher.hash_one(k)))
    }
}

impl<K, V, S> Clone for ChainedHashTable<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            buckets: self.buckets.clone(),
            reentrancy: ReentrancyCheck::new(),
        }
    }
}

/// Same length, and every key of `self` maps to an equal value in `other`.
impl<K, V, S> PartialEq for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        if self.len() != other.len() {
            return false;
        }
        let _g = self.reentrancy.enter();
        self.iter()
            .all(|(k, v)| other.get(k).is_some_and(|ov| v == ov))
    }
}

impl<K, V, S> Eq for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, V, S> Hash for ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

/// `key=value` per entry, each followed by a space, with one more space
/// after every populated bucket.
impl<K, V, S> fmt::Display for ChainedHashTable<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chain in self.buckets.slots().iter().flatten() {
            for entry in chain.iter() {
                write!(f, "{} ", entry)?;
            }
            f.write_str(" ")?;
        }
        Ok(())
    }
}

impl<K, V, S> fmt::Debug for ChainedHashTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainedHashTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LOAD_THRESHOLD;
    use std::collections::BTreeSet;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        } // every key lands in bucket 0
    }

    /// Invariant: put/get round-trip; replacing returns the old value and
    /// keeps the count.
    #[test]
    fn put_get_replace() {
        let mut t: ChainedHashTable<String, i32> = ChainedHashTable::new();
        assert!(t.is_empty());
        assert_eq!(t.put("a".to_string(), 1), None);
        assert_eq!(t.put("b".to_string(), 2), None);
        assert_eq!(t.put("a".to_string(), 3), Some(1));
        assert_eq!(t.get("a"), Some(&3));
        assert_eq!(t.len(), 2);
        assert!(t.contains_value(&2));
        assert!(!t.contains_value(&99));
        assert_eq!(t.get("zzz"), None);
    }

    /// Invariant: lookups work when every key collides; equality picks the
    /// right entry and bucket 0 is iterated.
    #[test]
    fn collision_handling_with_const_hasher() {
        let mut t: ChainedHashTable<String, i32, ConstBuildHasher> =
            ChainedHashTable::with_hasher(ConstBuildHasher);
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            t.put((*k).to_string(), i as i32);
        }
        assert_eq!(t.get("a"), Some(&0));
        assert_eq!(t.get("d"), Some(&3));
        assert_eq!(t.iter().count(), 4);
        assert!(t.contains_key("c"));
        assert_eq!(t.remove("b"), Some(1));
        assert_eq!(t.get("b"), None);
        assert_eq!(t.len(), 3);
        // Newest first within the single chain.
        let keys: Vec<&str> = t.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["d", "c", "a"]);
    }

    /// Invariant: rendering is bucket by bucket, chain newest first.
    #[test]
    fn display_single_bucket() {
        let mut t: ChainedHashTable<&str, i32, ConstBuildHasher> =
            ChainedHashTable::with_hasher(ConstBuildHasher);
        assert_eq!(t.to_string(), "");
        t.put("a", 1);
        t.put("b", 2);
        assert_eq!(t.to_string(), "b=2 a=1  ");
        assert_eq!(format!("{:?}", t), r#"{"b": 2, "a": 1}"#);
    }

    /// Invariant: the load factor stays at or under the threshold after
    /// every insertion.
    #[test]
    fn load_factor_bounded_after_each_put() {
        let mut t: ChainedHashTable<u32, u32> = ChainedHashTable::new();
        for k in 0..2_000 {
            t.put(k, k);
            assert!(t.load_factor() <= LOAD_THRESHOLD, "after {} keys", k + 1);
        }
        assert_eq!(t.capacity(), 1_631); // 101 -> 203 -> 407 -> 815 -> 1631
    }

    #[test]
    fn get_mut_writes_through() {
        let mut t: ChainedHashTable<&str, Vec<i32>> = ChainedHashTable::new();
        t.put("k", vec![1]);
        t.get_mut("k").expect("present").push(2);
        assert_eq!(t.get("k"), Some(&vec![1, 2]));
        assert!(t.get_mut("missing").is_none());
    }

    #[test]
    fn key_set_is_a_snapshot() {
        let mut t: ChainedHashTable<String, i32> = ChainedHashTable::new();
        t.put("x".to_string(), 1);
        t.put("y".to_string(), 2);
        let keys = t.key_set();
        t.put("z".to_string(), 3);
        t.remove("x");
        let sorted: BTreeSet<&str> = keys.iter().map(String::as_str).collect();
        assert_eq!(sorted, BTreeSet::from(["x", "y"]));
    }

    /// Invariant: equality pairs keys with values; same values under
    /// different keys are not equal.
    #[test]
    fn equality_pairs_keys_and_values() {
        let mut a: ChainedHashTable<&str, i32> = ChainedHashTable::new();
        let mut b: ChainedHashTable<&str, i32> = ChainedHashTable::new();
        a.put("x", 1);
        a.put("y", 2);
        b.put("y", 2);
        b.put("x", 1);
        assert_eq!(a, b);

        let mut swapped: ChainedHashTable<&str, i32> = ChainedHashTable::new();
        swapped.put("x", 2);
        swapped.put("y", 1);
        assert_ne!(a, swapped);

        b.put("z", 3);
        assert_ne!(a, b);
    }

    /// Invariant: hash_code is 1 + sum of key hashes; values and insertion
    /// order do not matter.
    #[test]
    fn hash_code_ignores_values_and_order() {
        let empty: ChainedHashTable<&str, i32> = ChainedHashTable::new();
        assert_eq!(empty.hash_code(), 1);

        let mut a: ChainedHashTable<&str, i32> = ChainedHashTable::new();
        let mut b: ChainedHashTable<&str, i32> = ChainedHashTable::new();
        a.put("p", 1);
        a.put("q", 2);
        b.put("q", 20);
        b.put("p", 10);
        assert_eq!(a.hash_code(), b.hash_code());

        let h = FixedState::default();
        let expected = 1u64
            .wrapping_add(h.hash_one("p"))
            .wrapping_add(h.hash_one("q"));
        assert_eq!(a.hash_code(), expected);
    }

    #[test]
    fn clone_is_independent() {
        let mut a: ChainedHashTable<u8, u8> = ChainedHashTable::new();
        a.put(1, 1);
        let mut b = a.clone();
        b.put(2, 2);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 2);
        assert_eq!(b.get(&1), Some(&1));
    }

    /// Invariant (debug-only): re-entering the table from a key's `Eq`
    /// during a lookup panics due to the reentrancy check.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_eq_during_get() {
        struct ReentryKey {
            id: &'static str,
            table: *const ChainedHashTable<ReentryKey, i32, ConstBuildHasher>,
            trigger: bool,
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                if self.id == other.id {
                    return true;
                }
                if other.trigger {
                    // Reach back into the table while it is probing.
                    unsafe {
                        let t = &*other.table;
                        let _ = t.len();
                        let _ = t.contains_value(&0);
                    }
                }
                false
            }
        }
        impl Eq for ReentryKey {}
        impl Hash for ReentryKey {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        let mut t: ChainedHashTable<ReentryKey, i32, ConstBuildHasher> =
            ChainedHashTable::with_hasher(ConstBuildHasher);
        t.put(
            ReentryKey {
                id: "a",
                table: core::ptr::null(),
                trigger: false,
            },
            1,
        );
        let query = ReentryKey {
            id: "b",
            table: &t as *const _,
            trigger: true,
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = t.get(&query);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }
}
