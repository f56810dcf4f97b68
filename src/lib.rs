//! chained-hashtable: a single-threaded hash table using separate chaining,
//! load-factor growth, and a live entry view whose cursor can remove the
//! entry it just yielded.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a map that does its own bucket addressing and collision
//!   handling instead of delegating to a library hash map.
//! - Layers:
//!   - Chain<K, V>: newest-first collision list for one bucket; linear
//!     search by key, removal by position.
//!   - Buckets<K, V>: array of `Option<Chain>` plus the entry count; owns
//!     the put path and growth (`2C + 1` buckets once `len > 1.5 C`).
//!   - Position / Iter / EntryCursor: the one traversal of the array, in
//!     read-only and removal-capable forms.
//!   - ChainedHashTable<K, V, S>: public API; wraps `Buckets` with the
//!     hasher and a debug-only reentrancy check.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (marker in the reentrancy check).
//! - Keys are unique; `put` on an existing key replaces the value in place.
//! - A stored chain is never empty. `None` is the only representation of
//!   an unused bucket, so lookups stop at the bucket without scanning.
//! - `clear` returns to `DEFAULT_CAPACITY` buckets, not the grown size.
//!
//! Traversal
//! - Bucket order, then chain order. Bucket 0 is visited.
//! - `EntryCursor::remove` detaches the entry last yielded by `next` and
//!   rewinds the chain offset by one, so the successor is yielded next.
//! - `remove`, `contains_key` and `contains_value` all go through this
//!   traversal and therefore cost O(len); `get`, `get_mut` and `put`
//!   address the bucket directly.
//!
//! Hashing
//! - One `BuildHasher` reduces keys to `u64`; the bucket is `hash % C`.
//! - Each entry keeps the hash computed when it was inserted. Growth places
//!   entries by that stored hash, so `K: Hash` runs once per `put` and a
//!   panicking `Hash` can only abort the `put` that called it.
//! - The default, `FixedState`, is unkeyed: placement, iteration order and
//!   `Display` output are reproducible within one build.
//!
//! Errors
//! - Absence is `None`. Cursor misuse (`next` past the end, `remove`
//!   without a yielded entry) and the unsupported operations (`put_all`,
//!   `values`) return `TableError`.
//!
//! Notes and non-goals
//! - No concurrent access, no persistence, no ordering between keys.
//! - Equality compares key/value pairs; `hash_code` sums key hashes only.

mod buckets;
mod chain;
mod cursor;
mod entry;
mod entry_set;
mod error;
mod hash_table;
mod hash_table_proptest;
mod reentrancy;

// Public surface
pub use buckets::{DEFAULT_CAPACITY, LOAD_THRESHOLD};
pub use cursor::{EntryCursor, Iter};
pub use entry_set::EntrySet;
pub use error::{Operation, TableError};
pub use hash_table::{ChainedHashTable, FixedState};
