//! Debug-only detection of re-entry into a table.
//!
//! User code runs inside table operations only through `K: Hash` and
//! `K: Eq`/`V: PartialEq`. If such an impl reaches back into the same table
//! (through a raw pointer or interior mutability), debug builds panic with
//! a clear message instead of observing a half-updated bucket array.
//! Release builds keep the marker field and nothing else.
//!
//! Only `ChainedHashTable` opens sections. Cursors and `EntrySet` hold an
//! exclusive borrow of the bucket array and call no `Hash`, so nothing can
//! reach back into the table through them. A plain flag is enough because
//! sections never nest legitimately: no operation calls another public
//! operation while one is open.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Per-table flag. Public operations open a section with
/// `let _g = self.reentrancy.enter();`.
#[derive(Debug)]
pub(crate) struct ReentrancyCheck {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // Keeps the owning table !Send + !Sync.
    _single_threaded: PhantomData<*mut ()>,
}

impl ReentrancyCheck {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _single_threaded: PhantomData,
        }
    }

    /// Open a section; in debug builds panics if one is already open.
    #[inline]
    pub(crate) fn enter(&self) -> Section<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrancy detected: table accessed from within its own Hash/Eq callback"
            );
            return Section { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return Section { _owner: PhantomData };
        }
    }
}

impl Default for ReentrancyCheck {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes its section on drop.
pub(crate) struct Section<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ReentrancyCheck,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for Section<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let was_busy = self.owner.busy.replace(false);
            debug_assert!(was_busy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReentrancyCheck;

    #[test]
    fn sequential_sections_are_fine() {
        let r = ReentrancyCheck::new();
        {
            let _g = r.enter();
        }
        let _g = r.enter();
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_section_panics_in_debug() {
        let r = ReentrancyCheck::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter();
            let _inner = r.enter();
        }));
        assert!(res.is_err(), "expected nested entry to panic in debug builds");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_section_is_noop_in_release() {
        let r = ReentrancyCheck::new();
        let _outer = r.enter();
        let _inner = r.enter();
    }
}
