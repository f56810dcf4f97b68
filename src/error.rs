//! Failure conditions surfaced by the table and its cursor.
//!
//! Absence of a key or value is not an error; lookups return `Option`.

use core::fmt;
use thiserror::Error;

/// Operations the table deliberately does not provide.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Operation {
    PutAll,
    Values,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::PutAll => f.write_str("put_all"),
            Operation::Values => f.write_str("values"),
        }
    }
}

#[derive(Error, Copy, Clone, Debug, Eq, PartialEq)]
pub enum TableError {
    /// `next` was called on a cursor with no remaining entries.
    #[error("iteration exhausted: no entries remain")]
    Exhausted,
    /// `remove` was called without an entry yielded since construction or
    /// since the previous removal.
    #[error("illegal cursor state: no entry has been yielded since the last removal")]
    IllegalState,
    #[error("operation `{0}` is not supported")]
    Unsupported(Operation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            TableError::Unsupported(Operation::PutAll).to_string(),
            "operation `put_all` is not supported"
        );
        assert_eq!(
            TableError::Unsupported(Operation::Values).to_string(),
            "operation `values` is not supported"
        );
        assert!(TableError::Exhausted.to_string().contains("exhausted"));
        assert!(TableError::IllegalState.to_string().contains("illegal"));
    }

    #[test]
    fn unsupported_is_distinct_from_cursor_errors() {
        let e = TableError::Unsupported(Operation::Values);
        assert_ne!(e, TableError::Exhausted);
        assert_ne!(e, TableError::IllegalState);
        assert!(matches!(e, TableError::Unsupported(Operation::Values)));
    }
}
