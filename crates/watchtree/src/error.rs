#![forbid(unsafe_code)]

//! Error types for watchable-tree operations.

use std::fmt;

/// Errors from building, reading, writing, or watching a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    /// The factory was handed a scalar; only maps and lists can be watched.
    NotAnObject {
        /// Kind name of the rejected value (e.g. `"int"`, `"string"`).
        kind: &'static str,
    },
    /// An initial-watch binding failed validation. No bindings from the same
    /// call were applied.
    InvalidBinding { route: String, reason: String },
    /// A route segment did not resolve to a structured value.
    PathNotFound { route: String, segment: String },
    /// A non-numeric segment addressed a list.
    InvalidIndex { segment: String },
    /// A list write landed past the append position.
    IndexOutOfBounds { index: usize, len: usize },
}

impl fmt::Display for WatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { kind } => {
                write!(f, "watchable target must be a map or list, got {kind}")
            }
            Self::InvalidBinding { route, reason } => {
                write!(f, "invalid watch binding for route '{route}': {reason}")
            }
            Self::PathNotFound { route, segment } => {
                write!(f, "route '{route}' does not resolve: segment '{segment}' not found")
            }
            Self::InvalidIndex { segment } => {
                write!(f, "segment '{segment}' is not a valid list index")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "list index {index} out of bounds (len {len})")
            }
        }
    }
}

impl std::error::Error for WatchError {}
