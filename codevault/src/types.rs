//! Common type definitions.
//!
//! Entity ids are database identity columns (`BIGINT`), wrapped in type aliases so signatures say
//! which table an id belongs to.

use std::fmt;

// Type aliases for IDs
pub type UserId = i64;
pub type SnippetId = i64;

/// Actions that are subject to an ownership check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
        }
    }
}
