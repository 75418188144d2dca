//! Snippet ownership rules.
//!
//! Owners may read and update their snippets. Anyone, anonymous callers included, may read a
//! public snippet. A private snippet is reported as missing to everyone but its owner, so its
//! existence is not revealed.

use crate::{
    api::models::users::CurrentUser,
    db::models::snippets::SnippetDBResponse,
    errors::{Error, Result},
    types::{Operation, UserId},
};

pub fn is_owner(caller: Option<&CurrentUser>, owner_id: UserId) -> bool {
    caller.is_some_and(|user| user.id == owner_id)
}

pub fn can_read_snippet(caller: Option<&CurrentUser>, snippet: &SnippetDBResponse) -> bool {
    snippet.is_public || is_owner(caller, snippet.user_id)
}

/// Fails with `NotFound` unless the caller may read the snippet.
pub fn require_read(caller: Option<&CurrentUser>, snippet: &SnippetDBResponse) -> Result<()> {
    if can_read_snippet(caller, snippet) {
        Ok(())
    } else {
        Err(Error::NotFound {
            resource: "Snippet".to_string(),
            id: snippet.id.to_string(),
        })
    }
}

/// Fails with `Forbidden` unless the caller owns the snippet.
pub fn require_owner(caller: &CurrentUser, snippet: &SnippetDBResponse, action: Operation) -> Result<()> {
    if caller.id == snippet.user_id {
        Ok(())
    } else {
        Err(Error::Forbidden {
            action,
            resource: format!("snippet {}", snippet.id),
        })
    }
}
