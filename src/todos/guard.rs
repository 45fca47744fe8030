//! Ownership check composed in front of every mutating todo operation.

use super::Todo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Decide whether `acting_user` may mutate `todo`. Only the owner may.
///
/// Lookup misses never reach this point, callers resolve the todo first and
/// handle the missing case on their own terms (404 for updates, an
/// idempotent `success: false` for deletes).
#[must_use]
pub fn authorize(acting_user: &str, todo: &Todo) -> Access {
    if todo.owner_id == acting_user {
        Access::Allow
    } else {
        Access::Deny
    }
}
