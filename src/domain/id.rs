//! Content-derived task identity
//!
//! A task id is the lowercase hex SHA-1 of the task text, truncated to a
//! fixed length (5 characters by default). The id is a pure function of the
//! text: identical text always yields the same id, regardless of group or
//! creation time. Truncation trades uniqueness for short ids; collisions
//! are surfaced as `Conflict` at task creation/edit, never overwritten.

use sha1::{Digest, Sha1};

/// Default number of hex characters kept from the digest
///
/// At this length a collision is expected after roughly a thousand distinct
/// texts (birthday bound over 16^5 values). Raise `task_id_length` in the
/// configuration if that is too tight.
pub const DEFAULT_ID_LENGTH: usize = 5;

/// Derives the id for a task from its text
///
/// `length` is clamped to the full digest width (40 hex characters).
pub fn derive_task_id(text: &str, length: usize) -> String {
    let digest = Sha1::digest(text.as_bytes());
    let hex = hex::encode(digest);
    let length = length.min(hex.len());
    hex[..length].to_string()
}
