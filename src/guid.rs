//! Identifier generation for image records.

use uuid::Uuid;

/// Generate a fresh GUID: a random v4 UUID rendered as 32 lowercase hex
/// characters with no hyphens.
#[must_use]
pub fn make_guid() -> String {
    Uuid::new_v4().simple().to_string()
}
