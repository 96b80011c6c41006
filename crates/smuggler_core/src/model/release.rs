//! Release domain model.
//!
//! # Responsibility
//! - Define the release record used as the dataset container.
//!
//! # Invariants
//! - `tag_name` is the cache key and never changes for a cached release.
//! - Only `body` is mutated after creation, and only after a confirmed remote
//!   update.

/// Opaque hosting-platform identifier of one release.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type ReleaseId = u64;

/// One tagged release whose note body is used as a document store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Platform id required by the edit endpoint.
    pub id: ReleaseId,
    /// Tag the release is attached to.
    pub tag_name: String,
    /// Free-form markdown note text.
    pub body: String,
}

impl Release {
    /// Creates a release record from its remote parts.
    pub fn new(id: ReleaseId, tag_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            tag_name: tag_name.into(),
            body: body.into(),
        }
    }
}
