use std::collections::TryReserveError;
use thiserror::Error;

/// Failures reported by [`TreeMap`](crate::TreeMap).
///
/// A missing key is never an error: lookups and removals report it with
/// `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeMapError {
    /// The map was constructed without a comparator.
    #[error("a tree map cannot be created without a comparator")]
    MissingComparator,

    /// The node arena could not grow. The map is left as it was.
    #[error("failed to allocate tree node: {0}")]
    AllocationFailure(#[from] TryReserveError),

    /// [`TreeMap::check`](crate::TreeMap::check) found a structural defect.
    #[error("tree invariant violated: {0}")]
    BrokenInvariant(String),
}
