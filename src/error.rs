//! Errors reported by [`RbTree`](crate::RbTree).
//!
//! A missing key is never an error: lookups and deletions report it as `None`.

/// Error returned by tree operations that validate handles or allocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RbTreeError {
    /// The handle refers to a deleted, reused, or sentinel slot.
    InvalidNode { index: usize },
    /// A node was about to be freed while its payload was still attached.
    InvalidDeallocation { index: usize },
    /// Growing the node arena failed.
    OutOfMemory,
    /// The index type cannot address another node.
    CapacityExceeded,
}

impl std::fmt::Display for RbTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNode { index } => write!(f, "invalid red-black tree node at slot {index}"),
            Self::InvalidDeallocation { index } => {
                write!(f, "node at slot {index} still holds a payload")
            }
            Self::OutOfMemory => write!(f, "could not allocate memory"),
            Self::CapacityExceeded => write!(f, "reached maximum number of nodes"),
        }
    }
}

impl std::error::Error for RbTreeError {}
