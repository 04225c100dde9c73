//! `sentinel_rbtree` is an ordered key-payload index based on a red-black tree.
//!
//! Insertion, deletion, lookup, and single-step ordered traversal
//! (minimum, maximum, successor, predecessor) all run in O(logN) worst-case time.
//!
//! Nodes are stored in an arena and linked by indices. Slot 0 holds a single
//! black sentinel that stands in for every missing child and for the parent of
//! the root, so the balancing code never branches on an absent link. Handles
//! returned to the caller carry the identity of their tree and a generation
//! stamp: once a node is deleted its handle is rejected with
//! [`RbTreeError::InvalidNode`], even if the slot is later reused, and a handle
//! from one tree is never accepted by another.
//!
//! Payloads belong to the caller. The tree only stores them, hands them back on
//! deletion, and refuses to [`destroy`](RbTree::destroy) itself while any node
//! still holds one.
//!
//! # Example
//!
//! ```rust
//! use sentinel_rbtree::RbTree;
//!
//! let mut tree = RbTree::new();
//! for key in [10, 4, 20, -4, 100, 101, 13] {
//!     tree.insert(key, key * 2);
//! }
//! let keys: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
//! assert_eq!(keys, [-4, 4, 10, 13, 20, 100, 101]);
//!
//! let twenty = tree.search(&20).unwrap();
//! let next = tree.successor(twenty).unwrap().unwrap();
//! assert_eq!(tree.key(next), Ok(&100));
//! assert_eq!(tree.delete(&100), Some(200));
//! ```
//!

mod error;
#[cfg(feature = "graphviz")]
mod graphviz;
mod index;
mod iter;
mod node;
mod rbtree;


pub use error::RbTreeError;
pub use index::{DefaultIx, IndexType, NodeRef};
pub use iter::{Iter, Nodes};
pub use node::Color;
pub use rbtree::RbTree;
