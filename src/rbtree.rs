use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::error::RbTreeError;
use crate::index::{DefaultIx, IndexType, NodeIndex, NodeRef};
use crate::iter::{Iter, Nodes};
use crate::node::{Color, Node};

/// An ordered key-payload container backed by a red-black tree.
///
/// Nodes live in an arena; slot 0 holds the shared black sentinel that stands
/// in for every missing child and for the parent of the root.
#[derive(Debug)]
pub struct RbTree<K, V, Ix = DefaultIx> {
    /// Vector that stores nodes
    pub(crate) nodes: Vec<Node<K, V, Ix>>,
    /// Root of the tree, the sentinel when empty
    pub(crate) root: NodeIndex<Ix>,
    /// Retired slots available for reuse
    pub(crate) free: Vec<NodeIndex<Ix>>,
    /// Number of live nodes
    pub(crate) len: usize,
    /// Stamp handed to the next allocated node
    pub(crate) next_generation: u64,
    /// Process-wide identity carried by every handle this tree gives out
    pub(crate) id: u64,
}

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

impl<K, V, Ix> RbTree<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Creates a new `RbTree` with estimated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = vec![Node::new_sentinel()];
        nodes.reserve(capacity);
        RbTree {
            nodes,
            root: Self::sentinel(),
            free: Vec::new(),
            len: 0,
            next_generation: 0,
            id: NEXT_TREE_ID.fetch_add(1, AtomicOrdering::Relaxed),
        }
    }

    /// Creates a tree holding a single black root.
    ///
    /// # Example
    /// ```rust
    /// use sentinel_rbtree::{Color, RbTree};
    ///
    /// let tree = RbTree::<i32, &str>::with_root(7, "seven");
    /// let root = tree.minimum().unwrap();
    /// assert_eq!(tree.key(root), Ok(&7));
    /// assert_eq!(tree.color(root), Ok(Color::Black));
    /// ```
    #[inline]
    #[must_use]
    pub fn with_root(key: K, payload: V) -> Self {
        let mut tree = Self::with_capacity(1);
        let _root = tree.insert(key, payload);
        tree
    }

    /// Insert a key with its payload and return a handle to the new node.
    ///
    /// Equal keys are kept side by side; a later insert sorts after the earlier ones.
    ///
    /// # Panics
    ///
    /// This method panics when the arena cannot grow or the tree is at the
    /// maximum number of nodes for its index
    ///
    /// # Example
    /// ```rust
    /// use sentinel_rbtree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// let node = tree.insert(3, "three");
    /// assert_eq!(tree.search(&3), Some(node));
    /// assert_eq!(tree.payload(node), Ok(Some(&"three")));
    /// ```
    #[inline]
    pub fn insert(&mut self, key: K, payload: V) -> NodeRef<Ix> {
        match self.try_insert(key, payload) {
            Ok(node) => node,
            Err(err) => panic!("{err}"),
        }
    }

    /// Insert a key with its payload, reporting allocation failures instead of panicking.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::OutOfMemory`] when the arena cannot grow and
    /// [`RbTreeError::CapacityExceeded`] when `Ix` cannot address another node.
    /// The tree is left unchanged in both cases.
    #[inline]
    pub fn try_insert(&mut self, key: K, payload: V) -> Result<NodeRef<Ix>, RbTreeError> {
        let z = self.alloc_node(key, Some(payload))?;
        self.insert_inner(z);
        Ok(self.handle(z))
    }

    /// Remove the node with the given key, returning its payload.
    ///
    /// Returns `None` when the key is absent, leaving the tree untouched.
    ///
    /// # Example
    /// ```rust
    /// use sentinel_rbtree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// tree.insert(1, 'a');
    /// tree.insert(2, 'b');
    /// assert_eq!(tree.delete(&3), None);
    /// assert_eq!(tree.delete(&2), Some('b'));
    /// assert_eq!(tree.search(&2), None);
    /// assert_eq!(tree.len(), 1);
    /// ```
    #[inline]
    pub fn delete(&mut self, key: &K) -> Option<V> {
        let z = self.search_index(key)?;
        self.remove_node(z)
    }

    /// Remove the node behind a handle, returning whatever payload it still holds.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] when the handle was already deleted.
    #[inline]
    pub fn delete_node(&mut self, node: NodeRef<Ix>) -> Result<Option<V>, RbTreeError> {
        let z = self.resolve(node)?;
        Ok(self.remove_node(z))
    }

    /// Search for the node with the given key.
    #[inline]
    pub fn search(&self, key: &K) -> Option<NodeRef<Ix>> {
        self.search_index(key).map(|idx| self.handle(idx))
    }

    /// Return `true` if a node with the given key exists.
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.search_index(key).is_some()
    }

    /// Return a reference to the payload stored under the key.
    ///
    /// # Example
    /// ```rust
    /// use sentinel_rbtree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// tree.insert(10, "ten");
    /// assert_eq!(tree.get(&10), Some(&"ten"));
    /// assert_eq!(tree.get(&11), None);
    /// ```
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.search_index(key)
            .and_then(|idx| self.nodes[idx.index()].payload.as_ref())
    }
}

impl<K, V, Ix> RbTree<K, V, Ix>
where
    Ix: IndexType,
{
    /// Node with the smallest key, `None` for an empty tree.
    #[inline]
    pub fn minimum(&self) -> Option<NodeRef<Ix>> {
        if self.node_ref(self.root, Node::is_sentinel) {
            return None;
        }
        Some(self.handle(self.tree_minimum(self.root)))
    }

    /// Node with the largest key, `None` for an empty tree.
    #[inline]
    pub fn maximum(&self) -> Option<NodeRef<Ix>> {
        if self.node_ref(self.root, Node::is_sentinel) {
            return None;
        }
        Some(self.handle(self.tree_maximum(self.root)))
    }

    /// Node with the smallest key in the subtree rooted at `node`.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    #[inline]
    pub fn subtree_minimum(&self, node: NodeRef<Ix>) -> Result<NodeRef<Ix>, RbTreeError> {
        let x = self.resolve(node)?;
        Ok(self.handle(self.tree_minimum(x)))
    }

    /// Node with the largest key in the subtree rooted at `node`.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    #[inline]
    pub fn subtree_maximum(&self, node: NodeRef<Ix>) -> Result<NodeRef<Ix>, RbTreeError> {
        let x = self.resolve(node)?;
        Ok(self.handle(self.tree_maximum(x)))
    }

    /// In-order successor of `node`, `None` when it holds the largest key.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    ///
    /// # Example
    /// ```rust
    /// use sentinel_rbtree::RbTree;
    ///
    /// let mut tree = RbTree::new();
    /// for k in [10, 4, 20] {
    ///     tree.insert(k, ());
    /// }
    /// let ten = tree.search(&10).unwrap();
    /// let next = tree.successor(ten).unwrap().unwrap();
    /// assert_eq!(tree.key(next), Ok(&20));
    /// assert_eq!(tree.successor(next), Ok(None));
    /// ```
    #[inline]
    pub fn successor(&self, node: NodeRef<Ix>) -> Result<Option<NodeRef<Ix>>, RbTreeError> {
        let mut x = self.resolve(node)?;
        if !self.right_ref(x, Node::is_sentinel) {
            return Ok(Some(self.handle(self.tree_minimum(self.node_ref(x, Node::right)))));
        }
        let mut y = self.node_ref(x, Node::parent);
        while !self.node_ref(y, Node::is_sentinel) && self.node_ref(y, Node::right) == x {
            x = y;
            y = self.node_ref(y, Node::parent);
        }
        Ok(self.live_handle(y))
    }

    /// In-order predecessor of `node`, `None` when it holds the smallest key.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    #[inline]
    pub fn predecessor(&self, node: NodeRef<Ix>) -> Result<Option<NodeRef<Ix>>, RbTreeError> {
        let mut x = self.resolve(node)?;
        if !self.left_ref(x, Node::is_sentinel) {
            return Ok(Some(self.handle(self.tree_maximum(self.node_ref(x, Node::left)))));
        }
        let mut y = self.node_ref(x, Node::parent);
        while !self.node_ref(y, Node::is_sentinel) && self.node_ref(y, Node::left) == x {
            x = y;
            y = self.node_ref(y, Node::parent);
        }
        Ok(self.live_handle(y))
    }

    /// Height of the tree, 0 when empty. Walks every node.
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.height_inner(self.root)
    }

    /// Height of the subtree rooted at `node`.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    #[inline]
    pub fn subtree_height(&self, node: NodeRef<Ix>) -> Result<usize, RbTreeError> {
        let x = self.resolve(node)?;
        Ok(self.height_inner(x))
    }

    /// Check that a handle still refers to a node of this tree.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for handles of deleted nodes,
    /// including handles whose slot has since been reused.
    #[inline]
    pub fn validate(&self, node: NodeRef<Ix>) -> Result<(), RbTreeError> {
        self.resolve(node).map(|_| ())
    }

    /// Key stored in `node`.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    #[inline]
    pub fn key(&self, node: NodeRef<Ix>) -> Result<&K, RbTreeError> {
        let x = self.resolve(node)?;
        self.nodes[x.index()]
            .key
            .as_ref()
            .ok_or(RbTreeError::InvalidNode { index: x.index() })
    }

    /// Payload attached to `node`, `None` once the caller released it.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    #[inline]
    pub fn payload(&self, node: NodeRef<Ix>) -> Result<Option<&V>, RbTreeError> {
        let x = self.resolve(node)?;
        Ok(self.nodes[x.index()].payload.as_ref())
    }

    /// Mutable access to the payload attached to `node`.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    #[inline]
    pub fn payload_mut(&mut self, node: NodeRef<Ix>) -> Result<Option<&mut V>, RbTreeError> {
        let x = self.resolve(node)?;
        Ok(self.nodes[x.index()].payload.as_mut())
    }

    /// Detach the payload from `node`, handing ownership back to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    #[inline]
    pub fn take_payload(&mut self, node: NodeRef<Ix>) -> Result<Option<V>, RbTreeError> {
        let x = self.resolve(node)?;
        Ok(self.node_mut(x, Node::take_payload))
    }

    /// Attach a payload to `node`, returning the one it replaces.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    #[inline]
    pub fn set_payload(&mut self, node: NodeRef<Ix>, payload: V) -> Result<Option<V>, RbTreeError> {
        let x = self.resolve(node)?;
        Ok(self.nodes[x.index()].payload.replace(payload))
    }

    /// Color of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidNode`] for a deleted handle.
    #[inline]
    pub fn color(&self, node: NodeRef<Ix>) -> Result<Color, RbTreeError> {
        let x = self.resolve(node)?;
        Ok(self.node_ref(x, Node::color))
    }

    /// Get an iterator over the entries of the tree, sorted by key.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, Ix> {
        Iter::new(self)
    }

    /// Get an iterator over node handles, sorted by key.
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> Nodes<'_, K, V, Ix> {
        Nodes::new(self)
    }

    /// Free every node, post-order, and leave the tree empty.
    ///
    /// All payloads must have been released with [`take_payload`](Self::take_payload)
    /// (or returned by a deletion) first.
    ///
    /// # Errors
    ///
    /// Returns [`RbTreeError::InvalidDeallocation`] naming a node that still
    /// holds a payload; nothing is freed in that case.
    ///
    /// # Example
    /// ```rust
    /// use sentinel_rbtree::{RbTree, RbTreeError};
    ///
    /// let mut tree = RbTree::new();
    /// let node = tree.insert(1, String::from("one"));
    /// assert!(matches!(tree.destroy(), Err(RbTreeError::InvalidDeallocation { .. })));
    /// assert_eq!(tree.take_payload(node), Ok(Some(String::from("one"))));
    /// assert_eq!(tree.destroy(), Ok(()));
    /// assert!(tree.is_empty());
    /// ```
    pub fn destroy(&mut self) -> Result<(), RbTreeError> {
        if let Some(index) = self
            .nodes
            .iter()
            .position(|node| node.is_live() && node.has_payload())
        {
            tracing::warn!(index, "refusing to destroy a tree with an attached payload");
            return Err(RbTreeError::InvalidDeallocation { index });
        }
        if !self.node_ref(self.root, Node::is_sentinel) {
            self.destroy_subtree(self.root)?;
        }
        tracing::debug!(freed = self.len, "destroyed tree");
        self.reset();
        Ok(())
    }

    /// Remove all elements from the tree, dropping their payloads.
    #[inline]
    pub fn clear(&mut self) {
        tracing::debug!(dropped = self.len, "cleared tree");
        self.reset();
    }

    /// Return the number of elements in the tree.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return `true` if the tree contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> RbTree<K, V>
where
    K: Ord,
{
    /// Create an empty `RbTree`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }
}

impl<K, V> Default for RbTree<K, V>
where
    K: Ord,
{
    #[inline]
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<'a, K, V, Ix> IntoIterator for &'a RbTree<K, V, Ix>
where
    Ix: IndexType,
{
    type Item = (&'a K, Option<&'a V>);
    type IntoIter = Iter<'a, K, V, Ix>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Slot lifecycle
impl<K, V, Ix> RbTree<K, V, Ix>
where
    Ix: IndexType,
{
    /// Get the sentinel node index
    pub(crate) fn sentinel() -> NodeIndex<Ix> {
        NodeIndex::sentinel()
    }

    /// Allocate a detached red node, reusing a retired slot when one is available.
    fn alloc_node(&mut self, key: K, payload: Option<V>) -> Result<NodeIndex<Ix>, RbTreeError> {
        let generation = self.next_generation;
        let node = Node::new_live(key, payload, generation);
        let idx = if let Some(idx) = self.free.pop() {
            self.nodes[idx.index()] = node;
            idx
        } else {
            // index max is reserved, except if we use usize
            if <Ix as IndexType>::max().index() != !0
                && self.nodes.len() >= <Ix as IndexType>::max().index()
            {
                return Err(RbTreeError::CapacityExceeded);
            }
            self.nodes
                .try_reserve(1)
                .map_err(|_| RbTreeError::OutOfMemory)?;
            let idx = NodeIndex::new(self.nodes.len());
            self.nodes.push(node);
            idx
        };
        self.next_generation = generation + 1;
        Ok(idx)
    }

    /// Retire a slot that is no longer linked into the tree.
    fn free_node(&mut self, x: NodeIndex<Ix>) -> Result<(), RbTreeError> {
        if self.node_ref(x, Node::has_payload) {
            tracing::warn!(index = x.index(), "refusing to free a node with an attached payload");
            return Err(RbTreeError::InvalidDeallocation { index: x.index() });
        }
        self.node_mut(x, Node::retire);
        self.free.push(x);
        Ok(())
    }

    /// Post-order walk freeing every node below and including `x`.
    fn destroy_subtree(&mut self, x: NodeIndex<Ix>) -> Result<(), RbTreeError> {
        let left = self.node_ref(x, Node::left);
        let right = self.node_ref(x, Node::right);
        if !self.node_ref(left, Node::is_sentinel) {
            self.destroy_subtree(left)?;
        }
        if !self.node_ref(right, Node::is_sentinel) {
            self.destroy_subtree(right)?;
        }
        self.free_node(x)
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::new_sentinel());
        self.free.clear();
        self.root = Self::sentinel();
        self.len = 0;
    }

    /// Resolve a handle to its slot, rejecting deleted and reused slots.
    fn resolve(&self, node: NodeRef<Ix>) -> Result<NodeIndex<Ix>, RbTreeError> {
        match self.nodes.get(node.index.index()) {
            Some(slot)
                if node.tree == self.id && slot.is_live() && slot.generation == node.generation =>
            {
                Ok(node.index)
            }
            _ => {
                tracing::warn!(?node, "rejected invalid node handle");
                Err(RbTreeError::InvalidNode {
                    index: node.index.index(),
                })
            }
        }
    }

    pub(crate) fn handle(&self, x: NodeIndex<Ix>) -> NodeRef<Ix> {
        NodeRef::new(self.id, x, self.node_ref(x, |xn| xn.generation))
    }

    fn live_handle(&self, x: NodeIndex<Ix>) -> Option<NodeRef<Ix>> {
        (!self.node_ref(x, Node::is_sentinel)).then(|| self.handle(x))
    }
}

// Balancing engine
impl<K, V, Ix> RbTree<K, V, Ix>
where
    K: Ord,
    Ix: IndexType,
{
    /// Link a detached node into the tree and rebalance.
    fn insert_inner(&mut self, z: NodeIndex<Ix>) {
        let mut y = Self::sentinel();
        let mut x = self.root;

        while !self.node_ref(x, Node::is_sentinel) {
            y = x;
            if self.key_less(z, x) {
                x = self.node_ref(x, Node::left);
            } else {
                x = self.node_ref(x, Node::right);
            }
        }
        self.node_mut(z, Node::set_parent(y));
        if self.node_ref(y, Node::is_sentinel) {
            self.root = z;
        } else if self.key_less(z, y) {
            self.node_mut(y, Node::set_left(z));
        } else {
            self.node_mut(y, Node::set_right(z));
        }
        self.node_mut(z, Node::set_color(Color::Red));

        self.insert_fixup(z);

        self.len = self.len.wrapping_add(1);
    }

    /// Search for the node with exact the given key
    fn search_index(&self, key: &K) -> Option<NodeIndex<Ix>> {
        let mut x = self.root;
        while let Some(xk) = self.node_ref(x, Node::key) {
            match key.cmp(xk) {
                Ordering::Less => x = self.node_ref(x, Node::left),
                Ordering::Greater => x = self.node_ref(x, Node::right),
                Ordering::Equal => return Some(x),
            }
        }
        None
    }

    fn key_less(&self, a: NodeIndex<Ix>, b: NodeIndex<Ix>) -> bool {
        self.node_ref(a, Node::key) < self.node_ref(b, Node::key)
    }
}

impl<K, V, Ix> RbTree<K, V, Ix>
where
    Ix: IndexType,
{
    /// Unlink a live node, hand back its payload and retire the slot.
    fn remove_node(&mut self, z: NodeIndex<Ix>) -> Option<V> {
        self.remove_inner(z);
        let payload = self.node_mut(z, Node::take_payload);
        self.node_mut(z, Node::retire);
        self.free.push(z);
        payload
    }

    /// Remove a node from the tree.
    fn remove_inner(&mut self, z: NodeIndex<Ix>) {
        let mut y_orig_color = self.node_ref(z, Node::color);
        let x;
        if self.left_ref(z, Node::is_sentinel) {
            x = self.node_ref(z, Node::right);
            self.transplant(z, x);
        } else if self.right_ref(z, Node::is_sentinel) {
            x = self.node_ref(z, Node::left);
            self.transplant(z, x);
        } else {
            let y = self.tree_minimum(self.node_ref(z, Node::right));
            y_orig_color = self.node_ref(y, Node::color);
            x = self.node_ref(y, Node::right);
            if self.node_ref(y, Node::parent) == z {
                // x may be the sentinel
                self.node_mut(x, Node::set_parent(y));
            } else {
                self.transplant(y, x);
                self.node_mut(y, Node::set_right(self.node_ref(z, Node::right)));
                self.right_mut(y, Node::set_parent(y));
            }
            self.transplant(z, y);
            self.node_mut(y, Node::set_left(self.node_ref(z, Node::left)));
            self.left_mut(y, Node::set_parent(y));
            self.node_mut(y, Node::set_color(self.node_ref(z, Node::color)));
        }

        if matches!(y_orig_color, Color::Black) {
            self.remove_fixup(x);
        }
        // the sentinel's parent only matters while fixing up
        self.node_mut(Self::sentinel(), Node::set_parent(Self::sentinel()));

        self.len = self.len.wrapping_sub(1);
    }

    /// Restore red-black tree properties after an insert.
    fn insert_fixup(&mut self, mut z: NodeIndex<Ix>) {
        while self.parent_ref(z, Node::is_red) {
            if self.is_left_child(self.node_ref(z, Node::parent)) {
                let y = self.grand_parent_ref(z, Node::right);
                if self.node_ref(y, Node::is_red) {
                    tracing::trace!(node = z.index(), "insert fixup: red uncle, recolor");
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.node_mut(y, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    z = self.parent_ref(z, Node::parent);
                } else {
                    if self.is_right_child(z) {
                        tracing::trace!(node = z.index(), "insert fixup: inner child");
                        z = self.node_ref(z, Node::parent);
                        self.left_rotate(z);
                    }
                    tracing::trace!(node = z.index(), "insert fixup: outer child");
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    self.right_rotate(self.parent_ref(z, Node::parent));
                }
            } else {
                let y = self.grand_parent_ref(z, Node::left);
                if self.node_ref(y, Node::is_red) {
                    tracing::trace!(node = z.index(), "insert fixup: red uncle, recolor");
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.node_mut(y, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    z = self.parent_ref(z, Node::parent);
                } else {
                    if self.is_left_child(z) {
                        tracing::trace!(node = z.index(), "insert fixup: inner child");
                        z = self.node_ref(z, Node::parent);
                        self.right_rotate(z);
                    }
                    tracing::trace!(node = z.index(), "insert fixup: outer child");
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    self.left_rotate(self.parent_ref(z, Node::parent));
                }
            }
        }
        self.node_mut(self.root, Node::set_color(Color::Black));
    }

    /// Restore red-black tree properties after a remove.
    ///
    /// `x` carries the extra black; it may be the sentinel, whose parent was
    /// set by the preceding transplant.
    fn remove_fixup(&mut self, mut x: NodeIndex<Ix>) {
        while x != self.root && self.node_ref(x, Node::is_black) {
            let mut w;
            if self.is_left_child(x) {
                w = self.parent_ref(x, Node::right);
                if self.node_ref(w, Node::is_red) {
                    tracing::trace!(node = x.index(), "remove fixup: red sibling");
                    self.node_mut(w, Node::set_color(Color::Black));
                    self.parent_mut(x, Node::set_color(Color::Red));
                    self.left_rotate(self.node_ref(x, Node::parent));
                    w = self.parent_ref(x, Node::right);
                }
                debug_assert!(!self.node_ref(w, Node::is_sentinel));
                if self.left_ref(w, Node::is_black) && self.right_ref(w, Node::is_black) {
                    tracing::trace!(node = x.index(), "remove fixup: black nephews");
                    self.node_mut(w, Node::set_color(Color::Red));
                    x = self.node_ref(x, Node::parent);
                } else {
                    if self.right_ref(w, Node::is_black) {
                        tracing::trace!(node = x.index(), "remove fixup: red inner nephew");
                        self.left_mut(w, Node::set_color(Color::Black));
                        self.node_mut(w, Node::set_color(Color::Red));
                        self.right_rotate(w);
                        w = self.parent_ref(x, Node::right);
                    }
                    tracing::trace!(node = x.index(), "remove fixup: red outer nephew");
                    self.node_mut(w, Node::set_color(self.parent_ref(x, Node::color)));
                    self.parent_mut(x, Node::set_color(Color::Black));
                    self.right_mut(w, Node::set_color(Color::Black));
                    self.left_rotate(self.node_ref(x, Node::parent));
                    x = self.root;
                }
            } else {
                w = self.parent_ref(x, Node::left);
                if self.node_ref(w, Node::is_red) {
                    tracing::trace!(node = x.index(), "remove fixup: red sibling");
                    self.node_mut(w, Node::set_color(Color::Black));
                    self.parent_mut(x, Node::set_color(Color::Red));
                    self.right_rotate(self.node_ref(x, Node::parent));
                    w = self.parent_ref(x, Node::left);
                }
                debug_assert!(!self.node_ref(w, Node::is_sentinel));
                if self.right_ref(w, Node::is_black) && self.left_ref(w, Node::is_black) {
                    tracing::trace!(node = x.index(), "remove fixup: black nephews");
                    self.node_mut(w, Node::set_color(Color::Red));
                    x = self.node_ref(x, Node::parent);
                } else {
                    if self.left_ref(w, Node::is_black) {
                        tracing::trace!(node = x.index(), "remove fixup: red inner nephew");
                        self.right_mut(w, Node::set_color(Color::Black));
                        self.node_mut(w, Node::set_color(Color::Red));
                        self.left_rotate(w);
                        w = self.parent_ref(x, Node::left);
                    }
                    tracing::trace!(node = x.index(), "remove fixup: red outer nephew");
                    self.node_mut(w, Node::set_color(self.parent_ref(x, Node::color)));
                    self.parent_mut(x, Node::set_color(Color::Black));
                    self.left_mut(w, Node::set_color(Color::Black));
                    self.right_rotate(self.node_ref(x, Node::parent));
                    x = self.root;
                }
            }
        }
        self.node_mut(x, Node::set_color(Color::Black));
    }

    /// Binary tree left rotate. `x` must have a right child.
    pub(crate) fn left_rotate(&mut self, x: NodeIndex<Ix>) {
        debug_assert!(!self.right_ref(x, Node::is_sentinel), "left rotate without right child");
        if self.right_ref(x, Node::is_sentinel) {
            return;
        }
        let y = self.node_ref(x, Node::right);
        self.node_mut(x, Node::set_right(self.node_ref(y, Node::left)));
        if !self.left_ref(y, Node::is_sentinel) {
            self.left_mut(y, Node::set_parent(x));
        }

        self.replace_parent(x, y);
        self.node_mut(y, Node::set_left(x));
    }

    /// Binary tree right rotate. `x` must have a left child.
    pub(crate) fn right_rotate(&mut self, x: NodeIndex<Ix>) {
        debug_assert!(!self.left_ref(x, Node::is_sentinel), "right rotate without left child");
        if self.left_ref(x, Node::is_sentinel) {
            return;
        }
        let y = self.node_ref(x, Node::left);
        self.node_mut(x, Node::set_left(self.node_ref(y, Node::right)));
        if !self.right_ref(y, Node::is_sentinel) {
            self.right_mut(y, Node::set_parent(x));
        }

        self.replace_parent(x, y);
        self.node_mut(y, Node::set_right(x));
    }

    /// Replace parent during a rotation.
    fn replace_parent(&mut self, x: NodeIndex<Ix>, y: NodeIndex<Ix>) {
        self.node_mut(y, Node::set_parent(self.node_ref(x, Node::parent)));
        if self.parent_ref(x, Node::is_sentinel) {
            self.root = y;
        } else if self.is_left_child(x) {
            self.parent_mut(x, Node::set_left(y));
        } else {
            self.parent_mut(x, Node::set_right(y));
        }
        self.node_mut(x, Node::set_parent(y));
    }

    /// Replace one subtree as a child of its parent with another subtree.
    ///
    /// `v`'s parent is set even when `v` is the sentinel.
    fn transplant(&mut self, u: NodeIndex<Ix>, v: NodeIndex<Ix>) {
        if self.parent_ref(u, Node::is_sentinel) {
            self.root = v;
        } else if self.is_left_child(u) {
            self.parent_mut(u, Node::set_left(v));
        } else {
            self.parent_mut(u, Node::set_right(v));
        }
        self.node_mut(v, Node::set_parent(self.node_ref(u, Node::parent)));
    }

    /// Find the node with the minimum key.
    fn tree_minimum(&self, mut x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        while !self.left_ref(x, Node::is_sentinel) {
            x = self.node_ref(x, Node::left);
        }
        x
    }

    /// Find the node with the maximum key.
    fn tree_maximum(&self, mut x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        while !self.right_ref(x, Node::is_sentinel) {
            x = self.node_ref(x, Node::right);
        }
        x
    }

    fn height_inner(&self, x: NodeIndex<Ix>) -> usize {
        if self.node_ref(x, Node::is_sentinel) {
            return 0;
        }
        let lefth = self.height_inner(self.node_ref(x, Node::left));
        let righth = self.height_inner(self.node_ref(x, Node::right));
        1 + lefth.max(righth)
    }

    /// Check if a node is a left child of its parent.
    fn is_left_child(&self, node: NodeIndex<Ix>) -> bool {
        self.parent_ref(node, Node::left) == node
    }

    /// Check if a node is a right child of its parent.
    fn is_right_child(&self, node: NodeIndex<Ix>) -> bool {
        self.parent_ref(node, Node::right) == node
    }
}

// Convenient methods for reference or mutate current/parent/left/right node
impl<'a, K, V, Ix> RbTree<K, V, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn node_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<K, V, Ix>) -> R,
    {
        op(&self.nodes[node.index()])
    }

    pub(crate) fn node_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<K, V, Ix>) -> R,
    {
        op(&mut self.nodes[node.index()])
    }

    pub(crate) fn left_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<K, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].left().index();
        op(&self.nodes[idx])
    }

    pub(crate) fn right_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<K, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].right().index();
        op(&self.nodes[idx])
    }

    fn parent_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<K, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].parent().index();
        op(&self.nodes[idx])
    }

    fn grand_parent_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<K, V, Ix>) -> R,
    {
        let parent_idx = self.nodes[node.index()].parent().index();
        let grand_parent_idx = self.nodes[parent_idx].parent().index();
        op(&self.nodes[grand_parent_idx])
    }

    fn left_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<K, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].left().index();
        op(&mut self.nodes[idx])
    }

    fn right_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<K, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].right().index();
        op(&mut self.nodes[idx])
    }

    fn parent_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<K, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].parent().index();
        op(&mut self.nodes[idx])
    }

    fn grand_parent_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<K, V, Ix>) -> R,
    {
        let parent_idx = self.nodes[node.index()].parent().index();
        let grand_parent_idx = self.nodes[parent_idx].parent().index();
        op(&mut self.nodes[grand_parent_idx])
    }
}
