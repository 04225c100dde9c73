use crate::index::{IndexType, NodeIndex};

/// Node of the red-black tree
#[derive(Debug)]
pub struct Node<K, V, Ix> {
    /// Left children
    pub left: NodeIndex<Ix>,
    /// Right children
    pub right: NodeIndex<Ix>,
    /// Parent
    pub parent: NodeIndex<Ix>,
    /// Color of the node
    pub color: Color,

    /// Key of the node, `None` for the sentinel and retired slots
    pub key: Option<K>,
    /// Caller-owned payload, cleared once the caller releases it
    pub payload: Option<V>,
    /// Lifecycle state of the slot
    pub state: NodeState,
    /// Allocation stamp matched against `NodeRef::generation`
    pub generation: u64,
}

impl<K, V, Ix> Node<K, V, Ix>
where
    Ix: IndexType,
{
    /// The shared sentinel: black, keyless, linked to itself.
    pub fn new_sentinel() -> Self {
        Node {
            left: NodeIndex::sentinel(),
            right: NodeIndex::sentinel(),
            parent: NodeIndex::sentinel(),
            color: Color::Black,
            key: None,
            payload: None,
            state: NodeState::Sentinel,
            generation: 0,
        }
    }

    /// A detached red node whose links all point at the sentinel.
    pub fn new_live(key: K, payload: Option<V>, generation: u64) -> Self {
        Node {
            left: NodeIndex::sentinel(),
            right: NodeIndex::sentinel(),
            parent: NodeIndex::sentinel(),
            color: Color::Red,
            key: Some(key),
            payload,
            state: NodeState::Live,
            generation,
        }
    }
}

// Convenient getter/setter methods
impl<K, V, Ix> Node<K, V, Ix>
where
    Ix: IndexType,
{
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn left(&self) -> NodeIndex<Ix> {
        self.left
    }

    pub fn right(&self) -> NodeIndex<Ix> {
        self.right
    }

    pub fn parent(&self) -> NodeIndex<Ix> {
        self.parent
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self.state, NodeState::Sentinel)
    }

    pub fn is_live(&self) -> bool {
        matches!(self.state, NodeState::Live)
    }

    pub fn is_black(&self) -> bool {
        matches!(self.color, Color::Black)
    }

    pub fn is_red(&self) -> bool {
        matches!(self.color, Color::Red)
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    pub fn take_payload(&mut self) -> Option<V> {
        self.payload.take()
    }

    pub fn set_color(color: Color) -> impl FnOnce(&mut Node<K, V, Ix>) {
        move |node: &mut Node<K, V, Ix>| {
            node.color = color;
        }
    }

    pub fn set_left(left: NodeIndex<Ix>) -> impl FnOnce(&mut Node<K, V, Ix>) {
        move |node: &mut Node<K, V, Ix>| {
            node.left = left;
        }
    }

    pub fn set_right(right: NodeIndex<Ix>) -> impl FnOnce(&mut Node<K, V, Ix>) {
        move |node: &mut Node<K, V, Ix>| {
            node.right = right;
        }
    }

    pub fn set_parent(parent: NodeIndex<Ix>) -> impl FnOnce(&mut Node<K, V, Ix>) {
        move |node: &mut Node<K, V, Ix>| {
            node.parent = parent;
        }
    }

    /// Turns a live node into a retired slot. The payload must already be gone.
    pub fn retire(&mut self) {
        self.left = NodeIndex::sentinel();
        self.right = NodeIndex::sentinel();
        self.parent = NodeIndex::sentinel();
        self.color = Color::Black;
        self.key = None;
        self.state = NodeState::Removed;
    }
}

/// The color of the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Red node
    Red,
    /// Black node
    Black,
}

/// Lifecycle state of an arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// The shared sentinel in slot 0
    Sentinel,
    /// A node linked into the tree
    Live,
    /// A deleted node waiting on the free list
    Removed,
}
