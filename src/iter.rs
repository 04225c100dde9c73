use crate::index::{IndexType, NodeIndex, NodeRef};
use crate::node::Node;
use crate::rbtree::RbTree;

/// Pushes a link of nodes on the left to stack.
fn left_link<K, V, Ix>(tree_ref: &RbTree<K, V, Ix>, mut x: NodeIndex<Ix>) -> Vec<NodeIndex<Ix>>
where
    Ix: IndexType,
{
    let mut nodes = vec![];
    while !tree_ref.node_ref(x, Node::is_sentinel) {
        nodes.push(x);
        x = tree_ref.node_ref(x, Node::left);
    }
    nodes
}

/// Pops the next node in key order and queues its right subtree.
fn next_in_order<K, V, Ix>(
    tree_ref: &RbTree<K, V, Ix>,
    stack: &mut Vec<NodeIndex<Ix>>,
) -> Option<NodeIndex<Ix>>
where
    Ix: IndexType,
{
    let x = stack.pop()?;
    stack.extend(left_link(tree_ref, tree_ref.node_ref(x, Node::right)));
    Some(x)
}

/// An iterator over the entries of a `RbTree`, sorted by key.
///
/// Yields each key with its payload, or `None` where the payload was released.
#[derive(Debug)]
pub struct Iter<'a, K, V, Ix> {
    /// Reference to the tree
    tree_ref: &'a RbTree<K, V, Ix>,
    /// Stack for iteration
    stack: Vec<NodeIndex<Ix>>,
}

impl<'a, K, V, Ix> Iter<'a, K, V, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn new(tree_ref: &'a RbTree<K, V, Ix>) -> Self {
        Iter {
            tree_ref,
            stack: left_link(tree_ref, tree_ref.root),
        }
    }
}

impl<'a, K, V, Ix> Iterator for Iter<'a, K, V, Ix>
where
    Ix: IndexType,
{
    type Item = (&'a K, Option<&'a V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = next_in_order(self.tree_ref, &mut self.stack)?;
        self.tree_ref
            .node_ref(x, |xn| xn.key.as_ref().map(|k| (k, xn.payload.as_ref())))
    }
}

/// An iterator over node handles of a `RbTree`, sorted by key.
#[derive(Debug)]
pub struct Nodes<'a, K, V, Ix> {
    /// Reference to the tree
    tree_ref: &'a RbTree<K, V, Ix>,
    /// Stack for iteration
    stack: Vec<NodeIndex<Ix>>,
}

impl<'a, K, V, Ix> Nodes<'a, K, V, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn new(tree_ref: &'a RbTree<K, V, Ix>) -> Self {
        Nodes {
            tree_ref,
            stack: left_link(tree_ref, tree_ref.root),
        }
    }
}

impl<K, V, Ix> Iterator for Nodes<'_, K, V, Ix>
where
    Ix: IndexType,
{
    type Item = NodeRef<Ix>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = next_in_order(self.tree_ref, &mut self.stack)?;
        Some(self.tree_ref.handle(x))
    }
}
