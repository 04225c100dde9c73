use std::fmt;
use std::hash::Hash;

pub type DefaultIx = u32;

/// Integer type used to address slots of the node arena.
///
/// # Safety
///
/// `new` and `index` must round-trip every value in `0..=max().index()`.
pub unsafe trait IndexType: Copy + Default + Hash + Ord + fmt::Debug + 'static {
    fn new(x: usize) -> Self;
    fn index(&self) -> usize;
    fn max() -> Self;
}

unsafe impl IndexType for u32 {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x as u32
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self as usize
    }
    #[inline(always)]
    fn max() -> Self {
        u32::MAX
    }
}

unsafe impl IndexType for u16 {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x as u16
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self as usize
    }
    #[inline(always)]
    fn max() -> Self {
        u16::MAX
    }
}

unsafe impl IndexType for usize {
    #[inline(always)]
    fn new(x: usize) -> Self {
        x
    }
    #[inline(always)]
    fn index(&self) -> usize {
        *self
    }
    #[inline(always)]
    fn max() -> Self {
        usize::MAX
    }
}

/// Arena slot identifier.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct NodeIndex<Ix = DefaultIx>(Ix);

impl<Ix: IndexType> NodeIndex<Ix> {
    #[inline]
    pub fn new(x: usize) -> Self {
        NodeIndex(IndexType::new(x))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0.index()
    }

    /// The slot reserved for the shared sentinel.
    #[inline]
    pub fn sentinel() -> Self {
        NodeIndex(IndexType::new(0))
    }
}

impl<Ix: fmt::Debug> fmt::Debug for NodeIndex<Ix> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeIndex({:?})", self.0)
    }
}

/// Handle to a node stored in an [`RbTree`](crate::RbTree).
///
/// A handle stays valid until its node is deleted or the tree is cleared.
/// Afterwards every accessor rejects it with
/// [`RbTreeError::InvalidNode`](crate::RbTreeError::InvalidNode), even when
/// the slot has since been reused by another node. A handle obtained from one
/// tree is rejected the same way by every other tree.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef<Ix = DefaultIx> {
    pub(crate) tree: u64,
    pub(crate) index: NodeIndex<Ix>,
    pub(crate) generation: u64,
}

impl<Ix: IndexType> NodeRef<Ix> {
    pub(crate) fn new(tree: u64, index: NodeIndex<Ix>, generation: u64) -> Self {
        Self {
            tree,
            index,
            generation,
        }
    }

    /// Arena slot of the node.
    #[inline]
    pub fn index(self) -> usize {
        self.index.index()
    }
}

impl<Ix: fmt::Debug> fmt::Debug for NodeRef<Ix> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "NodeRef(#{}:{:?}@{})",
            self.tree, self.index.0, self.generation
        )
    }
}
