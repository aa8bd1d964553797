//! Free list of recycled node views

use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a node view
pub type NodeRef<T> = Rc<RefCell<T>>;

/// Free list for node views
///
/// Never shrinks: it grows to the peak number of simultaneously released
/// nodes. Recycled nodes keep whatever they held last and must be fully
/// repopulated before use.
pub struct NodePool<T> {
    free: Vec<NodeRef<T>>,
    created: usize,
}

impl<T: Default> NodePool<T> {
    /// Create an empty pool
    pub const fn new() -> Self {
        Self {
            free: Vec::new(),
            created: 0,
        }
    }

    /// Take the most recently released node, or build a fresh one
    pub fn get(&mut self) -> NodeRef<T> {
        if let Some(node) = self.free.pop() {
            node
        } else {
            self.created += 1;
            Rc::new(RefCell::new(T::default()))
        }
    }

    /// Return a node that is no longer in use
    pub fn put(&mut self, node: NodeRef<T>) {
        self.free.push(node);
    }

    /// Number of nodes waiting for reuse
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Whether no node is waiting for reuse
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Total nodes ever constructed by this pool
    pub const fn created(&self) -> usize {
        self.created
    }
}

impl<T: Default> Default for NodePool<T> {
    fn default() -> Self {
        Self::new()
    }
}
