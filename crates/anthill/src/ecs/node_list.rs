//! Observable, lockable list of node views

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::deferred::{Change, DeferredQueue};
use super::pool::NodeRef;
use crate::events::{EventListeners, ListenerId};

/// Ordered node views of one family
///
/// While locked, [`add`](Self::add) and [`remove`](Self::remove) are queued
/// and applied in request order by the final [`unlock`](Self::unlock).
/// Listeners hear about a change when it is applied, never when it is
/// queued, and [`len`](Self::len) only counts applied changes.
pub struct NodeList<T> {
    nodes: RefCell<Vec<NodeRef<T>>>,
    queue: DeferredQueue<NodeRef<T>>,
    added: EventListeners<NodeRef<T>>,
    removed: EventListeners<NodeRef<T>>,
}

impl<T: 'static> NodeList<T> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            nodes: RefCell::new(Vec::new()),
            queue: DeferredQueue::new(),
            added: EventListeners::new(),
            removed: EventListeners::new(),
        }
    }

    /// Number of nodes currently in the list
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// Whether the list holds no node
    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Node at `index`
    pub fn get(&self, index: usize) -> Option<NodeRef<T>> {
        self.nodes.borrow().get(index).cloned()
    }

    /// Whether this exact node instance is in the list
    pub fn contains(&self, node: &NodeRef<T>) -> bool {
        self.nodes.borrow().iter().any(|stored| Rc::ptr_eq(stored, node))
    }

    /// Copy of the current node handles, in list order
    pub fn to_vec(&self) -> Vec<NodeRef<T>> {
        self.nodes.borrow().clone()
    }

    /// Append a node, or queue the append while locked
    pub fn add(&self, node: NodeRef<T>) {
        if let Some(change) = self.queue.submit(Change::Add(node)) {
            self.apply(change);
        }
    }

    /// Remove a node, or queue the removal while locked
    pub fn remove(&self, node: NodeRef<T>) {
        if let Some(change) = self.queue.submit(Change::Remove(node)) {
            self.apply(change);
        }
    }

    /// Whether changes are currently being queued
    pub fn is_locked(&self) -> bool {
        self.queue.is_locked()
    }

    /// Number of queued changes
    pub fn pending_len(&self) -> usize {
        self.queue.pending_len()
    }

    /// Start queueing changes
    pub fn lock(&self) {
        self.queue.lock();
    }

    /// Release a lock; the last release applies every queued change
    pub fn unlock(&self) {
        for change in self.queue.unlock() {
            self.apply(change);
        }
    }

    /// Visit every node, last to first.
    ///
    /// The list is locked for the duration, so the callback may add or remove
    /// nodes (directly or by changing entity components) without disturbing
    /// the walk. Those changes apply after the last node is visited.
    pub fn for_each(&self, mut f: impl FnMut(&NodeRef<T>)) {
        self.lock();
        let len = self.len();
        for index in (0..len).rev() {
            let node = self.get(index);
            if let Some(node) = node {
                f(&node);
            }
        }
        self.unlock();
    }

    /// Listen for nodes entering the list
    pub fn on_added(&self, handler: impl Fn(&NodeRef<T>) + 'static) -> ListenerId {
        self.added.subscribe(handler)
    }

    /// Listen for nodes leaving the list
    pub fn on_removed(&self, handler: impl Fn(&NodeRef<T>) + 'static) -> ListenerId {
        self.removed.subscribe(handler)
    }

    /// Drop a listener registered with [`on_added`](Self::on_added) or
    /// [`on_removed`](Self::on_removed)
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.added.unsubscribe(id) || self.removed.unsubscribe(id)
    }

    fn apply(&self, change: Change<NodeRef<T>>) {
        match change {
            Change::Add(node) => {
                self.nodes.borrow_mut().push(Rc::clone(&node));
                self.added.emit(&node);
            }
            Change::Remove(node) => {
                let position = self
                    .nodes
                    .borrow()
                    .iter()
                    .position(|stored| Rc::ptr_eq(stored, &node));
                if let Some(index) = position {
                    self.nodes.borrow_mut().remove(index);
                    self.removed.emit(&node);
                }
            }
        }
    }
}

impl<T: 'static> Default for NodeList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for NodeList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeList")
            .field("len", &self.nodes.borrow().len())
            .field("locked", &self.queue.is_locked())
            .field("pending", &self.queue.pending_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn node(value: i32) -> NodeRef<i32> {
        Rc::new(RefCell::new(value))
    }

    fn values(list: &NodeList<i32>) -> Vec<i32> {
        list.to_vec().iter().map(|n| *n.borrow()).collect()
    }

    #[test]
    fn test_add_and_remove_fire_events() {
        let list = NodeList::new();
        let added = Rc::new(Cell::new(0));
        let removed = Rc::new(Cell::new(0));
        let a = Rc::clone(&added);
        let r = Rc::clone(&removed);
        list.on_added(move |_| a.set(a.get() + 1));
        list.on_removed(move |_| r.set(r.get() + 1));

        let first = node(1);
        list.add(Rc::clone(&first));
        list.add(node(2));
        list.remove(Rc::clone(&first));
        list.remove(first);

        assert_eq!(values(&list), vec![2]);
        assert_eq!(added.get(), 2);
        assert_eq!(removed.get(), 1, "removing an absent node is silent");
    }

    #[test]
    fn test_locked_changes_apply_on_unlock() {
        let list = NodeList::new();
        let keep = node(1);
        list.add(Rc::clone(&keep));

        let events = Rc::new(Cell::new(0));
        let counter = Rc::clone(&events);
        list.on_added(move |_| counter.set(counter.get() + 1));

        list.lock();
        list.add(node(2));
        list.remove(Rc::clone(&keep));
        assert_eq!(list.len(), 1, "len only counts applied changes");
        assert_eq!(list.pending_len(), 2);
        assert_eq!(events.get(), 0, "queued adds are not announced");

        list.unlock();
        assert_eq!(values(&list), vec![2]);
        assert_eq!(events.get(), 1);
    }

    #[test]
    fn test_for_each_walks_backwards_and_defers_removal() {
        let list = Rc::new(NodeList::new());
        for value in 1..=4 {
            list.add(node(value));
        }

        let mut seen = Vec::new();
        let inner = Rc::clone(&list);
        list.for_each(|n| {
            seen.push(*n.borrow());
            if *n.borrow() % 2 == 0 {
                inner.remove(Rc::clone(n));
            }
            assert_eq!(inner.len(), 4);
        });

        assert_eq!(seen, vec![4, 3, 2, 1]);
        assert_eq!(values(&list), vec![1, 3]);
        assert!(!list.is_locked());
    }

    #[test]
    fn test_unsubscribe() {
        let list = NodeList::<i32>::new();
        let id = list.on_removed(|_| panic!("should not be called"));
        assert!(list.unsubscribe(id));

        let n = node(1);
        list.add(Rc::clone(&n));
        list.remove(n);
        assert!(list.is_empty());
    }
}
