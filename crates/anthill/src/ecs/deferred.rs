//! Lock count and pending-change queue shared by iterated collections
//!
//! Collections that hand out elements to callbacks ([`NodeList`] and
//! [`Scenario`]) cannot change shape while a loop over them is in progress.
//! They hold a [`DeferredQueue`]: while it is locked, structural changes are
//! queued; when the last lock is released, the owner applies the returned
//! changes in the order they were requested.
//!
//! [`NodeList`]: super::NodeList
//! [`Scenario`]: super::Scenario

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// A structural change to a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    /// Insert the element
    Add(T),
    /// Remove the element
    Remove(T),
}

/// Lock counter with a FIFO queue of changes postponed while locked
#[derive(Debug)]
pub struct DeferredQueue<T> {
    locks: Cell<usize>,
    pending: RefCell<VecDeque<Change<T>>>,
}

impl<T> DeferredQueue<T> {
    /// Create an unlocked, empty queue
    pub fn new() -> Self {
        Self {
            locks: Cell::new(0),
            pending: RefCell::new(VecDeque::new()),
        }
    }

    /// Whether at least one lock is held
    pub fn is_locked(&self) -> bool {
        self.locks.get() > 0
    }

    /// Number of locks currently held
    pub fn lock_count(&self) -> usize {
        self.locks.get()
    }

    /// Number of queued changes
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Take a lock
    pub fn lock(&self) {
        self.locks.set(self.locks.get() + 1);
    }

    /// Release a lock.
    ///
    /// Returns the queued changes, oldest first, when this was the last lock;
    /// otherwise returns nothing. The caller is responsible for applying them.
    pub fn unlock(&self) -> Vec<Change<T>> {
        match self.locks.get() {
            0 => {
                log::warn!("unlock called on a queue that is not locked");
                Vec::new()
            }
            1 => {
                self.locks.set(0);
                self.pending.borrow_mut().drain(..).collect()
            }
            n => {
                self.locks.set(n - 1);
                Vec::new()
            }
        }
    }

    /// Queue `change` if locked.
    ///
    /// Hands the change back when unlocked so the caller applies it at once.
    pub fn submit(&self, change: Change<T>) -> Option<Change<T>> {
        if self.is_locked() {
            self.pending.borrow_mut().push_back(change);
            None
        } else {
            Some(change)
        }
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
