//! Priority-tagged entries for phase lists

/// An element paired with its execution priority.
///
/// Lower values run earlier. Pairs are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityPair<T> {
    system: T,
    priority: i32,
}

impl<T> PriorityPair<T> {
    /// Pair `system` with `priority`
    pub const fn new(system: T, priority: i32) -> Self {
        Self { system, priority }
    }

    /// The paired element
    pub const fn system(&self) -> &T {
        &self.system
    }

    /// The priority value
    pub const fn priority(&self) -> i32 {
        self.priority
    }
}

/// Insert `pair` into a list kept sorted ascending by priority.
///
/// The new pair goes after every existing pair of equal priority, so equal
/// priorities keep insertion order.
pub fn insert_sorted<T>(list: &mut Vec<PriorityPair<T>>, pair: PriorityPair<T>) {
    let index = list.partition_point(|existing| existing.priority <= pair.priority);
    list.insert(index, pair);
}
