//! Families: incrementally maintained node-view indexes
//!
//! A [`Family`] tracks which registered entities satisfy one node view's
//! schema. It never rescans: each entity or component notification only
//! re-examines the entity involved.
//!
//! ```text
//!                  component_added(excluded)
//!                  component_removed(required)
//!                  entity_removed
//!   ┌───────────┐ ─────────────────────────────► ┌───────────┐
//!   │  Matched  │                                │ Unmatched │
//!   └───────────┘ ◄───────────────────────────── └───────────┘
//!                  entity_added / component_added
//!                  component_removed(excluded)
//!                  (only if the schema now matches)
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::component::ComponentType;
use super::entity::Entity;
use super::node::{Node, NodeSchema};
use super::node_list::NodeList;
use super::pool::{NodePool, NodeRef};
use crate::EngineError;

/// Receiver of the entity and component notifications routed by the engine
pub trait FamilyIndex {
    /// An entity was registered with the engine
    fn entity_added(&self, entity: &Entity);

    /// An entity was unregistered from the engine
    fn entity_removed(&self, entity: &Entity);

    /// A registered entity gained a component
    fn component_added(&self, entity: &Entity, component: ComponentType);

    /// A registered entity lost a component
    fn component_removed(&self, entity: &Entity, component: ComponentType);

    /// Schema this index maintains
    fn schema(&self) -> &NodeSchema;

    /// Upcast used by the engine to recover the concrete family
    fn as_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// The set of entities currently qualifying for node view `T`
pub struct Family<T: Node> {
    schema: NodeSchema,
    nodes: Rc<NodeList<T>>,
    entity_to_node: RefCell<HashMap<Entity, NodeRef<T>>>,
    pool: Rc<RefCell<NodePool<T>>>,
}

impl<T: Node> Family<T> {
    /// Create an empty family for `T`.
    ///
    /// Fails if `T`'s schema requires nothing, or both requires and excludes
    /// the same component.
    pub fn new() -> Result<Self, EngineError> {
        let schema = T::schema();
        schema.validate()?;

        let nodes = Rc::new(NodeList::new());
        let pool = Rc::new(RefCell::new(NodePool::new()));

        // Nodes are recycled once their removal has actually been applied,
        // never while a locked list still holds them.
        let recycle = Rc::downgrade(&pool);
        nodes.on_removed(move |node| {
            if let Some(pool) = recycle.upgrade() {
                pool.borrow_mut().put(Rc::clone(node));
            }
        });

        Ok(Self {
            schema,
            nodes,
            entity_to_node: RefCell::new(HashMap::new()),
            pool,
        })
    }

    /// The node list kept in sync with the matched entities
    pub fn nodes(&self) -> Rc<NodeList<T>> {
        Rc::clone(&self.nodes)
    }

    /// Whether `entity` is currently matched
    pub fn contains(&self, entity: &Entity) -> bool {
        self.entity_to_node.borrow().contains_key(entity)
    }

    /// Node describing `entity`, if it is matched
    pub fn node_of(&self, entity: &Entity) -> Option<NodeRef<T>> {
        self.entity_to_node.borrow().get(entity).cloned()
    }

    /// Number of matched entities
    pub fn len(&self) -> usize {
        self.entity_to_node.borrow().len()
    }

    /// Whether no entity is matched
    pub fn is_empty(&self) -> bool {
        self.entity_to_node.borrow().is_empty()
    }

    /// Number of recycled nodes waiting for reuse
    pub fn pooled(&self) -> usize {
        self.pool.borrow().len()
    }

    /// Match every entity in `entities`, announcing the results together
    pub fn backfill<'a>(&self, entities: impl IntoIterator<Item = &'a Entity>) {
        self.nodes.lock();
        for entity in entities {
            self.try_match(entity);
        }
        self.nodes.unlock();
        log::debug!("{} backfilled with {} nodes", self.schema.node(), self.len());
    }

    fn try_match(&self, entity: &Entity) {
        if self.contains(entity) || !self.schema.matches(entity) {
            return;
        }

        let node = self.pool.borrow_mut().get();
        // Borrow ends before anything can observe the node.
        let populated = node.borrow_mut().populate(entity);
        if let Err(err) = populated {
            log::error!("{} not indexed: {}", entity, err);
            self.pool.borrow_mut().put(node);
            return;
        }

        self.entity_to_node
            .borrow_mut()
            .insert(entity.clone(), Rc::clone(&node));
        log::trace!("{} joined {}", entity, self.schema.node());
        self.nodes.add(node);
    }

    fn unmatch(&self, entity: &Entity) {
        let node = self.entity_to_node.borrow_mut().remove(entity);
        if let Some(node) = node {
            log::trace!("{} left {}", entity, self.schema.node());
            self.nodes.remove(node);
        }
    }
}

impl<T: Node> FamilyIndex for Family<T> {
    fn entity_added(&self, entity: &Entity) {
        self.try_match(entity);
    }

    fn entity_removed(&self, entity: &Entity) {
        self.unmatch(entity);
    }

    fn component_added(&self, entity: &Entity, component: ComponentType) {
        if self.contains(entity) {
            if self.schema.is_excluded(component.id()) {
                self.unmatch(entity);
            }
        } else {
            self.try_match(entity);
        }
    }

    fn component_removed(&self, entity: &Entity, component: ComponentType) {
        if self.contains(entity) {
            if self.schema.is_required(component.id()) {
                self.unmatch(entity);
            }
        } else if self.schema.is_excluded(component.id()) {
            self.try_match(entity);
        }
    }

    fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    fn as_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
