//! Entity implementation
//!
//! An [`Entity`] is a shared handle around a component collection. Cloning
//! the handle does not clone the entity: equality and hashing go by identity,
//! so handles can be used as map keys by the engine and its families.
//!
//! Storage is pluggable through [`ComponentHost`]. [`Entity::new`] keeps
//! components in an internal [`ComponentList`]; [`Entity::hosted`] delegates to
//! an external object hierarchy that owns the components instead.

use std::any::TypeId;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::component::{downcast, share, AnyComponent, Comp, Component, ComponentType};
use crate::events::{EventListeners, ListenerId};

/// Backing storage for an entity's components
///
/// Implementations store at most one component per type. The entity checks
/// for an existing component before calling [`ComponentHost::attach`].
pub trait ComponentHost {
    /// Look up the component of the given type
    fn find(&self, ty: TypeId) -> Option<AnyComponent>;

    /// Store a component. The type is known not to be present.
    fn attach(&mut self, ty: ComponentType, component: AnyComponent);

    /// Remove and return the component of the given type
    fn detach(&mut self, ty: TypeId) -> Option<(ComponentType, AnyComponent)>;

    /// Types of all stored components, in storage order
    fn component_types(&self) -> Vec<ComponentType>;
}

/// Default in-entity component storage, kept in insertion order
#[derive(Default)]
pub struct ComponentList {
    components: Vec<(ComponentType, AnyComponent)>,
}

impl ComponentList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }
}

impl ComponentHost for ComponentList {
    fn find(&self, ty: TypeId) -> Option<AnyComponent> {
        self.components
            .iter()
            .find(|(stored, _)| stored.id() == ty)
            .map(|(_, component)| Rc::clone(component))
    }

    fn attach(&mut self, ty: ComponentType, component: AnyComponent) {
        self.components.push((ty, component));
    }

    fn detach(&mut self, ty: TypeId) -> Option<(ComponentType, AnyComponent)> {
        let index = self.components.iter().position(|(stored, _)| stored.id() == ty)?;
        Some(self.components.remove(index))
    }

    fn component_types(&self) -> Vec<ComponentType> {
        self.components.iter().map(|(ty, _)| *ty).collect()
    }
}

/// What happened to an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityEventKind {
    /// A component of this type was added
    ComponentAdded(ComponentType),
    /// A component of this type was removed
    ComponentRemoved(ComponentType),
    /// The entity was registered with an engine
    AddedToEngine,
    /// The entity was unregistered from its engine
    RemovedFromEngine,
}

/// Notification raised synchronously by an [`Entity`]
#[derive(Debug, Clone)]
pub struct EntityEvent {
    /// Entity the event originates from
    pub entity: Entity,
    /// What happened
    pub kind: EntityEventKind,
}

struct EntityInner {
    name: String,
    host: RefCell<Box<dyn ComponentHost>>,
    added_to_engine: Cell<bool>,
    listeners: EventListeners<EntityEvent>,
}

/// Shared handle to a game object and its components
#[derive(Clone)]
pub struct Entity {
    inner: Rc<EntityInner>,
}

impl Entity {
    /// Create an entity storing its components internally
    pub fn new(name: impl Into<String>) -> Self {
        Self::hosted(name, ComponentList::new())
    }

    /// Create an entity whose components live in an external host
    pub fn hosted(name: impl Into<String>, host: impl ComponentHost + 'static) -> Self {
        Self {
            inner: Rc::new(EntityInner {
                name: name.into(),
                host: RefCell::new(Box::new(host)),
                added_to_engine: Cell::new(false),
                listeners: EventListeners::new(),
            }),
        }
    }

    /// Entity name, for diagnostics
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Whether the entity is currently registered with an engine
    pub fn is_added_to_engine(&self) -> bool {
        self.inner.added_to_engine.get()
    }

    /// Add a component.
    ///
    /// If a component of type `C` is already present, nothing changes and the
    /// existing handle is returned; `component` is dropped.
    pub fn add<C: Component>(&self, component: C) -> Comp<C> {
        if let Some(existing) = self.get::<C>() {
            log::trace!("{} already has {}", self, ComponentType::of::<C>());
            return existing;
        }

        let ty = ComponentType::of::<C>();
        let (typed, erased) = share(component);
        self.inner.host.borrow_mut().attach(ty, erased);
        self.emit(EntityEventKind::ComponentAdded(ty));
        typed
    }

    /// Remove the component of type `C`, returning it if present
    pub fn remove<C: Component>(&self) -> Option<Comp<C>> {
        let detached = self.inner.host.borrow_mut().detach(TypeId::of::<C>());
        let (ty, component) = detached?;
        self.emit(EntityEventKind::ComponentRemoved(ty));
        downcast(component)
    }

    /// Remove a specific component instance.
    ///
    /// Returns `false` without touching the entity if `component` is not the
    /// instance currently stored for its type.
    pub fn remove_component<C: Component>(&self, component: &Comp<C>) -> bool {
        match self.get::<C>() {
            Some(stored) if Rc::ptr_eq(&stored, component) => self.remove::<C>().is_some(),
            _ => false,
        }
    }

    /// Whether a component of type `C` is present
    pub fn has<C: Component>(&self) -> bool {
        self.has_type(TypeId::of::<C>())
    }

    /// Whether a component with the given type id is present
    pub fn has_type(&self, ty: TypeId) -> bool {
        self.inner.host.borrow().find(ty).is_some()
    }

    /// Get the component of type `C`
    pub fn get<C: Component>(&self) -> Option<Comp<C>> {
        self.get_any(TypeId::of::<C>()).and_then(downcast)
    }

    /// Get a component by type id, type-erased
    pub fn get_any(&self, ty: TypeId) -> Option<AnyComponent> {
        self.inner.host.borrow().find(ty)
    }

    /// Types of all components currently attached
    pub fn component_types(&self) -> Vec<ComponentType> {
        self.inner.host.borrow().component_types()
    }

    /// Listen to this entity's events
    pub fn subscribe(&self, handler: impl Fn(&EntityEvent) + 'static) -> ListenerId {
        self.inner.listeners.subscribe(handler)
    }

    /// Stop listening. Returns `false` for an unknown handle.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }

    /// Called by the engine once the entity is registered
    pub fn on_added_to_engine(&self) {
        self.inner.added_to_engine.set(true);
        self.emit(EntityEventKind::AddedToEngine);
    }

    /// Called by the engine once the entity is unregistered
    pub fn on_removed_from_engine(&self) {
        self.inner.added_to_engine.set(false);
        self.emit(EntityEventKind::RemovedFromEngine);
    }

    /// Whether both handles refer to the same entity
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn emit(&self, kind: EntityEventKind) {
        let event = EntityEvent {
            entity: self.clone(),
            kind,
        };
        self.inner.listeners.emit(&event);
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.inner.name)
            .field("components", &self.component_types())
            .field("added_to_engine", &self.is_added_to_engine())
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}
