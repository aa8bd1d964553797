//! Core engine implementation
//!
//! The [`Engine`] is the composition root: it registers entities, keeps one
//! [`Family`] per requested node view up to date with their components, and
//! drives a root [`Scenario`] of systems. It is an explicit context object;
//! construct as many independent engines as needed.

use std::any::{type_name, TypeId};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::ecs::{
    Entity, EntityEvent, EntityEventKind, Family, FamilyIndex, Node, NodeList, Scenario,
    ScenarioConfig, System,
};
use crate::events::ListenerId;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name of the root scenario, used in logs
    pub name: String,
    /// Priority given to the first system added without an explicit one
    pub first_priority: i32,
    /// Increment between consecutive automatic priorities
    pub priority_step: i32,
    /// Profile every system call of the root scenario
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "engine".to_string(),
            first_priority: 0,
            priority_step: 1,
            debug: false,
        }
    }
}

impl Config for EngineConfig {}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A node view requires no component and would match everything
    #[error("node view `{node}` requires no component")]
    EmptySchema {
        /// Node view name
        node: &'static str,
    },

    /// A node view requires and excludes the same component
    #[error("node view `{node}` both requires and excludes `{component}`")]
    ConflictingSchema {
        /// Node view name
        node: &'static str,
        /// Offending component type
        component: &'static str,
    },

    /// A node could not be populated from an entity
    #[error("node view `{node}` needs `{component}`, which entity `{entity}` lacks")]
    MissingComponent {
        /// Node view name
        node: &'static str,
        /// Missing component type
        component: &'static str,
        /// Entity name
        entity: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

struct EngineInner {
    entities: RefCell<Vec<Entity>>,
    subscriptions: RefCell<HashMap<Entity, ListenerId>>,
    families: RefCell<HashMap<TypeId, Rc<dyn FamilyIndex>>>,
    scenario: Scenario,
    next_priority: Cell<i32>,
    priority_step: i32,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        for (entity, id) in self.subscriptions.get_mut().drain() {
            entity.unsubscribe(id);
        }
    }
}

/// Main engine handle
///
/// Cloning the handle shares the engine. Systems that keep a reference to it
/// should hold a [`WeakEngine`] to avoid a cycle through the root scenario.
#[derive(Clone)]
pub struct Engine {
    inner: Rc<EngineInner>,
}

impl Engine {
    /// Create an engine with default settings
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine from settings
    pub fn with_config(config: EngineConfig) -> Self {
        log::debug!("Creating engine `{}`", config.name);
        let scenario = Scenario::with_config(ScenarioConfig {
            name: config.name,
            debug: config.debug,
        });

        Self {
            inner: Rc::new(EngineInner {
                entities: RefCell::new(Vec::new()),
                subscriptions: RefCell::new(HashMap::new()),
                families: RefCell::new(HashMap::new()),
                scenario,
                next_priority: Cell::new(config.first_priority),
                priority_step: config.priority_step,
            }),
        }
    }

    /// Create an engine from a TOML or RON settings file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let config = EngineConfig::load_from_file(path)?;
        Ok(Self::with_config(config))
    }

    /// Non-owning handle
    pub fn downgrade(&self) -> WeakEngine {
        WeakEngine {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same engine
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The root scenario
    pub fn scenario(&self) -> &Scenario {
        &self.inner.scenario
    }

    // ── Entities ────────────────────────────────────────────────────

    /// Register an entity: families index it and follow its component changes
    pub fn add_entity(&self, entity: &Entity) {
        if self.inner.subscriptions.borrow().contains_key(entity) {
            log::warn!("{entity} is already registered, ignoring");
            return;
        }

        let engine = Rc::downgrade(&self.inner);
        let id = entity.subscribe(move |event| {
            if let Some(inner) = engine.upgrade() {
                Self { inner }.on_entity_event(event);
            }
        });
        self.inner
            .subscriptions
            .borrow_mut()
            .insert(entity.clone(), id);

        // Listed before the broadcast, so a family created from inside it
        // backfills this entity too.
        self.inner.entities.borrow_mut().push(entity.clone());
        for family in self.family_indexes() {
            family.entity_added(entity);
        }

        log::debug!("Registered {entity}");
        entity.on_added_to_engine();
    }

    /// Unregister an entity; families drop it and stop following it
    pub fn remove_entity(&self, entity: &Entity) {
        let Some(id) = self.inner.subscriptions.borrow_mut().remove(entity) else {
            log::warn!("{entity} is not registered, ignoring");
            return;
        };

        entity.unsubscribe(id);
        self.inner.entities.borrow_mut().retain(|e| e != entity);
        for family in self.family_indexes() {
            family.entity_removed(entity);
        }

        log::debug!("Unregistered {entity}");
        entity.on_removed_from_engine();
    }

    /// Whether `entity` is registered with this engine
    pub fn has_entity(&self, entity: &Entity) -> bool {
        self.inner.subscriptions.borrow().contains_key(entity)
    }

    /// Registered entities, in registration order
    pub fn entities(&self) -> Vec<Entity> {
        self.inner.entities.borrow().clone()
    }

    /// Number of registered entities
    pub fn entity_count(&self) -> usize {
        self.inner.entities.borrow().len()
    }

    fn on_entity_event(&self, event: &EntityEvent) {
        match event.kind {
            EntityEventKind::ComponentAdded(ty) => {
                for family in self.family_indexes() {
                    family.component_added(&event.entity, ty);
                }
            }
            EntityEventKind::ComponentRemoved(ty) => {
                for family in self.family_indexes() {
                    family.component_removed(&event.entity, ty);
                }
            }
            EntityEventKind::AddedToEngine | EntityEventKind::RemovedFromEngine => {}
        }
    }

    // Families may be created or released while a notification is broadcast.
    fn family_indexes(&self) -> Vec<Rc<dyn FamilyIndex>> {
        self.inner.families.borrow().values().cloned().collect()
    }

    // ── Families ────────────────────────────────────────────────────

    /// Node list of the family for `T`, creating and backfilling the family
    /// on first request.
    ///
    /// # Panics
    ///
    /// Panics if `T`'s schema is invalid. Use
    /// [`try_get_nodes`](Self::try_get_nodes) to handle that case.
    pub fn get_nodes<T: Node>(&self) -> Rc<NodeList<T>> {
        self.try_get_nodes::<T>()
            .unwrap_or_else(|err| panic!("cannot index `{}`: {err}", type_name::<T>()))
    }

    /// Node list of the family for `T`, creating and backfilling the family
    /// on first request
    pub fn try_get_nodes<T: Node>(&self) -> Result<Rc<NodeList<T>>, EngineError> {
        if let Some(family) = self.family::<T>() {
            return Ok(family.nodes());
        }

        let family = Rc::new(Family::<T>::new()?);
        let index: Rc<dyn FamilyIndex> = family.clone();
        log::debug!("Created family {}", index.schema().node());
        self.inner
            .families
            .borrow_mut()
            .insert(TypeId::of::<T>(), index);

        family.backfill(&self.entities());
        Ok(family.nodes())
    }

    /// Drop the family for `T`. Returns `false` if there was none.
    ///
    /// Node lists already handed out stop receiving updates; the next
    /// [`get_nodes`](Self::get_nodes) builds a fresh family.
    pub fn release_nodes<T: Node>(&self) -> bool {
        let released = self.inner.families.borrow_mut().remove(&TypeId::of::<T>());
        match released {
            Some(index) => {
                log::debug!("Released family {}", index.schema().node());
                true
            }
            None => false,
        }
    }

    /// Whether a family for `T` currently exists
    pub fn has_nodes<T: Node>(&self) -> bool {
        self.inner.families.borrow().contains_key(&TypeId::of::<T>())
    }

    /// The family for `T`, if it exists
    pub fn family<T: Node>(&self) -> Option<Rc<Family<T>>> {
        let index = self.inner.families.borrow().get(&TypeId::of::<T>()).cloned()?;
        index.as_any().downcast::<Family<T>>().ok()
    }

    /// Number of live families
    pub fn family_count(&self) -> usize {
        self.inner.families.borrow().len()
    }

    // ── Systems ─────────────────────────────────────────────────────

    /// Add a system to the root scenario after every system added so far
    pub fn add_system<S: System>(&self, system: S) -> Rc<RefCell<S>> {
        let priority = self.next_priority();
        self.inner.scenario.add(system, priority)
    }

    /// Add a system to the root scenario with an explicit priority
    pub fn add_system_with_priority<S: System>(&self, system: S, priority: i32) -> Rc<RefCell<S>> {
        self.inner.scenario.add(system, priority)
    }

    /// Add a default-constructed system with the next automatic priority
    pub fn add_default_system<S: System + Default>(&self) -> Rc<RefCell<S>> {
        self.add_system(S::default())
    }

    /// Remove a system from the root scenario
    pub fn remove_system<S: System>(&self, system: &Rc<RefCell<S>>) -> Rc<RefCell<S>> {
        self.inner.scenario.remove(system)
    }

    /// Remove the first system of type `S` from the root scenario
    pub fn remove_system_type<S: System>(&self) -> Option<Rc<RefCell<S>>> {
        self.inner.scenario.remove_type::<S>()
    }

    /// First system of type `S` in the root scenario
    pub fn get_system<S: System>(&self) -> Option<Rc<RefCell<S>>> {
        self.inner.scenario.get::<S>()
    }

    /// Whether the root scenario holds a system of type `S`
    pub fn has_system<S: System>(&self) -> bool {
        self.inner.scenario.has::<S>()
    }

    fn next_priority(&self) -> i32 {
        let priority = self.inner.next_priority.get();
        self.inner
            .next_priority
            .set(priority.saturating_add(self.inner.priority_step));
        priority
    }

    // ── Phases ──────────────────────────────────────────────────────

    /// Initialize every system, once before the first tick
    pub fn initialize(&self) {
        self.inner.scenario.initialize();
    }

    /// Deinitialize every system, once at shutdown
    pub fn deinitialize(&self) {
        self.inner.scenario.deinitialize();
    }

    /// Variable-rate tick
    pub fn execute(&self) {
        self.inner.scenario.execute();
    }

    /// Fixed-rate tick
    pub fn execute_fixed(&self) {
        self.inner.scenario.execute_fixed();
    }

    /// Late tick, after [`execute`](Self::execute)
    pub fn execute_late(&self) {
        self.inner.scenario.execute_late();
    }

    /// End-of-tick cleanup
    pub fn cleanup(&self) {
        self.inner.scenario.cleanup();
    }

    /// Resume per-tick phases
    pub fn enable(&self) {
        self.inner.scenario.enable();
    }

    /// Suspend per-tick phases
    pub fn disable(&self) {
        self.inner.scenario.disable();
    }

    /// Reset every system
    pub fn reset(&self) {
        self.inner.scenario.reset();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("entities", &self.entity_count())
            .field("families", &self.family_count())
            .field("scenario", &self.inner.scenario)
            .finish()
    }
}

/// Non-owning engine handle
#[derive(Clone, Default)]
pub struct WeakEngine {
    inner: Weak<EngineInner>,
}

impl WeakEngine {
    /// Recover the engine if it is still alive
    pub fn upgrade(&self) -> Option<Engine> {
        self.inner.upgrade().map(|inner| Engine { inner })
    }
}
