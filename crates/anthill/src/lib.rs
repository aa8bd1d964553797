//! # Anthill
//!
//! Gameplay infrastructure built around a small entity-component-system core.
//!
//! ## Features
//!
//! - **Scenarios**: Priority-ordered, nestable containers of systems with
//!   nine lifecycle phases
//! - **Families**: Incrementally maintained indexes of the entities matching a
//!   node view (required and excluded component sets)
//! - **Deferred mutation**: Structural changes requested mid-iteration are
//!   queued and applied once iteration completes
//! - **Node pooling**: Node views are recycled instead of reallocated
//!
//! ## Quick Start
//!
//! ```rust
//! use anthill::prelude::*;
//!
//! pub struct Health(pub i32);
//! impl Component for Health {}
//!
//! anthill::node! {
//!     pub struct HealthNode {
//!         pub health: Health,
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Regen {
//!     nodes: Option<std::rc::Rc<NodeList<HealthNode>>>,
//! }
//!
//! impl System for Regen {
//!     fn capabilities(&self) -> Capabilities {
//!         Capabilities::EXECUTE
//!     }
//!
//!     fn execute(&mut self) {
//!         if let Some(nodes) = &self.nodes {
//!             nodes.for_each(|node| node.borrow().health.borrow_mut().0 += 1);
//!         }
//!     }
//! }
//!
//! let engine = Engine::new();
//! let hero = Entity::new("hero");
//! hero.add(Health(10));
//! engine.add_entity(&hero);
//!
//! let regen = Regen { nodes: Some(engine.get_nodes::<HealthNode>()) };
//! engine.add_system(regen);
//! engine.initialize();
//! engine.execute();
//!
//! assert_eq!(hero.get::<Health>().unwrap().borrow().0, 11);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod events;
pub mod foundation;

mod engine;

pub use engine::{Engine, EngineConfig, EngineError, WeakEngine};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        Engine, EngineConfig, EngineError, WeakEngine,
        config::{Config, ConfigError},
        ecs::{
            Capabilities, Comp, Component, ComponentType, Entity, EntityEvent, EntityEventKind,
            Family, Node, NodeList, NodeRef, NodeSchema, Phase, PriorityPair, Scenario,
            ScenarioConfig, Slot, System, SystemProfile, WeakScenario,
        },
        events::ListenerId,
    };
}
