//! Entity-component-system core
//!
//! - [`Entity`]: identity handle over a set of typed components
//! - [`Node`] / [`NodeSchema`]: typed views over entities with a given set of
//!   components
//! - [`Family`]: the entities currently matching one node view, with their
//!   nodes kept in a [`NodeList`]
//! - [`System`] / [`Scenario`]: behaviour driven through lifecycle phases in
//!   priority order

pub mod component;
pub mod deferred;
pub mod entity;
pub mod family;
pub mod node;
pub mod node_list;
pub mod pool;
pub mod priority;
pub mod scenario;
pub mod system;

#[cfg(test)]
mod tests;

pub use component::{AnyComponent, Comp, Component, ComponentType};
pub use deferred::{Change, DeferredQueue};
pub use entity::{ComponentHost, ComponentList, Entity, EntityEvent, EntityEventKind};
pub use family::{Family, FamilyIndex};
pub use node::{Node, NodeSchema, Slot};
pub use node_list::NodeList;
pub use pool::{NodePool, NodeRef};
pub use priority::{insert_sorted, PriorityPair};
pub use scenario::{Scenario, ScenarioConfig, SystemProfile, WeakScenario};
pub use system::{Capabilities, Phase, System};
