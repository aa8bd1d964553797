//! Node views: compile-time schemas over entity components
//!
//! A node view is a plain struct whose [`Slot`] fields point at the
//! components an entity must carry to appear in that view's [`Family`]. The
//! required and excluded component sets are declared by [`Node::schema`];
//! [`node!`](crate::node) writes both the struct and its schema from one
//! declaration.
//!
//! [`Family`]: super::Family

use std::any::TypeId;
use std::cell::{Ref, RefMut};
use std::fmt;

use super::component::{Comp, Component, ComponentType};
use super::entity::Entity;
use crate::EngineError;

/// Required and excluded component types of a node view
#[derive(Debug, Clone)]
pub struct NodeSchema {
    node: &'static str,
    required: Vec<ComponentType>,
    excluded: Vec<ComponentType>,
}

impl NodeSchema {
    /// Start an empty schema for the named node view
    pub const fn new(node: &'static str) -> Self {
        Self {
            node,
            required: Vec::new(),
            excluded: Vec::new(),
        }
    }

    /// Require component `C` (builder pattern)
    #[must_use]
    pub fn require<C: Component>(mut self) -> Self {
        let ty = ComponentType::of::<C>();
        if !self.required.contains(&ty) {
            self.required.push(ty);
        }
        self
    }

    /// Exclude entities carrying component `C` (builder pattern)
    #[must_use]
    pub fn exclude<C: Component>(mut self) -> Self {
        let ty = ComponentType::of::<C>();
        if !self.excluded.contains(&ty) {
            self.excluded.push(ty);
        }
        self
    }

    /// Node view name
    pub const fn node(&self) -> &'static str {
        self.node
    }

    /// Required component types
    pub fn required(&self) -> &[ComponentType] {
        &self.required
    }

    /// Excluded component types
    pub fn excluded(&self) -> &[ComponentType] {
        &self.excluded
    }

    /// Whether `ty` is one of the required types
    pub fn is_required(&self, ty: TypeId) -> bool {
        self.required.iter().any(|required| required.id() == ty)
    }

    /// Whether `ty` is one of the excluded types
    pub fn is_excluded(&self, ty: TypeId) -> bool {
        self.excluded.iter().any(|excluded| excluded.id() == ty)
    }

    /// Whether `entity` currently qualifies for this view
    pub fn matches(&self, entity: &Entity) -> bool {
        !self.excluded.iter().any(|ty| entity.has_type(ty.id()))
            && self.required.iter().all(|ty| entity.has_type(ty.id()))
    }

    /// Reject schemas that can never match anything meaningful
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.required.is_empty() {
            return Err(EngineError::EmptySchema { node: self.node });
        }
        if let Some(conflict) = self.required.iter().find(|ty| self.excluded.contains(ty)) {
            return Err(EngineError::ConflictingSchema {
                node: self.node,
                component: conflict.name(),
            });
        }
        Ok(())
    }
}

/// A node view type
///
/// Implementations are usually generated by [`node!`](crate::node).
pub trait Node: Default + 'static {
    /// Components this view requires and excludes
    fn schema() -> NodeSchema;

    /// Point every slot at the matching component of `entity`.
    ///
    /// Must overwrite every slot: a pooled node still carries the handles of
    /// the last entity it described.
    fn populate(&mut self, entity: &Entity) -> Result<(), EngineError>;
}

/// A node field referring to one component of the described entity
pub struct Slot<C> {
    component: Option<Comp<C>>,
}

impl<C: Component> Slot<C> {
    /// Point the slot at `entity`'s `C` component
    pub fn fill(&mut self, node: &'static str, entity: &Entity) -> Result<(), EngineError> {
        self.component = entity.get::<C>();
        if self.component.is_some() {
            Ok(())
        } else {
            Err(EngineError::MissingComponent {
                node,
                component: ComponentType::of::<C>().name(),
                entity: entity.name().to_owned(),
            })
        }
    }

    /// The component handle, if the slot is filled
    pub const fn handle(&self) -> Option<&Comp<C>> {
        self.component.as_ref()
    }

    /// Whether the slot points at a component
    pub const fn is_filled(&self) -> bool {
        self.component.is_some()
    }

    /// Borrow the component.
    ///
    /// # Panics
    ///
    /// Panics if the slot is empty or the component is mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, C> {
        self.filled().borrow()
    }

    /// Mutably borrow the component.
    ///
    /// # Panics
    ///
    /// Panics if the slot is empty or the component is already borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, C> {
        self.filled().borrow_mut()
    }

    fn filled(&self) -> &Comp<C> {
        self.component.as_ref().unwrap_or_else(|| {
            panic!(
                "slot for `{}` read before its node was populated",
                ComponentType::of::<C>().name()
            )
        })
    }
}

impl<C> Default for Slot<C> {
    fn default() -> Self {
        Self { component: None }
    }
}

impl<C: Component> fmt::Debug for Slot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("component", &ComponentType::of::<C>())
            .field("filled", &self.is_filled())
            .finish()
    }
}

/// Declares a node view struct and implements [`Node`] for it.
///
/// Every field becomes a required [`Slot`]; types listed in the optional
/// `exclude { .. }` block disqualify an entity. The macro derives `Default`
/// itself, so do not add it to the attributes.
///
/// ```rust
/// use anthill::ecs::{Component, Node};
///
/// pub struct Health(pub i32);
/// impl Component for Health {}
/// pub struct UserControl;
/// impl Component for UserControl {}
///
/// anthill::node! {
///     /// Health of everything the player does not steer
///     pub struct EnemyNode {
///         pub health: Health,
///     }
///     exclude { UserControl }
/// }
///
/// let schema = EnemyNode::schema();
/// assert_eq!(schema.required().len(), 1);
/// assert_eq!(schema.excluded().len(), 1);
/// ```
#[macro_export]
macro_rules! node {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($(#[$field_meta:meta])* $field_vis:vis $field:ident : $component:ty),* $(,)?
        }
        $(exclude { $($excluded:ty),* $(,)? })?
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis struct $name {
            $($(#[$field_meta])* $field_vis $field: $crate::ecs::Slot<$component>,)*
        }

        impl $crate::ecs::Node for $name {
            fn schema() -> $crate::ecs::NodeSchema {
                $crate::ecs::NodeSchema::new(::std::stringify!($name))
                    $(.require::<$component>())*
                    $($(.exclude::<$excluded>())*)?
            }

            fn populate(
                &mut self,
                entity: &$crate::ecs::Entity,
            ) -> ::std::result::Result<(), $crate::EngineError> {
                $(self.$field.fill(::std::stringify!($name), entity)?;)*
                let _ = entity;
                ::std::result::Result::Ok(())
            }
        }
    };
}
