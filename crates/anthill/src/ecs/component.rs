//! Component trait and type identifiers

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Marker trait for components
///
/// Components are plain data owned by exactly one entity and looked up by
/// their concrete type.
pub trait Component: Any {}

/// Shared handle to a component stored on an entity
pub type Comp<C> = Rc<RefCell<C>>;

/// Type-erased component handle. Always holds a `RefCell<C>` for some `C`.
pub type AnyComponent = Rc<dyn Any>;

/// Runtime identity of a component type
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    /// Identity of component type `C`
    pub fn of<C: Component>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: std::any::type_name::<C>(),
        }
    }

    /// The underlying [`TypeId`]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Type name without its module path
    pub fn name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name())
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wrap a component value into a shareable handle, returning both the typed and
/// the erased view of the same allocation.
pub(crate) fn share<C: Component>(component: C) -> (Comp<C>, AnyComponent) {
    let typed = Rc::new(RefCell::new(component));
    let erased: AnyComponent = typed.clone();
    (typed, erased)
}

/// Recover the typed handle from an erased one
pub(crate) fn downcast<C: Component>(component: AnyComponent) -> Option<Comp<C>> {
    component.downcast::<RefCell<C>>().ok()
}

/// Strip the module path from a type name, keeping generic arguments intact
/// (`game::units::Health` → `Health`, `a::Wrapper<b::Inner>` → `Wrapper<b::Inner>`).
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let head = full.find('<').map_or(full, |generic| &full[..generic]);
    head.rfind("::").map_or(full, |sep| &full[sep + 2..])
}
