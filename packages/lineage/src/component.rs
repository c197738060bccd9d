//! Base definitions for components.
//!
//! Components are plain data attached to entities. There is no intrinsic
//! value to an entity beyond the components it holds.
//!
//! Each component type is allocated a dense `ComponentTypeID` by the
//! `ComponentRegistry` of the world it is first used in. The ID doubles as the
//! bit position of the type in every `BitSet` the world keeps. There is a macro
//! (`component`) to mark a type as a component.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use tracing::debug;

/// A component type ID which is unique for a specific component type within a
/// single world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentTypeID(usize);

impl ComponentTypeID {
    /// Construct a new `ComponentTypeID` from the inner value.
    pub(crate) fn new(inner: usize) -> ComponentTypeID {
        ComponentTypeID(inner)
    }

    /// Return the inner unique ID.
    ///
    /// This is also the bit position of the type in component bit sets.
    pub fn id(&self) -> usize {
        self.0
    }
}

/// The component trait is implemented on all component types.
///
/// Instances are pooled by their store once detached. Before a pooled
/// instance is handed out again it is `reset`, so an initializer only ever
/// sees a neutral value.
pub trait Component: Default + 'static {
    /// Return this instance to a neutral state before it is reused.
    ///
    /// The default implementation replaces the value with `Default::default()`.
    /// Override it to keep allocations (such as a `Vec`'s buffer) alive across
    /// reuse.
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Implement the `Component` trait on one or more types.
///
/// Component types must implement Default.
#[macro_export]
macro_rules! component {
    ($($i:ty),+ $(,)?) => {
        $(
            impl $crate::component::Component for $i {}
        )+
    };
}

/// Assigns `ComponentTypeID`s to Rust types in first-use order.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    ids: HashMap<TypeId, ComponentTypeID>,
    names: Vec<&'static str>,
}

impl ComponentRegistry {
    /// Create a new, empty, registry.
    pub fn new() -> ComponentRegistry {
        ComponentRegistry::with_capacity(0)
    }

    /// Create a new registry with room for `capacity` component types.
    pub fn with_capacity(capacity: usize) -> ComponentRegistry {
        ComponentRegistry {
            ids: HashMap::with_capacity(capacity),
            names: Vec::with_capacity(capacity),
        }
    }

    /// Return the ID for `T`, allocating the next free ID on first use.
    pub fn id_for<T: Component>(&mut self) -> ComponentTypeID {
        if let Some(id) = self.get::<T>() {
            return id;
        }

        let id = ComponentTypeID::new(self.names.len());
        self.ids.insert(TypeId::of::<T>(), id);
        self.names.push(type_name::<T>());
        debug!(component = type_name::<T>(), id = id.id(), "registered component type");
        id
    }

    /// Return the ID for `T` if it has been registered.
    pub fn get<T: Component>(&self) -> Option<ComponentTypeID> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Return the type name registered for `id`.
    pub fn name(&self, id: ComponentTypeID) -> Option<&'static str> {
        self.names.get(id.0).copied()
    }

    /// Return the number of registered component types.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no component type has been registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
