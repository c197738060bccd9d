//! Entity builders describe the components a new entity starts with.

use std::fmt::{self, Debug, Formatter};

use crate::component::Component;
use crate::entity::EntityID;
use crate::error::WorldError;
use crate::world::World;

type BuildStep = Box<dyn FnOnce(&mut World, EntityID) -> Result<(), WorldError>>;

/// A list of components to attach to an entity when it is created.
///
/// Components are attached in the order they were added to the builder.
///
/// ```
/// # use lineage::{component, EntityBuilder, World};
/// #[derive(Default)]
/// struct Health(u32);
/// component!(Health);
///
/// let mut world = World::new();
/// let entity = world.create(EntityBuilder::new().with(|h: &mut Health| h.0 = 10)).unwrap();
/// assert_eq!(world.get::<Health>(entity).unwrap().0, 10);
/// ```
#[derive(Default)]
pub struct EntityBuilder {
    steps: Vec<BuildStep>,
}

impl EntityBuilder {
    /// Create a new, empty, builder.
    pub fn new() -> EntityBuilder {
        EntityBuilder {
            steps: Vec::new(),
        }
    }

    /// Attach a `T`, initialized by `init`.
    pub fn with<T, F>(mut self, init: F) -> EntityBuilder
        where T: Component, F: FnOnce(&mut T) + 'static
    {
        self.steps.push(Box::new(move |world: &mut World, entity| {
            world.add(entity, init).map(|_| ())
        }));
        self
    }

    /// Attach a `T` with its default value.
    pub fn with_default<T: Component>(self) -> EntityBuilder {
        self.with(|_: &mut T| {})
    }

    /// Return the number of components this builder attaches.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the builder attaches nothing.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Attach every component to `entity`, stopping at the first failure.
    pub(crate) fn build(self, world: &mut World, entity: EntityID) -> Result<(), WorldError> {
        for step in self.steps {
            step(world, entity)?;
        }
        Ok(())
    }
}

impl Debug for EntityBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityBuilder")
            .field("components", &self.steps.len())
            .finish()
    }
}
