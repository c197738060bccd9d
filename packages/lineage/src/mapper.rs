//! Typed component accessors.

use std::fmt::{self, Debug, Formatter};
use std::marker::PhantomData;

use crate::component::{Component, ComponentTypeID};
use crate::entity::EntityID;
use crate::error::WorldError;
use crate::world::World;

/// A cached accessor for one component type.
///
/// A mapper remembers the `ComponentTypeID` of `T` so repeated access skips
/// the type lookup. Mappers are obtained from `World::mapper` and are cheap to
/// copy. Using a mapper with a world other than the one that created it still
/// works, it just falls back to looking the type up.
pub struct Mapper<T: Component> {
    type_id: ComponentTypeID,
    marker: PhantomData<fn() -> T>,
}

impl<T: Component> Mapper<T> {
    pub(crate) fn new(type_id: ComponentTypeID) -> Mapper<T> {
        Mapper {
            type_id,
            marker: PhantomData,
        }
    }

    /// Return the component type this mapper accesses.
    pub fn component_type(&self) -> ComponentTypeID {
        self.type_id
    }

    /// Returns true if the entity is alive and has a `T`.
    pub fn has(&self, world: &World, entity: EntityID) -> bool {
        world.has_at::<T>(Some(self.type_id), entity)
    }

    /// Get the component of an entity.
    pub fn get<'a>(&self, world: &'a World, entity: EntityID) -> Result<&'a T, WorldError> {
        world.get_at(Some(self.type_id), entity)
    }

    /// Get the component of an entity mutably.
    pub fn get_mut<'a>(&self, world: &'a mut World, entity: EntityID) -> Result<&'a mut T, WorldError> {
        world.get_mut_at(Some(self.type_id), entity)
    }

    /// Attach a `T` to an entity, initialized by `init`.
    pub fn add<'a, F>(&self, world: &'a mut World, entity: EntityID, init: F) -> Result<&'a mut T, WorldError>
        where F: FnOnce(&mut T)
    {
        world.add_at(Some(self.type_id), entity, init)
    }

    /// Attach a default `T` to an entity.
    pub fn add_default<'a>(&self, world: &'a mut World, entity: EntityID) -> Result<&'a mut T, WorldError> {
        self.add(world, entity, |_| {})
    }

    /// Detach the `T` of an entity.
    pub fn remove(&self, world: &mut World, entity: EntityID) -> Result<(), WorldError> {
        world.remove_at::<T>(Some(self.type_id), entity)
    }
}

impl<T: Component> Clone for Mapper<T> {
    fn clone(&self) -> Mapper<T> {
        *self
    }
}

impl<T: Component> Copy for Mapper<T> {}

impl<T: Component> Debug for Mapper<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("type_id", &self.type_id)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::component;

    #[derive(Debug, Default, PartialEq)]
    struct Speed(f32);

    #[derive(Debug, Default, PartialEq)]
    struct Mass(f32);

    component!(Speed, Mass);

    #[test]
    fn test_mapper_access() {
        let mut world = World::new();
        let speed = world.mapper::<Speed>();
        let entity = world.spawn();

        assert!(!speed.has(&world, entity));
        speed.add(&mut world, entity, |s| s.0 = 3.0).unwrap();
        assert!(speed.has(&world, entity));
        assert_eq!(speed.get(&world, entity).unwrap(), &Speed(3.0));

        speed.get_mut(&mut world, entity).unwrap().0 = 4.0;
        assert_eq!(world.get::<Speed>(entity).unwrap(), &Speed(4.0));

        speed.remove(&mut world, entity).unwrap();
        assert!(matches!(
            speed.get(&world, entity),
            Err(WorldError::MissingComponent { .. })));
        assert_eq!(world.pool_len::<Speed>(), 1);
    }

    #[test]
    fn test_mapper_from_other_world() {
        let mut first = World::new();
        first.register::<Mass>();
        let speed = first.mapper::<Speed>();
        assert_eq!(speed.component_type().id(), 1);

        let mut second = World::new();
        second.register::<Speed>();
        let mass = second.mapper::<Mass>();
        assert_eq!(mass.component_type(), speed.component_type());

        let entity = second.spawn();
        speed.add(&mut second, entity, |s| s.0 = 2.0).unwrap();
        mass.add_default(&mut second, entity).unwrap();

        assert_eq!(second.get::<Speed>(entity).unwrap(), &Speed(2.0));
        assert_eq!(speed.get(&second, entity).unwrap(), &Speed(2.0));
        assert_eq!(second.get::<Mass>(entity).unwrap(), &Mass(0.0));
        assert_eq!(second.component_types(entity).unwrap().len(), 2);
    }
}
