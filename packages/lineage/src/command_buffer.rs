use std::collections::VecDeque;
use std::fmt::{self, Debug, Formatter};

use crate::builder::EntityBuilder;
use crate::component::Component;
use crate::entity::EntityID;
use crate::error::WorldError;
use crate::world::World;

type Command = Box<dyn FnOnce(&mut World) -> Result<(), WorldError>>;

/// A command buffer for entity changes.
///
/// A `FamilyView` borrows the world, so entities cannot be changed while a
/// family is being iterated. Record the changes in a `CommandBuffer` instead
/// and apply them once iteration is done. Commands are applied in the order
/// they were recorded.
#[derive(Default)]
pub struct CommandBuffer {
    commands: VecDeque<Command>,
}

impl CommandBuffer {
    /// Create a new, empty, command buffer.
    pub fn new() -> CommandBuffer {
        CommandBuffer {
            commands: VecDeque::new(),
        }
    }

    /// Create a new entity from a builder.
    pub fn create(&mut self, builder: EntityBuilder) {
        self.commands.push_back(Box::new(move |world: &mut World| {
            world.create(builder).map(|_| ())
        }));
    }

    /// Destroy an entity.
    pub fn destroy(&mut self, entity: EntityID) {
        self.commands.push_back(Box::new(move |world: &mut World| world.destroy(entity)));
    }

    /// Attach a component to an entity.
    pub fn add<T, F>(&mut self, entity: EntityID, init: F)
        where T: Component, F: FnOnce(&mut T) + 'static
    {
        self.commands.push_back(Box::new(move |world: &mut World| {
            world.add(entity, init).map(|_| ())
        }));
    }

    /// Attach a default component to an entity.
    pub fn add_default<T: Component>(&mut self, entity: EntityID) {
        self.add(entity, |_: &mut T| {});
    }

    /// Remove a single component from an entity.
    pub fn remove<T: Component>(&mut self, entity: EntityID) {
        self.commands.push_back(Box::new(move |world: &mut World| world.remove::<T>(entity)));
    }

    /// Move every command of `other` to the end of this buffer.
    pub fn append(&mut self, other: &mut CommandBuffer) {
        self.commands.append(&mut other.commands);
    }

    /// Apply the recorded commands to a world, in order.
    ///
    /// Stops at the first command that fails and returns its error. Commands
    /// after the failing one stay in the buffer.
    pub fn apply(&mut self, world: &mut World) -> Result<(), WorldError> {
        while let Some(command) = self.commands.pop_front() {
            command(world)?;
        }
        Ok(())
    }

    /// Return the number of pending commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if there are no pending commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drop every pending command.
    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Debug for CommandBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBuffer")
            .field("commands", &self.commands.len())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::component;
    use crate::family::FamilySpec;

    #[derive(Debug, Default, PartialEq)]
    struct Fuel(u32);

    #[derive(Debug, Default)]
    struct Stranded;

    component!(Fuel, Stranded);

    #[test]
    fn test_deferred_changes() {
        let mut world = World::new();
        let fuelled = world.build_family(&FamilySpec::new().all_of::<Fuel>());
        let a = world.create(EntityBuilder::new().with(|f: &mut Fuel| f.0 = 0)).unwrap();
        let b = world.create(EntityBuilder::new().with(|f: &mut Fuel| f.0 = 5)).unwrap();

        let mut commands = CommandBuffer::new();
        for entity in world.family(fuelled).unwrap().iter() {
            if world.get::<Fuel>(entity).unwrap().0 == 0 {
                commands.remove::<Fuel>(entity);
                commands.add_default::<Stranded>(entity);
            }
        }
        commands.create(EntityBuilder::new().with_default::<Fuel>());
        assert_eq!(commands.len(), 3);
        assert_eq!(world.family(fuelled).unwrap().len(), 2);

        commands.apply(&mut world).unwrap();
        assert!(commands.is_empty());
        assert!(world.has::<Stranded>(a));
        assert!(!world.has::<Stranded>(b));

        let view = world.family(fuelled).unwrap();
        assert!(!view.contains(a));
        assert!(view.contains(b));
        assert_eq!(view.len(), 2);
        assert_eq!(world.len(), 3);
    }

    #[test]
    fn test_apply_stops_at_failure() {
        let mut world = World::new();
        let entity = world.spawn();

        let mut commands = CommandBuffer::new();
        commands.add(entity, |f: &mut Fuel| f.0 = 1);
        commands.add_default::<Fuel>(entity);
        commands.destroy(entity);

        let err = commands.apply(&mut world).unwrap_err();
        assert!(matches!(err, WorldError::ComponentAlreadyExists { .. }));
        assert_eq!(commands.len(), 1);
        assert_eq!(world.get::<Fuel>(entity).unwrap(), &Fuel(1));

        commands.apply(&mut world).unwrap();
        assert!(!world.contains(entity));
        assert_eq!(commands.apply(&mut world), Ok(()));
    }

    #[test]
    fn test_append_and_clear() {
        let mut world = World::new();
        let entity = world.spawn();

        let mut first = CommandBuffer::new();
        let mut second = CommandBuffer::new();
        first.add_default::<Fuel>(entity);
        second.destroy(entity);
        first.append(&mut second);
        assert_eq!(first.len(), 2);
        assert!(second.is_empty());

        let mut discarded = CommandBuffer::default();
        discarded.destroy(entity);
        discarded.clear();
        assert!(discarded.is_empty());
        assert_eq!(format!("{:?}", discarded), "CommandBuffer { commands: 0 }");

        first.apply(&mut world).unwrap();
        assert!(world.is_empty());
        assert_eq!(world.pool_len::<Fuel>(), 1);
    }
}
