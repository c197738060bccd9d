//! Per-type component storage.
//!
//! Each component type gets one `ComponentStore`, indexed by entity index.
//! Detached components are kept in a free pool and handed out again on the
//! next add, after being reset.
//!
//! A store keeps the list of families interested in its type. Adding or
//! removing a component updates the entity's component bits first and only
//! then notifies those families, so they always see the final state.

use std::any::{type_name, Any};

use crossbeam_queue::SegQueue;

use crate::bits::BitSet;
use crate::component::{Component, ComponentRegistry, ComponentTypeID};
use crate::entity::EntityID;
use crate::error::WorldError;
use crate::family::{FamilyID, FamilyRegistry};

/// Storage for every instance of one component type.
pub struct ComponentStore<T: Component> {
    type_id: ComponentTypeID,
    components: Vec<Option<T>>,
    pool: SegQueue<T>,
    listeners: Vec<FamilyID>,
    len: usize,
}

impl<T: Component> ComponentStore<T> {
    /// Create an empty store with slots for `capacity` entities.
    pub fn new(type_id: ComponentTypeID, capacity: usize) -> ComponentStore<T> {
        ComponentStore {
            type_id,
            components: Vec::with_capacity(capacity),
            pool: SegQueue::new(),
            listeners: Vec::new(),
            len: 0,
        }
    }

    /// Return the component type stored here.
    pub fn component_type(&self) -> ComponentTypeID {
        self.type_id
    }

    /// Returns true if the entity has a component in this store.
    pub fn has(&self, entity: EntityID) -> bool {
        self.components.get(entity.index() as usize)
            .map_or(false, Option::is_some)
    }

    /// Get the component attached to an entity.
    pub fn get(&self, entity: EntityID) -> Option<&T> {
        self.components.get(entity.index() as usize)
            .and_then(Option::as_ref)
    }

    /// Get the component attached to an entity mutably.
    pub fn get_mut(&mut self, entity: EntityID) -> Option<&mut T> {
        self.components.get_mut(entity.index() as usize)
            .and_then(Option::as_mut)
    }

    /// Return the number of detached instances waiting to be reused.
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Return the families notified about changes to this store.
    pub fn listeners(&self) -> &[FamilyID] {
        &self.listeners
    }

    /// Return the number of attached components.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no entity has this component.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Take an instance from the pool, or make a new one.
    fn obtain(&mut self) -> T {
        match self.pool.pop() {
            Some(mut component) => {
                component.reset();
                component
            }
            None => T::default(),
        }
    }

    /// Attach a component to an entity.
    ///
    /// `bits` must be the entity's component bits. On failure nothing is
    /// changed.
    pub(crate) fn add<F>(
        &mut self,
        entity: EntityID,
        bits: &mut BitSet,
        families: &mut FamilyRegistry,
        init: F,
    ) -> Result<&mut T, WorldError>
        where F: FnOnce(&mut T)
    {
        let bit = self.type_id.id();
        if bits.contains(bit) {
            return Err(WorldError::ComponentAlreadyExists {
                entity,
                component: type_name::<T>(),
            });
        }

        let mut component = self.obtain();
        init(&mut component);

        let index = entity.index() as usize;
        if index >= self.components.len() {
            self.components.resize_with(index + 1, || None);
        }
        let slot = self.components[index].insert(component);
        self.len += 1;

        bits.insert(bit);
        families.component_changed(&self.listeners, index, bits);
        Ok(slot)
    }

    /// Detach the component of an entity and return it to the pool.
    ///
    /// Families are notified after the bit is cleared and before the instance
    /// is pooled. On failure nothing is changed.
    pub(crate) fn remove(
        &mut self,
        entity: EntityID,
        bits: &mut BitSet,
        families: &mut FamilyRegistry,
    ) -> Result<(), WorldError> {
        if !bits.remove(self.type_id.id()) {
            return Err(WorldError::MissingComponent {
                entity,
                component: type_name::<T>(),
            });
        }

        let index = entity.index() as usize;
        families.component_changed(&self.listeners, index, bits);

        if let Some(component) = self.components.get_mut(index).and_then(Option::take) {
            self.pool.push(component);
            self.len -= 1;
        }
        Ok(())
    }
}

/// The type-independent part of a `ComponentStore`.
pub(crate) trait ErasedStore {
    fn pool_len(&self) -> usize;

    /// Register a family for change notifications, at most once.
    fn subscribe(&mut self, family: FamilyID);

    fn detach(
        &mut self,
        entity: EntityID,
        bits: &mut BitSet,
        families: &mut FamilyRegistry,
    ) -> Result<(), WorldError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn pool_len(&self) -> usize {
        self.pool.len()
    }

    fn subscribe(&mut self, family: FamilyID) {
        if !self.listeners.contains(&family) {
            self.listeners.push(family);
        }
    }

    fn detach(
        &mut self,
        entity: EntityID,
        bits: &mut BitSet,
        families: &mut FamilyRegistry,
    ) -> Result<(), WorldError> {
        self.remove(entity, bits, families)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Every component store of a world, indexed by `ComponentTypeID`.
pub struct ComponentTable {
    registry: ComponentRegistry,
    stores: Vec<Box<dyn ErasedStore>>,
    entity_capacity: usize,
}

impl ComponentTable {
    /// Create an empty table.
    ///
    /// `component_capacity` is the number of component types to reserve room
    /// for, `entity_capacity` the number of slots each new store reserves.
    pub fn new(component_capacity: usize, entity_capacity: usize) -> ComponentTable {
        ComponentTable {
            registry: ComponentRegistry::with_capacity(component_capacity),
            stores: Vec::with_capacity(component_capacity),
            entity_capacity,
        }
    }

    /// Return the ID of `T`, registering it and creating its store on first use.
    pub fn register<T: Component>(&mut self) -> ComponentTypeID {
        let id = self.registry.id_for::<T>();
        if id.id() == self.stores.len() {
            self.stores.push(Box::new(ComponentStore::<T>::new(id, self.entity_capacity)));
        }
        id
    }

    /// Return the ID of `T` if it has been registered.
    pub fn id_of<T: Component>(&self) -> Option<ComponentTypeID> {
        self.registry.get::<T>()
    }

    /// Return the type name of a registered component type.
    pub fn name(&self, id: ComponentTypeID) -> Option<&'static str> {
        self.registry.name(id)
    }

    /// Return the number of pooled instances of a registered component type.
    pub fn pool_len(&self, id: ComponentTypeID) -> Option<usize> {
        self.erased(id).map(|store| store.pool_len())
    }

    /// Get the store for `T` if it has been registered.
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.store_at(None)
    }

    /// Get the store for `T` mutably if it has been registered.
    pub fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.store_at_mut(None)
    }

    /// Find the ID `T` is stored under.
    ///
    /// `hint` is tried first and used if it holds a store of `T`, otherwise
    /// the ID is looked up by type.
    fn resolve<T: Component>(&self, hint: Option<ComponentTypeID>) -> Option<ComponentTypeID> {
        let hinted = hint.filter(|id| {
            self.stores.get(id.id())
                .map_or(false, |store| store.as_any().is::<ComponentStore<T>>())
        });

        match hinted {
            Some(id) => Some(id),
            None => self.id_of::<T>(),
        }
    }

    pub(crate) fn store_at<T: Component>(&self, hint: Option<ComponentTypeID>) -> Option<&ComponentStore<T>> {
        let id = self.resolve::<T>(hint)?;
        self.stores.get(id.id())?.as_any().downcast_ref()
    }

    pub(crate) fn store_at_mut<T: Component>(&mut self, hint: Option<ComponentTypeID>) -> Option<&mut ComponentStore<T>> {
        let id = self.resolve::<T>(hint)?;
        self.stores.get_mut(id.id())?.as_any_mut().downcast_mut()
    }

    /// Get the store for `T`, registering it first if needed.
    pub(crate) fn store_or_insert<T: Component>(&mut self, hint: Option<ComponentTypeID>) -> Option<&mut ComponentStore<T>> {
        if self.resolve::<T>(hint).is_none() {
            self.register::<T>();
        }
        self.store_at_mut(hint)
    }

    pub(crate) fn erased(&self, id: ComponentTypeID) -> Option<&dyn ErasedStore> {
        self.stores.get(id.id()).map(|store| &**store)
    }

    pub(crate) fn erased_mut(&mut self, id: ComponentTypeID) -> Option<&mut (dyn ErasedStore + 'static)> {
        self.stores.get_mut(id.id()).map(|store| &mut **store)
    }

    /// Return the number of registered component types.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Returns true if no component type has been registered.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::component;
    use crate::entity::EntityTable;
    use crate::family::{FamilyMasks, FamilyRegistry};

    #[derive(Debug, Default, PartialEq)]
    struct Position {
        x: i32,
        y: i32,
    }

    #[derive(Debug, Default)]
    struct Tag;

    component!(Position, Tag);

    #[test]
    fn test_register_creates_store() {
        let mut table = ComponentTable::new(4, 4);
        let position = table.register::<Position>();
        let tag = table.register::<Tag>();

        assert_eq!(table.register::<Position>(), position);
        assert_ne!(position, tag);
        assert_eq!(table.len(), 2);
        assert_eq!(table.store::<Position>().unwrap().component_type(), position);
        assert!(table.name(tag).unwrap().ends_with("Tag"));
        assert_eq!(table.pool_len(tag), Some(0));
    }

    #[test]
    fn test_add_and_remove() {
        let mut entities = EntityTable::new();
        let mut families = FamilyRegistry::new(0);
        let mut table = ComponentTable::new(1, 1);
        let entity = entities.allocate();

        let bits = entities.component_bits_mut(entity).unwrap();
        let store = table.store_or_insert::<Position>(None).unwrap();
        let position = store.add(entity, bits, &mut families, |p| p.x = 4).unwrap();
        assert_eq!(*position, Position { x: 4, y: 0 });
        assert!(store.has(entity));
        assert!(bits.contains(store.component_type().id()));
        assert_eq!(store.len(), 1);

        store.remove(entity, bits, &mut families).unwrap();
        assert!(!store.has(entity));
        assert!(bits.is_empty());
        assert_eq!(store.pool_len(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_add_changes_nothing() {
        let mut entities = EntityTable::new();
        let mut families = FamilyRegistry::new(0);
        let mut table = ComponentTable::new(1, 1);
        let entity = entities.allocate();
        let bits = entities.component_bits_mut(entity).unwrap();
        let store = table.store_or_insert::<Position>(None).unwrap();

        store.add(entity, bits, &mut families, |p| p.y = 1).unwrap();
        store.remove(entity, bits, &mut families).unwrap();
        store.add(entity, bits, &mut families, |p| p.y = 2).unwrap();
        assert_eq!(store.pool_len(), 0);

        let other = EntityID::new(9, 0);
        let mut other_bits = BitSet::new();
        store.add(other, &mut other_bits, &mut families, |_| {}).unwrap();
        store.remove(other, &mut other_bits, &mut families).unwrap();
        assert_eq!(store.pool_len(), 1);

        let before = bits.clone();
        let err = store.add(entity, bits, &mut families, |p| p.y = 3).unwrap_err();
        assert!(matches!(err, WorldError::ComponentAlreadyExists { .. }));
        assert_eq!(*bits, before);
        assert_eq!(store.pool_len(), 1);
        assert_eq!(store.get(entity), Some(&Position { x: 0, y: 2 }));
    }

    #[test]
    fn test_remove_missing() {
        let mut families = FamilyRegistry::new(0);
        let mut table = ComponentTable::new(1, 1);
        let store = table.store_or_insert::<Tag>(None).unwrap();
        let mut bits = BitSet::new();

        let err = store.remove(EntityID::new(0, 0), &mut bits, &mut families).unwrap_err();
        assert!(matches!(err, WorldError::MissingComponent { .. }));
        assert_eq!(store.pool_len(), 0);
    }

    #[test]
    fn test_pooled_instance_is_reset() {
        let mut entities = EntityTable::new();
        let mut families = FamilyRegistry::new(0);
        let mut table = ComponentTable::new(1, 1);
        let entity = entities.allocate();
        let bits = entities.component_bits_mut(entity).unwrap();
        let store = table.store_or_insert::<Position>(None).unwrap();

        store.add(entity, bits, &mut families, |p| *p = Position { x: 5, y: 6 }).unwrap();
        store.remove(entity, bits, &mut families).unwrap();
        let reused = store.add(entity, bits, &mut families, |p| p.x = 1).unwrap();
        assert_eq!(*reused, Position { x: 1, y: 0 });
    }

    #[test]
    fn test_notifies_listeners() {
        let mut entities = EntityTable::new();
        let mut families = FamilyRegistry::new(0);
        let mut table = ComponentTable::new(1, 1);
        let entity = entities.allocate();

        let position = table.register::<Position>();
        let masks = FamilyMasks::new(
            std::iter::once(position.id()).collect(), BitSet::new(), BitSet::new());
        let (family, _) = families.get_or_insert(masks, &entities);
        let erased = table.erased_mut(position).unwrap();
        erased.subscribe(family);
        erased.subscribe(family);
        assert_eq!(table.store::<Position>().unwrap().listeners(), &[family]);

        let bits = entities.component_bits_mut(entity).unwrap();
        let store = table.store_or_insert::<Position>(None).unwrap();
        store.add(entity, bits, &mut families, |_| {}).unwrap();
        assert!(families.get(family).unwrap().contains_index(0));

        table.erased_mut(position).unwrap().detach(entity, bits, &mut families).unwrap();
        assert!(families.get(family).unwrap().is_empty());
        assert_eq!(table.pool_len(position), Some(1));
    }

    #[test]
    fn test_store_or_insert_ignores_foreign_hint() {
        let mut table = ComponentTable::new(2, 1);
        let tag = table.register::<Tag>();

        let store = table.store_or_insert::<Position>(Some(tag)).unwrap();
        let position = store.component_type();
        assert_ne!(position, tag);
        assert_eq!(table.len(), 2);
        assert_eq!(table.store_or_insert::<Position>(Some(tag)).unwrap().component_type(), position);
        assert_eq!(table.store_or_insert::<Tag>(Some(position)).unwrap().component_type(), tag);
        assert_eq!(table.len(), 2);
    }
}
