//! The world: entities, their components and the families watching them.

use std::any::type_name;

use tracing::trace;

use crate::bits::BitSet;
use crate::builder::EntityBuilder;
use crate::component::{Component, ComponentTypeID};
use crate::config::WorldConfig;
use crate::entity::{EntityID, EntityTable};
use crate::error::WorldError;
use crate::family::{FamilyID, FamilyRegistry, FamilySpec, FamilyView};
use crate::mapper::Mapper;
use crate::store::{ComponentStore, ComponentTable};

/// A World owns every entity, component store and family.
///
/// All operations are synchronous: by the time a call returns, every
/// component bit set, store and family reflects it.
///
/// Component changes are applied in a fixed order. The entity's component
/// bits are updated first, then the store notifies the families subscribed to
/// it. Destroying an entity removes its components one at a time in that
/// order before the entity is dropped from every family and its slot freed.
pub struct World {
    config: WorldConfig,
    components: ComponentTable,
    entities: EntityTable,
    families: FamilyRegistry,
}

impl World {
    /// Create a new world with the default config.
    pub fn new() -> World {
        World::with_config(WorldConfig::default())
    }

    /// Create a new world with the given config.
    pub fn with_config(config: WorldConfig) -> World {
        World {
            config,
            components: ComponentTable::new(
                config.initial_component_capacity,
                config.initial_entity_capacity),
            entities: EntityTable::with_capacity(config.initial_entity_capacity),
            families: FamilyRegistry::new(config.initial_entity_capacity),
        }
    }

    /// Return the config this world was created with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Return the `ComponentTypeID` of `T`, registering it on first use.
    pub fn register<T: Component>(&mut self) -> ComponentTypeID {
        self.components.register::<T>()
    }

    /// Get the component stores of this world.
    pub fn components(&self) -> &ComponentTable {
        &self.components
    }

    /// Get the store for `T` if it has been registered.
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.components.store::<T>()
    }

    /// Create a new entity with no components.
    pub fn spawn(&mut self) -> EntityID {
        let entity = self.entities.allocate();
        self.families.entity_created(entity.index() as usize, &BitSet::new());
        trace!(%entity, "spawned entity");
        entity
    }

    /// Create a new entity and attach the builder's components in order.
    ///
    /// Each component is attached as its own change, so families observe the
    /// entity gaining components one by one. If any component cannot be
    /// attached the entity is destroyed again and the error returned.
    pub fn create(&mut self, builder: EntityBuilder) -> Result<EntityID, WorldError> {
        let entity = self.spawn();
        if let Err(err) = builder.build(self, entity) {
            self.destroy(entity)?;
            return Err(err);
        }

        Ok(entity)
    }

    /// Destroy an entity, detaching all of its components.
    ///
    /// Fails with `UnknownEntity` if the entity is not alive.
    pub fn destroy(&mut self, entity: EntityID) -> Result<(), WorldError> {
        let bits = self.entities.component_bits_mut(entity)
            .ok_or(WorldError::UnknownEntity(entity))?;

        while let Some(bit) = bits.first() {
            let store = self.components.erased_mut(ComponentTypeID::new(bit));
            debug_assert!(store.is_some(), "component bit {} has no store", bit);
            match store {
                Some(store) => store.detach(entity, bits, &mut self.families)?,
                None => { bits.remove(bit); }
            }
        }

        self.families.entity_destroyed(entity.index() as usize);
        self.entities.free(entity);
        trace!(%entity, "destroyed entity");
        Ok(())
    }

    /// Returns true if the entity is alive in this world.
    pub fn contains(&self, entity: EntityID) -> bool {
        self.entities.contains(entity)
    }

    /// Iterate over every live entity.
    pub fn entities(&self) -> impl Iterator<Item=EntityID> + '_ {
        self.entities.iter()
    }

    /// Return the number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if there are no live entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Get the component bits of an entity.
    ///
    /// Bit `i` is set when the entity holds the component with ID `i`.
    pub fn component_bits(&self, entity: EntityID) -> Result<&BitSet, WorldError> {
        self.entities.component_bits(entity)
            .ok_or(WorldError::UnknownEntity(entity))
    }

    /// List the component types attached to an entity.
    pub fn component_types(&self, entity: EntityID) -> Result<Vec<ComponentTypeID>, WorldError> {
        let bits = self.component_bits(entity)?;
        Ok(bits.iter().map(ComponentTypeID::new).collect())
    }

    /// Attach a component to an entity.
    ///
    /// The instance comes from the store's pool when possible, reset to a
    /// neutral state, and is then passed to `init`.
    pub fn add<T, F>(&mut self, entity: EntityID, init: F) -> Result<&mut T, WorldError>
        where T: Component, F: FnOnce(&mut T)
    {
        self.add_at(None, entity, init)
    }

    /// Attach a component with its default value to an entity.
    pub fn add_default<T: Component>(&mut self, entity: EntityID) -> Result<&mut T, WorldError> {
        self.add_at(None, entity, |_: &mut T| {})
    }

    /// Detach a component from an entity, returning it to its store's pool.
    pub fn remove<T: Component>(&mut self, entity: EntityID) -> Result<(), WorldError> {
        self.remove_at::<T>(None, entity)
    }

    /// Get a component of an entity.
    pub fn get<T: Component>(&self, entity: EntityID) -> Result<&T, WorldError> {
        self.get_at(None, entity)
    }

    /// Get a component of an entity mutably.
    pub fn get_mut<T: Component>(&mut self, entity: EntityID) -> Result<&mut T, WorldError> {
        self.get_mut_at(None, entity)
    }

    /// Returns true if the entity is alive and has a `T`.
    pub fn has<T: Component>(&self, entity: EntityID) -> bool {
        self.has_at::<T>(None, entity)
    }

    /// Return the number of pooled instances of `T`.
    pub fn pool_len<T: Component>(&self) -> usize {
        self.store::<T>().map_or(0, ComponentStore::pool_len)
    }

    /// Create a typed accessor for `T`, registering it on first use.
    pub fn mapper<T: Component>(&mut self) -> Mapper<T> {
        Mapper::new(self.register::<T>())
    }

    /// Return the family matching `spec`.
    ///
    /// The first request for a predicate creates the family, fills it from
    /// the live entities and subscribes it to the stores of every type it
    /// mentions. Later requests for the same predicate return the same ID.
    pub fn build_family(&mut self, spec: &FamilySpec) -> FamilyID {
        let masks = spec.resolve(&mut self.components);
        let component_types = masks.component_types();
        let (id, created) = self.families.get_or_insert(masks, &self.entities);

        if created {
            for bit in component_types.iter() {
                if let Some(store) = self.components.erased_mut(ComponentTypeID::new(bit)) {
                    store.subscribe(id);
                }
            }
        }

        id
    }

    /// View the current members of a family.
    pub fn family(&self, id: FamilyID) -> Result<FamilyView<'_>, WorldError> {
        match self.families.get(id) {
            Some(family) => Ok(FamilyView::new(family, &self.entities)),
            None => Err(WorldError::UnknownFamily(id)),
        }
    }

    /// Return the number of distinct families built so far.
    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub(crate) fn add_at<T, F>(
        &mut self,
        hint: Option<ComponentTypeID>,
        entity: EntityID,
        init: F,
    ) -> Result<&mut T, WorldError>
        where T: Component, F: FnOnce(&mut T)
    {
        let bits = self.entities.component_bits_mut(entity)
            .ok_or(WorldError::UnknownEntity(entity))?;
        let store = self.components.store_or_insert::<T>(hint)
            .ok_or(WorldError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })?;
        store.add(entity, bits, &mut self.families, init)
    }

    pub(crate) fn remove_at<T: Component>(
        &mut self,
        hint: Option<ComponentTypeID>,
        entity: EntityID,
    ) -> Result<(), WorldError> {
        let bits = self.entities.component_bits_mut(entity)
            .ok_or(WorldError::UnknownEntity(entity))?;

        match self.components.store_at_mut::<T>(hint) {
            Some(store) => store.remove(entity, bits, &mut self.families),
            None => Err(WorldError::MissingComponent {
                entity,
                component: type_name::<T>(),
            }),
        }
    }

    pub(crate) fn get_at<T: Component>(
        &self,
        hint: Option<ComponentTypeID>,
        entity: EntityID,
    ) -> Result<&T, WorldError> {
        if !self.entities.contains(entity) {
            return Err(WorldError::UnknownEntity(entity));
        }

        self.components.store_at::<T>(hint)
            .and_then(|store| store.get(entity))
            .ok_or(WorldError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    pub(crate) fn get_mut_at<T: Component>(
        &mut self,
        hint: Option<ComponentTypeID>,
        entity: EntityID,
    ) -> Result<&mut T, WorldError> {
        if !self.entities.contains(entity) {
            return Err(WorldError::UnknownEntity(entity));
        }

        self.components.store_at_mut::<T>(hint)
            .and_then(|store| store.get_mut(entity))
            .ok_or(WorldError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    pub(crate) fn has_at<T: Component>(&self, hint: Option<ComponentTypeID>, entity: EntityID) -> bool {
        self.entities.contains(entity)
            && self.components.store_at::<T>(hint).map_or(false, |store| store.has(entity))
    }
}

impl Default for World {
    fn default() -> World {
        World::new()
    }
}
