//! Families: live sets of entities matching a component predicate.
//!
//! A family is described by three masks over component type IDs:
//! - `all`: every type must be attached
//! - `none`: no type may be attached
//! - `any`: at least one type must be attached, unless the mask is empty
//!
//! Families are deduplicated by their masks, so asking for the same predicate
//! twice yields the same `FamilyID`. Membership is kept up to date one entity
//! at a time as the component stores a family subscribes to report changes.

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};

use tracing::{debug, trace};

use crate::bits::{BitSet, Ones};
use crate::component::{Component, ComponentTypeID};
use crate::entity::{EntityID, EntityTable};
use crate::store::ComponentTable;

/// A handle to a family registered with a `World`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FamilyID(usize);

impl FamilyID {
    /// Return the inner unique ID.
    pub fn id(&self) -> usize {
        self.0
    }
}

/// The three component masks which make up a family predicate.
///
/// Masks compare by content, which is what identifies a family.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FamilyMasks {
    all: BitSet,
    none: BitSet,
    any: BitSet,
}

impl FamilyMasks {
    /// Create a new set of masks.
    pub fn new(all: BitSet, none: BitSet, any: BitSet) -> FamilyMasks {
        FamilyMasks { all, none, any }
    }

    /// Component types which must all be attached.
    pub fn all(&self) -> &BitSet {
        &self.all
    }

    /// Component types which must all be absent.
    pub fn none(&self) -> &BitSet {
        &self.none
    }

    /// Component types of which at least one must be attached.
    pub fn any(&self) -> &BitSet {
        &self.any
    }

    /// Returns true if an entity with the given component bits matches.
    pub fn matches(&self, bits: &BitSet) -> bool {
        bits.contains_all(&self.all)
            && !bits.intersects(&self.none)
            && (self.any.is_empty() || bits.intersects(&self.any))
    }

    /// Every component type mentioned by any of the masks.
    pub fn component_types(&self) -> BitSet {
        self.all.iter()
            .chain(self.none.iter())
            .chain(self.any.iter())
            .collect()
    }
}

type Resolver = fn(&mut ComponentTable) -> ComponentTypeID;

/// A description of a family in terms of Rust component types.
///
/// The order types are listed in does not matter.
///
/// ```ignore
/// let moving = FamilySpec::new()
///     .all_of::<Position>()
///     .all_of::<Velocity>()
///     .none_of::<Frozen>();
/// let family = world.build_family(&moving);
/// ```
#[derive(Clone, Default)]
pub struct FamilySpec {
    all: Vec<Resolver>,
    none: Vec<Resolver>,
    any: Vec<Resolver>,
}

impl FamilySpec {
    /// Create a spec which matches every entity.
    pub fn new() -> FamilySpec {
        FamilySpec::default()
    }

    /// Require `T` to be attached.
    #[must_use]
    pub fn all_of<T: Component>(mut self) -> FamilySpec {
        self.all.push(ComponentTable::register::<T>);
        self
    }

    /// Require `T` to be absent.
    #[must_use]
    pub fn none_of<T: Component>(mut self) -> FamilySpec {
        self.none.push(ComponentTable::register::<T>);
        self
    }

    /// Require at least one of the `any_of` types to be attached.
    #[must_use]
    pub fn any_of<T: Component>(mut self) -> FamilySpec {
        self.any.push(ComponentTable::register::<T>);
        self
    }

    /// Build the masks, registering any component type seen for the first time.
    pub(crate) fn resolve(&self, components: &mut ComponentTable) -> FamilyMasks {
        let mut mask = |resolvers: &[Resolver]| -> BitSet {
            resolvers.iter()
                .map(|resolve| resolve(&mut *components).id())
                .collect()
        };

        let all = mask(&self.all);
        let none = mask(&self.none);
        let any = mask(&self.any);
        FamilyMasks::new(all, none, any)
    }
}

impl Debug for FamilySpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FamilySpec")
            .field("all", &self.all.len())
            .field("none", &self.none.len())
            .field("any", &self.any.len())
            .finish()
    }
}

/// A family and its current members.
#[derive(Debug)]
pub struct Family {
    id: FamilyID,
    masks: FamilyMasks,
    members: BitSet,
    len: usize,
}

impl Family {
    fn new(id: FamilyID, masks: FamilyMasks, capacity: usize) -> Family {
        Family {
            id,
            masks,
            members: BitSet::with_capacity(capacity),
            len: 0,
        }
    }

    /// Return the ID of this family.
    pub fn id(&self) -> FamilyID {
        self.id
    }

    /// Return the masks describing this family.
    pub fn masks(&self) -> &FamilyMasks {
        &self.masks
    }

    /// Returns true if an entity with the given component bits belongs here.
    pub fn matches(&self, bits: &BitSet) -> bool {
        self.masks.matches(bits)
    }

    /// Returns true if the entity at `index` is a member.
    pub fn contains_index(&self, index: usize) -> bool {
        self.members.contains(index)
    }

    /// Iterate over the entity indices of the members.
    pub fn indices(&self) -> Ones<'_> {
        self.members.iter()
    }

    /// Return the number of members.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the family has no members.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Re-evaluate the entity at `index` against its current component bits.
    fn update(&mut self, index: usize, bits: &BitSet) {
        if self.masks.matches(bits) {
            if self.members.insert(index) {
                self.len += 1;
                trace!(family = self.id.0, index, "entity joined family");
            }
        } else {
            self.evict(index);
        }
    }

    fn evict(&mut self, index: usize) {
        if self.members.remove(index) {
            self.len -= 1;
            trace!(family = self.id.0, index, "entity left family");
        }
    }
}

/// Canonicalizes families and keeps their membership current.
#[derive(Debug, Default)]
pub struct FamilyRegistry {
    families: Vec<Family>,
    lookup: HashMap<FamilyMasks, FamilyID>,
    entity_capacity: usize,
}

impl FamilyRegistry {
    /// Create an empty registry whose families reserve room for
    /// `entity_capacity` members.
    pub fn new(entity_capacity: usize) -> FamilyRegistry {
        FamilyRegistry {
            families: Vec::new(),
            lookup: HashMap::new(),
            entity_capacity,
        }
    }

    /// Get a registered family.
    pub fn get(&self, id: FamilyID) -> Option<&Family> {
        self.families.get(id.0)
    }

    /// Find the family with exactly these masks.
    pub fn find(&self, masks: &FamilyMasks) -> Option<FamilyID> {
        self.lookup.get(masks).copied()
    }

    /// Return the family for `masks`, creating it if needed.
    ///
    /// A new family is populated from every live entity. The second value is
    /// true if the family was created by this call.
    pub(crate) fn get_or_insert(&mut self, masks: FamilyMasks, entities: &EntityTable) -> (FamilyID, bool) {
        if let Some(id) = self.find(&masks) {
            return (id, false);
        }

        let id = FamilyID(self.families.len());
        let mut family = Family::new(id, masks.clone(), self.entity_capacity);
        for entity in entities.iter() {
            if let Some(bits) = entities.component_bits(entity) {
                family.update(entity.index() as usize, bits);
            }
        }

        debug!(family = id.0, members = family.len(), ?masks, "created family");
        self.families.push(family);
        self.lookup.insert(masks, id);
        (id, true)
    }

    /// Re-evaluate one entity for the given subscribed families.
    pub(crate) fn component_changed(&mut self, listeners: &[FamilyID], index: usize, bits: &BitSet) {
        for id in listeners {
            if let Some(family) = self.families.get_mut(id.0) {
                family.update(index, bits);
            }
        }
    }

    /// Add a freshly created entity to every family matching its empty
    /// component set.
    pub(crate) fn entity_created(&mut self, index: usize, bits: &BitSet) {
        for family in &mut self.families {
            family.update(index, bits);
        }
    }

    /// Remove a destroyed entity from every family.
    pub(crate) fn entity_destroyed(&mut self, index: usize) {
        for family in &mut self.families {
            family.evict(index);
        }
    }

    /// Iterate over every registered family.
    pub fn iter(&self) -> impl Iterator<Item=&Family> {
        self.families.iter()
    }

    /// Return the number of registered families.
    pub fn len(&self) -> usize {
        self.families.len()
    }

    /// Returns true if no family has been registered.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}

/// A read-only view of a family's members.
///
/// The view borrows the world, so the world cannot change while it is alive.
/// Use a `CommandBuffer` to queue changes found while walking the members.
#[derive(Clone, Copy)]
pub struct FamilyView<'a> {
    family: &'a Family,
    entities: &'a EntityTable,
}

impl<'a> FamilyView<'a> {
    pub(crate) fn new(family: &'a Family, entities: &'a EntityTable) -> FamilyView<'a> {
        FamilyView { family, entities }
    }

    /// Return the ID of the viewed family.
    pub fn id(&self) -> FamilyID {
        self.family.id()
    }

    /// Return the masks describing the family.
    pub fn masks(&self) -> &'a FamilyMasks {
        self.family.masks()
    }

    /// Returns true if an entity with the given component bits would belong.
    pub fn matches(&self, bits: &BitSet) -> bool {
        self.family.matches(bits)
    }

    /// Returns true if `entity` is a member.
    pub fn contains(&self, entity: EntityID) -> bool {
        self.entities.contains(entity) && self.family.contains_index(entity.index() as usize)
    }

    /// Iterate over the members in index order.
    pub fn iter(&self) -> impl Iterator<Item=EntityID> + 'a {
        let entities = self.entities;
        self.family.indices()
            .filter_map(move |index| entities.entity_at(index))
    }

    /// Copy the current members out.
    pub fn entities(&self) -> Vec<EntityID> {
        self.iter().collect()
    }

    /// Return the number of members.
    pub fn len(&self) -> usize {
        self.family.len()
    }

    /// Returns true if the family has no members.
    pub fn is_empty(&self) -> bool {
        self.family.is_empty()
    }
}
