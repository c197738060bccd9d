//! Entity handles and the table that issues them.
//!
//! An entity is nothing more than an index into the world's tables plus a
//! generation counter. Indices are recycled once an entity is destroyed; the
//! generation is bumped at the same time so stale handles can be told apart
//! from the entity that reuses their slot.

use std::fmt::{self, Display, Formatter};

use crate::bits::BitSet;

/// A handle to an entity in a `World`.
///
/// Handles compare by identity: two entities holding identical component data
/// are still different entities.
///
/// Both halves are 32 bits. A world holds at most `u32::MAX` entity slots, and
/// the generation of a slot wraps after 2^32 reuses, at which point a handle
/// that old compares equal to the slot's current entity again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityID {
    index: u32,
    generation: u32,
}

impl EntityID {
    pub(crate) fn new(index: u32, generation: u32) -> EntityID {
        EntityID { index, generation }
    }

    /// The slot of this entity.
    ///
    /// Slots are dense and reused after the entity is destroyed.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// How many times the slot has been recycled before this entity got it.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack the handle into a single integer.
    pub fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }

    /// Unpack a handle produced by `to_bits`.
    pub fn from_bits(bits: u64) -> EntityID {
        EntityID {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl Display for EntityID {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "entity {}v{}", self.index, self.generation)
    }
}

/// Allocates entity slots and records which components each live entity holds.
#[derive(Debug, Default)]
pub struct EntityTable {
    generations: Vec<u32>,
    components: Vec<BitSet>,
    alive: BitSet,
    free_list: Vec<u32>,
    len: usize,
}

impl EntityTable {
    /// Create a new, empty, entity table.
    pub fn new() -> EntityTable {
        EntityTable::with_capacity(0)
    }

    /// Create an entity table with room for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> EntityTable {
        EntityTable {
            generations: Vec::with_capacity(capacity),
            components: Vec::with_capacity(capacity),
            alive: BitSet::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Allocate a new entity with an empty component set.
    ///
    /// The most recently freed slot is reused first.
    pub fn allocate(&mut self) -> EntityID {
        let index = match self.free_list.pop() {
            Some(index) => index,
            None => {
                debug_assert!(self.generations.len() < u32::MAX as usize, "entity slots exhausted");
                let index = self.generations.len() as u32;
                self.generations.push(0);
                self.components.push(BitSet::new());
                index
            }
        };

        self.alive.insert(index as usize);
        self.len += 1;
        EntityID::new(index, self.generations[index as usize])
    }

    /// Release the slot of a live entity.
    ///
    /// Returns false if the entity is not alive.
    pub fn free(&mut self, entity: EntityID) -> bool {
        if !self.contains(entity) {
            return false;
        }

        let index = entity.index() as usize;
        self.components[index].clear();
        self.alive.remove(index);
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.free_list.push(entity.index());
        self.len -= 1;
        true
    }

    /// Returns true if the entity is alive.
    pub fn contains(&self, entity: EntityID) -> bool {
        let index = entity.index() as usize;
        self.alive.contains(index) && self.generations[index] == entity.generation()
    }

    /// Return the live entity occupying `index`, if any.
    pub fn entity_at(&self, index: usize) -> Option<EntityID> {
        if self.alive.contains(index) {
            Some(EntityID::new(index as u32, self.generations[index]))
        } else {
            None
        }
    }

    /// Get the component bits of a live entity.
    pub fn component_bits(&self, entity: EntityID) -> Option<&BitSet> {
        if self.contains(entity) {
            self.components.get(entity.index() as usize)
        } else {
            None
        }
    }

    /// Get the component bits of a live entity mutably.
    pub fn component_bits_mut(&mut self, entity: EntityID) -> Option<&mut BitSet> {
        if self.contains(entity) {
            self.components.get_mut(entity.index() as usize)
        } else {
            None
        }
    }

    /// Iterate over every live entity in index order.
    pub fn iter(&self) -> impl Iterator<Item=EntityID> + '_ {
        self.alive.iter()
            .map(move |index| EntityID::new(index as u32, self.generations[index]))
    }

    /// Return the number of live entities.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no live entities.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
