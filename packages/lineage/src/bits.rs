//! Growable bit sets.
//!
//! Every entity carries a `BitSet` of the component types attached to it, and
//! every family keeps its masks and its membership as `BitSet`s. The set grows
//! on demand so neither the entity index space nor the component type space
//! has a fixed ceiling.

use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

use bit_vec::BitVec;

/// A growable set of small integers backed by a `BitVec`.
///
/// Two sets are equal when they contain the same integers, regardless of how
/// far either of them has grown.
#[derive(Clone, Default)]
pub struct BitSet {
    bits: BitVec,
}

impl BitSet {
    /// Create a new empty `BitSet`.
    pub fn new() -> BitSet {
        BitSet {
            bits: BitVec::new(),
        }
    }

    /// Create a new empty `BitSet` with room for `nbits` bits before growing.
    pub fn with_capacity(nbits: usize) -> BitSet {
        BitSet {
            bits: BitVec::with_capacity(nbits),
        }
    }

    /// Add `index` to the set, growing the storage if needed.
    ///
    /// Returns true if the value was not already present.
    pub fn insert(&mut self, index: usize) -> bool {
        let len = self.bits.len();
        if index >= len {
            self.bits.grow(index + 1 - len, false);
        } else if self.bits[index] {
            return false;
        }

        self.bits.set(index, true);
        true
    }

    /// Remove `index` from the set.
    ///
    /// Returns true if the value was present.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.contains(index) {
            self.bits.set(index, false);
            true
        } else {
            false
        }
    }

    /// Returns true if `index` is in the set.
    pub fn contains(&self, index: usize) -> bool {
        self.bits.get(index).unwrap_or(false)
    }

    /// Remove every value from the set, keeping the allocation.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Returns true if no value is in the set.
    pub fn is_empty(&self) -> bool {
        self.bits.none()
    }

    /// Count the values in the set.
    pub fn len(&self) -> usize {
        self.bits.storage().iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Returns true if every value of `other` is also in this set.
    pub fn contains_all(&self, other: &BitSet) -> bool {
        let ours = self.bits.storage();
        other.blocks().iter()
            .enumerate()
            .all(|(i, &theirs)| {
                let mine = ours.get(i).copied().unwrap_or(0);
                mine & theirs == theirs
            })
    }

    /// Returns true if the two sets share at least one value.
    pub fn intersects(&self, other: &BitSet) -> bool {
        self.bits.storage().iter()
            .zip(other.bits.storage().iter())
            .any(|(a, b)| a & b != 0)
    }

    /// Return the smallest value in the set.
    pub fn first(&self) -> Option<usize> {
        self.iter().next()
    }

    /// Iterate over the values in the set in ascending order.
    pub fn iter(&self) -> Ones<'_> {
        let blocks = self.blocks();
        Ones {
            blocks,
            block: 0,
            current: blocks.first().copied().unwrap_or(0),
        }
    }

    /// The storage blocks up to and including the last non-zero one.
    fn blocks(&self) -> &[u32] {
        let storage = self.bits.storage();
        let end = storage.iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        &storage[..end]
    }
}

impl PartialEq for BitSet {
    fn eq(&self, other: &BitSet) -> bool {
        self.blocks() == other.blocks()
    }
}

impl Eq for BitSet {}

impl Hash for BitSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.blocks().hash(state)
    }
}

impl Debug for BitSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<I: IntoIterator<Item=usize>>(iter: I) -> BitSet {
        let mut set = BitSet::new();
        for index in iter {
            set.insert(index);
        }
        set
    }
}

impl<'a> IntoIterator for &'a BitSet {
    type Item = usize;
    type IntoIter = Ones<'a>;

    fn into_iter(self) -> Ones<'a> {
        self.iter()
    }
}

/// An iterator over the values of a `BitSet`.
#[derive(Clone)]
pub struct Ones<'a> {
    blocks: &'a [u32],
    block: usize,
    current: u32,
}

impl<'a> Iterator for Ones<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.block += 1;
            if self.block >= self.blocks.len() {
                return None;
            }
            self.current = self.blocks[self.block];
        }

        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some(self.block * 32 + bit)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(set: &BitSet) -> u64 {
        let mut hasher = DefaultHasher::new();
        set.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_insert_grows() {
        let mut set = BitSet::new();
        assert!(set.is_empty());
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.insert(200));
        assert!(set.contains(3));
        assert!(set.contains(200));
        assert!(!set.contains(199));
        assert!(!set.contains(10_000));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut set: BitSet = vec![1, 2, 70].into_iter().collect();
        assert!(set.remove(70));
        assert!(!set.remove(70));
        assert!(!set.remove(5000));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(set.first(), Some(1));
        assert_eq!(BitSet::new().first(), None);
    }

    #[test]
    fn test_equality_ignores_length() {
        let mut grown = BitSet::new();
        grown.insert(4);
        grown.insert(300);
        grown.remove(300);

        let small: BitSet = vec![4].into_iter().collect();
        assert_eq!(grown, small);
        assert_eq!(hash_of(&grown), hash_of(&small));

        let mut empty = BitSet::new();
        empty.insert(90);
        empty.clear();
        assert_eq!(empty, BitSet::new());
    }

    #[test]
    fn test_contains_all() {
        let bits: BitSet = vec![0, 2, 33, 64].into_iter().collect();
        assert!(bits.contains_all(&BitSet::new()));
        assert!(bits.contains_all(&vec![2, 64].into_iter().collect()));
        assert!(!bits.contains_all(&vec![2, 65].into_iter().collect()));
        assert!(!bits.contains_all(&vec![500].into_iter().collect()));
        assert!(!BitSet::new().contains_all(&bits));
    }

    #[test]
    fn test_intersects() {
        let bits: BitSet = vec![1, 40].into_iter().collect();
        assert!(bits.intersects(&vec![40, 100].into_iter().collect()));
        assert!(!bits.intersects(&vec![2, 100].into_iter().collect()));
        assert!(!bits.intersects(&BitSet::new()));
    }

    #[test]
    fn test_iter_spans_blocks() {
        let values = vec![0, 31, 32, 63, 64, 129];
        let bits: BitSet = values.iter().copied().collect();
        assert_eq!(bits.iter().collect::<Vec<_>>(), values);
        assert_eq!(format!("{:?}", bits), "{0, 31, 32, 63, 64, 129}");
    }
}
