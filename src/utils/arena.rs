//! A generational arena built on top of [`slab::Slab`].
//!
//! Slab slots are reused after removal; every slot carries a generation
//! counter bumped on removal so that an [`Index`] to a removed element never
//! aliases the element later stored in the same slot.

use slab::Slab;

/// A stable handle to an element of an [`Arena`].
///
/// Ordering is by slot then generation, which gives a deterministic (if
/// arbitrary) total order usable for tie-breaks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Index {
    slot: u32,
    generation: u32,
}

impl Index {
    /// Builds an index from its raw parts.
    pub fn from_raw_parts(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// The raw parts of this index.
    pub fn into_raw_parts(self) -> (u32, u32) {
        (self.slot, self.generation)
    }
}

/// An owning registry keyed by generational [`Index`]es.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    items: Slab<T>,
    generations: Vec<u32>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            items: Slab::new(),
            generations: Vec::new(),
        }
    }

    /// The number of live elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Is this arena empty?
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inserts a new element and returns its handle.
    pub fn insert(&mut self, item: T) -> Index {
        let slot = self.items.insert(item);
        if slot >= self.generations.len() {
            self.generations.resize(slot + 1, 0);
        }

        Index {
            slot: slot as u32,
            generation: self.generations[slot],
        }
    }

    /// Removes the element identified by `index`, if it is still alive.
    pub fn remove(&mut self, index: Index) -> Option<T> {
        if !self.contains(index) {
            return None;
        }

        let slot = index.slot as usize;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        Some(self.items.remove(slot))
    }

    /// Is `index` referring to a live element?
    pub fn contains(&self, index: Index) -> bool {
        let slot = index.slot as usize;
        self.generations.get(slot) == Some(&index.generation) && self.items.contains(slot)
    }

    /// Gets a reference to the element identified by `index`.
    pub fn get(&self, index: Index) -> Option<&T> {
        if self.generations.get(index.slot as usize) != Some(&index.generation) {
            return None;
        }
        self.items.get(index.slot as usize)
    }

    /// Gets a mutable reference to the element identified by `index`.
    pub fn get_mut(&mut self, index: Index) -> Option<&mut T> {
        if self.generations.get(index.slot as usize) != Some(&index.generation) {
            return None;
        }
        self.items.get_mut(index.slot as usize)
    }

    /// Iterates through all live elements, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &T)> {
        self.items.iter().map(|(slot, item)| {
            (
                Index {
                    slot: slot as u32,
                    generation: self.generations[slot],
                },
                item,
            )
        })
    }

    /// Iterates mutably through all live elements, in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Index, &mut T)> {
        let generations = &self.generations;
        self.items.iter_mut().map(move |(slot, item)| {
            (
                Index {
                    slot: slot as u32,
                    generation: generations[slot],
                },
                item,
            )
        })
    }
}
