// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Index-based backing storage and LIFO recycle lists.
//!
//! Blocks, pools and arenas live in typed [`Slab`]s and are addressed by
//! small newtype ids. Slots are never removed: when a structure is freed its
//! id goes on a [`FreeList`], and the next request for that kind of
//! structure pops the most recently freed id and resets the slot in place.

use crate::AllocError;
use std::fmt;
use std::marker::PhantomData;

/// A typed index into a [`Slab`].
pub trait SlotId: Copy + Eq + fmt::Debug {
    /// Wraps a raw slot index, or `None` if it is outside the id space.
    fn from_index(index: usize) -> Option<Self>;
    /// Returns the raw slot index.
    fn index(self) -> usize;
}

macro_rules! slot_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl SlotId for $name {
            fn from_index(index: usize) -> Option<Self> {
                u32::try_from(index).ok().map(Self)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

slot_id!(
    /// Identifies a block slot.
    BlockId,
    "block"
);
slot_id!(
    /// Identifies a pool slot.
    PoolId,
    "pool"
);
slot_id!(
    /// Identifies an arena slot.
    ArenaId,
    "arena"
);

/// Append-only storage addressed by a typed id.
#[derive(Debug, Clone)]
pub(crate) struct Slab<I, T> {
    slots: Vec<T>,
    _id: PhantomData<I>,
}

impl<I: SlotId, T> Slab<I, T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            _id: PhantomData,
        }
    }

    /// Stores a fresh value and returns its id.
    ///
    /// Fails once every id of type `I` has been handed out.
    pub(crate) fn insert(&mut self, value: T) -> Result<I, AllocError> {
        let id = I::from_index(self.slots.len())
            .ok_or(AllocError::SlotsExhausted(std::any::type_name::<I>()))?;
        self.slots.push(value);
        Ok(id)
    }

    pub(crate) fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.index())
    }

    /// Number of slots ever created.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

/// A stack of freed ids, reused most-recently-freed first.
#[derive(Debug, Clone)]
pub(crate) struct FreeList<I> {
    stack: Vec<I>,
}

impl<I: SlotId> FreeList<I> {
    pub(crate) fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub(crate) fn push(&mut self, id: I) {
        self.stack.push(id);
    }

    pub(crate) fn pop(&mut self) -> Option<I> {
        self.stack.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn contains(&self, id: I) -> bool {
        self.stack.contains(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = I> + '_ {
        self.stack.iter().copied()
    }
}

/// Sizes of the three recycle lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RecycleCounts {
    /// Freed block shells.
    pub blocks: usize,
    /// Freed pools.
    pub pools: usize,
    /// Freed arenas.
    pub arenas: usize,
}

impl RecycleCounts {
    /// `true` when nothing is waiting to be reused.
    pub fn is_empty(&self) -> bool {
        self.blocks == 0 && self.pools == 0 && self.arenas == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slab_ids_are_sequential() {
        let mut slab: Slab<PoolId, &str> = Slab::new();
        let a = slab.insert("a").unwrap();
        let b = slab.insert("b").unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(slab.get(b), Some(&"b"));
        assert_eq!(slab.len(), 2);
    }

    #[test]
    fn test_slab_get_mut() {
        let mut slab: Slab<BlockId, u32> = Slab::new();
        let id = slab.insert(1).unwrap();
        *slab.get_mut(id).unwrap() = 7;
        assert_eq!(slab.get(id), Some(&7));
        assert!(slab.get(BlockId::from_index(9).unwrap()).is_none());
    }

    #[test]
    fn test_free_list_is_lifo() {
        let mut free = FreeList::new();
        free.push(ArenaId::from_index(3).unwrap());
        free.push(ArenaId::from_index(5).unwrap());
        assert_eq!(free.len(), 2);
        assert!(free.contains(ArenaId::from_index(3).unwrap()));
        assert_eq!(free.pop(), Some(ArenaId::from_index(5).unwrap()));
        assert_eq!(free.pop(), Some(ArenaId::from_index(3).unwrap()));
        assert_eq!(free.pop(), None);
    }

    #[test]
    fn test_ids_do_not_wrap() {
        assert_eq!(BlockId::from_index(u32::MAX as usize).unwrap().index(), u32::MAX as usize);
        if let Ok(past) = usize::try_from(u64::from(u32::MAX) + 1) {
            assert!(BlockId::from_index(past).is_none());
        }
        assert!(PoolId::from_index(usize::MAX).is_none());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(BlockId::from_index(4).unwrap().to_string(), "block#4");
        assert_eq!(ArenaId::from_index(0).unwrap().to_string(), "arena#0");
    }

    #[test]
    fn test_recycle_counts_empty() {
        assert!(RecycleCounts::default().is_empty());
        let counts = RecycleCounts {
            pools: 1,
            ..Default::default()
        };
        assert!(!counts.is_empty());
    }
}
