// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Top-level reservation units holding pools.

use crate::recycle::PoolId;
use crate::size_class::{ARENA_MAXSIZE, POOL_MAXSIZE};
use crate::AllocError;

/// A fixed-capacity container of pools.
///
/// An arena reserves [`POOL_MAXSIZE`] bytes for every pool it holds, no
/// matter how full that pool is, so `bytes_reserved` always equals
/// `POOL_MAXSIZE * pools.len()`.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    pools: Vec<PoolId>,
    bytes_reserved: usize,
}

impl Arena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether another reservation of `reservation_size` fits.
    ///
    /// Arenas only reserve whole pools. Any other increment is a usage
    /// error reported as [`AllocError::InvalidArgument`].
    pub fn has_room(&self, reservation_size: usize) -> Result<bool, AllocError> {
        if reservation_size != POOL_MAXSIZE {
            return Err(AllocError::InvalidArgument(format!(
                "arenas reserve in units of {POOL_MAXSIZE} bytes, got {reservation_size}"
            )));
        }
        Ok(self.bytes_reserved + reservation_size <= ARENA_MAXSIZE)
    }

    pub(crate) fn push(&mut self, id: PoolId) {
        self.pools.push(id);
        self.bytes_reserved += POOL_MAXSIZE;
    }

    pub(crate) fn remove(&mut self, id: PoolId) -> bool {
        match self.pools.iter().position(|&p| p == id) {
            Some(pos) => {
                self.pools.remove(pos);
                self.bytes_reserved = self.bytes_reserved.saturating_sub(POOL_MAXSIZE);
                true
            }
            None => false,
        }
    }

    /// Returns a recycled arena to its freshly constructed state.
    pub(crate) fn reset(&mut self) {
        self.pools.clear();
        self.bytes_reserved = 0;
    }

    /// Pools in placement order.
    pub fn pools(&self) -> &[PoolId] {
        &self.pools
    }

    /// Bytes reserved on behalf of the pools held.
    pub fn bytes_reserved(&self) -> usize {
        self.bytes_reserved
    }

    /// `true` once the last pool has left.
    pub fn is_empty(&self) -> bool {
        self.bytes_reserved == 0
    }

    #[cfg(test)]
    pub(crate) fn set_bytes_reserved(&mut self, bytes: usize) {
        self.bytes_reserved = bytes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recycle::SlotId;

    #[test]
    fn test_new_arena_is_empty() {
        let arena = Arena::new();
        assert!(arena.is_empty());
        assert!(arena.pools().is_empty());
        assert!(arena.has_room(POOL_MAXSIZE).unwrap());
    }

    #[test]
    fn test_has_room_rejects_other_increments() {
        let arena = Arena::new();
        assert!(matches!(
            arena.has_room(4001),
            Err(AllocError::InvalidArgument(_))
        ));
        assert!(matches!(arena.has_room(0), Err(AllocError::InvalidArgument(_))));
    }

    #[test]
    fn test_reaching_capacity() {
        let mut arena = Arena::new();
        arena.set_bytes_reserved(ARENA_MAXSIZE - POOL_MAXSIZE);
        assert!(arena.has_room(POOL_MAXSIZE).unwrap());

        arena.push(PoolId::from_index(0).unwrap());
        assert_eq!(arena.bytes_reserved(), ARENA_MAXSIZE);
        assert!(!arena.has_room(POOL_MAXSIZE).unwrap());
    }

    #[test]
    fn test_push_remove() {
        let mut arena = Arena::new();
        let a = PoolId::from_index(0).unwrap();
        let b = PoolId::from_index(1).unwrap();
        arena.push(a);
        arena.push(b);
        assert_eq!(arena.bytes_reserved(), 2 * POOL_MAXSIZE);

        assert!(arena.remove(a));
        assert!(!arena.remove(a));
        assert_eq!(arena.pools(), &[b]);
        assert_eq!(arena.bytes_reserved(), POOL_MAXSIZE);
    }

    #[test]
    fn test_reset() {
        let mut arena = Arena::new();
        arena.push(PoolId::from_index(3).unwrap());
        arena.reset();
        assert!(arena.is_empty());
        assert!(arena.pools().is_empty());
    }
}
