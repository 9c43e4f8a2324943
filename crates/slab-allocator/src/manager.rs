// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The allocator: places objects into blocks, pools and arenas.
//!
//! ```text
//! allocate(object)
//!   │  measure → round to size class (fails before touching any state)
//!   ▼
//! existing pool with room? ──yes──► attach block
//!   │ no
//!   ▼
//! pool: pop recycle list or create ─► arena with room? pop/create ─► attach block
//!
//! deallocate(handle)
//!   │  scan arenas → pools for the block
//!   ▼
//! unlink block ─► recycle ─► pool empty? unlink + recycle ─► arena empty? unlink + recycle
//! ```
//!
//! Freed blocks, pools and arenas are never discarded. Each goes on its
//! LIFO recycle list and is reset in place by the next request that needs
//! one, so a free followed by an allocation of the same size class hands
//! back the very same arena, pool and block slots.
//!
//! # Thread Safety
//! `Allocator` mutates through `&mut self` and carries no lock of its own.
//! Wrap it in a [`SharedAllocator`](crate::SharedAllocator) to share it
//! between threads.

use crate::arena::Arena;
use crate::block::{checked_class, Block};
use crate::handle::{BlockHandle, Placement};
use crate::pool::{validate_block_size, Pool};
use crate::recycle::{ArenaId, BlockId, FreeList, PoolId, RecycleCounts, Slab, SlotId};
use crate::size_class::{SizeClass, ARENA_MAXSIZE, POOL_MAXSIZE};
use crate::snapshot::{AllocatorSnapshot, ArenaSnapshot, PoolSnapshot};
use crate::{AllocError, AllocationStats, Footprint, FootprintOracle, SizeOracle};

/// A three-tier slab allocator over objects of type `T`.
///
/// # Example
/// ```
/// use slab_allocator::Allocator;
///
/// // Objects here are plain byte counts, measured as themselves.
/// let mut alloc = Allocator::new(|n: &usize| *n);
///
/// let a = alloc.allocate(8).unwrap();
/// let b = alloc.allocate(160).unwrap();
/// assert_eq!(alloc.active_arenas().len(), 1);
/// assert_eq!(alloc.bytes_used(), 168);
///
/// assert!(alloc.deallocate(a));
/// assert!(alloc.deallocate(b));
/// assert!(!alloc.deallocate(b));
/// assert!(alloc.active_arenas().is_empty());
/// ```
pub struct Allocator<T, O = FootprintOracle> {
    oracle: O,
    blocks: Slab<BlockId, Block<T>>,
    pools: Slab<PoolId, Pool>,
    arenas: Slab<ArenaId, Arena>,
    /// Active arenas in allocation order; also the scan order.
    active: Vec<ArenaId>,
    free_blocks: FreeList<BlockId>,
    free_pools: FreeList<PoolId>,
    free_arenas: FreeList<ArenaId>,
    bytes_used: usize,
    stats: AllocationStats,
}

impl<T, O: SizeOracle<T>> Allocator<T, O> {
    /// Creates an empty allocator that measures objects with `oracle`.
    pub fn new(oracle: O) -> Self {
        Self {
            oracle,
            blocks: Slab::new(),
            pools: Slab::new(),
            arenas: Slab::new(),
            active: Vec::new(),
            free_blocks: FreeList::new(),
            free_pools: FreeList::new(),
            free_arenas: FreeList::new(),
            bytes_used: 0,
            stats: AllocationStats::default(),
        }
    }

    /// Places `object` into a block and returns a handle to it.
    ///
    /// Steps:
    /// 1. Measure and round. Oversized objects fail here with
    ///    [`AllocError::SizeExceeded`] before any pool or arena is touched.
    /// 2. Scan active arenas, then their pools, for the first pool of the
    ///    same size class with room.
    /// 3. Otherwise obtain a pool for the class (recycled first), and place
    ///    it in the first arena with room for one more pool, obtaining a new
    ///    arena (recycled first) if none has room.
    /// 4. Attach a block (recycled first) to the chosen pool.
    pub fn allocate(&mut self, object: T) -> Result<BlockHandle, AllocError> {
        let raw_size = self.oracle.measure(&object);
        let class = match checked_class(raw_size) {
            Ok(class) => class,
            Err(e) => {
                self.stats.record_size_exceeded();
                tracing::warn!("rejected allocation of {raw_size} bytes: {e}");
                return Err(e);
            }
        };
        validate_block_size(class.allocated_size)?;
        let size = class.allocated_size;

        let pool_id = match self.find_pool(size) {
            Some(pool_id) => pool_id,
            None => {
                let pool_id = self.obtain_pool(size)?;
                self.place_pool(pool_id)?;
                pool_id
            }
        };

        let handle = self.obtain_block(object, raw_size, class)?;
        self.pools
            .get_mut(pool_id)
            .ok_or_else(|| missing("pool", pool_id))?
            .push(handle.id, size);

        self.bytes_used += size;
        self.stats.update_peak(self.bytes_used);
        tracing::trace!("placed {handle} ({size} bytes) in {pool_id}");
        Ok(handle)
    }

    /// Releases the block behind `handle`.
    ///
    /// Returns `false`, leaving all state untouched, when the handle does
    /// not name a live block (never issued, already released, or stale).
    pub fn deallocate(&mut self, handle: BlockHandle) -> bool {
        self.release(handle).is_some()
    }

    /// Like [`deallocate`](Self::deallocate), but hands back the object.
    ///
    /// The block goes on the block recycle list. If its pool is now empty
    /// the pool leaves its arena for the pool recycle list, and if that
    /// arena is now empty it leaves the active list for the arena recycle
    /// list.
    pub fn release(&mut self, handle: BlockHandle) -> Option<T> {
        let Some(placement) = self.placement(handle) else {
            self.stats.record_deallocation(false);
            return None;
        };
        let Placement { arena: arena_id, pool: pool_id, block: block_id } = placement;

        let size = self.blocks.get(block_id)?.allocated_size();
        let pool = self.pools.get_mut(pool_id)?;
        // `placement` found the block in this pool, so removal cannot miss.
        let removed = pool.remove(block_id, size);
        debug_assert!(removed, "{block_id} located in {pool_id} but not held by it");
        if !removed {
            tracing::error!("{block_id} located in {pool_id} but not held by it");
            return None;
        }
        let pool_emptied = pool.is_empty();
        let object = self.blocks.get_mut(block_id)?.take();
        self.bytes_used = self.bytes_used.saturating_sub(size);
        self.free_blocks.push(block_id);

        if pool_emptied {
            let arena = self.arenas.get_mut(arena_id)?;
            let detached = arena.remove(pool_id);
            debug_assert!(detached, "{pool_id} located in {arena_id} but not held by it");
            let arena_emptied = arena.is_empty();
            self.free_pools.push(pool_id);
            tracing::debug!("{pool_id} emptied and recycled from {arena_id}");

            if arena_emptied {
                self.active.retain(|&a| a != arena_id);
                self.free_arenas.push(arena_id);
                tracing::debug!("{arena_id} emptied and recycled");
            }
        }

        self.stats.record_deallocation(true);
        object
    }

    /// Finds where a live block sits, scanning arenas then pools in order.
    pub fn placement(&self, handle: BlockHandle) -> Option<Placement> {
        let block = self.blocks.get(handle.id)?;
        if !block.is_live() || block.generation() != handle.generation {
            return None;
        }
        for &arena_id in &self.active {
            let Some(arena) = self.arenas.get(arena_id) else {
                continue;
            };
            for &pool_id in arena.pools() {
                if self.pools.get(pool_id).is_some_and(|p| p.contains(handle.id)) {
                    return Some(Placement {
                        arena: arena_id,
                        pool: pool_id,
                        block: handle.id,
                    });
                }
            }
        }
        None
    }

    /// Borrows the object behind a live handle.
    pub fn get(&self, handle: BlockHandle) -> Option<&T> {
        let block = self.blocks.get(handle.id)?;
        if block.generation() != handle.generation {
            return None;
        }
        block.object()
    }

    /// Returns the handle of the first live object matching `pred`, in
    /// arena → pool → block order.
    pub fn locate<P>(&self, mut pred: P) -> Option<BlockHandle>
    where
        P: FnMut(&T) -> bool,
    {
        self.live_blocks().find_map(|(id, block)| {
            let object = block.object()?;
            pred(object).then_some(BlockHandle {
                id,
                generation: block.generation(),
            })
        })
    }

    /// The oracle this allocator measures with.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    fn find_pool(&self, size: usize) -> Option<PoolId> {
        self.active
            .iter()
            .filter_map(|&arena_id| self.arenas.get(arena_id))
            .flat_map(|arena| arena.pools().iter().copied())
            .find(|&pool_id| self.pools.get(pool_id).is_some_and(|p| p.has_room(size)))
    }

    fn obtain_pool(&mut self, block_size: usize) -> Result<PoolId, AllocError> {
        if let Some(pool_id) = self.free_pools.pop() {
            self.pools
                .get_mut(pool_id)
                .ok_or_else(|| missing("pool", pool_id))?
                .reassign(block_size)?;
            self.stats.record_pool(true);
            tracing::debug!("reusing {pool_id} for size class {block_size}");
            return Ok(pool_id);
        }
        let pool_id = self.pools.insert(Pool::new(block_size)?)?;
        self.stats.record_pool(false);
        tracing::debug!("created {pool_id} for size class {block_size}");
        Ok(pool_id)
    }

    fn place_pool(&mut self, pool_id: PoolId) -> Result<(), AllocError> {
        let mut target = None;
        for &arena_id in &self.active {
            let arena = self.arenas.get(arena_id).ok_or_else(|| missing("arena", arena_id))?;
            if arena.has_room(POOL_MAXSIZE)? {
                target = Some(arena_id);
                break;
            }
        }
        let arena_id = match target {
            Some(arena_id) => arena_id,
            None => self.obtain_arena()?,
        };
        self.arenas
            .get_mut(arena_id)
            .ok_or_else(|| missing("arena", arena_id))?
            .push(pool_id);
        Ok(())
    }

    fn obtain_arena(&mut self) -> Result<ArenaId, AllocError> {
        let arena_id = match self.free_arenas.pop() {
            Some(arena_id) => {
                self.arenas
                    .get_mut(arena_id)
                    .ok_or_else(|| missing("arena", arena_id))?
                    .reset();
                self.stats.record_arena(true);
                tracing::debug!("reusing {arena_id}");
                arena_id
            }
            None => {
                let arena_id = self.arenas.insert(Arena::new())?;
                self.stats.record_arena(false);
                tracing::debug!("created {arena_id}");
                arena_id
            }
        };
        self.active.push(arena_id);
        Ok(arena_id)
    }

    fn obtain_block(
        &mut self,
        object: T,
        raw_size: usize,
        class: SizeClass,
    ) -> Result<BlockHandle, AllocError> {
        if let Some(id) = self.free_blocks.pop() {
            let block = self.blocks.get_mut(id).ok_or_else(|| missing("block", id))?;
            block.refill(object, class);
            self.stats.record_block(true, class.allocated_size);
            return Ok(BlockHandle {
                id,
                generation: block.generation(),
            });
        }
        let id = self.blocks.insert(Block::new(object, raw_size)?)?;
        self.stats.record_block(false, class.allocated_size);
        Ok(BlockHandle { id, generation: 0 })
    }
}

impl<T, O> Allocator<T, O> {
    /// Active arenas in allocation order.
    pub fn active_arenas(&self) -> &[ArenaId] {
        &self.active
    }

    pub fn arena(&self, id: ArenaId) -> Option<&Arena> {
        self.arenas.get(id)
    }

    pub fn pool(&self, id: PoolId) -> Option<&Pool> {
        self.pools.get(id)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block<T>> {
        self.blocks.get(id)
    }

    /// Sizes of the block, pool and arena recycle lists.
    pub fn recycle_counts(&self) -> RecycleCounts {
        RecycleCounts {
            blocks: self.free_blocks.len(),
            pools: self.free_pools.len(),
            arenas: self.free_arenas.len(),
        }
    }

    /// Bytes held by live blocks across all active pools.
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    /// Number of live blocks.
    pub fn live_count(&self) -> usize {
        self.blocks.len() - self.free_blocks.len()
    }

    pub fn stats(&self) -> &AllocationStats {
        &self.stats
    }

    /// Live blocks in arena → pool → block order.
    pub fn live_blocks(&self) -> impl Iterator<Item = (BlockId, &Block<T>)> + '_ {
        self.active
            .iter()
            .filter_map(|&arena_id| self.arenas.get(arena_id))
            .flat_map(|arena| arena.pools().iter().copied())
            .filter_map(|pool_id| self.pools.get(pool_id))
            .flat_map(|pool| pool.blocks().iter().copied())
            .filter_map(|block_id| self.blocks.get(block_id).map(|b| (block_id, b)))
    }

    /// Copies the current layout into an owned snapshot.
    pub fn snapshot(&self) -> AllocatorSnapshot {
        let arenas = self
            .active
            .iter()
            .filter_map(|&arena_id| self.arenas.get(arena_id).map(|a| (arena_id, a)))
            .map(|(arena_id, arena)| ArenaSnapshot {
                id: arena_id,
                bytes_reserved: arena.bytes_reserved(),
                pools: arena
                    .pools()
                    .iter()
                    .filter_map(|&pool_id| self.pools.get(pool_id).map(|p| (pool_id, p)))
                    .map(|(pool_id, pool)| PoolSnapshot {
                        id: pool_id,
                        block_size: pool.block_size(),
                        bytes_used: pool.bytes_used(),
                        block_count: pool.blocks().len(),
                    })
                    .collect(),
            })
            .collect();

        AllocatorSnapshot {
            arenas,
            recycled: self.recycle_counts(),
            stats: self.stats.clone(),
        }
    }

    /// Verifies the capacity and reservation invariants.
    ///
    /// - every active pool: `sum(block sizes) == bytes_used <= POOL_MAXSIZE`,
    ///   all blocks live and of the pool's class, pool not empty;
    /// - every active arena: `bytes_reserved == POOL_MAXSIZE * pools <= ARENA_MAXSIZE`,
    ///   arena not empty;
    /// - nothing active is also on a recycle list, and recycled blocks are empty.
    pub fn check_invariants(&self) -> Result<(), AllocError> {
        let mut total_used = 0;

        for &arena_id in &self.active {
            if self.free_arenas.contains(arena_id) {
                return Err(corrupt(format!("{arena_id} is active and recycled")));
            }
            let arena = self.arenas.get(arena_id).ok_or_else(|| missing("arena", arena_id))?;
            let expected = POOL_MAXSIZE * arena.pools().len();
            if arena.bytes_reserved() != expected || expected > ARENA_MAXSIZE {
                return Err(corrupt(format!(
                    "{arena_id} reserves {} bytes for {} pools",
                    arena.bytes_reserved(),
                    arena.pools().len()
                )));
            }
            if arena.is_empty() {
                return Err(corrupt(format!("{arena_id} is active but empty")));
            }

            for &pool_id in arena.pools() {
                if self.free_pools.contains(pool_id) {
                    return Err(corrupt(format!("{pool_id} is active and recycled")));
                }
                let pool = self.pools.get(pool_id).ok_or_else(|| missing("pool", pool_id))?;
                let mut sum = 0;
                for &block_id in pool.blocks() {
                    let block = self.blocks.get(block_id).ok_or_else(|| missing("block", block_id))?;
                    if !block.is_live() || self.free_blocks.contains(block_id) {
                        return Err(corrupt(format!("{block_id} in {pool_id} is not live")));
                    }
                    if block.allocated_size() != pool.block_size() {
                        return Err(corrupt(format!(
                            "{block_id} has size {} in {pool_id} of class {}",
                            block.allocated_size(),
                            pool.block_size()
                        )));
                    }
                    sum += block.allocated_size();
                }
                if sum != pool.bytes_used() || sum > POOL_MAXSIZE || sum == 0 {
                    return Err(corrupt(format!(
                        "{pool_id} records {} bytes used but holds {sum}",
                        pool.bytes_used()
                    )));
                }
                total_used += sum;
            }
        }

        if let Some(block_id) = self
            .free_blocks
            .iter()
            .find(|&id| self.blocks.get(id).map_or(true, Block::is_live))
        {
            return Err(corrupt(format!("recycled {block_id} still holds an object")));
        }
        if total_used != self.bytes_used {
            return Err(corrupt(format!(
                "allocator records {} bytes used, pools hold {total_used}",
                self.bytes_used
            )));
        }
        Ok(())
    }
}

impl<T: Footprint> Default for Allocator<T> {
    fn default() -> Self {
        Self::new(FootprintOracle)
    }
}

impl<T, O> std::fmt::Debug for Allocator<T, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Allocator")
            .field("active_arenas", &self.active.len())
            .field("bytes_used", &self.bytes_used)
            .field("recycled", &self.recycle_counts())
            .finish()
    }
}

fn missing<I: SlotId>(kind: &str, id: I) -> AllocError {
    AllocError::Corruption(format!("{kind} slot {id:?} does not exist"))
}

fn corrupt(detail: String) -> AllocError {
    AllocError::Corruption(detail)
}
