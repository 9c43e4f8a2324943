// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Owned, read-only copies of allocator state.
//!
//! An [`AllocatorSnapshot`] is taken under whatever lock guards the
//! allocator and then handed to diagnostics code, which can inspect it at
//! leisure without holding the lock or touching live state.

use crate::recycle::{ArenaId, PoolId, RecycleCounts};
use crate::AllocationStats;
use std::fmt::Write as _;

/// One active pool.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PoolSnapshot {
    pub id: PoolId,
    pub block_size: usize,
    pub bytes_used: usize,
    pub block_count: usize,
}

/// One active arena and its pools, in placement order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ArenaSnapshot {
    pub id: ArenaId,
    pub bytes_reserved: usize,
    pub pools: Vec<PoolSnapshot>,
}

/// The full arena → pool layout plus recycle-list sizes and statistics.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AllocatorSnapshot {
    /// Active arenas in allocation order.
    pub arenas: Vec<ArenaSnapshot>,
    /// Recycle-list sizes.
    pub recycled: RecycleCounts,
    /// Cumulative statistics at the time of the snapshot.
    pub stats: AllocationStats,
}

impl AllocatorSnapshot {
    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }

    pub fn pool_count(&self) -> usize {
        self.arenas.iter().map(|a| a.pools.len()).sum()
    }

    pub fn block_count(&self) -> usize {
        self.pools().map(|p| p.block_count).sum()
    }

    /// Bytes held by live blocks.
    pub fn bytes_used(&self) -> usize {
        self.pools().map(|p| p.bytes_used).sum()
    }

    /// Bytes reserved by active arenas.
    pub fn bytes_reserved(&self) -> usize {
        self.arenas.iter().map(|a| a.bytes_reserved).sum()
    }

    /// All active pools, arena by arena.
    pub fn pools(&self) -> impl Iterator<Item = &PoolSnapshot> {
        self.arenas.iter().flat_map(|a| a.pools.iter())
    }

    /// A multi-line layout listing for terminals.
    ///
    /// ```text
    /// arena#0  8000/256000 bytes reserved
    ///   pool#0  class 8     8/4000 bytes, 1 blocks
    ///   pool#1  class 160   160/4000 bytes, 1 blocks
    /// recycled: 0 blocks, 0 pools, 0 arenas
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();
        for arena in &self.arenas {
            let _ = writeln!(
                out,
                "{}  {}/{} bytes reserved",
                arena.id,
                arena.bytes_reserved,
                crate::ARENA_MAXSIZE
            );
            for pool in &arena.pools {
                let _ = writeln!(
                    out,
                    "  {}  class {:<5} {}/{} bytes, {} blocks",
                    pool.id,
                    pool.block_size,
                    pool.bytes_used,
                    crate::POOL_MAXSIZE,
                    pool.block_count
                );
            }
        }
        let _ = write!(
            out,
            "recycled: {} blocks, {} pools, {} arenas",
            self.recycled.blocks, self.recycled.pools, self.recycled.arenas
        );
        out
    }
}
