// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Allocation statistics for profiling and diagnostics.
//!
//! [`AllocationStats`] tracks cumulative metrics about how the allocator
//! is being used: how often recycled structures satisfy a request, how many
//! requests were rejected, and the high-water mark of bytes in use.

/// Cumulative statistics about allocator usage.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct AllocationStats {
    /// Successful allocation requests.
    pub total_allocations: u64,
    /// Requests rejected because the object was larger than a block.
    pub size_exceeded_count: u64,
    /// Successful deallocations.
    pub total_deallocations: u64,
    /// Deallocation requests for blocks that were not found.
    pub missed_deallocations: u64,
    /// Blocks served from the block recycle list.
    pub blocks_reused: u64,
    /// Blocks that required a new slot.
    pub blocks_created: u64,
    /// Pools served from the pool recycle list.
    pub pools_reused: u64,
    /// Pools that required a new slot.
    pub pools_created: u64,
    /// Arenas served from the arena recycle list.
    pub arenas_reused: u64,
    /// Arenas that required a new slot.
    pub arenas_created: u64,
    /// Peak bytes held by live blocks.
    pub peak_bytes_used: usize,
    /// Total rounded bytes ever allocated.
    pub cumulative_allocated_bytes: u64,
}

impl AllocationStats {
    /// Fraction of block requests served from the recycle list, in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` if no blocks have been handed out.
    pub fn block_reuse_ratio(&self) -> f64 {
        let total = self.blocks_reused + self.blocks_created;
        if total == 0 {
            return 0.0;
        }
        self.blocks_reused as f64 / total as f64
    }

    pub(crate) fn record_block(&mut self, reused: bool, size: usize) {
        self.total_allocations += 1;
        self.cumulative_allocated_bytes += size as u64;
        if reused {
            self.blocks_reused += 1;
        } else {
            self.blocks_created += 1;
        }
    }

    pub(crate) fn record_pool(&mut self, reused: bool) {
        if reused {
            self.pools_reused += 1;
        } else {
            self.pools_created += 1;
        }
    }

    pub(crate) fn record_arena(&mut self, reused: bool) {
        if reused {
            self.arenas_reused += 1;
        } else {
            self.arenas_created += 1;
        }
    }

    pub(crate) fn record_size_exceeded(&mut self) {
        self.size_exceeded_count += 1;
    }

    pub(crate) fn record_deallocation(&mut self, found: bool) {
        if found {
            self.total_deallocations += 1;
        } else {
            self.missed_deallocations += 1;
        }
    }

    pub(crate) fn update_peak(&mut self, current_bytes: usize) {
        if current_bytes > self.peak_bytes_used {
            self.peak_bytes_used = current_bytes;
        }
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        format!(
            "Allocations: {} total ({} reused blocks, {:.0}% reuse), {} rejected, \
             {} deallocations ({} missed), pools {}+{} reused, arenas {}+{} reused, \
             peak {} bytes",
            self.total_allocations,
            self.blocks_reused,
            self.block_reuse_ratio() * 100.0,
            self.size_exceeded_count,
            self.total_deallocations,
            self.missed_deallocations,
            self.pools_created,
            self.pools_reused,
            self.arenas_created,
            self.arenas_reused,
            self.peak_bytes_used,
        )
    }
}
