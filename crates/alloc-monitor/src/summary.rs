// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Population summaries: how many of each structure exist, and their bytes.

use slab_allocator::{AllocatorSnapshot, POOL_MAXSIZE};
use std::fmt;

/// The kinds of structure a summary counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationKind {
    Arena,
    Pool,
    Block,
    FreeArena,
    FreePool,
    FreeBlock,
}

impl PopulationKind {
    /// Every kind, in reporting order.
    pub const ALL: [PopulationKind; 6] = [
        PopulationKind::Arena,
        PopulationKind::Pool,
        PopulationKind::Block,
        PopulationKind::FreeArena,
        PopulationKind::FreePool,
        PopulationKind::FreeBlock,
    ];
}

impl fmt::Display for PopulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PopulationKind::Arena => "slab.Arena",
            PopulationKind::Pool => "slab.Pool",
            PopulationKind::Block => "slab.Block",
            PopulationKind::FreeArena => "slab.Arena (free)",
            PopulationKind::FreePool => "slab.Pool (free)",
            PopulationKind::FreeBlock => "slab.Block (free)",
        };
        f.write_str(name)
    }
}

/// One line of a population summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SummaryRow {
    pub kind: PopulationKind,
    pub count: usize,
    /// Reserved bytes for arenas and pools, used bytes for blocks, zero
    /// for recycled shells.
    pub bytes: usize,
}

impl fmt::Display for SummaryRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type: {}, Count: {}, Size: {} bytes",
            self.kind, self.count, self.bytes
        )
    }
}

/// Counts and sizes for every [`PopulationKind`], in reporting order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PopulationSummary {
    pub rows: Vec<SummaryRow>,
}

impl PopulationSummary {
    /// Builds a summary from an allocator snapshot.
    pub fn from_snapshot(snapshot: &AllocatorSnapshot) -> Self {
        let pool_count = snapshot.pool_count();
        let rows = PopulationKind::ALL
            .iter()
            .map(|&kind| {
                let (count, bytes) = match kind {
                    PopulationKind::Arena => (snapshot.arena_count(), snapshot.bytes_reserved()),
                    PopulationKind::Pool => (pool_count, pool_count * POOL_MAXSIZE),
                    PopulationKind::Block => (snapshot.block_count(), snapshot.bytes_used()),
                    PopulationKind::FreeArena => (snapshot.recycled.arenas, 0),
                    PopulationKind::FreePool => (snapshot.recycled.pools, 0),
                    PopulationKind::FreeBlock => (snapshot.recycled.blocks, 0),
                };
                SummaryRow { kind, count, bytes }
            })
            .collect();
        Self { rows }
    }

    /// The row for `kind`.
    pub fn row(&self, kind: PopulationKind) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.kind == kind)
    }

    /// Total number of structures, live and recycled.
    pub fn total_objects(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }
}
