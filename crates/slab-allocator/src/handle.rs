// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Handles returned by [`Allocator::allocate`](crate::Allocator::allocate).

use crate::recycle::{ArenaId, BlockId, PoolId};
use std::fmt;

/// Identifies one occupancy of a block slot.
///
/// Block slots are recycled, so the slot id alone is not enough to tell
/// the current occupant from a previous one. The handle also records the
/// slot's generation at allocation time; once the slot is freed and reused,
/// the old handle no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockHandle {
    pub(crate) id: BlockId,
    pub(crate) generation: u32,
}

impl BlockHandle {
    /// The block slot this handle points at.
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// The slot generation when this handle was issued.
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@gen{}", self.id, self.generation)
    }
}

/// Where a live block sits: arena → pool → block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Placement {
    pub arena: ArenaId,
    pub pool: PoolId,
    pub block: BlockId,
}
