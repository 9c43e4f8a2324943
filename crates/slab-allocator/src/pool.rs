// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fixed-capacity, single-size-class containers of blocks.
//!
//! A [`Pool`] accepts blocks of exactly one rounded size. Once a pool's
//! `bytes_used` drops back to zero it leaves its arena and waits on the
//! pool recycle list, where it may be reassigned to a different size class.

use crate::recycle::BlockId;
use crate::size_class::{ALIGNMENT, POOL_MAXSIZE};
use crate::AllocError;

/// A container of same-sized blocks.
///
/// # Invariants
/// - every block in `blocks` has `allocated_size == block_size`;
/// - `bytes_used == block_size * blocks.len() <= POOL_MAXSIZE`.
#[derive(Debug, Clone)]
pub struct Pool {
    blocks: Vec<BlockId>,
    bytes_used: usize,
    block_size: usize,
}

impl Pool {
    /// Creates an empty pool for the given size class.
    ///
    /// Returns [`AllocError::InvalidConfiguration`] if `block_size` is zero
    /// or not a multiple of [`ALIGNMENT`].
    pub(crate) fn new(block_size: usize) -> Result<Self, AllocError> {
        validate_block_size(block_size)?;
        Ok(Self {
            blocks: Vec::new(),
            bytes_used: 0,
            block_size,
        })
    }

    /// Repurposes an empty, recycled pool for a new size class.
    pub(crate) fn reassign(&mut self, block_size: usize) -> Result<(), AllocError> {
        validate_block_size(block_size)?;
        if !self.blocks.is_empty() || self.bytes_used != 0 {
            return Err(AllocError::Corruption(format!(
                "reassigning a pool that still holds {} blocks ({} bytes)",
                self.blocks.len(),
                self.bytes_used
            )));
        }
        self.block_size = block_size;
        Ok(())
    }

    /// Whether a block of `candidate_block_size` fits.
    ///
    /// A size mismatch is a routing decision, not a fault: it simply
    /// reports no room.
    pub fn has_room(&self, candidate_block_size: usize) -> bool {
        candidate_block_size == self.block_size
            && self.bytes_used + candidate_block_size <= POOL_MAXSIZE
    }

    pub(crate) fn push(&mut self, id: BlockId, allocated_size: usize) {
        debug_assert_eq!(allocated_size, self.block_size);
        self.blocks.push(id);
        self.bytes_used += allocated_size;
    }

    /// Unlinks `id` if present, returning `true` when it was found.
    pub(crate) fn remove(&mut self, id: BlockId, allocated_size: usize) -> bool {
        match self.blocks.iter().position(|&b| b == id) {
            Some(pos) => {
                self.blocks.remove(pos);
                self.bytes_used = self.bytes_used.saturating_sub(allocated_size);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, id: BlockId) -> bool {
        self.blocks.contains(&id)
    }

    /// Blocks in insertion order.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Bytes consumed by the blocks currently held.
    pub fn bytes_used(&self) -> usize {
        self.bytes_used
    }

    /// The size class this pool accepts.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// `true` once the last block has left.
    pub fn is_empty(&self) -> bool {
        self.bytes_used == 0
    }

    /// How many more blocks of this class fit.
    pub fn free_slots(&self) -> usize {
        (POOL_MAXSIZE - self.bytes_used) / self.block_size
    }
}

/// Checks that `block_size` is a positive multiple of [`ALIGNMENT`].
pub(crate) fn validate_block_size(block_size: usize) -> Result<(), AllocError> {
    if block_size == 0 {
        return Err(AllocError::InvalidConfiguration(
            "block size must be positive".to_string(),
        ));
    }
    if block_size % ALIGNMENT != 0 {
        return Err(AllocError::InvalidConfiguration(format!(
            "block size {block_size} is not divisible by {ALIGNMENT}"
        )));
    }
    Ok(())
}
