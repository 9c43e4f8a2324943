// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The smallest allocation unit: one object plus its rounded size.

use crate::size_class::{size_class_for, SizeClass, BLOCK_MAXSIZE};
use crate::AllocError;

/// A block wrapping one logical object.
///
/// Active blocks are owned by exactly one pool. A freed block is an empty
/// shell on the block recycle list; its slot (and [`BlockId`](crate::BlockId))
/// is reused by the next allocation, which bumps [`generation`](Self::generation)
/// so that handles to the previous occupant stop matching.
#[derive(Debug, Clone)]
pub struct Block<T> {
    object: Option<T>,
    allocated_size: usize,
    size_class_index: usize,
    generation: u32,
}

impl<T> Block<T> {
    /// Wraps `object`, whose measured size is `raw_size`.
    ///
    /// Fails with [`AllocError::SizeExceeded`] when the rounded size is
    /// larger than [`BLOCK_MAXSIZE`]; no block is produced in that case.
    pub(crate) fn new(object: T, raw_size: usize) -> Result<Self, AllocError> {
        let class = checked_class(raw_size)?;
        Ok(Self {
            object: Some(object),
            allocated_size: class.allocated_size,
            size_class_index: class.index,
            generation: 0,
        })
    }

    /// Overwrites a recycled shell with a new occupant.
    ///
    /// The size class must already have been checked by the caller.
    pub(crate) fn refill(&mut self, object: T, class: SizeClass) {
        debug_assert!(self.object.is_none(), "refilling a live block");
        self.object = Some(object);
        self.allocated_size = class.allocated_size;
        self.size_class_index = class.index;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Empties the shell, handing back its object.
    pub(crate) fn take(&mut self) -> Option<T> {
        self.object.take()
    }

    /// The stored object, if the block is live.
    pub fn object(&self) -> Option<&T> {
        self.object.as_ref()
    }

    /// Rounded size this block reserves inside its pool.
    pub fn allocated_size(&self) -> usize {
        self.allocated_size
    }

    /// Raw size divided by the alignment unit. Informational only.
    pub fn size_class_index(&self) -> usize {
        self.size_class_index
    }

    /// How many times this slot has been recycled.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// `true` while the block holds an object.
    pub fn is_live(&self) -> bool {
        self.object.is_some()
    }
}

/// Rounds `raw_size` and rejects anything larger than a block.
pub(crate) fn checked_class(raw_size: usize) -> Result<SizeClass, AllocError> {
    let class = size_class_for(raw_size);
    if class.allocated_size > BLOCK_MAXSIZE {
        return Err(AllocError::SizeExceeded {
            requested: class.allocated_size,
            limit: BLOCK_MAXSIZE,
        });
    }
    Ok(class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rounds_size() {
        let block = Block::new("payload", 13).unwrap();
        assert_eq!(block.allocated_size(), 16);
        assert_eq!(block.size_class_index(), 1);
        assert_eq!(block.object(), Some(&"payload"));
        assert_eq!(block.generation(), 0);
    }

    #[test]
    fn test_largest_accepted_size() {
        let block = Block::new((), 512).unwrap();
        assert_eq!(block.allocated_size(), BLOCK_MAXSIZE);

        // 505 rounds up to exactly the limit.
        assert!(Block::new((), 505).is_ok());
    }

    #[test]
    fn test_size_exceeded() {
        let err = Block::new((), 513).unwrap_err();
        assert_eq!(
            err,
            AllocError::SizeExceeded {
                requested: 520,
                limit: 512
            }
        );
        assert!(matches!(
            Block::new((), 10_000),
            Err(AllocError::SizeExceeded { .. })
        ));
    }

    #[test]
    fn test_take_and_refill() {
        let mut block = Block::new(1u32, 8).unwrap();
        assert_eq!(block.take(), Some(1));
        assert!(!block.is_live());

        block.refill(2, size_class_for(40));
        assert!(block.is_live());
        assert_eq!(block.object(), Some(&2));
        assert_eq!(block.allocated_size(), 40);
        assert_eq!(block.size_class_index(), 5);
        assert_eq!(block.generation(), 1);
    }
}
