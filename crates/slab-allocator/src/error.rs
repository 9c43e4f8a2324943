// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the slab allocator.

/// Faults raised by the allocator and its building blocks.
///
/// A failed [`deallocate`](crate::Allocator::deallocate) is deliberately
/// absent: releasing an unknown block is a normal `false` outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// The object's rounded size does not fit in a block.
    #[error("size exceeded: object needs {requested} bytes, but a block holds at most {limit}")]
    SizeExceeded { requested: usize, limit: usize },

    /// A pool was configured with an unusable size class.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An arena was asked to reserve something other than one pool unit.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Bookkeeping no longer matches the structures it describes.
    #[error("allocator integrity error: {0}")]
    Corruption(String),

    /// Every slot id of one kind has been handed out.
    #[error("slot ids exhausted for {0}")]
    SlotsExhausted(&'static str),

    /// Another thread panicked while holding the allocator lock.
    #[error("allocator lock poisoned by a panicking thread")]
    LockPoisoned,

    /// The single-construction allocator was claimed twice.
    #[error("an allocator instance has already been constructed in this process")]
    AlreadyConstructed,
}
