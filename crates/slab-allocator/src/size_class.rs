// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Capacity constants and the size-class rounding rule.
//!
//! Every measured object size is rounded up to the next multiple of
//! [`ALIGNMENT`]. The rounded value is the object's *size class*: it decides
//! which pool a block may join. The truncated quotient `raw / ALIGNMENT` is
//! kept alongside as an informational class index only.

/// Allocation granularity in bytes.
pub const ALIGNMENT: usize = 8;

/// Largest rounded size a single block may hold.
pub const BLOCK_MAXSIZE: usize = 512;

/// Capacity of one pool, and the unit in which arenas reserve space.
pub const POOL_MAXSIZE: usize = 4000;

/// Capacity of one arena.
pub const ARENA_MAXSIZE: usize = 256_000;

/// A measured size after rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SizeClass {
    /// Bytes reserved for the object (`raw` rounded up to [`ALIGNMENT`]).
    pub allocated_size: usize,
    /// `raw / ALIGNMENT`, truncating. Not used for routing.
    pub index: usize,
}

/// Computes the size class for a raw measured size.
///
/// ```
/// use slab_allocator::size_class_for;
///
/// let class = size_class_for(13);
/// assert_eq!(class.allocated_size, 16);
/// assert_eq!(class.index, 1);
/// ```
pub fn size_class_for(raw: usize) -> SizeClass {
    SizeClass {
        allocated_size: raw.div_ceil(ALIGNMENT).saturating_mul(ALIGNMENT),
        index: raw / ALIGNMENT,
    }
}
