// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # slab-allocator
//!
//! A three-tier slab allocator simulator. Fixed-capacity **arenas** are
//! subdivided into fixed-capacity, single-size-class **pools**, which hold
//! **blocks** that each wrap one logical object.
//!
//! # Key Components
//!
//! - [`Allocator`]: routes objects to pools by size class,
//!   places new pools into arenas, and cascades teardown on release.
//! - [`Arena`], [`Pool`], [`Block`]: the three tiers, addressed by
//!   [`ArenaId`], [`PoolId`] and [`BlockId`].
//! - [`SizeOracle`]: the injected capability that measures objects.
//!   [`FootprintOracle`] is the default for [`Footprint`] types.
//! - [`SharedAllocator`] / [`get_instance`]: lock-guarded sharing and the
//!   process-wide instance.
//! - [`AllocationStats`] and [`AllocatorSnapshot`]: read-only views for
//!   diagnostics.
//!
//! # Capacities
//!
//! | Tier  | Capacity | Unit |
//! |-------|----------|------|
//! | Block | [`BLOCK_MAXSIZE`] = 512 | rounded object size, multiple of [`ALIGNMENT`] |
//! | Pool  | [`POOL_MAXSIZE`] = 4000 | sum of its blocks' sizes |
//! | Arena | [`ARENA_MAXSIZE`] = 256000 | one `POOL_MAXSIZE` per pool held |
//!
//! # Recycling
//!
//! Nothing is discarded. Freed blocks, pools and arenas go on LIFO recycle
//! lists and are reset in place on reuse:
//!
//! ```
//! use slab_allocator::Allocator;
//!
//! let mut alloc = Allocator::new(|s: &&str| s.len());
//!
//! let first = alloc.allocate("object 1").unwrap();
//! let before = alloc.placement(first).unwrap();
//! assert!(alloc.deallocate(first));
//! assert!(alloc.active_arenas().is_empty());
//!
//! let second = alloc.allocate("object 2").unwrap();
//! assert_eq!(alloc.placement(second).unwrap(), before);
//! assert_eq!(alloc.get(second), Some(&"object 2"));
//! ```

mod arena;
mod block;
mod error;
mod handle;
mod manager;
mod oracle;
mod pool;
mod recycle;
mod shared;
mod size_class;
mod snapshot;
mod stats;

pub use arena::Arena;
pub use block::Block;
pub use error::AllocError;
pub use handle::{BlockHandle, Placement};
pub use manager::Allocator;
pub use oracle::{Footprint, FootprintOracle, SizeOracle};
pub use pool::Pool;
pub use recycle::{ArenaId, BlockId, PoolId, RecycleCounts};
pub use shared::{get_instance, SharedAllocator};
pub use size_class::{size_class_for, SizeClass, ALIGNMENT, ARENA_MAXSIZE, BLOCK_MAXSIZE, POOL_MAXSIZE};
pub use snapshot::{AllocatorSnapshot, ArenaSnapshot, PoolSnapshot};
pub use stats::AllocationStats;
