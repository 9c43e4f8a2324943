// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # alloc-monitor
//!
//! Diagnostics for the slab allocator: periodic population sampling and
//! change tracking, written to whatever `tracing` subscriber the host
//! installs (typically an append-only log file).
//!
//! The monitor only ever sees [`AllocatorSnapshot`](slab_allocator::AllocatorSnapshot)s,
//! owned copies taken under the allocator's lock, so sampling never
//! interferes with allocation.
//!
//! # Example
//! ```
//! use alloc_monitor::MemoryMonitor;
//! use slab_allocator::Allocator;
//!
//! let mut alloc = Allocator::new(|n: &usize| *n);
//! let mut monitor = MemoryMonitor::new();
//!
//! alloc.allocate(8).unwrap();
//! let changes = monitor.track(&alloc.snapshot());
//! assert_eq!(changes.len(), 3); // an arena, a pool and a block appeared
//! ```

mod monitor;
mod summary;
mod tracker;

pub use monitor::MemoryMonitor;
pub use summary::{PopulationKind, PopulationSummary, SummaryRow};
pub use tracker::{SummaryDelta, SummaryTracker};
