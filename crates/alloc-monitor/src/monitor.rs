// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The memory monitor: samples allocator populations into the log sink.
//!
//! Every report is emitted as `tracing` events at `INFO` level, so where
//! the lines end up (terminal, append-only log file) is decided by the
//! subscriber the host installs. The monitor itself never locks or mutates
//! an allocator; callers hand it an [`AllocatorSnapshot`].

use crate::summary::PopulationSummary;
use crate::tracker::{SummaryDelta, SummaryTracker};
use slab_allocator::{AllocatorSnapshot, SizeOracle};

/// Samples and reports allocator populations.
#[derive(Debug, Default)]
pub struct MemoryMonitor {
    tracker: SummaryTracker,
}

impl MemoryMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measures one object with `oracle` and logs the result.
    pub fn measure_size<T, O>(&self, object: &T, oracle: &O) -> usize
    where
        T: ?Sized,
        O: SizeOracle<T>,
    {
        let size = oracle.measure(object);
        tracing::info!("Size of object: {size} bytes");
        size
    }

    /// Logs and returns what changed since the previous call.
    pub fn track(&mut self, snapshot: &AllocatorSnapshot) -> Vec<SummaryDelta> {
        let deltas = self.tracker.diff(PopulationSummary::from_snapshot(snapshot));
        tracing::info!("Track:");
        for delta in &deltas {
            tracing::info!("{delta}");
        }
        deltas
    }

    /// Logs and returns the total number of structures, live and recycled.
    pub fn analyze(&self, snapshot: &AllocatorSnapshot) -> usize {
        let total = PopulationSummary::from_snapshot(snapshot).total_objects();
        tracing::info!("Total number of objects: {total}");
        total
    }

    /// Logs every row of the current population and returns the summary.
    pub fn summarize(&self, snapshot: &AllocatorSnapshot) -> PopulationSummary {
        let summary = PopulationSummary::from_snapshot(snapshot);
        tracing::info!("Total number of objects: {}", summary.total_objects());
        tracing::info!("Summarize:");
        for row in &summary.rows {
            tracing::info!("{row}");
        }
        summary
    }

    /// The tracker holding the previous sample.
    pub fn tracker(&self) -> &SummaryTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PopulationKind;
    use slab_allocator::{Allocator, FootprintOracle};

    #[test]
    fn test_measure_size() {
        let monitor = MemoryMonitor::new();
        let oracle = |s: &str| s.len();
        assert_eq!(monitor.measure_size("object", &oracle), 6);
        assert_eq!(monitor.measure_size(&7u32, &FootprintOracle), 4);
    }

    #[test]
    fn test_track_updates_baseline() {
        let mut alloc = Allocator::new(|n: &usize| *n);
        let mut monitor = MemoryMonitor::new();
        alloc.allocate(8).unwrap();

        assert_eq!(monitor.track(&alloc.snapshot()).len(), 3);
        assert!(monitor.tracker().baseline().is_some());
        assert!(monitor.track(&alloc.snapshot()).is_empty());

        alloc.allocate(8).unwrap();
        let deltas = monitor.track(&alloc.snapshot());
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].kind, PopulationKind::Block);
    }

    #[test]
    fn test_analyze_and_summarize() {
        let mut alloc = Allocator::new(|n: &usize| *n);
        let monitor = MemoryMonitor::new();
        for _ in 0..3 {
            alloc.allocate(40).unwrap();
        }

        assert_eq!(monitor.analyze(&alloc.snapshot()), 1 + 1 + 3);
        let summary = monitor.summarize(&alloc.snapshot());
        assert_eq!(summary.row(PopulationKind::Block).unwrap().bytes, 120);
    }

    #[test]
    fn test_monitors_keep_separate_baselines() {
        let mut alloc = Allocator::new(|n: &usize| *n);
        let mut early = MemoryMonitor::new();
        alloc.allocate(8).unwrap();
        early.track(&alloc.snapshot());

        alloc.allocate(8).unwrap();
        let mut late = MemoryMonitor::new();
        // A fresh monitor reports everything; the earlier one only the new block.
        assert_eq!(late.track(&alloc.snapshot()).len(), 3);
        assert_eq!(early.track(&alloc.snapshot()).len(), 1);
    }
}
