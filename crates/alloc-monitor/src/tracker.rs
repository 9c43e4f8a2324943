// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Change tracking between successive population summaries.

use crate::summary::{PopulationKind, PopulationSummary};
use std::fmt;

/// A signed change in one row between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct SummaryDelta {
    pub kind: PopulationKind,
    pub count: i64,
    pub bytes: i64,
}

impl fmt::Display for SummaryDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type: {}, Count: {:+}, Size: {:+} bytes",
            self.kind, self.count, self.bytes
        )
    }
}

/// Remembers the last summary and reports what changed since.
///
/// The first call to [`diff`](Self::diff) compares against an empty
/// population, so it reports everything that exists.
#[derive(Debug, Clone, Default)]
pub struct SummaryTracker {
    baseline: Option<PopulationSummary>,
}

impl SummaryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rows that changed since the previous call, then makes
    /// `current` the new baseline.
    pub fn diff(&mut self, current: PopulationSummary) -> Vec<SummaryDelta> {
        let deltas = current
            .rows
            .iter()
            .filter_map(|row| {
                let (prev_count, prev_bytes) = self
                    .baseline
                    .as_ref()
                    .and_then(|b| b.row(row.kind))
                    .map_or((0, 0), |p| (p.count, p.bytes));
                let delta = SummaryDelta {
                    kind: row.kind,
                    count: row.count as i64 - prev_count as i64,
                    bytes: row.bytes as i64 - prev_bytes as i64,
                };
                (delta.count != 0 || delta.bytes != 0).then_some(delta)
            })
            .collect();
        self.baseline = Some(current);
        deltas
    }

    /// The summary the next diff will compare against.
    pub fn baseline(&self) -> Option<&PopulationSummary> {
        self.baseline.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slab_allocator::Allocator;

    #[test]
    fn test_first_diff_reports_everything() {
        let mut alloc = Allocator::new(|n: &usize| *n);
        alloc.allocate(16).unwrap();

        let mut tracker = SummaryTracker::new();
        let deltas = tracker.diff(PopulationSummary::from_snapshot(&alloc.snapshot()));
        let kinds: Vec<_> = deltas.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![PopulationKind::Arena, PopulationKind::Pool, PopulationKind::Block]
        );
    }

    #[test]
    fn test_unchanged_population_reports_nothing() {
        let mut alloc = Allocator::new(|n: &usize| *n);
        alloc.allocate(16).unwrap();

        let mut tracker = SummaryTracker::new();
        tracker.diff(PopulationSummary::from_snapshot(&alloc.snapshot()));
        assert!(tracker
            .diff(PopulationSummary::from_snapshot(&alloc.snapshot()))
            .is_empty());
    }

    #[test]
    fn test_negative_deltas_after_release() {
        let mut alloc = Allocator::new(|n: &usize| *n);
        let handle = alloc.allocate(16).unwrap();

        let mut tracker = SummaryTracker::new();
        tracker.diff(PopulationSummary::from_snapshot(&alloc.snapshot()));
        alloc.deallocate(handle);
        let deltas = tracker.diff(PopulationSummary::from_snapshot(&alloc.snapshot()));

        let block = deltas
            .iter()
            .find(|d| d.kind == PopulationKind::Block)
            .unwrap();
        assert_eq!((block.count, block.bytes), (-1, -16));
        let free = deltas
            .iter()
            .find(|d| d.kind == PopulationKind::FreeArena)
            .unwrap();
        assert_eq!(free.count, 1);
        assert_eq!(block.to_string(), "Type: slab.Block, Count: -1, Size: -16 bytes");
    }
}
