// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The stress driver: a timed allocation workload with a concurrent tracker.
//!
//! ```text
//!   spawn_blocking ── allocation worker ──► SharedAllocator ◄── snapshot ── tracker task
//!        │  allocate / deallocate every interval                 │  every track interval
//!        ▼                                                       ▼
//!   WorkloadOutcome                                        MemoryMonitor::track
//!        └──────────────────► DriverReport ◄── MemoryMonitor::summarize
//! ```
//!
//! The worker and the tracker share nothing but the allocator, whose lock
//! serialises every mutation. The tracker only ever reads snapshots.

use crate::{DriverError, SimConfig};
use alloc_monitor::{MemoryMonitor, PopulationSummary};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slab_allocator::{AllocError, AllocationStats, BlockHandle, FootprintOracle, SharedAllocator};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

/// The allocator flavour the driver exercises: heap byte buffers.
pub type HeapAllocator = SharedAllocator<Vec<u8>, FootprintOracle>;

/// Counters from the allocation worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct WorkloadOutcome {
    /// Objects successfully allocated.
    pub allocations: u64,
    /// Blocks released by the worker.
    pub releases: u64,
    /// Objects rejected as larger than a block.
    pub rejected: u64,
}

/// Results of one stress run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DriverReport {
    /// Seed the workload ran with (drawn from entropy when not configured).
    pub seed: u64,
    pub workload: WorkloadOutcome,
    /// Number of tracker samples taken.
    pub samples: usize,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
    /// Population at the end of the run.
    pub final_summary: PopulationSummary,
    /// Allocator statistics at the end of the run.
    pub stats: AllocationStats,
}

impl DriverReport {
    /// Returns a summary string suitable for logging or CLI display.
    pub fn summary(&self) -> String {
        format!(
            "Run: {:.1}s, seed {}, {} allocations, {} releases, {} rejected, {} samples\n{}",
            self.elapsed.as_secs_f64(),
            self.seed,
            self.workload.allocations,
            self.workload.releases,
            self.workload.rejected,
            self.samples,
            self.stats.summary(),
        )
    }
}

/// Drives a [`HeapAllocator`] with random traffic while sampling it.
///
/// # Example
/// ```no_run
/// use slab_driver::{SimConfig, StressDriver};
///
/// # async fn example() -> Result<(), slab_driver::DriverError> {
/// let driver = StressDriver::new(SimConfig::default(), slab_allocator::get_instance()?.clone())?;
/// let report = driver.run().await?;
/// println!("{}", report.summary());
/// # Ok(())
/// # }
/// ```
pub struct StressDriver {
    config: SimConfig,
    allocator: HeapAllocator,
}

impl StressDriver {
    /// Creates a driver after validating `config`.
    pub fn new(config: SimConfig, allocator: HeapAllocator) -> Result<Self, DriverError> {
        config.validate()?;
        Ok(Self { config, allocator })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Runs the workload to completion and reports on it.
    pub async fn run(&self) -> Result<DriverReport, DriverError> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        tracing::info!(
            "stress run starting: {:.1}s, sizes {}..={}, seed {seed}",
            self.config.duration_secs,
            self.config.min_object_size,
            self.config.max_object_size
        );
        let start = Instant::now();

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let tracker = {
            let allocator = self.allocator.clone();
            let period = self.config.track_interval()?;
            tokio::spawn(async move {
                let mut monitor = MemoryMonitor::new();
                let mut interval = tokio::time::interval(period);
                let mut samples = 0usize;
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            match allocator.snapshot() {
                                Ok(snapshot) => {
                                    monitor.track(&snapshot);
                                    samples += 1;
                                }
                                Err(e) => tracing::warn!("tracker sample skipped: {e}"),
                            }
                        }
                        _ = &mut stop_rx => break,
                    }
                }
                (monitor, samples)
            })
        };

        let worker = {
            let allocator = self.allocator.clone();
            let config = self.config.clone();
            tokio::task::spawn_blocking(move || run_workload(&config, &allocator, seed))
        };

        let outcome = worker.await.map_err(|e| task_failed("allocation worker", e))?;
        // The tracker must stop even when the worker failed.
        let _ = stop_tx.send(());
        let (monitor, samples) = tracker.await.map_err(|e| task_failed("tracker", e))?;
        let workload = outcome?;

        let snapshot = self.allocator.snapshot()?;
        let final_summary = monitor.summarize(&snapshot);
        let report = DriverReport {
            seed,
            workload,
            samples,
            elapsed: start.elapsed(),
            final_summary,
            stats: snapshot.stats,
        };
        tracing::info!("{}", report.summary());
        Ok(report)
    }
}

/// The blocking allocation loop.
fn run_workload(
    config: &SimConfig,
    allocator: &HeapAllocator,
    seed: u64,
) -> Result<WorkloadOutcome, DriverError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut live: Vec<BlockHandle> = Vec::new();
    let mut outcome = WorkloadOutcome::default();
    // Past the clock's range there is no deadline; the run goes on until
    // the process is stopped.
    let deadline = Instant::now().checked_add(config.duration()?);
    let pause = config.allocation_interval();

    while deadline.map_or(true, |d| Instant::now() < d) {
        if !live.is_empty() && rng.gen_bool(config.release_probability) {
            let handle = live.swap_remove(rng.gen_range(0..live.len()));
            if allocator.deallocate(handle) {
                outcome.releases += 1;
            }
        } else {
            let len = rng.gen_range(config.min_object_size..=config.max_object_size);
            match allocator.allocate(vec![0u8; len]) {
                Ok(handle) => {
                    live.push(handle);
                    outcome.allocations += 1;
                }
                Err(AllocError::SizeExceeded { requested, .. }) => {
                    tracing::debug!("payload of {len} bytes rounds to {requested}, rejected");
                    outcome.rejected += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    }
    Ok(outcome)
}

fn task_failed(task: &str, err: tokio::task::JoinError) -> DriverError {
    DriverError::TaskFailed {
        task: task.to_string(),
        detail: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slab_allocator::Allocator;

    fn fresh() -> HeapAllocator {
        SharedAllocator::new(Allocator::default())
    }

    fn quick(seed: u64) -> SimConfig {
        SimConfig {
            duration_secs: 0.05,
            allocation_interval_ms: 0,
            track_interval_secs: 0.01,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_workload_counts_allocations() {
        let allocator = fresh();
        let outcome = run_workload(&quick(1), &allocator, 1).unwrap();
        assert!(outcome.allocations > 0);
        assert_eq!(outcome.releases, 0);
        assert_eq!(outcome.rejected, 0);

        let live = allocator.with(|a| a.live_count()).unwrap();
        assert_eq!(live as u64, outcome.allocations);
    }

    #[test]
    fn test_workload_counts_rejections() {
        let allocator = fresh();
        let config = SimConfig {
            min_object_size: 600,
            max_object_size: 700,
            ..quick(2)
        };
        let outcome = run_workload(&config, &allocator, 2).unwrap();
        assert_eq!(outcome.allocations, 0);
        assert!(outcome.rejected > 0);
        assert!(allocator.with(|a| a.active_arenas().is_empty()).unwrap());
    }

    #[test]
    fn test_workload_with_releases_keeps_invariants() {
        let allocator = fresh();
        let config = SimConfig {
            release_probability: 0.4,
            ..quick(3)
        };
        let outcome = run_workload(&config, &allocator, 3).unwrap();
        assert!(outcome.releases > 0);
        let live = allocator.with(|a| a.live_count()).unwrap() as u64;
        assert_eq!(live, outcome.allocations - outcome.releases);
        allocator.with(|a| a.check_invariants()).unwrap().unwrap();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimConfig {
            release_probability: -0.1,
            ..Default::default()
        };
        assert!(StressDriver::new(config, fresh()).is_err());

        let config = SimConfig {
            duration_secs: f64::INFINITY,
            track_interval_secs: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            StressDriver::new(config, fresh()),
            Err(DriverError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_run_produces_report() {
        let driver = StressDriver::new(quick(4), fresh()).unwrap();
        let report = driver.run().await.unwrap();

        assert_eq!(report.seed, 4);
        assert!(report.samples >= 1);
        assert!(report.workload.allocations > 0);
        assert_eq!(report.stats.total_allocations, report.workload.allocations);
        assert!(report.summary().contains("seed 4"));
    }
}
