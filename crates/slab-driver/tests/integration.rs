// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: config file → driver → allocator → monitor.
//!
//! Each test drives a private allocator so runs never share state through
//! the process-wide instance.

use alloc_monitor::PopulationKind;
use slab_allocator::{Allocator, FootprintOracle, SharedAllocator};
use slab_driver::{DriverError, HeapAllocator, SimConfig, StressDriver};

// ── Helpers ────────────────────────────────────────────────────

fn fresh() -> HeapAllocator {
    SharedAllocator::new(Allocator::new(FootprintOracle))
}

fn short_run(seed: u64) -> SimConfig {
    SimConfig {
        duration_secs: 0.2,
        allocation_interval_ms: 1,
        track_interval_secs: 0.05,
        seed: Some(seed),
        ..Default::default()
    }
}

// ── Runs ───────────────────────────────────────────────────────

#[tokio::test]
async fn allocate_only_run_keeps_everything_live() {
    let allocator = fresh();
    let driver = StressDriver::new(short_run(11), allocator.clone()).unwrap();
    let report = driver.run().await.unwrap();

    assert!(report.workload.allocations > 0);
    assert_eq!(report.workload.releases, 0);
    assert!(report.samples >= 2, "tracker sampled {} times", report.samples);

    let blocks = report.final_summary.row(PopulationKind::Block).unwrap();
    assert_eq!(blocks.count as u64, report.workload.allocations);
    assert_eq!(allocator.with(|a| a.live_count()).unwrap() as u64, blocks.count as u64);
}

#[tokio::test]
async fn release_traffic_recycles_structures() {
    let allocator = fresh();
    let config = SimConfig {
        release_probability: 0.5,
        ..short_run(12)
    };
    let report = StressDriver::new(config, allocator.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(report.workload.releases > 0);
    assert_eq!(
        report.stats.total_deallocations,
        report.workload.releases,
    );
    assert!(report.stats.blocks_reused > 0);
    allocator.with(|a| a.check_invariants()).unwrap().unwrap();
}

#[tokio::test]
async fn oversized_traffic_is_counted_not_fatal() {
    let config = SimConfig {
        min_object_size: 400,
        max_object_size: 800,
        ..short_run(13)
    };
    let report = StressDriver::new(config, fresh()).unwrap().run().await.unwrap();

    assert!(report.workload.rejected > 0);
    assert!(report.workload.allocations > 0);
    assert_eq!(report.stats.size_exceeded_count, report.workload.rejected);
}

#[tokio::test]
async fn report_serializes() {
    let report = StressDriver::new(short_run(15), fresh()).unwrap().run().await.unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["seed"], 15);
    assert!(json["final_summary"]["rows"].is_array());
    assert!(json["stats"]["total_allocations"].as_u64().unwrap() > 0);
}

// ── Configuration ──────────────────────────────────────────────

#[test]
fn config_file_round_trip() {
    let dir = std::env::temp_dir().join("slabsim_test_config");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sim.toml");

    let config = short_run(16);
    std::fs::write(&path, config.to_toml().unwrap()).unwrap();
    let loaded = SimConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_config_file_is_a_config_error() {
    let path = std::env::temp_dir().join("slabsim_test_missing/none.toml");
    assert!(matches!(
        SimConfig::from_file(&path),
        Err(DriverError::ConfigError(_))
    ));
}
