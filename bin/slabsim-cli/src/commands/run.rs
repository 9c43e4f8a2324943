// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `slabsim run` command: stress the process-wide allocator.

use slab_driver::{DriverReport, SimConfig, StressDriver};

pub async fn execute(config: SimConfig, json: bool) -> anyhow::Result<()> {
    let driver = StressDriver::new(config, slab_allocator::get_instance()?.clone())?;

    if !json {
        let config = driver.config();
        println!("╔══════════════════════════════════════════════════════╗");
        println!("║              slabsim · Stress Run                   ║");
        println!("╚══════════════════════════════════════════════════════╝");
        println!();
        println!("  Config:");
        println!("   Duration: {:.1}s", config.duration_secs);
        println!(
            "   Sizes:    {}..={} bytes",
            config.min_object_size, config.max_object_size
        );
        println!("   Interval: {} ms", config.allocation_interval_ms);
        println!("   Tracker:  every {:.1}s", config.track_interval_secs);
        println!("   Release:  p = {}", config.release_probability);
        println!("   Log:      {}", config.log_file.display());
        println!();
        println!("  Running...");
        println!();
    }

    let report = driver.run().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &DriverReport) {
    println!("  Workload:");
    println!("   Seed:        {}", report.seed);
    println!("   Elapsed:     {:.2}s", report.elapsed.as_secs_f64());
    println!("   Allocations: {}", report.workload.allocations);
    println!("   Releases:    {}", report.workload.releases);
    println!("   Rejected:    {}", report.workload.rejected);
    println!("   Samples:     {}", report.samples);
    println!();
    println!("  Population:");
    for row in &report.final_summary.rows {
        println!("   {row}");
    }
    println!();
    println!("  Allocator Stats:");
    println!("   {}", report.stats.summary());
    println!();
}
