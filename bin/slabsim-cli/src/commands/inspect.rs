// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `slabsim inspect` command: show where raw object sizes land.
//!
//! Uses a fresh allocator whose oracle reports each object's own value as
//! its size, so `--sizes 13` allocates exactly a 13-byte object.

use alloc_monitor::MemoryMonitor;
use slab_allocator::{size_class_for, Allocator};

pub fn execute(sizes: &[usize]) -> anyhow::Result<()> {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║              slabsim · Layout Inspector             ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    let mut allocator = Allocator::new(|n: &usize| *n);

    // ── Placements ─────────────────────────────────────────────
    println!("  {:>8} {:>8}  Placement", "Raw", "Class");
    println!("  {}", "-".repeat(52));
    for &raw in sizes {
        let class = size_class_for(raw).allocated_size;
        match allocator.allocate(raw) {
            Ok(handle) => match allocator.placement(handle) {
                Some(p) => println!("  {raw:>8} {class:>8}  {} / {} / {}", p.arena, p.pool, p.block),
                None => println!("  {raw:>8} {class:>8}  {handle} (not placed)"),
            },
            Err(e) => println!("  {raw:>8} {class:>8}  fault: {e}"),
        }
    }
    println!();

    // ── Layout ─────────────────────────────────────────────────
    let snapshot = allocator.snapshot();
    println!("  Layout:");
    for line in snapshot.render().lines() {
        println!("   {line}");
    }
    println!();

    let monitor = MemoryMonitor::new();
    println!("  Population ({} objects):", monitor.analyze(&snapshot));
    for row in &monitor.summarize(&snapshot).rows {
        println!("   {row}");
    }
    println!();
    println!("  {}", snapshot.stats.summary());

    allocator.check_invariants()?;
    Ok(())
}
