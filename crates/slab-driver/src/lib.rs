// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # slab-driver
//!
//! A stress harness for the slab allocator. One blocking worker allocates
//! randomly sized byte buffers (and optionally releases some) for a fixed
//! duration, while an async tracker samples the allocator's population
//! through [`alloc_monitor::MemoryMonitor`] at a fixed interval.
//!
//! Configuration comes from [`SimConfig`], either built in code or loaded
//! from TOML.

mod config;
mod driver;
mod error;

pub use config::SimConfig;
pub use driver::{DriverReport, HeapAllocator, StressDriver, WorkloadOutcome};
pub use error::DriverError;
