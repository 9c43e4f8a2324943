// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the stress driver.

/// Errors that can occur while configuring or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The allocator raised a fault the driver cannot absorb.
    #[error("allocator error: {0}")]
    Alloc(#[from] slab_allocator::AllocError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// A background task panicked or was cancelled.
    #[error("task '{task}' failed: {detail}")]
    TaskFailed { task: String, detail: String },
}
