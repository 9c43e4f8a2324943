// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Single construction when the injected path runs first.
//!
//! Lives in its own test binary because construction ownership is
//! process-wide: it must start from an unclaimed process.

use slab_allocator::{AllocError, FootprintOracle, SharedAllocator};

#[test]
fn claim_first_owns_the_process() {
    let claimed = SharedAllocator::<Vec<u8>, _>::claim(FootprintOracle).unwrap();
    let handle = claimed.allocate(vec![1, 2, 3]).unwrap();

    assert!(matches!(
        SharedAllocator::<Vec<u8>, _>::claim(FootprintOracle),
        Err(AllocError::AlreadyConstructed)
    ));
    assert!(matches!(
        slab_allocator::get_instance(),
        Err(AllocError::AlreadyConstructed)
    ));

    // The refused paths left the claimed allocator alone.
    assert_eq!(claimed.with(|a| a.live_count()).unwrap(), 1);
    assert!(claimed.deallocate(handle));
}
