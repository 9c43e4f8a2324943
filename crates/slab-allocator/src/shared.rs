// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Lock-guarded sharing and the process-wide allocator instance.
//!
//! [`Allocator`] is a plain single-threaded value. [`SharedAllocator`]
//! wraps it in `Arc<Mutex<_>>` and holds the lock for the full duration of
//! every `allocate` and `deallocate`, so concurrent callers are serialised.
//! Diagnostics take an owned [`AllocatorSnapshot`] under the same lock and
//! inspect it afterwards without blocking the allocator.
//!
//! Exactly one logical allocator per process is available, through one of
//! two mutually exclusive paths:
//! - [`get_instance`] lazily builds a global `SharedAllocator<Vec<u8>>`;
//! - [`SharedAllocator::claim`] constructs an injected instance.
//!
//! Whichever path runs first owns the process. The other then fails with
//! [`AllocError::AlreadyConstructed`], as does a second `claim`.

use crate::handle::BlockHandle;
use crate::snapshot::AllocatorSnapshot;
use crate::{AllocError, Allocator, FootprintOracle, SizeOracle};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

const UNCLAIMED: u8 = 0;
const GLOBAL: u8 = 1;
const INJECTED: u8 = 2;

/// Which construction path owns the process.
static OWNER: AtomicU8 = AtomicU8::new(UNCLAIMED);
static INSTANCE: OnceLock<SharedAllocator<Vec<u8>, FootprintOracle>> = OnceLock::new();

/// Moves `OWNER` from unclaimed to `path`, or reports who holds it.
fn take_ownership(path: u8) -> Result<(), u8> {
    OWNER
        .compare_exchange(UNCLAIMED, path, Ordering::AcqRel, Ordering::Acquire)
        .map(|_| ())
}

/// Returns the process-wide allocator, creating it on first use.
///
/// Fails with [`AllocError::AlreadyConstructed`] if
/// [`SharedAllocator::claim`] already constructed this process's allocator.
///
/// # Example
/// ```
/// let alloc = slab_allocator::get_instance().unwrap();
/// let handle = alloc.allocate(vec![0u8; 64]).unwrap();
/// assert!(alloc.deallocate(handle));
/// assert!(std::ptr::eq(alloc, slab_allocator::get_instance().unwrap()));
/// ```
pub fn get_instance() -> Result<&'static SharedAllocator<Vec<u8>, FootprintOracle>, AllocError> {
    match take_ownership(GLOBAL) {
        Ok(()) | Err(GLOBAL) => Ok(INSTANCE.get_or_init(|| {
            tracing::debug!("initialising process-wide allocator");
            SharedAllocator::new(Allocator::new(FootprintOracle))
        })),
        Err(_) => Err(AllocError::AlreadyConstructed),
    }
}

/// A cloneable, thread-safe handle to one [`Allocator`].
pub struct SharedAllocator<T, O = FootprintOracle> {
    inner: Arc<Mutex<Allocator<T, O>>>,
}

impl<T, O> Clone for SharedAllocator<T, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, O: SizeOracle<T>> SharedAllocator<T, O> {
    /// Wraps an existing allocator.
    pub fn new(allocator: Allocator<T, O>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(allocator)),
        }
    }

    /// Constructs the single injected allocator for this process.
    ///
    /// Only succeeds if neither an earlier `claim` nor [`get_instance`]
    /// has constructed one; otherwise returns
    /// [`AllocError::AlreadyConstructed`].
    pub fn claim(oracle: O) -> Result<Self, AllocError> {
        take_ownership(INJECTED).map_err(|_| AllocError::AlreadyConstructed)?;
        tracing::debug!("claimed process-wide allocator");
        Ok(Self::new(Allocator::new(oracle)))
    }

    /// Allocates `object` while holding the lock.
    pub fn allocate(&self, object: T) -> Result<BlockHandle, AllocError> {
        self.lock()?.allocate(object)
    }

    /// Deallocates while holding the lock.
    ///
    /// A poisoned lock is reported as `false` (nothing was released).
    pub fn deallocate(&self, handle: BlockHandle) -> bool {
        match self.lock() {
            Ok(mut alloc) => alloc.deallocate(handle),
            Err(e) => {
                tracing::error!("deallocate of {handle} skipped: {e}");
                false
            }
        }
    }

    /// Takes an owned copy of the current layout.
    pub fn snapshot(&self) -> Result<AllocatorSnapshot, AllocError> {
        Ok(self.lock()?.snapshot())
    }

    /// Runs `f` with shared access to the allocator.
    pub fn with<R>(&self, f: impl FnOnce(&Allocator<T, O>) -> R) -> Result<R, AllocError> {
        let guard = self.lock()?;
        Ok(f(&guard))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Allocator<T, O>>, AllocError> {
        self.inner.lock().map_err(|_| AllocError::LockPoisoned)
    }
}

impl<T, O> std::fmt::Debug for SharedAllocator<T, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_lock() {
            Ok(alloc) => f.debug_tuple("SharedAllocator").field(&*alloc).finish(),
            Err(_) => f.write_str("SharedAllocator(<locked>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_shared_allocate_and_deallocate() {
        let shared = SharedAllocator::new(Allocator::new(|n: &usize| *n));
        let handle = shared.allocate(8).unwrap();
        assert_eq!(shared.snapshot().unwrap().block_count(), 1);
        assert!(shared.deallocate(handle));
        assert_eq!(shared.with(|a| a.recycle_counts().arenas).unwrap(), 1);
    }

    #[test]
    fn test_concurrent_allocations_keep_invariants() {
        let shared = SharedAllocator::new(Allocator::new(|n: &usize| *n));

        let workers: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let mut handles = Vec::new();
                    for i in 0..200 {
                        handles.push(shared.allocate(8 + (t * 8) + (i % 3) * 8).unwrap());
                    }
                    for handle in handles.iter().step_by(2) {
                        assert!(shared.deallocate(*handle));
                    }
                })
            })
            .collect();

        // A reader sampling while writers run.
        for _ in 0..10 {
            let snap = shared.snapshot().unwrap();
            assert!(snap.bytes_used() <= snap.bytes_reserved());
        }

        for w in workers {
            w.join().unwrap();
        }

        shared.with(|a| a.check_invariants()).unwrap().unwrap();
        assert_eq!(shared.with(|a| a.live_count()).unwrap(), 4 * 100);
    }

    #[test]
    fn test_with_reads_under_lock() {
        let shared = SharedAllocator::new(Allocator::new(|n: &usize| *n));
        shared.allocate(24).unwrap();
        let (live, used) = shared.with(|a| (a.live_count(), a.bytes_used())).unwrap();
        assert_eq!((live, used), (1, 24));
    }

    // Ownership is process-wide and nothing in this binary calls `claim`
    // first, so the global path always owns it here. The claim-first order
    // is covered by `tests/single_instance.rs`, which runs in its own process.
    #[test]
    fn test_get_instance_is_shared() {
        let a = get_instance().unwrap();
        let b = get_instance().unwrap();
        assert!(std::ptr::eq(a, b));

        let handle = a.allocate(String::from("x").into_bytes()).unwrap();
        assert!(b.deallocate(handle));
    }

    #[test]
    fn test_claim_after_get_instance_is_refused() {
        get_instance().unwrap();
        let claimed = SharedAllocator::<Vec<u8>, _>::claim(FootprintOracle);
        assert!(matches!(claimed, Err(AllocError::AlreadyConstructed)));
        let claimed = SharedAllocator::<usize, _>::claim(|n: &usize| *n);
        assert!(matches!(claimed, Err(AllocError::AlreadyConstructed)));
    }
}
