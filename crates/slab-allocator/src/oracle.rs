// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The size oracle: how the allocator learns an object's footprint.
//!
//! The allocator never inspects objects itself. It asks a [`SizeOracle`]
//! for a byte count and bin-packs on that number alone. Any `Fn(&T) -> usize`
//! closure is an oracle, which keeps tests free to pick exact sizes:
//!
//! ```
//! use slab_allocator::SizeOracle;
//!
//! let oracle = |n: &usize| *n;
//! assert_eq!(oracle.measure(&40), 40);
//! ```
//!
//! [`FootprintOracle`] is the default for real values. It sums the inline
//! size of a value with the heap bytes it owns, via the [`Footprint`] trait.

use std::mem;

/// Measures the footprint of an object in bytes.
///
/// Repeated measurement of an unmodified object must return the same value,
/// otherwise pool and arena byte counters drift from their contents.
pub trait SizeOracle<T: ?Sized> {
    /// Returns the object's size in bytes.
    fn measure(&self, object: &T) -> usize;
}

impl<T: ?Sized, F> SizeOracle<T> for F
where
    F: Fn(&T) -> usize,
{
    fn measure(&self, object: &T) -> usize {
        self(object)
    }
}

/// Types that can report how much memory they occupy.
pub trait Footprint {
    /// Bytes owned on the heap, excluding the value's inline size.
    fn heap_bytes(&self) -> usize {
        0
    }

    /// Inline size plus owned heap bytes.
    fn footprint(&self) -> usize {
        mem::size_of_val(self) + self.heap_bytes()
    }
}

macro_rules! inline_only {
    ($($t:ty),* $(,)?) => {
        $(impl Footprint for $t {})*
    };
}

inline_only!(bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl Footprint for String {
    fn heap_bytes(&self) -> usize {
        self.capacity()
    }
}

impl Footprint for Box<[u8]> {
    fn heap_bytes(&self) -> usize {
        self.len()
    }
}

impl Footprint for Box<str> {
    fn heap_bytes(&self) -> usize {
        self.len()
    }
}

impl<T: Footprint> Footprint for Vec<T> {
    fn heap_bytes(&self) -> usize {
        self.capacity() * mem::size_of::<T>() + self.iter().map(Footprint::heap_bytes).sum::<usize>()
    }
}

impl<T: Footprint> Footprint for Option<T> {
    fn heap_bytes(&self) -> usize {
        self.as_ref().map_or(0, Footprint::heap_bytes)
    }
}

/// Measures any [`Footprint`] type.
#[derive(Debug, Clone, Copy, Default)]
pub struct FootprintOracle;

impl<T: Footprint> SizeOracle<T> for FootprintOracle {
    fn measure(&self, object: &T) -> usize {
        object.footprint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_oracle() {
        let oracle = |s: &str| s.len() * 2;
        assert_eq!(oracle.measure("abcd"), 8);
    }

    #[test]
    fn test_primitive_footprint() {
        assert_eq!(8u64.footprint(), 8);
        assert_eq!(1u8.footprint(), 1);
        assert_eq!(FootprintOracle.measure(&0.5f32), 4);
    }

    #[test]
    fn test_vec_counts_capacity() {
        let v: Vec<u8> = Vec::with_capacity(100);
        assert_eq!(v.footprint(), mem::size_of::<Vec<u8>>() + 100);
    }

    #[test]
    fn test_nested_vec() {
        let mut inner = Vec::with_capacity(4);
        inner.push(String::with_capacity(10));
        let expected = mem::size_of::<Vec<String>>() + 4 * mem::size_of::<String>() + 10;
        assert_eq!(inner.footprint(), expected);
    }

    #[test]
    fn test_string_and_boxed() {
        let s = String::with_capacity(32);
        assert_eq!(s.footprint(), mem::size_of::<String>() + 32);

        let b: Box<[u8]> = vec![0u8; 12].into_boxed_slice();
        assert_eq!(b.footprint(), mem::size_of::<Box<[u8]>>() + 12);
    }

    #[test]
    fn test_option() {
        let none: Option<String> = None;
        assert_eq!(none.heap_bytes(), 0);
        assert_eq!(Some(String::with_capacity(5)).heap_bytes(), 5);
    }
}
