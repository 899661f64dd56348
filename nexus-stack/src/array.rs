//! Typed dynamic array over chunked byte storage.
//!
//! [`Array`] places values into the chunk slots of a [`ChunkedStorage`]
//! sized to `T`. Slots `[0, len)` always hold live values; everything past
//! `len` is raw memory.
//!
//! Growth relocates elements with a byte copy. That is a valid move for
//! every Rust type, so no element type restriction applies. Popping moves
//! the element out before the slot is released, so its destructor runs
//! exactly once.
//!
//! # Example
//!
//! ```
//! use nexus_stack::{Amortized, Array, Exact};
//!
//! // Amortized growth: capacity runs ahead of len
//! let mut stack: Array<i32, Amortized> = Array::new();
//! stack.emplace_back(5);
//! stack.emplace_back(3);
//! stack.emplace_back(1);
//! assert_eq!(stack.pop_back(), Some(1));
//! stack.emplace_back(2);
//! assert_eq!(stack.as_slice(), &[5, 3, 2]);
//!
//! // Exact growth: capacity always equals len
//! let mut tight: Array<i32, Exact> = Array::new();
//! tight.emplace_back(1);
//! tight.emplace_back(2);
//! assert_eq!(tight.capacity(), 2);
//! ```

use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, align_of, size_of};
use core::ops::{Index, IndexMut};
use core::ptr::{self, NonNull};
use core::slice;

use crate::chunked::ChunkedStorage;
use crate::cursor::{Cursor, CursorMut};
use crate::error::ReserveError;
use crate::growth::{Amortized, GrowthPolicy};

/// A growable array with a pluggable [`GrowthPolicy`].
///
/// Only the back is mutable: [`emplace_back`](Self::emplace_back) and
/// [`pop_back`](Self::pop_back). Random access is by index.
pub struct Array<T, P: GrowthPolicy = Amortized> {
    chunks: ChunkedStorage<P>,
    _marker: PhantomData<T>,
}

impl<T, P: GrowthPolicy + Default> Array<T, P> {
    /// Creates an empty array. Does not allocate.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    pub fn new() -> Self {
        Self::with_policy(P::default())
    }

    /// Creates an empty array with room for `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized or the byte size overflows.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut array = Self::new();
        array.chunks.reserve(capacity);
        array
    }
}

impl<T, P: GrowthPolicy + Default> Default for Array<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: GrowthPolicy> Array<T, P> {
    /// Creates an empty array using `policy`, measured in elements.
    ///
    /// # Panics
    ///
    /// Panics if `T` is zero-sized.
    pub fn with_policy(policy: P) -> Self {
        assert!(
            size_of::<T>() != 0,
            "zero-sized element types are not supported"
        );
        Self {
            chunks: ChunkedStorage::with_policy(size_of::<T>(), align_of::<T>(), policy),
            _marker: PhantomData,
        }
    }

    /// Returns the number of elements.
    #[inline]
    pub const fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns `true` if the array holds no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns the number of elements that fit without reallocating.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.chunks.capacity()
    }

    /// Returns the growth policy.
    #[inline]
    pub const fn policy(&self) -> &P {
        self.chunks.policy()
    }

    /// Appends `value` and returns a reference to it.
    ///
    /// May reallocate according to the growth policy. Existing elements keep
    /// their indices.
    #[inline]
    pub fn emplace_back(&mut self, value: T) -> &mut T {
        self.emplace_back_with(move || value)
    }

    /// Reserves the next slot, then constructs the element in it from `f`.
    ///
    /// If `f` panics the reserved slot is released and the array keeps its
    /// previous length.
    pub fn emplace_back_with<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let old_len = self.len();
        self.chunks.resize(old_len + 1);

        let guard = ReleaseSlot {
            chunks: &mut self.chunks,
            len: old_len,
        };
        let value = f();
        // Safety: old_len < len, and the chunk is sized and aligned for T
        let slot = unsafe { guard.chunks.at_unchecked(old_len) }.cast::<T>();
        mem::forget(guard);

        // Safety: slot is in bounds, aligned, and holds no live value
        unsafe {
            slot.write(value);
            &mut *slot.as_ptr()
        }
    }

    /// Fallible version of [`emplace_back`](Self::emplace_back).
    ///
    /// # Errors
    ///
    /// Returns the allocation error if growing fails. `value` is dropped and
    /// the array is left unchanged.
    pub fn try_emplace_back(&mut self, value: T) -> Result<&mut T, ReserveError> {
        let old_len = self.len();
        self.chunks.try_resize(old_len + 1)?;
        // Safety: old_len < len after the resize
        let slot = unsafe { self.chunks.at_unchecked(old_len) }.cast::<T>();
        // Safety: slot is in bounds, aligned, and holds no live value
        unsafe {
            slot.write(value);
            Ok(&mut *slot.as_ptr())
        }
    }

    /// Removes the last element and returns it, or `None` if empty.
    ///
    /// Popping an empty array is a no-op.
    pub fn pop_back(&mut self) -> Option<T> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        // Safety: len - 1 holds a live value which we take ownership of
        let value = unsafe { self.chunks.at_unchecked(len - 1).cast::<T>().read() };
        self.chunks.resize(len - 1);
        Some(value)
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    #[track_caller]
    pub fn at(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => out_of_bounds(index, self.len()),
        }
    }

    /// Returns a mutable reference to the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    #[track_caller]
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.get_mut(index) {
            Some(value) => value,
            None => out_of_bounds(index, len),
        }
    }

    /// Returns a reference to the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline]
    pub unsafe fn at_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len());
        // Safety: forwarded to caller
        unsafe { self.chunks.at_unchecked(index).cast::<T>().as_ref() }
    }

    /// Returns a reference to the element at `index`, or `None`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns a mutable reference to the element at `index`, or `None`.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.as_mut_slice().get_mut(index)
    }

    /// Returns the last element.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Returns the elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // Safety: the first len chunks hold live T values; the base pointer is
        // aligned for T even when nothing is allocated
        unsafe { slice::from_raw_parts(self.base().as_ptr(), self.len()) }
    }

    /// Returns the elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // Safety: as in as_slice, with exclusive access through &mut self
        unsafe { slice::from_raw_parts_mut(self.base().as_ptr(), self.len()) }
    }

    /// Returns a cursor positioned at the first element.
    #[inline]
    pub fn cursor(&self) -> ArrayCursor<'_, T> {
        ArrayCursor {
            elements: self.as_slice(),
            index: 0,
        }
    }

    /// Returns a mutable cursor positioned at the first element.
    #[inline]
    pub fn cursor_mut(&mut self) -> ArrayCursorMut<'_, T> {
        ArrayCursorMut {
            elements: self.as_mut_slice(),
            index: 0,
        }
    }

    /// Returns an iterator over the elements, front to back.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Returns a mutable iterator over the elements, front to back.
    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Reserves room for `additional` more elements.
    pub fn reserve(&mut self, additional: usize) {
        let requested = match self.len().checked_add(additional) {
            Some(requested) => requested,
            None => panic!("capacity overflow"),
        };
        self.chunks.reserve(requested);
    }

    /// Drops every element. Capacity is released only if the policy shrinks
    /// on resize.
    pub fn clear(&mut self) {
        let elements: *mut [T] = self.as_mut_slice();
        // Safety: 0 <= capacity; the values are dropped below and must not be
        // reachable again if a destructor panics
        unsafe { self.chunks.set_len(0) };
        // Safety: elements were live and are now unreachable through self
        unsafe { ptr::drop_in_place(elements) };
        self.chunks.resize(0);
    }

    #[inline]
    fn base(&self) -> NonNull<T> {
        // Safety: the storage pointer is never null
        unsafe { NonNull::new_unchecked(self.chunks.as_ptr().cast::<T>()) }
    }
}

impl<T, P: GrowthPolicy> Drop for Array<T, P> {
    fn drop(&mut self) {
        let elements: *mut [T] = self.as_mut_slice();
        // Safety: same as clear; the allocation itself is freed by RawBuffer
        unsafe {
            self.chunks.set_len(0);
            ptr::drop_in_place(elements);
        }
    }
}

impl<T, P: GrowthPolicy> Index<usize> for Array<T, P> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, index: usize) -> &T {
        self.at(index)
    }
}

impl<T, P: GrowthPolicy> IndexMut<usize> for Array<T, P> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.at_mut(index)
    }
}

impl<T: fmt::Debug, P: GrowthPolicy> fmt::Debug for Array<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, P: GrowthPolicy> Extend<T> for Array<T, P> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.emplace_back(value);
        }
    }
}

impl<T, P: GrowthPolicy + Default> FromIterator<T> for Array<T, P> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<'a, T, P: GrowthPolicy> IntoIterator for &'a Array<T, P> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

struct ReleaseSlot<'a, P: GrowthPolicy> {
    chunks: &'a mut ChunkedStorage<P>,
    len: usize,
}

impl<P: GrowthPolicy> Drop for ReleaseSlot<'_, P> {
    fn drop(&mut self) {
        self.chunks.resize(self.len);
    }
}

#[cold]
#[track_caller]
fn out_of_bounds(index: usize, len: usize) -> ! {
    panic!("index {index} out of bounds for array of length {len}");
}

// =============================================================================
// Cursors
// =============================================================================

/// Read-only cursor over an [`Array`].
///
/// Holds a snapshot of the element range taken when it was created.
#[derive(Debug, Clone)]
pub struct ArrayCursor<'a, T> {
    elements: &'a [T],
    index: usize,
}

impl<T> Cursor for ArrayCursor<'_, T> {
    type Item = T;

    #[inline]
    fn has_value(&self) -> bool {
        self.index < self.elements.len()
    }

    #[inline]
    fn current(&self) -> Option<&T> {
        self.elements.get(self.index)
    }

    #[inline]
    fn advance(&mut self) {
        if self.has_value() {
            self.index += 1;
        }
    }
}

/// Mutable cursor over an [`Array`].
#[derive(Debug)]
pub struct ArrayCursorMut<'a, T> {
    elements: &'a mut [T],
    index: usize,
}

impl<T> Cursor for ArrayCursorMut<'_, T> {
    type Item = T;

    #[inline]
    fn has_value(&self) -> bool {
        self.index < self.elements.len()
    }

    #[inline]
    fn current(&self) -> Option<&T> {
        self.elements.get(self.index)
    }

    #[inline]
    fn advance(&mut self) {
        if self.has_value() {
            self.index += 1;
        }
    }
}

impl<T> CursorMut for ArrayCursorMut<'_, T> {
    #[inline]
    fn current_mut(&mut self) -> Option<&mut T> {
        self.elements.get_mut(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::{Exact, ExactGrow};
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    #[derive(Debug)]
    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn collect<T: Copy, P: GrowthPolicy>(array: &Array<T, P>) -> Vec<T> {
        let mut out = Vec::new();
        let mut cursor = array.cursor();
        while cursor.has_value() {
            out.push(*cursor.value());
            cursor.advance();
        }
        out
    }

    #[test]
    fn new_is_empty() {
        let array: Array<u64> = Array::new();
        assert!(array.is_empty());
        assert_eq!(array.len(), 0);
        assert_eq!(array.capacity(), 0);
        assert!(!array.cursor().has_value());
    }

    #[test]
    fn emplace_back_returns_slot() {
        let mut array: Array<u64> = Array::new();
        *array.emplace_back(1) += 10;
        assert_eq!(array.at(0), &11);
    }

    #[test]
    fn interleaved_stack() {
        let mut array: Array<i32> = Array::new();
        array.emplace_back(5);
        array.emplace_back(3);
        array.emplace_back(1);
        assert_eq!(array.pop_back(), Some(1));
        array.emplace_back(2);
        assert_eq!(collect(&array), vec![5, 3, 2]);
    }

    #[test]
    fn pop_empty_is_noop() {
        let mut array: Array<i32, Exact> = Array::new();
        for _ in 0..3 {
            assert_eq!(array.pop_back(), None);
            assert!(array.is_empty());
            assert_eq!(array.capacity(), 0);
        }
    }

    #[test]
    fn push_pop_round_trip() {
        for n in [0usize, 1, 1000] {
            let mut array: Array<usize> = Array::new();
            for i in 0..n {
                array.emplace_back(i);
            }
            assert_eq!(array.len(), n);
            for i in (0..n).rev() {
                assert_eq!(array.pop_back(), Some(i));
            }
            assert!(array.is_empty());
            assert!(!array.cursor().has_value());
        }
    }

    #[test]
    fn exact_capacity_tracks_len() {
        let mut array: Array<u32, Exact> = Array::new();
        for i in 0..50 {
            array.emplace_back(i);
            assert_eq!(array.capacity(), array.len());
        }
        while array.pop_back().is_some() {
            assert_eq!(array.capacity(), array.len());
        }
    }

    #[test]
    fn amortized_capacity_is_monotonic() {
        let mut array: Array<u32, Amortized> = Array::new();
        let mut capacity = 0;
        for i in 0..1000 {
            array.emplace_back(i);
            let grown = array.capacity();
            assert!(grown >= array.len());
            assert!(grown >= capacity);
            if grown != capacity && capacity > 0 {
                assert!(grown * 2 >= capacity * 3, "{capacity} -> {grown}");
            }
            capacity = grown;
        }
        array.pop_back();
        assert_eq!(array.capacity(), capacity);
    }

    #[test]
    fn exact_grow_keeps_capacity() {
        let mut array: Array<u32, ExactGrow> = Array::new();
        array.extend(0..8);
        assert_eq!(array.capacity(), 8);
        array.pop_back();
        assert_eq!(array.capacity(), 8);
    }

    #[test]
    fn growth_preserves_values() {
        let mut array: Array<String, Exact> = Array::new();
        for i in 0..100 {
            array.emplace_back(i.to_string());
        }
        for i in 0..100 {
            assert_eq!(array[i], i.to_string());
        }
    }

    #[test]
    fn over_aligned_elements() {
        #[derive(Debug, Clone, Copy, PartialEq)]
        #[repr(align(64))]
        struct Line(u8);

        let mut array: Array<Line> = Array::new();
        for i in 0..10 {
            array.emplace_back(Line(i));
        }
        for i in 0..10 {
            let value = array.at(i);
            assert_eq!(value as *const Line as usize % 64, 0);
            assert_eq!(value.0, i as u8);
        }
    }

    #[test]
    fn pop_drops_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        let mut array: Array<DropCounter, Exact> = Array::new();
        array.emplace_back(DropCounter(drops.clone()));
        array.emplace_back(DropCounter(drops.clone()));

        let popped = array.pop_back();
        assert_eq!(drops.get(), 0);
        drop(popped);
        assert_eq!(drops.get(), 1);

        drop(array);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn clear_drops_all() {
        let drops = Rc::new(Cell::new(0));
        let mut array: Array<DropCounter> = Array::new();
        for _ in 0..5 {
            array.emplace_back(DropCounter(drops.clone()));
        }
        array.clear();
        assert_eq!(drops.get(), 5);
        assert!(array.is_empty());
        drop(array);
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn panicking_constructor_releases_slot() {
        let mut array: Array<u32, Exact> = Array::new();
        array.emplace_back(1);

        let result = catch_unwind(AssertUnwindSafe(|| {
            array.emplace_back_with(|| panic!("boom"));
        }));
        assert!(result.is_err());
        assert_eq!(array.len(), 1);
        assert_eq!(array.capacity(), 1);
        assert_eq!(array.as_slice(), &[1]);
    }

    #[test]
    fn try_emplace_back_succeeds() {
        let mut array: Array<u8> = Array::new();
        assert_eq!(array.try_emplace_back(7).copied(), Ok(7));
        assert_eq!(array.len(), 1);
    }

    #[test]
    fn cursor_mut_writes() {
        let mut array: Array<i32> = (1..=3).collect();
        let mut cursor = array.cursor_mut();
        while cursor.has_value() {
            *cursor.value_mut() *= 10;
            cursor.advance();
        }
        cursor.advance();
        assert!(cursor.current_mut().is_none());
        assert_eq!(array.as_slice(), &[10, 20, 30]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn at_out_of_bounds_panics() {
        let mut array: Array<i32> = Array::new();
        array.emplace_back(1);
        let _ = array.at(1);
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn exhausted_cursor_value_panics() {
        let array: Array<i32> = Array::new();
        let _ = array.cursor().value();
    }

    #[test]
    #[should_panic(expected = "zero-sized")]
    fn zero_sized_elements_rejected() {
        let _: Array<()> = Array::new();
    }

    #[test]
    #[ignore]
    fn bench_array_push_pop() {
        use std::time::Instant;

        const ITERATIONS: usize = 100_000;

        fn percentile(sorted: &[u64], p: f64) -> u64 {
            let idx = ((p / 100.0) * sorted.len() as f64) as usize;
            sorted[idx.min(sorted.len() - 1)]
        }

        fn print_stats(name: &str, sorted: &[u64]) {
            println!(
                "{:8} | p50: {:4} ns | p90: {:4} ns | p99: {:4} ns | p999: {:5} ns",
                name,
                percentile(sorted, 50.0),
                percentile(sorted, 90.0),
                percentile(sorted, 99.0),
                percentile(sorted, 99.9),
            );
        }

        fn run<P: GrowthPolicy + Default>(label: &str) {
            let mut array: Array<u64, P> = Array::new();
            let mut push_ns = Vec::with_capacity(ITERATIONS);
            let mut pop_ns = Vec::with_capacity(ITERATIONS);

            for i in 0..ITERATIONS {
                let start = Instant::now();
                std::hint::black_box(array.emplace_back(i as u64));
                push_ns.push(start.elapsed().as_nanos() as u64);
            }
            for _ in 0..ITERATIONS {
                let start = Instant::now();
                std::hint::black_box(array.pop_back());
                pop_ns.push(start.elapsed().as_nanos() as u64);
            }

            push_ns.sort_unstable();
            pop_ns.sort_unstable();

            println!("\n{label} ({ITERATIONS} iterations)");
            println!("---------------------------------------------------------");
            print_stats("push", &push_ns);
            print_stats("pop", &pop_ns);
        }

        run::<Amortized>("Array<u64, Amortized>");
        run::<ExactGrow>("Array<u64, ExactGrow>");
        println!();
    }
}
