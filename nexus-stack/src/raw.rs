//! Untyped growable byte storage.
//!
//! [`RawBuffer`] owns one contiguous allocation and tracks how many bytes
//! are logically in use (`len`) versus allocated (`capacity`). It knows
//! nothing about the values stored in it: growing copies the live prefix
//! byte for byte and resizing never constructs or drops anything. Typed
//! layers ([`Array`](crate::Array)) are responsible for element lifetimes.
//!
//! # Invariants
//!
//! - `len <= capacity`
//! - `capacity == 0` iff no allocation is held
//! - the allocation is aligned to `align`

use core::ptr::{self, NonNull};
use std::alloc::{Layout, alloc, dealloc, handle_alloc_error};

use tracing::trace;

use crate::error::ReserveError;
use crate::growth::{Amortized, GrowthPolicy};

/// A growable byte buffer whose capacity is decided by a [`GrowthPolicy`].
///
/// # Example
///
/// ```
/// use nexus_stack::{Exact, RawBuffer};
///
/// let mut buf: RawBuffer<Exact> = RawBuffer::new();
/// buf.resize(16);
/// assert_eq!(buf.len(), 16);
/// assert_eq!(buf.capacity(), 16);
///
/// buf.resize(4);
/// assert_eq!(buf.capacity(), 4);
/// ```
pub struct RawBuffer<P: GrowthPolicy = Amortized> {
    ptr: NonNull<u8>,
    len: usize,
    capacity: usize,
    align: usize,
    policy: P,
}

impl<P: GrowthPolicy + Default> RawBuffer<P> {
    /// Creates an empty, byte-aligned buffer. Does not allocate.
    pub fn new() -> Self {
        Self::with_policy(P::default())
    }
}

impl<P: GrowthPolicy + Default> Default for RawBuffer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: GrowthPolicy> RawBuffer<P> {
    /// Creates an empty, byte-aligned buffer using `policy`.
    pub fn with_policy(policy: P) -> Self {
        Self::with_align(1, policy)
    }

    /// Creates an empty buffer whose allocations are aligned to `align`.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    pub fn with_align(align: usize, policy: P) -> Self {
        assert!(align.is_power_of_two(), "alignment must be a power of two");
        Self {
            ptr: dangling(align),
            len: 0,
            capacity: 0,
            align,
            policy,
        }
    }

    /// Returns the number of bytes in use.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bytes are in use.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of bytes allocated.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the alignment of the allocation.
    #[inline]
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Returns the growth policy.
    #[inline]
    pub const fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns a pointer to the start of the buffer.
    ///
    /// The pointer is dangling (but aligned) while `capacity() == 0`.
    #[inline]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// Ensures capacity for at least `requested` bytes.
    ///
    /// Does nothing when `requested <= capacity()`, unless the policy
    /// shrinks on resize, in which case the buffer is reallocated to the
    /// policy's capacity. A shrinking reallocation truncates `len`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows the maximum allocation size.
    /// Allocation failure is reported through [`handle_alloc_error`].
    pub fn reserve(&mut self, requested: usize) {
        match self.try_reserve(requested) {
            Ok(()) => {}
            Err(ReserveError::AllocFailed { layout }) => handle_alloc_error(layout),
            Err(ReserveError::CapacityOverflow) => capacity_overflow(),
        }
    }

    /// Fallible version of [`reserve`](Self::reserve).
    ///
    /// # Errors
    ///
    /// Returns [`ReserveError::CapacityOverflow`] if no valid layout exists
    /// for the new capacity and [`ReserveError::AllocFailed`] if the
    /// allocator fails. The buffer is unchanged on error.
    pub fn try_reserve(&mut self, requested: usize) -> Result<(), ReserveError> {
        if !P::SHRINK_ON_RESIZE && requested <= self.capacity {
            return Ok(());
        }

        let new_capacity = self
            .policy
            .new_capacity(requested, self.capacity)
            .max(requested);

        if new_capacity == self.capacity {
            return Ok(());
        }

        self.reallocate(new_capacity)
    }

    /// Sets the number of bytes in use, reserving first.
    ///
    /// Bytes exposed by growing are uninitialized. No value semantics are
    /// applied to bytes added or removed.
    pub fn resize(&mut self, new_len: usize) {
        self.reserve(new_len);
        self.len = new_len;
    }

    /// Fallible version of [`resize`](Self::resize).
    ///
    /// # Errors
    ///
    /// See [`try_reserve`](Self::try_reserve). `len` is unchanged on error.
    pub fn try_resize(&mut self, new_len: usize) -> Result<(), ReserveError> {
        self.try_reserve(new_len)?;
        self.len = new_len;
        Ok(())
    }

    /// Sets `len` without reserving or reallocating.
    ///
    /// # Safety
    ///
    /// `new_len` must not exceed `capacity()`.
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity);
        self.len = new_len;
    }

    /// Returns a pointer to byte `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn at(&self, index: usize) -> NonNull<u8> {
        assert!(
            index < self.len,
            "byte index {index} out of bounds for buffer of {} bytes",
            self.len
        );
        // Safety: index < len <= capacity, so the offset stays in the allocation
        unsafe { self.at_unchecked(index) }
    }

    /// Returns a pointer to byte `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline]
    pub unsafe fn at_unchecked(&self, index: usize) -> NonNull<u8> {
        debug_assert!(index < self.len);
        // Safety: caller guarantees index is in bounds
        unsafe { self.ptr.add(index) }
    }

    fn reallocate(&mut self, new_capacity: usize) -> Result<(), ReserveError> {
        let new_ptr = if new_capacity == 0 {
            dangling(self.align)
        } else {
            let layout = Layout::from_size_align(new_capacity, self.align)
                .map_err(|_| ReserveError::CapacityOverflow)?;
            // Safety: layout has non-zero size
            let raw = unsafe { alloc(layout) };
            let new_ptr = NonNull::new(raw).ok_or(ReserveError::AllocFailed { layout })?;

            let copy = self.len.min(new_capacity);
            if copy > 0 {
                // Safety: both regions hold at least `copy` bytes and are distinct allocations
                unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), copy) };
            }
            new_ptr
        };

        trace!(
            old_capacity = self.capacity,
            new_capacity,
            len = self.len,
            "reallocated raw buffer"
        );

        self.release();
        self.ptr = new_ptr;
        self.capacity = new_capacity;
        self.len = self.len.min(new_capacity);
        Ok(())
    }

    fn release(&mut self) {
        if self.capacity > 0 {
            // Safety: the allocation was made with exactly this layout
            unsafe {
                dealloc(
                    self.ptr.as_ptr(),
                    Layout::from_size_align_unchecked(self.capacity, self.align),
                );
            }
        }
    }
}

impl<P: GrowthPolicy> Drop for RawBuffer<P> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<P: GrowthPolicy> core::fmt::Debug for RawBuffer<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RawBuffer")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("align", &self.align)
            .finish()
    }
}

// Safety: RawBuffer exclusively owns its allocation
unsafe impl<P: GrowthPolicy + Send> Send for RawBuffer<P> {}
unsafe impl<P: GrowthPolicy + Sync> Sync for RawBuffer<P> {}

#[inline]
fn dangling(align: usize) -> NonNull<u8> {
    // Safety: align is a non-zero power of two
    unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(align)) }
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}
