//! Fixed-stride view over [`RawBuffer`].
//!
//! A chunk is the storage for one element. [`ChunkedStorage`] expresses
//! every size as a chunk count and translates to bytes on the way down:
//! `to_bytes(n) = n * chunk_size`, `to_chunks(n) = n / chunk_size`.
//!
//! The growth policy is applied in chunk units, so the capacity it picks is
//! always a whole number of chunks.

use core::ptr::NonNull;

use crate::error::ReserveError;
use crate::growth::{Amortized, GrowthPolicy};
use crate::raw::RawBuffer;

/// Runs a chunk-unit policy against byte-unit requests.
#[derive(Debug, Clone, Copy)]
pub struct PerChunk<P> {
    inner: P,
    chunk_size: usize,
}

impl<P: GrowthPolicy> GrowthPolicy for PerChunk<P> {
    const SHRINK_ON_RESIZE: bool = P::SHRINK_ON_RESIZE;

    #[inline]
    fn new_capacity(&self, requested: usize, current: usize) -> usize {
        self.inner
            .new_capacity(requested / self.chunk_size, current / self.chunk_size)
            .saturating_mul(self.chunk_size)
    }
}

/// Chunk-indexed storage over a growable byte buffer.
///
/// # Example
///
/// ```
/// use nexus_stack::{ChunkedStorage, Exact};
///
/// let mut chunks: ChunkedStorage<Exact> = ChunkedStorage::new(8, 8);
/// chunks.resize(3);
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(chunks.byte_len(), 24);
/// assert_eq!(chunks.at(2).as_ptr() as usize - chunks.at(0).as_ptr() as usize, 16);
/// ```
#[derive(Debug)]
pub struct ChunkedStorage<P: GrowthPolicy = Amortized> {
    bytes: RawBuffer<PerChunk<P>>,
    chunk_size: usize,
}

impl<P: GrowthPolicy + Default> ChunkedStorage<P> {
    /// Creates empty storage of `chunk_size`-byte chunks aligned to `align`.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero or `align` is not a power of two.
    pub fn new(chunk_size: usize, align: usize) -> Self {
        Self::with_policy(chunk_size, align, P::default())
    }
}

impl<P: GrowthPolicy> ChunkedStorage<P> {
    /// Creates empty storage using `policy`, measured in chunks.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero or `align` is not a power of two.
    pub fn with_policy(chunk_size: usize, align: usize, policy: P) -> Self {
        assert!(chunk_size > 0, "chunk size must be > 0");
        Self {
            bytes: RawBuffer::with_align(
                align,
                PerChunk {
                    inner: policy,
                    chunk_size,
                },
            ),
            chunk_size,
        }
    }

    /// Returns the size of one chunk in bytes.
    #[inline]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the number of chunks in use.
    #[inline]
    pub const fn len(&self) -> usize {
        self.to_chunks(self.bytes.len())
    }

    /// Returns `true` if no chunks are in use.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the number of whole chunks allocated.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.to_chunks(self.bytes.capacity())
    }

    /// Returns the number of bytes in use.
    #[inline]
    pub const fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the growth policy.
    #[inline]
    pub const fn policy(&self) -> &P {
        &self.bytes.policy().inner
    }

    /// Returns a pointer to the first chunk.
    #[inline]
    pub const fn as_ptr(&self) -> *mut u8 {
        self.bytes.as_ptr()
    }

    /// Sets the number of chunks in use. See [`RawBuffer::resize`].
    ///
    /// # Panics
    ///
    /// Panics if the byte size overflows `usize`.
    #[inline]
    pub fn resize(&mut self, chunks: usize) {
        self.bytes.resize(self.to_bytes(chunks));
    }

    /// Fallible version of [`resize`](Self::resize).
    ///
    /// # Errors
    ///
    /// Returns [`ReserveError::CapacityOverflow`] if the byte size overflows
    /// and forwards allocator failures.
    pub fn try_resize(&mut self, chunks: usize) -> Result<(), ReserveError> {
        let bytes = self
            .chunk_size
            .checked_mul(chunks)
            .ok_or(ReserveError::CapacityOverflow)?;
        self.bytes.try_resize(bytes)
    }

    /// Sets the number of chunks in use without touching the allocation.
    ///
    /// # Safety
    ///
    /// `chunks` must not exceed `capacity()`.
    #[inline]
    pub unsafe fn set_len(&mut self, chunks: usize) {
        // Safety: chunks <= capacity in chunks, so the byte size fits the allocation
        unsafe { self.bytes.set_len(chunks * self.chunk_size) };
    }

    /// Ensures capacity for at least `chunks` chunks.
    ///
    /// # Panics
    ///
    /// Panics if the byte size overflows `usize`.
    #[inline]
    pub fn reserve(&mut self, chunks: usize) {
        self.bytes.reserve(self.to_bytes(chunks));
    }

    /// Returns a pointer to chunk `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn at(&self, index: usize) -> NonNull<u8> {
        assert!(
            index < self.len(),
            "chunk index {index} out of bounds for storage of {} chunks",
            self.len()
        );
        // Safety: index < len, so the chunk start is < byte_len
        unsafe { self.bytes.at_unchecked(index * self.chunk_size) }
    }

    /// Returns a pointer to chunk `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline]
    pub unsafe fn at_unchecked(&self, index: usize) -> NonNull<u8> {
        // Safety: forwarded to caller
        unsafe { self.bytes.at_unchecked(index * self.chunk_size) }
    }

    #[inline]
    fn to_bytes(&self, chunks: usize) -> usize {
        match self.chunk_size.checked_mul(chunks) {
            Some(bytes) => bytes,
            None => panic!("capacity overflow"),
        }
    }

    #[inline]
    const fn to_chunks(&self, bytes: usize) -> usize {
        bytes / self.chunk_size
    }
}
