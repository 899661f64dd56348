//! Stack containers with pluggable growth policies.
//!
//! This crate provides a family of back-only containers (stacks) that share
//! a single cursor protocol, so the same workload can run over a contiguous
//! array or any of four linked-list layouts and be compared directly.
//!
//! # Layers
//!
//! ```text
//! GrowthPolicy        - (requested, current) -> new capacity
//!     │
//! RawBuffer<P>        - untyped bytes: len, capacity, alignment
//!     │
//! ChunkedStorage<P>   - the same bytes viewed as fixed-size chunks
//!     │
//! Array<T, P>         - one T per chunk
//! ```
//!
//! The linked lists sit beside this stack rather than on top of it: each
//! node is its own heap allocation.
//!
//! # Quick Start
//!
//! ```
//! use nexus_stack::{Array, Cursor, DoublyTailList, Exact};
//!
//! let mut array: Array<u64, Exact> = Array::new();
//! let mut list: DoublyTailList<u64> = DoublyTailList::new();
//!
//! for value in [5, 3, 1] {
//!     array.emplace_back(value);
//!     list.emplace_back(value);
//! }
//! assert_eq!(array.pop_back(), Some(1));
//! assert_eq!(list.pop_back(), Some(1));
//!
//! let (mut a, mut b) = (array.cursor(), list.cursor());
//! while a.has_value() {
//!     assert_eq!(a.value(), b.value());
//!     a.advance();
//!     b.advance();
//! }
//! assert!(!b.has_value());
//! ```
//!
//! # Growth Policies
//!
//! | Policy | New capacity | Shrinks |
//! |--------|--------------|---------|
//! | [`Amortized`] | `max(requested, ceil(1.5 * current))` | no |
//! | [`Exact`] | `requested` | yes |
//! | [`ExactGrow`] | `requested` | no |
//! | [`FnPolicy`] | user closure | configurable |
//!
//! # Containers
//!
//! | Container | `emplace_back` | `pop_back` | Random access |
//! |-----------|----------------|------------|---------------|
//! | [`Array`] | amortized O(1) with [`Amortized`] | O(1), O(n) with [`Exact`] | O(1) |
//! | [`SinglyList`] | O(n) | O(n) | - |
//! | [`SinglyTailList`] | O(1) | O(n) | - |
//! | [`DoublyList`] | O(n) | O(n) | - |
//! | [`DoublyTailList`] | O(1) | O(1) | - |
//!
//! Every container implements [`Stack`], which is what [`workload`] and
//! [`profile`] are written against.
//!
//! # Logging
//!
//! The library emits [`tracing`] events and never installs a subscriber:
//! `trace` on buffer reallocation, `debug` for worker pool lifecycle and
//! validated workloads, `info` for profile results.

#![warn(missing_docs)]

pub mod array;
pub mod chunked;
pub mod cursor;
pub mod error;
pub mod growth;
pub mod list;
pub mod pool;
pub mod profile;
pub mod raw;
pub mod stack;
pub mod workload;

pub use array::{Array, ArrayCursor, ArrayCursorMut};
pub use chunked::ChunkedStorage;
pub use cursor::{Cursor, CursorMut};
pub use error::{PoolError, ProfileError, ReserveError, WorkloadError};
pub use growth::{Amortized, Exact, ExactGrow, FnPolicy, GrowthPolicy};
pub use list::{
    DoublyCursor, DoublyList, DoublyTailList, ListCursor, ListCursorMut, SinglyCursor, SinglyList,
    SinglyTailList,
};
pub use raw::RawBuffer;
pub use stack::Stack;
