//! Singly and doubly linked stacks.
//!
//! Four configurations, each its own type:
//!
//! | Type | Links | Tail | `emplace_back` | `pop_back` |
//! |------|-------|------|----------------|------------|
//! | [`SinglyList`] | next | scanned | O(n) | O(n) |
//! | [`SinglyTailList`] | next | cached | O(1) | O(n) |
//! | [`DoublyList`] | next + prev | scanned | O(n) | O(n) |
//! | [`DoublyTailList`] | next + prev | cached | O(1) | O(1) |
//!
//! Nodes are boxed and owned through the `next` chain: the head owns the
//! second node, which owns the third, and so on. `prev` links and cached
//! tails are non-owning and never used to free a node.
//!
//! Cursors and iterators walk forward through `next` only, in every
//! configuration.
//!
//! # Example
//!
//! ```
//! use nexus_stack::{Cursor, SinglyTailList};
//!
//! let mut list = SinglyTailList::new();
//! list.emplace_back("a");
//! list.emplace_back("b");
//! list.emplace_back("c");
//! assert_eq!(list.pop_back(), Some("c"));
//!
//! let mut cursor = list.cursor();
//! assert_eq!(*cursor.value(), "a");
//! cursor.advance();
//! assert_eq!(*cursor.value(), "b");
//! cursor.advance();
//! assert!(!cursor.has_value());
//! ```

/// Methods and trait impls shared by every list configuration.
///
/// The list type must have `head: Option<NonNull<$node<T>>>` and
/// `len: usize` fields, plus inherent `new`, `emplace_back` and `pop_back`.
macro_rules! impl_list_common {
    ($list:ident, $node:ident) => {
        impl<T> $list<T> {
            /// Returns the number of elements.
            #[inline]
            pub const fn len(&self) -> usize {
                self.len
            }

            /// Returns `true` if the list is empty.
            #[inline]
            pub const fn is_empty(&self) -> bool {
                self.head.is_none()
            }

            /// Returns the first element.
            #[inline]
            pub fn front(&self) -> Option<&T> {
                // Safety: head is owned by self
                self.head.map(|node| unsafe { &(*node.as_ptr()).value })
            }

            /// Returns the first element mutably.
            #[inline]
            pub fn front_mut(&mut self) -> Option<&mut T> {
                // Safety: head is owned by self, borrowed exclusively
                self.head.map(|node| unsafe { &mut (*node.as_ptr()).value })
            }

            /// Returns a cursor positioned at the head.
            #[inline]
            pub fn cursor(&self) -> $crate::list::ListCursor<'_, $node<T>> {
                $crate::list::ListCursor::new(self.head)
            }

            /// Returns a mutable cursor positioned at the head.
            #[inline]
            pub fn cursor_mut(&mut self) -> $crate::list::ListCursorMut<'_, $node<T>> {
                $crate::list::ListCursorMut::new(self.head)
            }

            /// Returns an iterator over the elements, front to back.
            #[inline]
            pub fn iter(&self) -> $crate::list::Iter<'_, $node<T>> {
                $crate::list::Iter::new(self.head, self.len)
            }

            /// Returns a mutable iterator over the elements, front to back.
            #[inline]
            pub fn iter_mut(&mut self) -> $crate::list::IterMut<'_, $node<T>> {
                $crate::list::IterMut::new(self.head, self.len)
            }

            /// Drops every element.
            pub fn clear(&mut self) {
                drop(core::mem::take(self));
            }
        }

        impl<T> Default for $list<T> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T> Drop for $list<T> {
            fn drop(&mut self) {
                // Safety: head owns the chain and self is never used again
                unsafe { $crate::list::free_chain(self.head.take()) };
            }
        }

        impl<T: core::fmt::Debug> core::fmt::Debug for $list<T> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_list().entries(self.iter()).finish()
            }
        }

        impl<T> Extend<T> for $list<T> {
            fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
                for value in iter {
                    self.emplace_back(value);
                }
            }
        }

        impl<T> FromIterator<T> for $list<T> {
            fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
                let mut list = Self::new();
                list.extend(iter);
                list
            }
        }

        impl<'a, T> IntoIterator for &'a $list<T> {
            type Item = &'a T;
            type IntoIter = $crate::list::Iter<'a, $node<T>>;

            fn into_iter(self) -> Self::IntoIter {
                self.iter()
            }
        }

        // Safety: every node is owned by the list; raw links never escape it
        unsafe impl<T: Send> Send for $list<T> {}
        unsafe impl<T: Sync> Sync for $list<T> {}
    };
}

mod doubly;
mod singly;

use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

use crate::cursor::{Cursor, CursorMut};

pub use doubly::{DoublyList, DoublyNode, DoublyTailList};
pub use singly::{SinglyList, SinglyNode, SinglyTailList};

mod sealed {
    pub trait Sealed {}
}

/// A node reachable by following `next` links.
///
/// Implemented by [`SinglyNode`] and [`DoublyNode`] only.
pub trait Link: sealed::Sealed + Sized {
    /// Element type stored in the node.
    type Item;

    /// Returns the stored element.
    fn value(&self) -> &Self::Item;

    /// Returns the stored element mutably.
    fn value_mut(&mut self) -> &mut Self::Item;

    /// Returns the successor, if any.
    fn next(&self) -> Option<NonNull<Self>>;
}

/// Moves `node` to the heap and returns an owning pointer to it.
#[inline]
fn into_raw<N>(node: N) -> NonNull<N> {
    NonNull::from(Box::leak(Box::new(node)))
}

/// Reclaims a node allocated by [`into_raw`].
///
/// # Safety
///
/// `node` must come from [`into_raw`], be unlinked, and not be freed twice.
#[inline]
unsafe fn from_raw<N>(node: NonNull<N>) -> Box<N> {
    // Safety: forwarded to caller
    unsafe { Box::from_raw(node.as_ptr()) }
}

/// Frees every node reachable from `head`, front to back.
///
/// # Safety
///
/// `head` must own its chain, and no node may be accessed afterwards.
unsafe fn free_chain<N: Link>(mut head: Option<NonNull<N>>) {
    while let Some(node) = head {
        // Safety: each node is owned by its predecessor and visited once
        let node = unsafe { from_raw(node) };
        head = node.next();
    }
}

// =============================================================================
// Cursors
// =============================================================================

/// Read-only cursor over a linked list.
pub struct ListCursor<'a, N: Link> {
    current: Option<NonNull<N>>,
    _marker: PhantomData<&'a N>,
}

impl<N: Link> ListCursor<'_, N> {
    #[inline]
    fn new(head: Option<NonNull<N>>) -> Self {
        Self {
            current: head,
            _marker: PhantomData,
        }
    }
}

impl<N: Link> Clone for ListCursor<'_, N> {
    fn clone(&self) -> Self {
        Self::new(self.current)
    }
}

impl<N: Link> Cursor for ListCursor<'_, N> {
    type Item = N::Item;

    #[inline]
    fn has_value(&self) -> bool {
        self.current.is_some()
    }

    #[inline]
    fn current(&self) -> Option<&N::Item> {
        // Safety: the list is borrowed for 'a, so the node is alive
        self.current.map(|node| unsafe { node.as_ref() }.value())
    }

    #[inline]
    fn advance(&mut self) {
        if let Some(node) = self.current {
            // Safety: as in current
            self.current = unsafe { node.as_ref() }.next();
        }
    }
}

impl<N: Link> fmt::Debug for ListCursor<'_, N>
where
    N::Item: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListCursor")
            .field("current", &self.current())
            .finish()
    }
}

/// Mutable cursor over a linked list.
pub struct ListCursorMut<'a, N: Link> {
    current: Option<NonNull<N>>,
    _marker: PhantomData<&'a mut N>,
}

impl<N: Link> ListCursorMut<'_, N> {
    #[inline]
    fn new(head: Option<NonNull<N>>) -> Self {
        Self {
            current: head,
            _marker: PhantomData,
        }
    }
}

impl<N: Link> Cursor for ListCursorMut<'_, N> {
    type Item = N::Item;

    #[inline]
    fn has_value(&self) -> bool {
        self.current.is_some()
    }

    #[inline]
    fn current(&self) -> Option<&N::Item> {
        // Safety: the list is exclusively borrowed for 'a
        self.current.map(|node| unsafe { node.as_ref() }.value())
    }

    #[inline]
    fn advance(&mut self) {
        if let Some(node) = self.current {
            // Safety: as in current
            self.current = unsafe { node.as_ref() }.next();
        }
    }
}

impl<N: Link> CursorMut for ListCursorMut<'_, N> {
    #[inline]
    fn current_mut(&mut self) -> Option<&mut N::Item> {
        // Safety: exclusive borrow of the list; the returned reference is
        // tied to &mut self so it cannot outlive the next advance
        self.current.map(|mut node| unsafe { node.as_mut() }.value_mut())
    }
}

// Safety: cursors behave like &'a List / &'a mut List
unsafe impl<N: Link> Send for ListCursor<'_, N> where N::Item: Sync {}
unsafe impl<N: Link> Sync for ListCursor<'_, N> where N::Item: Sync {}
unsafe impl<N: Link> Send for ListCursorMut<'_, N> where N::Item: Send {}
unsafe impl<N: Link> Sync for ListCursorMut<'_, N> where N::Item: Sync {}

// =============================================================================
// Iterators
// =============================================================================

/// Iterator over references to list elements, front to back.
pub struct Iter<'a, N: Link> {
    next: Option<NonNull<N>>,
    remaining: usize,
    _marker: PhantomData<&'a N>,
}

impl<N: Link> Iter<'_, N> {
    #[inline]
    fn new(head: Option<NonNull<N>>, len: usize) -> Self {
        Self {
            next: head,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, N: Link + 'a> Iterator for Iter<'a, N> {
    type Item = &'a N::Item;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        // Safety: the list is borrowed for 'a
        let node = unsafe { node.as_ref() };
        self.next = node.next();
        self.remaining -= 1;
        Some(node.value())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, N: Link + 'a> ExactSizeIterator for Iter<'a, N> {}
impl<'a, N: Link + 'a> FusedIterator for Iter<'a, N> {}

/// Iterator over mutable references to list elements, front to back.
pub struct IterMut<'a, N: Link> {
    next: Option<NonNull<N>>,
    remaining: usize,
    _marker: PhantomData<&'a mut N>,
}

impl<N: Link> IterMut<'_, N> {
    #[inline]
    fn new(head: Option<NonNull<N>>, len: usize) -> Self {
        Self {
            next: head,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, N: Link + 'a> Iterator for IterMut<'a, N> {
    type Item = &'a mut N::Item;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let mut node = self.next?;
        // Safety: exclusive borrow for 'a; every node is yielded once
        let node = unsafe { node.as_mut() };
        self.next = node.next();
        self.remaining -= 1;
        Some(node.value_mut())
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, N: Link + 'a> ExactSizeIterator for IterMut<'a, N> {}
impl<'a, N: Link + 'a> FusedIterator for IterMut<'a, N> {}

// Safety: iterators behave like slice iterators
unsafe impl<N: Link> Send for Iter<'_, N> where N::Item: Sync {}
unsafe impl<N: Link> Sync for Iter<'_, N> where N::Item: Sync {}
unsafe impl<N: Link> Send for IterMut<'_, N> where N::Item: Send {}
unsafe impl<N: Link> Sync for IterMut<'_, N> where N::Item: Sync {}

/// Read-only cursor over a [`SinglyList`] or [`SinglyTailList`].
pub type SinglyCursor<'a, T> = ListCursor<'a, SinglyNode<T>>;
/// Read-only cursor over a [`DoublyList`] or [`DoublyTailList`].
pub type DoublyCursor<'a, T> = ListCursor<'a, DoublyNode<T>>;
