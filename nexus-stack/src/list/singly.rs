//! Singly linked stacks.

use core::marker::PhantomData;
use core::ptr::NonNull;

use super::{Link, from_raw, into_raw, sealed};

/// Node of a singly linked list.
pub struct SinglyNode<T> {
    value: T,
    next: Option<NonNull<SinglyNode<T>>>,
}

impl<T> SinglyNode<T> {
    #[inline]
    fn new(value: T) -> Self {
        Self { value, next: None }
    }
}

impl<T> sealed::Sealed for SinglyNode<T> {}

impl<T> Link for SinglyNode<T> {
    type Item = T;

    #[inline]
    fn value(&self) -> &T {
        &self.value
    }

    #[inline]
    fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    #[inline]
    fn next(&self) -> Option<NonNull<Self>> {
        self.next
    }
}

/// Walks from `head` to the last node. Returns it with its predecessor.
///
/// # Safety
///
/// `head` must be the live head of a well-formed chain.
unsafe fn split_last<T>(
    head: NonNull<SinglyNode<T>>,
) -> (Option<NonNull<SinglyNode<T>>>, NonNull<SinglyNode<T>>) {
    let mut prev = None;
    let mut last = head;
    // Safety: every node reachable from head is alive
    while let Some(next) = unsafe { last.as_ref() }.next {
        prev = Some(last);
        last = next;
    }
    (prev, last)
}

/// Finds the node whose successor is `target`. `None` if `target` is `head`.
///
/// # Safety
///
/// `head` must be the live head of a well-formed chain containing `target`.
unsafe fn predecessor<T>(
    head: NonNull<SinglyNode<T>>,
    target: NonNull<SinglyNode<T>>,
) -> Option<NonNull<SinglyNode<T>>> {
    let mut node = head;
    loop {
        // Safety: every node reachable from head is alive
        let next = unsafe { node.as_ref() }.next?;
        if next == target {
            return Some(node);
        }
        node = next;
    }
}

/// Reclaims an unlinked node and returns its value.
///
/// # Safety
///
/// `node` must be owned by the caller and unreachable from any list.
#[inline]
unsafe fn take_value<T>(node: NonNull<SinglyNode<T>>) -> T {
    // Safety: forwarded to caller
    let node = *unsafe { from_raw(node) };
    node.value
}

// =============================================================================
// SinglyList
// =============================================================================

/// Singly linked stack without a cached tail.
///
/// Both ends of the stack are found by walking from the head, so
/// `emplace_back` and `pop_back` are O(n).
pub struct SinglyList<T> {
    head: Option<NonNull<SinglyNode<T>>>,
    len: usize,
    _marker: PhantomData<Box<SinglyNode<T>>>,
}

impl<T> SinglyList<T> {
    /// Creates an empty list.
    pub const fn new() -> Self {
        Self {
            head: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Appends `value` after the last node and returns a reference to it.
    pub fn emplace_back(&mut self, value: T) -> &mut T {
        let node = into_raw(SinglyNode::new(value));
        match self.head {
            None => self.head = Some(node),
            Some(head) => {
                // Safety: head belongs to self
                let (_, mut last) = unsafe { split_last(head) };
                // Safety: last is alive and exclusively borrowed through self
                unsafe { last.as_mut().next = Some(node) };
            }
        }
        self.len += 1;
        // Safety: node is linked into self, which is borrowed mutably
        unsafe { &mut (*node.as_ptr()).value }
    }

    /// Removes the last element and returns it, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        let head = self.head?;
        // Safety: head belongs to self
        let (prev, last) = unsafe { split_last(head) };
        match prev {
            // Safety: prev is alive; clearing its link releases ownership of last
            Some(mut prev) => unsafe { prev.as_mut().next = None },
            None => self.head = None,
        }
        self.len -= 1;
        // Safety: last is no longer reachable from self
        Some(unsafe { take_value(last) })
    }

    /// Returns the last element. Walks the whole chain.
    pub fn back(&self) -> Option<&T> {
        let head = self.head?;
        // Safety: head belongs to self
        let (_, last) = unsafe { split_last(head) };
        // Safety: last is alive for the borrow of self
        Some(unsafe { &(*last.as_ptr()).value })
    }
}

impl_list_common!(SinglyList, SinglyNode);

// =============================================================================
// SinglyTailList
// =============================================================================

/// Singly linked stack with a cached tail.
///
/// `emplace_back` is O(1). `pop_back` still walks from the head to find the
/// tail's predecessor.
pub struct SinglyTailList<T> {
    head: Option<NonNull<SinglyNode<T>>>,
    tail: Option<NonNull<SinglyNode<T>>>,
    len: usize,
    _marker: PhantomData<Box<SinglyNode<T>>>,
}

impl<T> SinglyTailList<T> {
    /// Creates an empty list.
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
            _marker: PhantomData,
        }
    }

    /// Appends `value` after the cached tail and returns a reference to it.
    pub fn emplace_back(&mut self, value: T) -> &mut T {
        let node = into_raw(SinglyNode::new(value));
        match self.tail {
            None => self.head = Some(node),
            // Safety: the tail is alive and owned by self
            Some(mut tail) => unsafe { tail.as_mut().next = Some(node) },
        }
        self.tail = Some(node);
        self.len += 1;
        // Safety: node is linked into self, which is borrowed mutably
        unsafe { &mut (*node.as_ptr()).value }
    }

    /// Removes the last element and returns it, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        let head = self.head?;
        // Safety: head and tail both belong to self
        match unsafe { predecessor(head, tail) } {
            Some(mut prev) => {
                // Safety: prev is alive; clearing its link releases ownership of tail
                unsafe { prev.as_mut().next = None };
                self.tail = Some(prev);
            }
            None => {
                self.head = None;
                self.tail = None;
            }
        }
        self.len -= 1;
        // Safety: tail is no longer reachable from self
        Some(unsafe { take_value(tail) })
    }

    /// Returns the last element.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        // Safety: the tail is alive for the borrow of self
        self.tail.map(|tail| unsafe { &(*tail.as_ptr()).value })
    }

    /// Returns the last element mutably.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        // Safety: the tail is alive and self is borrowed exclusively
        self.tail.map(|tail| unsafe { &mut (*tail.as_ptr()).value })
    }
}

impl_list_common!(SinglyTailList, SinglyNode);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{Cursor, CursorMut};
    use std::cell::Cell;
    use std::rc::Rc;

    struct DropCounter(Rc<Cell<usize>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn collect<C: Cursor<Item = i32>>(mut cursor: C) -> Vec<i32> {
        let mut out = Vec::new();
        while cursor.has_value() {
            out.push(*cursor.value());
            cursor.advance();
        }
        out
    }

    #[test]
    fn empty_list() {
        let mut list: SinglyList<i32> = SinglyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.pop_back(), None);
        assert_eq!(list.back(), None);
        assert!(!list.cursor().has_value());
    }

    #[test]
    fn interleaved_stack() {
        let mut list = SinglyList::new();
        list.emplace_back(5);
        list.emplace_back(3);
        list.emplace_back(1);
        assert_eq!(list.pop_back(), Some(1));
        list.emplace_back(2);
        assert_eq!(collect(list.cursor()), vec![5, 3, 2]);
        assert_eq!(list.back(), Some(&2));
        assert_eq!(list.front(), Some(&5));
    }

    #[test]
    fn tail_interleaved_stack() {
        let mut list = SinglyTailList::new();
        list.emplace_back(5);
        list.emplace_back(3);
        list.emplace_back(1);
        assert_eq!(list.pop_back(), Some(1));
        list.emplace_back(2);
        assert_eq!(collect(list.cursor()), vec![5, 3, 2]);
        assert_eq!(list.back(), Some(&2));
    }

    #[test]
    fn tail_follows_pops() {
        let mut list: SinglyTailList<i32> = (1..=4).collect();
        assert_eq!(list.pop_back(), Some(4));
        assert_eq!(list.back(), Some(&3));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.back(), Some(&2));

        list.emplace_back(9);
        assert_eq!(collect(list.cursor()), vec![1, 2, 9]);
    }

    #[test]
    fn single_element_pop_clears_tail() {
        let mut list = SinglyTailList::new();
        list.emplace_back(1);
        assert_eq!(list.pop_back(), Some(1));
        assert!(list.is_empty());
        assert_eq!(list.back(), None);
        assert_eq!(list.pop_back(), None);

        list.emplace_back(2);
        assert_eq!(list.front(), Some(&2));
        assert_eq!(list.back(), Some(&2));
    }

    #[test]
    fn round_trip() {
        for n in [0, 1, 1000] {
            let mut list = SinglyTailList::new();
            for i in 0..n {
                list.emplace_back(i);
            }
            assert_eq!(list.len(), n as usize);
            for i in (0..n).rev() {
                assert_eq!(list.pop_back(), Some(i));
            }
            assert!(list.is_empty());
            assert!(!list.cursor().has_value());
        }
    }

    #[test]
    fn emplace_back_returns_new_element() {
        let mut list = SinglyList::new();
        list.emplace_back(1);
        *list.emplace_back(2) += 40;
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 42]);
    }

    #[test]
    fn cursor_mut_writes() {
        let mut list: SinglyList<i32> = (1..=3).collect();
        let mut cursor = list.cursor_mut();
        while cursor.has_value() {
            *cursor.value_mut() *= -1;
            cursor.advance();
        }
        cursor.advance();
        assert!(!cursor.has_value());
        assert_eq!(collect(list.cursor()), vec![-1, -2, -3]);
    }

    #[test]
    fn iter_mut_and_len_hint() {
        let mut list: SinglyTailList<i32> = (0..5).collect();
        for value in list.iter_mut() {
            *value += 1;
        }
        let iter = list.iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.copied().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn drops_every_node_once() {
        let drops = Rc::new(Cell::new(0));
        let mut list = SinglyTailList::new();
        for _ in 0..10 {
            list.emplace_back(DropCounter(drops.clone()));
        }
        drop(list.pop_back());
        drop(list.pop_back());
        assert_eq!(drops.get(), 2);
        drop(list);
        assert_eq!(drops.get(), 10);
    }

    #[test]
    fn clear_resets_tail() {
        let mut list: SinglyTailList<i32> = (0..3).collect();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.back(), None);
        list.emplace_back(7);
        assert_eq!(collect(list.cursor()), vec![7]);
    }

    #[test]
    fn long_chain_drop_does_not_recurse() {
        let mut list = SinglyTailList::new();
        for i in 0..200_000 {
            list.emplace_back(i);
        }
        drop(list);
    }
}
