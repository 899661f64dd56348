//! Doubly linked stacks.

use core::marker::PhantomData;
use core::ptr::NonNull;

use super::{Link, from_raw, into_raw, sealed};

/// Node of a doubly linked list.
///
/// `next` owns the successor; `prev` is a non-owning back-link.
pub struct DoublyNode<T> {
    value: T,
    next: Option<NonNull<DoublyNode<T>>>,
    prev: Option<NonNull<DoublyNode<T>>>,
}

impl<T> DoublyNode<T> {
    #[inline]
    fn new(value: T, prev: Option<NonNull<Self>>) -> Self {
        Self {
            value,
            next: None,
            prev,
        }
    }
}

impl<T> sealed::Sealed for DoublyNode<T> {}

impl<T> Link for DoublyNode<T> {
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

/// Walks from `head` to the last node.
///
/// # Safety
///
/// `head` must be the live head of a well-formed chain.
unsafe fn last<T>(head: NonNull<DoublyNode<T>>) -> NonNull<DoublyNode<T>> {
    let mut node = head;
    // Safety: every node reachable from head is alive
    while let Some(next) = unsafe { node.as_ref() }.next {
        node = next;
    }
    node
}

/// Links a new node holding `value` after `last` (or as the head).
///
/// Returns the new node.
#[inline]
fn append<T>(
    head: &mut Option<NonNull<DoublyNode<T>>>,
    last: Option<NonNull<DoublyNode<T>>>,
    value: T,
) -> NonNull<DoublyNode<T>> {
    let node = into_raw(DoublyNode::new(value, last));
    match last {
        // Safety: last is alive and owned by the same list as head
        Some(mut last) => unsafe { last.as_mut().next = Some(node) },
        None => *head = Some(node),
    }
    node
}

/// Unlinks `last` from its predecessor (or clears `head`) and returns the
/// predecessor together with the value.
///
/// # Safety
///
/// `last` must be the final node of the chain rooted at `head`.
#[inline]
unsafe fn detach_last<T>(
    head: &mut Option<NonNull<DoublyNode<T>>>,
    last: NonNull<DoublyNode<T>>,
) -> (Option<NonNull<DoublyNode<T>>>, T) {
    // Safety: last is alive until freed below
    let prev = unsafe { last.as_ref() }.prev;
    match prev {
        // Safety: prev is alive; clearing its link releases ownership of last
        Some(mut prev) => unsafe { prev.as_mut().next = None },
        None => *head = None,
    }
    // Safety: last is now unreachable from the list
    let node = *unsafe { from_raw(last) };
    (prev, node.value)
}

// =============================================================================
// DoublyList
// =============================================================================

/// Doubly linked stack without a cached tail.
///
/// The tail is found by walking `next` from the head; once found, its `prev`
/// link yields the new last node, so `pop_back` walks the chain only once.
pub struct DoublyList<T> {
    head: Option<NonNull<DoublyNode<T>>>,
    len: usize,
    _marker: PhantomData<Box<DoublyNode<T>>>,
}

impl<T> DoublyList<T> {
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
        // Safety: head belongs to self
        let tail = self.head.map(|head| unsafe { last(head) });
        let node = append(&mut self.head, tail, value);
        self.len += 1;
        // Safety: node is linked into self, which is borrowed mutably
        unsafe { &mut (*node.as_ptr()).value }
    }

    /// Removes the last element and returns it, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        let head = self.head?;
        // Safety: head belongs to self, and last() returns its final node
        let (_, value) = unsafe { detach_last(&mut self.head, last(head)) };
        self.len -= 1;
        Some(value)
    }

    /// Returns the last element. Walks the whole chain.
    pub fn back(&self) -> Option<&T> {
        // Safety: head belongs to self; nodes live for the borrow of self
        self.head.map(|head| unsafe { &(*last(head).as_ptr()).value })
    }
}

impl_list_common!(DoublyList, DoublyNode);

// =============================================================================
// DoublyTailList
// =============================================================================

/// Doubly linked stack with a cached tail.
///
/// Both `emplace_back` and `pop_back` are O(1).
///
/// # Example
///
/// ```
/// use nexus_stack::DoublyTailList;
///
/// let mut list: DoublyTailList<u32> = (1..=4).collect();
/// list.pop_back();
/// list.pop_back();
/// assert_eq!(list.back(), Some(&2));
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
/// ```
pub struct DoublyTailList<T> {
    head: Option<NonNull<DoublyNode<T>>>,
    tail: Option<NonNull<DoublyNode<T>>>,
    len: usize,
    _marker: PhantomData<Box<DoublyNode<T>>>,
}

impl<T> DoublyTailList<T> {
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
        let node = append(&mut self.head, self.tail, value);
        self.tail = Some(node);
        self.len += 1;
        // Safety: node is linked into self, which is borrowed mutably
        unsafe { &mut (*node.as_ptr()).value }
    }

    /// Removes the last element and returns it, or `None` if empty.
    ///
    /// The cached tail moves to its predecessor.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        // Safety: the cached tail is the final node of self's chain
        let (prev, value) = unsafe { detach_last(&mut self.head, tail) };
        self.tail = prev;
        self.len -= 1;
        Some(value)
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

impl_list_common!(DoublyTailList, DoublyNode);
