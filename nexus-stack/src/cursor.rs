//! Cursor protocol shared by every container.
//!
//! A cursor is a position plus three operations: [`has_value`], [`value`]
//! and [`advance`]. Workloads written against [`Cursor`] run unchanged over
//! arrays and all list variants.
//!
//! Cursors borrow their container, so the container cannot be mutated while
//! one is alive.
//!
//! [`has_value`]: Cursor::has_value
//! [`value`]: Cursor::value
//! [`advance`]: Cursor::advance

/// Read-only cursor over a container's elements, front to back.
///
/// # Example
///
/// ```
/// use nexus_stack::{Cursor, DoublyTailList};
///
/// let mut list = DoublyTailList::new();
/// list.emplace_back(1);
/// list.emplace_back(2);
///
/// let mut cursor = list.cursor();
/// let mut seen = Vec::new();
/// while cursor.has_value() {
///     seen.push(*cursor.value());
///     cursor.advance();
/// }
/// assert_eq!(seen, vec![1, 2]);
/// ```
pub trait Cursor {
    /// Element type.
    type Item;

    /// Returns `true` if the cursor refers to an element.
    fn has_value(&self) -> bool;

    /// Returns the current element, or `None` when exhausted.
    fn current(&self) -> Option<&Self::Item>;

    /// Moves to the next element. Does nothing when exhausted.
    fn advance(&mut self);

    /// Returns the current element.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is exhausted (`has_value()` is `false`).
    #[inline]
    fn value(&self) -> &Self::Item {
        match self.current() {
            Some(value) => value,
            None => exhausted(),
        }
    }
}

/// Cursor with write access to the current element.
pub trait CursorMut: Cursor {
    /// Returns the current element mutably, or `None` when exhausted.
    fn current_mut(&mut self) -> Option<&mut Self::Item>;

    /// Returns the current element mutably.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is exhausted.
    #[inline]
    fn value_mut(&mut self) -> &mut Self::Item {
        match self.current_mut() {
            Some(value) => value,
            None => exhausted(),
        }
    }
}

#[cold]
#[track_caller]
fn exhausted() -> ! {
    panic!("cursor is exhausted");
}
