//! Container-agnostic stack interface.
//!
//! [`Stack`] lets workloads and the profiler run over every container
//! configuration without knowing which one they hold.
//!
//! | Implementor | `NAME` |
//! |-------------|--------|
//! | `Array<T, Exact>` | `array-exact` |
//! | `Array<T, ExactGrow>` | `array-exact-grow` |
//! | `Array<T, Amortized>` | `array-amortized` |
//! | `SinglyList<T>` | `singly-list` |
//! | `SinglyTailList<T>` | `singly-tail-list` |
//! | `DoublyList<T>` | `doubly-list` |
//! | `DoublyTailList<T>` | `doubly-tail-list` |

use crate::array::{Array, ArrayCursor};
use crate::cursor::Cursor;
use crate::growth::{Amortized, Exact, ExactGrow};
use crate::list::{
    DoublyList, DoublyNode, DoublyTailList, ListCursor, SinglyList, SinglyNode, SinglyTailList,
};

/// A LIFO container with forward cursor traversal.
///
/// # Example
///
/// ```
/// use nexus_stack::{Array, Cursor, DoublyTailList, Exact, Stack};
///
/// fn fill<S: Stack<Item = u32>>(n: u32) -> Vec<u32> {
///     let mut stack = S::default();
///     for i in 0..n {
///         stack.push(i);
///     }
///     stack.pop();
///
///     let mut out = Vec::new();
///     let mut cursor = stack.cursor();
///     while cursor.has_value() {
///         out.push(*cursor.value());
///         cursor.advance();
///     }
///     out
/// }
///
/// assert_eq!(fill::<Array<u32, Exact>>(4), vec![0, 1, 2]);
/// assert_eq!(fill::<DoublyTailList<u32>>(4), vec![0, 1, 2]);
/// ```
pub trait Stack: Default {
    /// Element type.
    type Item;

    /// Cursor type returned by [`cursor`](Stack::cursor).
    type Cursor<'a>: Cursor<Item = Self::Item>
    where
        Self: 'a;

    /// Short identifier used in reports and on the command line.
    const NAME: &'static str;

    /// Pushes `value` on top.
    fn push(&mut self, value: Self::Item);

    /// Removes the top value. `None` if empty.
    fn pop(&mut self) -> Option<Self::Item>;

    /// Returns a cursor from bottom to top.
    fn cursor(&self) -> Self::Cursor<'_>;

    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if the stack is empty.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! impl_stack_for_array {
    ($($policy:ty => $name:literal),* $(,)?) => {
        $(
            impl<T> Stack for Array<T, $policy> {
                type Item = T;
                type Cursor<'a> = ArrayCursor<'a, T> where Self: 'a;

                const NAME: &'static str = $name;

                #[inline]
                fn push(&mut self, value: T) {
                    self.emplace_back(value);
                }

                #[inline]
                fn pop(&mut self) -> Option<T> {
                    self.pop_back()
                }

                #[inline]
                fn cursor(&self) -> Self::Cursor<'_> {
                    Array::cursor(self)
                }

                #[inline]
                fn len(&self) -> usize {
                    Array::len(self)
                }
            }
        )*
    };
}

impl_stack_for_array!(
    Exact => "array-exact",
    ExactGrow => "array-exact-grow",
    Amortized => "array-amortized",
);

macro_rules! impl_stack_for_list {
    ($($list:ident<$node:ident> => $name:literal),* $(,)?) => {
        $(
            impl<T> Stack for $list<T> {
                type Item = T;
                type Cursor<'a> = ListCursor<'a, $node<T>> where Self: 'a;

                const NAME: &'static str = $name;

                #[inline]
                fn push(&mut self, value: T) {
                    self.emplace_back(value);
                }

                #[inline]
                fn pop(&mut self) -> Option<T> {
                    self.pop_back()
                }

                #[inline]
                fn cursor(&self) -> Self::Cursor<'_> {
                    $list::cursor(self)
                }

                #[inline]
                fn len(&self) -> usize {
                    $list::len(self)
                }
            }
        )*
    };
}

impl_stack_for_list!(
    SinglyList<SinglyNode> => "singly-list",
    SinglyTailList<SinglyNode> => "singly-tail-list",
    DoublyList<DoublyNode> => "doubly-list",
    DoublyTailList<DoublyNode> => "doubly-tail-list",
);
