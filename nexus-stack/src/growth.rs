//! Growth policies deciding how much a buffer allocates.
//!
//! A policy maps `(requested, current)` capacities to the capacity that
//! should actually be allocated. Buffers store the policy by value, so a
//! policy can carry state (see [`FnPolicy`]) while the common ones are
//! zero-sized.
//!
//! | Policy | New capacity | Shrinks on resize |
//! |--------|--------------|-------------------|
//! | [`Amortized`] | `max(requested, ceil(current * 1.5))` | no |
//! | [`Exact`] | `requested` | yes |
//! | [`ExactGrow`] | `requested` | no |
//! | [`FnPolicy`] | closure result | configurable |

/// Strategy for computing a buffer's new capacity.
///
/// # Contract
///
/// `new_capacity(requested, current)` must return a value `>= requested`.
/// Buffers clamp the result to `requested` if a policy breaks this, so a
/// misbehaving policy costs extra reallocations but never memory safety.
pub trait GrowthPolicy {
    /// When `true`, every reserve reallocates to the policy's capacity,
    /// including when the request is smaller than the current capacity.
    const SHRINK_ON_RESIZE: bool = false;

    /// Returns the capacity to allocate for a request of `requested` units
    /// when `current` units are allocated.
    fn new_capacity(&self, requested: usize, current: usize) -> usize;
}

/// Over-allocates by half of the current capacity, rounded up.
///
/// Repeated appends cost amortized O(1). Capacity never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Amortized;

impl GrowthPolicy for Amortized {
    #[inline]
    fn new_capacity(&self, requested: usize, current: usize) -> usize {
        requested.max(current.saturating_add(current.div_ceil(2)))
    }
}

/// Capacity always equals the requested size.
///
/// Every resize reallocates, including shrinking ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exact;

impl GrowthPolicy for Exact {
    const SHRINK_ON_RESIZE: bool = true;

    #[inline]
    fn new_capacity(&self, requested: usize, _current: usize) -> usize {
        requested
    }
}

/// Grows to exactly the requested size but never shrinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactGrow;

impl GrowthPolicy for ExactGrow {
    #[inline]
    fn new_capacity(&self, requested: usize, _current: usize) -> usize {
        requested
    }
}

/// Adapts a closure `(requested, current) -> capacity` into a policy.
///
/// The `SHRINK` parameter selects shrink-on-resize behavior; build with
/// [`FnPolicy::new`] or [`FnPolicy::shrinking`].
///
/// # Example
///
/// ```
/// use nexus_stack::{Array, FnPolicy};
///
/// let doubling = FnPolicy::new(|requested: usize, current: usize| requested.max(current * 2));
/// let mut array: Array<u32, _> = Array::with_policy(doubling);
/// array.emplace_back(1);
/// array.emplace_back(2);
/// array.emplace_back(3);
/// assert_eq!(array.capacity(), 4);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FnPolicy<F, const SHRINK: bool = false>(F);

impl<F> FnPolicy<F, false>
where
    F: Fn(usize, usize) -> usize,
{
    /// Wraps `f` as a growth policy that never shrinks.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> FnPolicy<F, true>
where
    F: Fn(usize, usize) -> usize,
{
    /// Wraps `f` as a growth policy that reallocates on every resize.
    pub const fn shrinking(f: F) -> Self {
        Self(f)
    }
}

impl<F, const SHRINK: bool> GrowthPolicy for FnPolicy<F, SHRINK>
where
    F: Fn(usize, usize) -> usize,
{
    const SHRINK_ON_RESIZE: bool = SHRINK;

    #[inline]
    fn new_capacity(&self, requested: usize, current: usize) -> usize {
        (self.0)(requested, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amortized_grows_by_half() {
        assert_eq!(Amortized.new_capacity(1, 0), 1);
        assert_eq!(Amortized.new_capacity(2, 1), 2);
        assert_eq!(Amortized.new_capacity(11, 10), 15);
        assert_eq!(Amortized.new_capacity(100, 10), 100);
    }

    #[test]
    fn amortized_growth_rounds_up() {
        assert_eq!(Amortized.new_capacity(4, 3), 5);
        assert_eq!(Amortized.new_capacity(10, 9), 14);
        for current in 1..1000 {
            let grown = Amortized.new_capacity(current + 1, current);
            assert!(grown * 2 >= current * 3, "{current} -> {grown}");
        }
    }

    #[test]
    fn amortized_saturates() {
        assert_eq!(Amortized.new_capacity(usize::MAX, usize::MAX - 1), usize::MAX);
    }

    #[test]
    fn exact_returns_request() {
        assert_eq!(Exact.new_capacity(7, 100), 7);
        assert_eq!(ExactGrow.new_capacity(7, 3), 7);
        const { assert!(Exact::SHRINK_ON_RESIZE) };
        const { assert!(!ExactGrow::SHRINK_ON_RESIZE) };
        const { assert!(!Amortized::SHRINK_ON_RESIZE) };
    }

    #[test]
    fn fn_policy_forwards() {
        let policy = FnPolicy::shrinking(|r: usize, c: usize| r + c);
        assert_eq!(policy.new_capacity(3, 4), 7);
        assert!(<FnPolicy<fn(usize, usize) -> usize, true> as GrowthPolicy>::SHRINK_ON_RESIZE);
    }

    #[test]
    fn policies_never_undershoot() {
        for current in 0..64 {
            for requested in current + 1..current + 64 {
                assert!(Amortized.new_capacity(requested, current) >= requested);
                assert!(Exact.new_capacity(requested, current) >= requested);
                assert!(ExactGrow.new_capacity(requested, current) >= requested);
            }
        }
    }
}
