//! Tuning policy consulted by the merge driver between runs.

/// Gallop threshold used by [`DefaultParams`].
pub const DEFAULT_GALLOP: usize = 7;

/// Inputs shorter than this form a single run under the default `min_run`.
const MIN_MERGE: usize = 64;

/// Decision for the three topmost runs `X`, `Y`, `Z` of the merge stack, `Z` being the most
/// recently pushed one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WhatMerge {
    /// The stack is locally balanced, go build the next run.
    NoMerge,
    /// Merge `X` and `Y`, leaving `Z` on top.
    MergeXY,
    /// Merge `Y` and `Z`.
    MergeYZ,
}

/// Pluggable merge policy.
///
/// Every method has a default that encodes the classical TimSort heuristic, so a custom policy
/// only overrides what it wants to change. The policy is stateless from the sort's point of view
/// and is consulted once per pushed run, never per element.
///
/// A policy that keeps asking for merges only costs extra work, the output is still sorted.
pub trait TimSortParams {
    /// Minimum run length for an input of `len` elements. Shorter natural runs are extended with
    /// insertion sort. A value of 0 is treated as 1.
    fn min_run(&self, len: usize) -> usize {
        default_min_run(len)
    }

    /// Called when exactly two runs are on the stack.
    fn need_merge(&self, len_x: usize, len_y: usize) -> bool {
        len_x <= len_y
    }

    /// Called when three or more runs are on the stack, with the lengths of the top three.
    fn what_merge(&self, len_x: usize, len_y: usize, len_z: usize) -> WhatMerge {
        if len_y > len_z && len_x > len_y + len_z {
            WhatMerge::NoMerge
        } else if len_x < len_z {
            WhatMerge::MergeXY
        } else {
            WhatMerge::MergeYZ
        }
    }

    /// Number of consecutive wins of one merge side after which the merge switches to
    /// galloping. Any value, including 0 and `usize::MAX`, yields the same sorted result.
    fn gallop(&self) -> usize {
        DEFAULT_GALLOP
    }

    /// Wraps this policy, replacing only its gallop threshold.
    fn with_gallop(self, gallop: usize) -> WithGallop<Self>
    where
        Self: Sized,
    {
        WithGallop {
            inner: self,
            gallop,
        }
    }
}

/// The classical adaptive heuristic.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultParams;

impl TimSortParams for DefaultParams {}

/// See [`TimSortParams::with_gallop`].
#[derive(Copy, Clone, Debug)]
pub struct WithGallop<P> {
    inner: P,
    gallop: usize,
}

impl<P: TimSortParams> TimSortParams for WithGallop<P> {
    fn min_run(&self, len: usize) -> usize {
        self.inner.min_run(len)
    }

    fn need_merge(&self, len_x: usize, len_y: usize) -> bool {
        self.inner.need_merge(len_x, len_y)
    }

    fn what_merge(&self, len_x: usize, len_y: usize, len_z: usize) -> WhatMerge {
        self.inner.what_merge(len_x, len_y, len_z)
    }

    fn gallop(&self) -> usize {
        self.gallop
    }
}

impl<P: TimSortParams + ?Sized> TimSortParams for &P {
    fn min_run(&self, len: usize) -> usize {
        (**self).min_run(len)
    }

    fn need_merge(&self, len_x: usize, len_y: usize) -> bool {
        (**self).need_merge(len_x, len_y)
    }

    fn what_merge(&self, len_x: usize, len_y: usize, len_z: usize) -> WhatMerge {
        (**self).what_merge(len_x, len_y, len_z)
    }

    fn gallop(&self) -> usize {
        (**self).gallop()
    }
}

/// Halves `len` until it drops below 64, adding one if any shifted out bit was set. The result
/// lies in `[32, 64]` for `len >= 64` and makes `len / min_run` close to a power of two.
pub fn default_min_run(len: usize) -> usize {
    let mut n = len;
    let mut r = 0;

    while n >= MIN_MERGE {
        r |= n & 1;
        n >>= 1;
    }

    n + r
}
