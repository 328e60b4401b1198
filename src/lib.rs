//! Stable adaptive merge sort with in-place merges.
//!
//! Natural runs are detected and extended with insertion sort, then merged as directed by a
//! pluggable [`TimSortParams`] policy. Merges work in place with `O(sqrt(n))` working space taken
//! from the input itself, so the only allocation is the run stack.

use std::cmp::Ordering;
use std::mem;

pub mod merge;
pub mod params;
pub mod runs;
pub mod timsort;

pub use merge::inplace_merge;
pub use params::{DefaultParams, TimSortParams, WhatMerge, WithGallop, DEFAULT_GALLOP};
pub use runs::{build_runs, Run};

/// Sorts the slice, preserving the order of equal elements.
///
/// This sort is stable (i.e., does not reorder equal elements), works in place by swapping
/// elements and uses the classical TimSort merge policy. It is adaptive: presorted and reverse
/// sorted runs in the input are detected and merged rather than re-sorted.
///
/// # Examples
///
/// ```
/// let mut v = [-5, 4, 1, -3, 2];
///
/// inplace_timsort::sort(&mut v);
/// assert!(v == [-5, -3, 1, 2, 4]);
/// ```
#[inline]
pub fn sort<T>(v: &mut [T])
where
    T: Ord,
{
    stable_sort(v, |a, b| a.lt(b), &DefaultParams);
}

/// Sorts the slice with a comparator function, preserving the order of equal elements.
///
/// The comparator function must define a total ordering for the elements in the slice. If the
/// ordering is not total, the order of the elements is unspecified, but the slice still holds all
/// of its original elements, even if the comparator panics.
#[inline]
pub fn sort_by<T, F>(v: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    stable_sort(v, |a, b| compare(a, b) == Ordering::Less, &DefaultParams);
}

/// Sorts the slice with a key extraction function, preserving the order of equal elements.
///
/// The key function is called for every comparison, prefer cheap keys.
#[inline]
pub fn sort_by_key<T, K, F>(v: &mut [T], mut f: F)
where
    F: FnMut(&T) -> K,
    K: Ord,
{
    stable_sort(v, |a, b| f(a).lt(&f(b)), &DefaultParams);
}

/// Sorts the slice with a comparator function and a custom merge policy.
///
/// Any policy yields the same sorted output. Policies only change how much work is done.
///
/// ```
/// use inplace_timsort::{DefaultParams, TimSortParams};
///
/// let mut v = [3, 1, 2];
/// inplace_timsort::sort_with_params(&mut v, |a, b| a.cmp(b), &DefaultParams.with_gallop(1));
/// assert_eq!(v, [1, 2, 3]);
/// ```
#[inline]
pub fn sort_with_params<T, F, P>(v: &mut [T], mut compare: F, params: &P)
where
    F: FnMut(&T, &T) -> Ordering,
    P: TimSortParams + ?Sized,
{
    stable_sort(v, |a, b| compare(a, b) == Ordering::Less, params);
}

#[inline]
fn stable_sort<T, F, P>(v: &mut [T], mut is_less: F, params: &P)
where
    F: FnMut(&T, &T) -> bool,
    P: TimSortParams + ?Sized,
{
    if mem::size_of::<T>() == 0 {
        // Sorting has no meaningful behavior on zero-sized types. Do nothing.
        return;
    }

    timsort::timsort(v, &mut is_less, params);
}
