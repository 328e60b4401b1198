//! Merge driver. Keeps a stack of sorted runs and merges adjacent ones as the policy demands.

use crate::merge::inplace_merge;
use crate::params::{TimSortParams, WhatMerge};
use crate::runs::{next_run, Run};

/// Sorts `v` stably with the runs, merge decisions and gallop threshold given by `params`.
///
/// Runs are built one at a time. After each push the policy is asked whether to merge the top of
/// the stack, until it declines. Once the input is consumed the stack is collapsed from the top.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub fn timsort<T, F, P>(v: &mut [T], is_less: &mut F, params: &P)
where
    F: FnMut(&T, &T) -> bool,
    P: TimSortParams + ?Sized,
{
    let len = v.len();

    if len < 2 {
        // These inputs are always sorted.
        return;
    }

    let min_run = params.min_run(len).max(1);
    let gallop = params.gallop();

    let mut runs: Vec<Run> = Vec::new();
    let mut start = 0;

    while start < len {
        let run = next_run(v, start, min_run, is_less);
        start = run.end();
        runs.push(run);

        while let Some(r) = collapse(&runs, params) {
            merge_at(v, &mut runs, r, is_less, gallop);
        }
    }

    while runs.len() > 1 {
        let r = runs.len() - 2;
        merge_at(v, &mut runs, r, is_less, gallop);
    }

    // Finally, exactly one run must remain in the stack.
    debug_assert!(runs.len() == 1 && runs[0].start == 0 && runs[0].len == len);
}

/// Examines the stack of runs and identifies the next pair of runs to merge. If `Some(r)` is
/// returned, `runs[r]` and `runs[r + 1]` must be merged next. If the algorithm should continue
/// building a new run instead, `None` is returned.
///
/// Every merge shrinks the stack, so this terminates for any policy.
fn collapse<P>(runs: &[Run], params: &P) -> Option<usize>
where
    P: TimSortParams + ?Sized,
{
    let n = runs.len();

    if n >= 3 {
        let (x, y, z) = (runs[n - 3], runs[n - 2], runs[n - 1]);
        match params.what_merge(x.len, y.len, z.len) {
            WhatMerge::NoMerge => None,
            WhatMerge::MergeXY => Some(n - 3),
            WhatMerge::MergeYZ => Some(n - 2),
        }
    } else if n == 2 && params.need_merge(runs[0].len, runs[1].len) {
        Some(0)
    } else {
        None
    }
}

fn merge_at<T, F>(v: &mut [T], runs: &mut Vec<Run>, r: usize, is_less: &mut F, gallop: usize)
where
    F: FnMut(&T, &T) -> bool,
{
    let left = runs[r];
    let right = runs[r + 1];
    debug_assert_eq!(left.end(), right.start);

    inplace_merge(&mut v[left.start..right.end()], left.len, is_less, gallop);

    runs[r] = Run {
        start: left.start,
        len: left.len + right.len,
    };
    runs.remove(r + 1);
}
