//! In-place stable merging of two adjacent sorted runs.
//!
//! The only mutation primitive is swapping two elements of the slice, so whatever the comparison
//! function does, including panicking or violating `Ord`, the slice keeps holding exactly its
//! original elements.
//!
//! Short inputs are merged with insertion sort. Longer ones use a block merge with `O(sqrt(n))`
//! working space carved out of the input itself:
//!
//! ```text
//! [ scratch | tags |  left rest  | left blocks ... | right blocks ... | right rest ]
//!  \---- keys ----/ \-- < k --/                                         \-- < k --/
//! ```
//!
//! The keys are distinct elements gathered from the front of the left run. The first `k` of them
//! serve as the swap buffer for the block merges, the remaining ones tag the blocks so that
//! the run each block came from stays known after the blocks have been rearranged. Inputs whose
//! left run holds too few distinct elements fall back to a rotation based merge.

use crate::runs::insertion_sort_shift_left;

/// Merges shorter than this are done by insertion sort.
pub const SMALL_MERGE_THRESHOLD: usize = 20;

/// Merges the non-decreasing runs `v[..mid]` and `v[mid..]` into one non-decreasing run.
///
/// Stable: equal elements keep their relative order, elements of `v[..mid]` go before equal
/// elements of `v[mid..]`. `gallop` is the number of consecutive wins of one side after which the
/// block merges switch to exponential search, it only affects the number of comparisons.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub fn inplace_merge<T, F>(v: &mut [T], mid: usize, is_less: &mut F, gallop: usize)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    if mid == 0 || mid >= len {
        return;
    }

    // Already in order, common for partially sorted inputs.
    if !is_less(&v[mid], &v[mid - 1]) {
        return;
    }

    if len < SMALL_MERGE_THRESHOLD {
        insertion_sort_shift_left(v, mid, is_less);
        return;
    }

    block_merge(v, mid, is_less, gallop);
}

// --- IMPL ---

#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
fn block_merge<T, F>(v: &mut [T], mid: usize, is_less: &mut F, gallop: usize)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    let block_len = isqrt(len);
    // One buffer block plus one tag per block.
    let key_len = block_len + len / block_len;

    if mid < key_len {
        rotate_merge(v, mid, is_less);
        return;
    }

    let keys_found = collect_keys(&mut v[..mid], key_len, is_less);
    if keys_found < key_len {
        // Put the keys back in front of their equal elements, then merge without buffer.
        rotate_merge(&mut v[..mid], keys_found, is_less);
        rotate_merge(v, mid, is_less);
        return;
    }

    let left_len = mid - key_len;
    let left_blocks = left_len / block_len;
    let left_rest = left_len % block_len;
    let right_blocks = (len - mid) / block_len;
    let right_rest = (len - mid) % block_len;

    let blocks_start = key_len + left_rest;
    let blocks_end = mid + right_blocks * block_len;

    let layout = BlockLayout {
        block_len,
        blocks_start,
        block_count: left_blocks + right_blocks,
    };

    if left_blocks > 0 && right_blocks > 0 {
        let boundary = block_select_sort(v, &layout, left_blocks, is_less);
        combine_blocks(v, &layout, boundary, is_less, gallop);
    }

    // v[blocks_start..blocks_end] is sorted now, fold in the partial blocks at both ends.
    if right_rest > 0 {
        merge_backward(v, blocks_start, blocks_end, len, is_less);
    }

    if left_rest > 0 {
        merge_forward(v, key_len, blocks_start, len, true, is_less, gallop);
    }

    // The keys are distinct, sorting them restores exactly the order they were collected in.
    insertion_sort_shift_left(&mut v[..key_len], 1, is_less);
    rotate_merge(v, key_len, is_less);
}

/// Position of the full blocks. The scratch buffer is `v[..block_len]` and the tag of block `i`
/// is `v[block_len + i]`.
struct BlockLayout {
    block_len: usize,
    blocks_start: usize,
    block_count: usize,
}

impl BlockLayout {
    #[inline]
    fn block(&self, i: usize) -> usize {
        self.blocks_start + i * self.block_len
    }

    #[inline]
    fn tag(&self, i: usize) -> usize {
        self.block_len + i
    }
}

/// Selection sort over whole blocks, by first element and then by tag. Left run blocks are tagged
/// lower than right run blocks, so among blocks with equal first elements the left ones come
/// first, in their original order.
///
/// Returns the index of the tag that belonged to the first right run block. A block originates
/// from the left run iff its tag is less than that tag.
fn block_select_sort<T, F>(
    v: &mut [T],
    layout: &BlockLayout,
    left_blocks: usize,
    is_less: &mut F,
) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let mut boundary = left_blocks;

    for i in 0..layout.block_count {
        let mut min = i;

        for j in (i + 1)..layout.block_count {
            let (head_j, head_min) = (&v[layout.block(j)], &v[layout.block(min)]);

            if is_less(head_j, head_min)
                || (!is_less(head_min, head_j) && is_less(&v[layout.tag(j)], &v[layout.tag(min)]))
            {
                min = j;
            }
        }

        if min != i {
            swap_ranges(v, layout.block(i), layout.block(min), layout.block_len);
            v.swap(layout.tag(i), layout.tag(min));

            if boundary == i {
                boundary = min;
            } else if boundary == min {
                boundary = i;
            }
        }
    }

    boundary
}

/// Merges the rearranged blocks left to right.
///
/// `pending` is the not yet final tail of the processed prefix, it always stems from a single run
/// and never exceeds one block. A following block of the same run finalizes it, a block of the
/// other run is merged with it and whatever is left over becomes the new pending range.
fn combine_blocks<T, F>(
    v: &mut [T],
    layout: &BlockLayout,
    boundary: usize,
    is_less: &mut F,
    gallop: usize,
) where
    F: FnMut(&T, &T) -> bool,
{
    let boundary_tag = layout.tag(boundary);

    let mut pending_start = layout.block(0);
    let mut pending_left = is_less(&v[layout.tag(0)], &v[boundary_tag]);

    for i in 1..layout.block_count {
        let block_start = layout.block(i);
        let block_left = is_less(&v[layout.tag(i)], &v[boundary_tag]);

        if block_left == pending_left {
            pending_start = block_start;
            continue;
        }

        let rest = merge_forward(
            v,
            pending_start,
            block_start,
            block_start + layout.block_len,
            pending_left,
            is_less,
            gallop,
        );

        pending_start = rest.start;
        if !rest.from_first {
            pending_left = block_left;
        }
    }
}

/// Unmerged suffix left behind by [`merge_forward`].
struct MergeRest {
    start: usize,
    from_first: bool,
}

/// Whether `a` of the first operand goes before `b` of the second one.
#[inline]
fn precedes<T, F>(a: &T, b: &T, first_wins_ties: bool, is_less: &mut F) -> bool
where
    F: FnMut(&T, &T) -> bool,
{
    if first_wins_ties {
        !is_less(b, a)
    } else {
        is_less(a, b)
    }
}

/// Merges `v[first..middle]` with `v[middle..last]` until one of them is exhausted.
///
/// `v[first..middle]` is swapped into the scratch buffer at the front of `v`, which must not
/// overlap `v[first..last]` and be at least as long. The output is then written from `first`
/// onwards, swapping the buffer contents back into the gaps. Returns where the sorted but not
/// yet merged remainder starts, it always ends at `last`.
fn merge_forward<T, F>(
    v: &mut [T],
    first: usize,
    middle: usize,
    last: usize,
    first_wins_ties: bool,
    is_less: &mut F,
    gallop: usize,
) -> MergeRest
where
    F: FnMut(&T, &T) -> bool,
{
    let left_len = middle - first;
    debug_assert!(left_len <= first);

    swap_ranges(v, 0, first, left_len);

    let (mut left, left_end) = (0, left_len);
    let mut right = middle;
    let mut out = first;

    let mut left_wins = 0;
    let mut right_wins = 0;

    while left < left_end && right < last {
        if left_wins >= gallop {
            let head = &v[right];
            let count = gallop_count(&v[left..left_end], |x| {
                precedes(x, head, first_wins_ties, is_less)
            });

            swap_ranges(v, left, out, count);
            left += count;
            out += count;
            left_wins = 0;
            right_wins = 0;

            if left == left_end {
                break;
            }
        } else if right_wins >= gallop {
            let head = &v[left];
            let count = gallop_count(&v[right..last], |y| {
                !precedes(head, y, first_wins_ties, is_less)
            });

            // The gap between out and right may be shorter than count.
            for _ in 0..count {
                v.swap(out, right);
                out += 1;
                right += 1;
            }
            left_wins = 0;
            right_wins = 0;

            if right == last {
                break;
            }
        }

        if precedes(&v[left], &v[right], first_wins_ties, is_less) {
            v.swap(out, left);
            left += 1;
            left_wins += 1;
            right_wins = 0;
        } else {
            v.swap(out, right);
            right += 1;
            right_wins += 1;
            left_wins = 0;
        }
        out += 1;
    }

    if left < left_end {
        // The gap is exactly as long as what is left in the buffer.
        swap_ranges(v, left, out, left_end - left);
        MergeRest {
            start: out,
            from_first: true,
        }
    } else {
        MergeRest {
            start: right,
            from_first: false,
        }
    }
}

/// Merges `v[first..middle]` with the shorter `v[middle..last]` from the back, using the front of
/// `v` as buffer for the latter. Elements of the first range win ties.
fn merge_backward<T, F>(v: &mut [T], first: usize, middle: usize, last: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let right_len = last - middle;
    debug_assert!(right_len <= first);

    swap_ranges(v, 0, middle, right_len);

    let mut left = middle;
    let mut right = right_len;
    let mut out = last;

    while left > first && right > 0 {
        if is_less(&v[right - 1], &v[left - 1]) {
            v.swap(out - 1, left - 1);
            left -= 1;
        } else {
            v.swap(out - 1, right - 1);
            right -= 1;
        }
        out -= 1;
    }

    if right > 0 {
        swap_ranges(v, 0, first, right);
    }
}

/// Counts the leading elements of `v` that satisfy `pred`, assuming they form a prefix.
///
/// Probes offsets 1, 2, 4, ... until the probe fails or runs off the end, then binary searches the
/// last interval. Costs `O(log count)` comparisons.
fn gallop_count<T, P>(v: &[T], mut pred: P) -> usize
where
    P: FnMut(&T) -> bool,
{
    let len = v.len();
    let mut known = 0;
    let mut probe = 1;

    while probe <= len && pred(&v[probe - 1]) {
        known = probe;
        probe = probe.saturating_mul(2);
    }

    let bound = len.min(probe - 1);
    known + v[known..bound].partition_point(pred)
}

/// Gathers up to `wanted` distinct elements of the sorted `v` at its front, in ascending order.
/// Each key is the first of its equal elements, the remaining elements stay in order. Returns the
/// number of keys found.
fn collect_keys<T, F>(v: &mut [T], wanted: usize, is_less: &mut F) -> usize
where
    F: FnMut(&T, &T) -> bool,
{
    let mut found = 1;
    let mut first_key = 0;
    let mut i = 1;

    while i < v.len() && found < wanted {
        if is_less(&v[first_key + found - 1], &v[i]) {
            // Drag the keys along so they end right before v[i].
            rotate(v, first_key, found, i - (first_key + found));
            first_key = i - found;
            found += 1;
        }
        i += 1;
    }

    rotate(v, 0, first_key, found);

    found
}

/// Stable merge of `v[..mid]` and `v[mid..]` without buffer. Splits the longer run in half, finds
/// the matching cut in the other run by binary search, rotates the middle parts and recurses.
fn rotate_merge<T, F>(v: &mut [T], mid: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    if mid == 0 || mid >= len || !is_less(&v[mid], &v[mid - 1]) {
        return;
    }

    if len == 2 {
        v.swap(0, 1);
        return;
    }

    let (left_cut, right_cut) = if mid >= len - mid {
        // mid >= 2 here, so left_cut > 0.
        let left_cut = mid / 2;
        let pivot = &v[left_cut];
        let right_cut = mid + v[mid..].partition_point(|x| is_less(x, pivot));
        (left_cut, right_cut)
    } else {
        let right_cut = mid + (len - mid) / 2;
        let pivot = &v[right_cut];
        let left_cut = v[..mid].partition_point(|x| !is_less(pivot, x));
        (left_cut, right_cut)
    };

    rotate(v, left_cut, mid - left_cut, right_cut - mid);

    let new_mid = left_cut + (right_cut - mid);
    rotate_merge(&mut v[..new_mid], left_cut, is_less);
    rotate_merge(&mut v[new_mid..], right_cut - new_mid, is_less);
}

/// Exchanges `v[start..start + left_len]` with the `right_len` elements that follow it, using
/// block swaps only.
fn rotate<T>(v: &mut [T], mut start: usize, mut left_len: usize, mut right_len: usize) {
    while left_len > 0 && right_len > 0 {
        if left_len <= right_len {
            swap_ranges(v, start, start + left_len, left_len);
            start += left_len;
            right_len -= left_len;
        } else {
            swap_ranges(v, start + left_len - right_len, start + left_len, right_len);
            left_len -= right_len;
        }
    }
}

/// Swaps the non-overlapping ranges `v[a..a + count]` and `v[b..b + count]`.
#[inline]
fn swap_ranges<T>(v: &mut [T], a: usize, b: usize, count: usize) {
    if count == 0 || a == b {
        return;
    }

    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    debug_assert!(lo + count <= hi);

    let (head, tail) = v.split_at_mut(hi);
    head[lo..lo + count].swap_with_slice(&mut tail[..count]);
}

fn isqrt(n: usize) -> usize {
    let mut r = (n as f64).sqrt() as usize;

    while r > 0 && r * r > n {
        r -= 1;
    }
    while (r + 1) * (r + 1) <= n {
        r += 1;
    }

    r
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lt(a: &i32, b: &i32) -> bool {
        a < b
    }

    #[test]
    fn isqrt_exact() {
        for n in 0..2_000 {
            let r = isqrt(n);
            assert!(r * r <= n && (r + 1) * (r + 1) > n, "n: {n}");
        }
    }

    #[test]
    fn rotate_block_swaps() {
        let mut v = [0, 1, 2, 3, 4, 5, 6];
        rotate(&mut v, 1, 2, 4);
        assert_eq!(v, [0, 3, 4, 5, 6, 1, 2]);

        let mut v = [0, 1, 2, 3, 4];
        rotate(&mut v, 0, 3, 0);
        assert_eq!(v, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn gallop_count_prefix() {
        let v = (0..100).collect::<Vec<i32>>();

        for limit in [0, 1, 2, 3, 7, 8, 9, 63, 64, 99, 100, 150] {
            let count = gallop_count(&v, |x| *x < limit);
            assert_eq!(count, limit.clamp(0, 100) as usize);
        }

        assert_eq!(gallop_count::<i32, _>(&[], |_| true), 0);
    }

    #[test]
    fn keys_are_first_of_equal() {
        let mut v = vec![(1, 0), (1, 1), (2, 0), (3, 0), (3, 1), (3, 2), (4, 0), (5, 0)];
        let found = collect_keys(&mut v, 3, &mut |a, b| a.0 < b.0);

        assert_eq!(found, 3);
        assert_eq!(
            v,
            [(1, 0), (2, 0), (3, 0), (1, 1), (3, 1), (3, 2), (4, 0), (5, 0)]
        );

        let mut few = vec![7, 7, 7, 8, 8];
        assert_eq!(collect_keys(&mut few, 4, &mut lt), 2);
        assert_eq!(few, [7, 8, 7, 7, 8]);
    }

    #[test]
    fn rotate_merge_stable() {
        let mut v = vec![(0, 0), (2, 0), (2, 1), (5, 0), (1, 1), (2, 2), (2, 3), (6, 1)];
        rotate_merge(&mut v, 4, &mut |a, b| a.0 < b.0);

        assert_eq!(
            v,
            [(0, 0), (1, 1), (2, 0), (2, 1), (2, 2), (2, 3), (5, 0), (6, 1)]
        );
    }

    #[test]
    fn block_merge_distinct() {
        // Large enough for the block path, every left value distinct.
        let mut v = (0..300).step_by(2).chain((1..300).step_by(2)).collect::<Vec<i32>>();
        inplace_merge(&mut v, 150, &mut lt, 7);

        assert_eq!(v, (0..300).collect::<Vec<i32>>());
    }

    #[test]
    fn block_merge_one_sided() {
        // Whole blocks of one side in a row trigger galloping.
        let mut v = (0..100)
            .chain(200..300)
            .chain(100..200)
            .chain(300..400)
            .collect::<Vec<i32>>();
        v[..200].sort();
        v[200..].sort();
        inplace_merge(&mut v, 200, &mut lt, 1);

        assert_eq!(v, (0..400).collect::<Vec<i32>>());
    }

    #[test]
    fn merge_forward_rest() {
        // buffer [90, 91], first operand [1, 5], second [2, 3, 4, 9]
        let mut v = vec![90, 91, 1, 5, 2, 3, 4, 9];
        let rest = merge_forward(&mut v, 2, 4, 8, true, &mut lt, 7);

        assert!(!rest.from_first);
        assert_eq!(rest.start, 7);
        assert_eq!(&v[2..], [1, 2, 3, 4, 5, 9]);

        let mut v = vec![90, 91, 1, 8, 2, 3, 4, 5];
        let rest = merge_forward(&mut v, 2, 4, 8, true, &mut lt, 7);

        assert!(rest.from_first);
        assert_eq!(rest.start, 7);
        assert_eq!(&v[2..], [1, 2, 3, 4, 5, 8]);

        let mut buf = v[..2].to_vec();
        buf.sort();
        assert_eq!(buf, [90, 91]);
    }
}
