//! Run detection and extension.

/// Half-open range `[start, start + len)` of the slice that is sorted ascending.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub start: usize,
    pub len: usize,
}

impl Run {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Splits `v` into ascending runs covering it from left to right.
///
/// Natural runs are found with [`find_streak`], strictly descending ones are reversed in place.
/// Runs shorter than `min_run` are extended to `min_run` elements, or to the end of the slice,
/// with a stable insertion sort.
pub fn build_runs<T, F>(v: &mut [T], min_run: usize, is_less: &mut F) -> Vec<Run>
where
    F: FnMut(&T, &T) -> bool,
{
    let mut runs = Vec::new();
    let mut start = 0;

    while start < v.len() {
        let run = next_run(v, start, min_run, is_less);
        start = run.end();
        runs.push(run);
    }

    runs
}

/// Builds the run that begins at `start`. Only `v[start..run.end()]` is touched.
#[cfg_attr(feature = "no_inline_sub_functions", inline(never))]
pub fn next_run<T, F>(v: &mut [T], start: usize, min_run: usize, is_less: &mut F) -> Run
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();
    debug_assert!(start < len);

    let (streak_len, was_reversed) = find_streak(&v[start..], is_less);
    let mut end = start + streak_len;
    if was_reversed {
        v[start..end].reverse();
    }

    if streak_len < min_run {
        end = len.min(start + min_run);
        insertion_sort_shift_left(&mut v[start..end], streak_len, is_less);
    }

    Run {
        start,
        len: end - start,
    }
}

/// Finds a streak of presorted elements starting at the beginning of the slice. Returns the first
/// value that is not part of said streak, and a bool denoting whether the streak was reversed.
///
/// Ascending streaks may contain equal neighbours, descending streaks must be strictly
/// descending. Reversing such a streak can never swap the relative order of equal elements.
pub fn find_streak<T, F>(v: &[T], is_less: &mut F) -> (usize, bool)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();

    if len < 2 {
        return (len, false);
    }

    let mut end = 2;

    if is_less(&v[1], &v[0]) {
        while end < len && is_less(&v[end], &v[end - 1]) {
            end += 1;
        }

        (end, true)
    } else {
        while end < len && !is_less(&v[end], &v[end - 1]) {
            end += 1;
        }

        (end, false)
    }
}

/// Sorts `v` assuming `v[..offset]` is already sorted, by moving each following element to the
/// left with adjacent swaps. Stable.
///
/// Never inline this function to avoid code bloat.
#[inline(never)]
pub fn insertion_sort_shift_left<T, F>(v: &mut [T], offset: usize, is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let len = v.len();

    // Using assert here improves performance.
    assert!(offset != 0 && offset <= len);

    for i in offset..len {
        insert_tail(&mut v[..=i], is_less);
    }
}

/// Inserts `v[v.len() - 1]` into pre-sorted sequence `v[..v.len() - 1]` so that whole `v[..]`
/// becomes sorted.
fn insert_tail<T, F>(v: &mut [T], is_less: &mut F)
where
    F: FnMut(&T, &T) -> bool,
{
    let mut i = v.len() - 1;

    while i > 0 && is_less(&v[i], &v[i - 1]) {
        v.swap(i, i - 1);
        i -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lt(a: &i32, b: &i32) -> bool {
        a < b
    }

    #[test]
    fn streaks() {
        assert_eq!(find_streak::<i32, _>(&[], &mut lt), (0, false));
        assert_eq!(find_streak(&[4], &mut lt), (1, false));
        assert_eq!(find_streak(&[1, 1, 2, 3, 0], &mut lt), (4, false));
        assert_eq!(find_streak(&[5, 3, 2, 2], &mut lt), (3, true));
        assert_eq!(find_streak(&[2, 2, 1], &mut lt), (2, false));
    }

    #[test]
    fn runs_cover_input() {
        let mut v = vec![1, 2, 3, 9, 8, 7, 6, 5, 0, 4, 4];
        let runs = build_runs(&mut v, 1, &mut lt);

        assert_eq!(
            runs,
            [
                Run { start: 0, len: 4 },
                Run { start: 4, len: 5 },
                Run { start: 9, len: 2 },
            ]
        );
        assert_eq!(v, [1, 2, 3, 9, 0, 5, 6, 7, 8, 4, 4]);
    }

    #[test]
    fn short_runs_are_extended() {
        let mut v = vec![3, 1, 2, 7, 5, 6, 0];
        let runs = build_runs(&mut v, 3, &mut lt);

        assert_eq!(
            runs,
            [
                Run { start: 0, len: 3 },
                Run { start: 3, len: 3 },
                Run { start: 6, len: 1 },
            ]
        );
        assert_eq!(v, [1, 2, 3, 5, 6, 7, 0]);

        let mut short = vec![9, 3, 5, 1];
        let runs = build_runs(&mut short, 32, &mut lt);
        assert_eq!(runs, [Run { start: 0, len: 4 }]);
        assert_eq!(short, [1, 3, 5, 9]);
    }

    #[test]
    fn insertion_sort_is_stable() {
        let mut v = vec![(2, 0), (1, 0), (2, 1), (1, 1), (0, 0)];
        insertion_sort_shift_left(&mut v, 1, &mut |a, b| a.0 < b.0);

        assert_eq!(v, [(0, 0), (1, 0), (1, 1), (2, 0), (2, 1)]);
    }
}
