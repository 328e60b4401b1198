use std::cell::Cell;
use std::cmp::Ordering;
use std::env;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use inplace_timsort::{DefaultParams, TimSortParams};
use sort_test_tools::{patterns, Sort};

struct InplaceTimsort;

impl Sort for InplaceTimsort {
    fn name() -> String {
        "inplace_timsort".into()
    }

    fn sort<T: Ord>(arr: &mut [T]) {
        inplace_timsort::sort(arr);
    }

    fn sort_by<T, F>(arr: &mut [T], compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        inplace_timsort::sort_by(arr, compare);
    }
}

/// Galloping after every single win.
struct InplaceTimsortEagerGallop;

impl Sort for InplaceTimsortEagerGallop {
    fn name() -> String {
        "inplace_timsort_gallop_1".into()
    }

    fn sort<T: Ord>(arr: &mut [T]) {
        Self::sort_by(arr, T::cmp);
    }

    fn sort_by<T, F>(arr: &mut [T], compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        inplace_timsort::sort_with_params(arr, compare, &DefaultParams.with_gallop(1));
    }
}

struct StdStable;

impl Sort for StdStable {
    fn name() -> String {
        "std_stable".into()
    }

    fn sort<T: Ord>(arr: &mut [T]) {
        arr.sort();
    }

    fn sort_by<T, F>(arr: &mut [T], compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        arr.sort_by(compare);
    }
}

fn measure_comp_count<S: Sort>(name: &str, test_size: usize, pattern: fn(usize) -> Vec<i32>) {
    // Mean number of comparisons for one implementation and input combination.
    let run_count: usize = if test_size <= 20 {
        10_000
    } else if test_size < 10_000 {
        300
    } else {
        20
    };

    let comp_count = Cell::new(0u64);
    for _ in 0..run_count {
        let mut test_data = pattern(test_size);
        S::sort_by(black_box(test_data.as_mut_slice()), |a, b| {
            comp_count.set(comp_count.get() + 1);
            a.cmp(b)
        });
    }

    let mean = comp_count.get() / (run_count as u64);
    println!("{name}: mean comparisons: {mean}");
}

#[inline(never)]
fn bench_impl<S: Sort>(
    c: &mut Criterion,
    test_size: usize,
    pattern_name: &str,
    pattern: fn(usize) -> Vec<i32>,
) {
    let name = format!("{}-{pattern_name}-{test_size}", S::name());

    if env::var("MEASURE_COMP").is_ok() {
        measure_comp_count::<S>(&name, test_size, pattern);
        return;
    }

    let batch_size = if test_size > 30 {
        BatchSize::LargeInput
    } else {
        BatchSize::SmallInput
    };

    c.bench_function(&name, |b| {
        b.iter_batched(
            || pattern(test_size),
            |mut test_data| S::sort(black_box(test_data.as_mut_slice())),
            batch_size,
        )
    });
}

fn bench_patterns(c: &mut Criterion, test_size: usize) {
    let pattern_providers: [(&str, fn(usize) -> Vec<i32>); 7] = [
        ("random", patterns::random),
        ("random_d16", |size| patterns::random_uniform(size, 0..16)),
        ("ascending", patterns::ascending),
        ("descending", patterns::descending),
        ("saws_long", |size| {
            patterns::saw_mixed(size, ((size as f64).log2().round()) as usize)
        }),
        ("random_s95", |size| patterns::random_sorted(size, 95.0)),
        ("pipe_organ", patterns::pipe_organ),
    ];

    for (pattern_name, pattern) in pattern_providers {
        bench_impl::<InplaceTimsort>(c, test_size, pattern_name, pattern);
        bench_impl::<InplaceTimsortEagerGallop>(c, test_size, pattern_name, pattern);
        bench_impl::<StdStable>(c, test_size, pattern_name, pattern);
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let test_sizes = [8, 19, 20, 50, 200, 1_000, 10_000, 100_000, 1_000_000];

    patterns::use_random_seed_each_time();

    for test_size in test_sizes {
        bench_patterns(c, test_size);
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
