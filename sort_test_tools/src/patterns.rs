use std::env;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;
use rand::prelude::*;

use zipf::ZipfDistribution;

/// Provides a set of patterns useful for testing and benchmarking sorting algorithms.
/// Currently limited to i32 values.

// --- Public ---

pub fn random(len: usize) -> Vec<i32> {
    //     .
    // : . : :
    // :.:::.::

    random_vec(len)
}

pub fn random_uniform<R>(len: usize, range: R) -> Vec<i32>
where
    R: Into<rand::distributions::Uniform<i32>>,
{
    // :.:.:.::
    let mut rng = new_rng();

    let dist: rand::distributions::Uniform<i32> = range.into();

    (0..len).map(|_| dist.sample(&mut rng)).collect()
}

pub fn random_zipf(len: usize, exponent: f64) -> Vec<i32> {
    // https://en.wikipedia.org/wiki/Zipf's_law
    let mut rng = new_rng();

    let dist = ZipfDistribution::new(len, exponent).unwrap();

    (0..len).map(|_| dist.sample(&mut rng) as i32).collect()
}

pub fn random_sorted(len: usize, sorted_percent: f64) -> Vec<i32> {
    //     .:
    //   .:::. :
    // .::::::.::
    // [----][--]
    //  ^      ^
    //  |      |
    // sorted  |
    //     unsorted

    let mut v = random_vec(len);
    let sorted_len = ((len as f64) * (sorted_percent / 100.0)).round() as usize;

    v[0..sorted_len].sort_unstable();

    v
}

pub fn all_equal(len: usize) -> Vec<i32> {
    // ......
    // ::::::

    (0..len).map(|_| 66).collect::<Vec<_>>()
}

pub fn ascending(len: usize) -> Vec<i32> {
    //     .:
    //   .:::
    // .:::::

    (0..len as i32).collect::<Vec<_>>()
}

pub fn descending(len: usize) -> Vec<i32> {
    // :.
    // :::.
    // :::::.

    (0..len as i32).rev().collect::<Vec<_>>()
}

pub fn saw_mixed(len: usize, saw_count: usize) -> Vec<i32> {
    // :.  :.    .::.    .:
    // :::.:::..::::::..:::

    if len == 0 {
        return Vec::new();
    }

    let mut vals = random_vec(len);
    let chunk_len = len / saw_count.max(1);
    sort_chunks_random_direction(&mut vals, chunk_len.max(1));

    vals
}

pub fn pipe_organ(len: usize) -> Vec<i32> {
    //   .:.
    // .:::::.

    let mut vals = random_vec(len);

    let first_half = &mut vals[0..(len / 2)];
    first_half.sort();

    let second_half = &mut vals[(len / 2)..len];
    second_half.sort_by_key(|&e| std::cmp::Reverse(e));

    vals
}

/// Two adjacent ascending runs `[..mid]` and `[mid..]`, the input of a single merge. Each `trial`
/// yields different values.
pub fn sorted_halves(
    len: usize,
    mid: usize,
    range: std::ops::RangeInclusive<i32>,
    trial: u64,
) -> Vec<i32> {
    //    .:   .:
    //  .:::.:::
    // [----][--]
    //      ^
    //     mid

    let mid = mid.min(len);
    let mut rng = StdRng::seed_from_u64(random_init_seed() ^ trial.wrapping_mul(TRIAL_MIX));
    let dist = rand::distributions::Uniform::from(range);
    let mut vals = (0..len).map(|_| dist.sample(&mut rng)).collect::<Vec<i32>>();

    vals[..mid].sort();
    vals[mid..].sort();

    vals
}

pub fn partially_sorted(chunk_count: usize, chunk_len: usize) -> Vec<i32> {
    // .:  :.  :.  .:
    // ::.:::.:::.:::

    // Concatenation of sorted chunks, each one reversed with a 50% chance.
    let mut vals = random_vec(chunk_count * chunk_len);
    if chunk_len > 0 {
        sort_chunks_random_direction(&mut vals, chunk_len);
    }

    vals
}

/// `key_count` distinct keys, each repeated `per_key` times, shuffled. The second value of each
/// element is its rank among the elements with the same key before shuffling.
pub fn key_groups(key_count: usize, per_key: usize) -> Vec<(i32, i32)> {
    let mut rng = new_rng();

    let mut vals = (0..key_count as i32)
        .flat_map(|key| (0..per_key as i32).map(move |rank| (key, rank)))
        .collect::<Vec<_>>();
    vals.shuffle(&mut rng);

    // Ranks must follow input order within a key after the shuffle.
    let mut next_rank = vec![0; key_count];
    for val in vals.iter_mut() {
        val.1 = next_rank[val.0 as usize];
        next_rank[val.0 as usize] += 1;
    }

    vals
}

/// Overwrites the default behavior so that each call to a random derived pattern yields new random
/// values.
///
/// By default `patterns::random(4)` will yield the same values per process invocation.
/// For benchmarks it's advised to use call this function.
pub fn use_random_seed_each_time() {
    if env::var("OVERRIDE_SEED").is_ok() {
        panic!("Using use_random_seed_each_time conflicts with the external seed override.");
    }

    RANDOM_EACH_TIME.store(true, Ordering::Relaxed);
}

/// The seed used by all patterns of this process, either random or taken from the `OVERRIDE_SEED`
/// environment variable.
pub fn random_init_seed() -> u64 {
    if RANDOM_EACH_TIME.load(Ordering::Relaxed) {
        return thread_rng().gen();
    }

    *PROCESS_SEED.get_or_init(|| {
        env::var("OVERRIDE_SEED")
            .ok()
            .map(|seed| u64::from_str(&seed).unwrap())
            .unwrap_or_else(|| thread_rng().gen())
    })
}

// --- Private ---

// Odd 64-bit constant, spreads consecutive trial numbers over the seed space.
const TRIAL_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

static RANDOM_EACH_TIME: AtomicBool = AtomicBool::new(false);
static PROCESS_SEED: OnceCell<u64> = OnceCell::new();

fn new_rng() -> StdRng {
    StdRng::seed_from_u64(random_init_seed())
}

fn random_vec(len: usize) -> Vec<i32> {
    let mut rng = new_rng();

    (0..len).map(|_| rng.gen::<i32>()).collect()
}

fn sort_chunks_random_direction(vals: &mut [i32], chunk_len: usize) {
    let mut rng = new_rng();

    for chunk in vals.chunks_mut(chunk_len) {
        if rng.gen::<bool>() {
            chunk.sort();
        } else {
            chunk.sort_by_key(|&e| std::cmp::Reverse(e));
        }
    }
}
