//! Profiling binary for stack churn (push/pop cycles at a steady depth).
//!
//! Run with:
//!   cargo build --release --bin perf_stack_churn
//!   perf stat -e cycles,instructions,cache-misses,cache-references \
//!       ./target/release/perf_stack_churn

use std::hint::black_box;

use nexus_stack::{Amortized, Array, DoublyTailList};

const CYCLES: usize = 10_000_000;
const DEPTH: u64 = 1024;

fn main() {
    let mut array: Array<u64, Amortized> = (0..DEPTH).collect();
    let mut list: DoublyTailList<u64> = (0..DEPTH).collect();

    // Timed section - push then immediately pop (hot cache)
    for i in 0..CYCLES as u64 {
        array.emplace_back(i);
        black_box(array.pop_back());
        list.emplace_back(i);
        black_box(list.pop_back());
    }
}
