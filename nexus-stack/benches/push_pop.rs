//! Push-all/pop-all benchmarks across every container.
//!
//! Run with: cargo bench --bench push_pop

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nexus_stack::{
    Amortized, Array, DoublyList, DoublyTailList, Exact, ExactGrow, SinglyList, SinglyTailList,
    Stack,
};

const SIZES: [usize; 3] = [16, 256, 1024];

// ============================================================================
// Helpers
// ============================================================================

fn push_pop<S: Stack<Item = u64>>(size: usize) {
    let mut stack = S::default();
    for i in 0..size as u64 {
        stack.push(i);
    }
    for _ in 0..size {
        black_box(stack.pop());
    }
}

fn bench_container<S: Stack<Item = u64>>(c: &mut Criterion, sizes: &[usize]) {
    let mut group = c.benchmark_group(S::NAME);
    for &size in sizes {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| push_pop::<S>(size));
        });
    }
    group.finish();
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_arrays(c: &mut Criterion) {
    bench_container::<Array<u64, Exact>>(c, &SIZES);
    bench_container::<Array<u64, ExactGrow>>(c, &SIZES);
    bench_container::<Array<u64, Amortized>>(c, &SIZES);
}

fn bench_tailed_lists(c: &mut Criterion) {
    bench_container::<SinglyTailList<u64>>(c, &SIZES);
    bench_container::<DoublyTailList<u64>>(c, &SIZES);
}

fn bench_scanned_lists(c: &mut Criterion) {
    // Quadratic: keep sizes small
    bench_container::<SinglyList<u64>>(c, &SIZES[..2]);
    bench_container::<DoublyList<u64>>(c, &SIZES[..2]);
}

criterion_group!(benches, bench_arrays, bench_tailed_lists, bench_scanned_lists);
criterion_main!(benches);
