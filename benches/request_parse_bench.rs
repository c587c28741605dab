//! Performance benchmarks for request parsing.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench request_parse_bench
//! ```

use criterion::{Criterion, criterion_group, criterion_main};
use pjlink_protocol::Request;
use std::hint::black_box;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_parse");

    for (name, line) in [
        ("query", "%1POWR ?"),
        ("write_input", "%1INPT 32"),
        ("unknown_mnemonic", "%1AVMT ?"),
        ("missing_sentinel", "POWR ?"),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| black_box(Request::parse(black_box(line))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
