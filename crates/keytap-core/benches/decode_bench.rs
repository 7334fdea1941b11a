//! Criterion benchmarks for the scancode decoder.
//!
//! Measures per-byte decode latency and sustained throughput over a mixed
//! stream, since the decoder sits on the consumer hot path (one call per
//! captured byte).
//!
//! Run with:
//! ```bash
//! cargo bench --package keytap-core --bench decode_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use keytap_core::ScancodeDecoder;

/// A representative mix: plain letters, shifted characters, modifier edges,
/// caps toggles, releases, and unmapped codes.
const BENCH_STREAM: &[u8] = &[
    0x23, 0x12, 0x26, 0x26, 0x18, 0x39, // "hello "
    0x2A, 0x11, 0xAA, // shift, 'W', release
    0x18, 0x13, 0x26, 0x20, // "orld"
    0x3A, 0x1E, 0x3A, // caps on, 'A', caps off
    0x1D, 0x9D, // ctrl edge pair
    0x02, 0x0E, 0x1C, // '1', backspace, newline
    0x7F, 0xFF, // unmapped
];

fn bench_decode_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder");

    group.bench_function("decode_letter", |b| {
        let mut decoder = ScancodeDecoder::new();
        b.iter(|| decoder.decode(black_box(0x1E)))
    });

    group.bench_function("decode_modifier_edge", |b| {
        let mut decoder = ScancodeDecoder::new();
        b.iter(|| {
            decoder.decode(black_box(0x2A));
            decoder.decode(black_box(0xAA))
        })
    });

    group.finish();
}

fn bench_decode_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("decoder_stream");
    group.throughput(Throughput::Bytes(BENCH_STREAM.len() as u64));

    group.bench_function("mixed_stream", |b| {
        let mut decoder = ScancodeDecoder::new();
        b.iter(|| {
            let mut counted = 0usize;
            for &raw in BENCH_STREAM {
                if let Some(unit) = decoder.decode(black_box(raw)) {
                    counted += usize::from(unit.counted());
                }
            }
            counted
        })
    });

    group.bench_function("mixed_stream_into_buffer", |b| {
        let mut decoder = ScancodeDecoder::new();
        let mut out = [0u8; 32];
        b.iter(|| {
            let mut written = 0usize;
            for &raw in BENCH_STREAM {
                written += decoder.decode_into(black_box(raw), &mut out).0;
            }
            written
        })
    });

    group.finish();
}

criterion_group!(benches, bench_decode_single, bench_decode_stream);
criterion_main!(benches);
