//! Performance benchmarks for payload classification.
//!
//! Classification runs on every scan, so the common retail path should stay
//! well under a microsecond. The license-like rule is the most expensive
//! predicate and is benchmarked separately.
//!
//! # Run Benchmarks
//!
//! ```sh
//! # Run all classifier benchmarks
//! cargo bench --bench classifier_bench
//!
//! # Run a specific group
//! cargo bench --bench classifier_bench -- classify
//! ```

use checkstand_protocol::{classify_bytes, decode_payload_text, looks_like_1d_license};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

const IDENTITY_RECORD: &[u8] = b"@\n\x1e\rANSI 636014090001DL00310090DLDAQD1234567\nDCSDOE\nDACJANE\nDBB01151990\nDBA01152030\nDAJCA\nDAK945010000\r";

/// Benchmark the full classifier across each route.
fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");
    group.throughput(Throughput::Elements(1));

    let cases: Vec<(&str, &[u8])> = vec![
        ("retail_ean13", &b"4006381333931\r\n"[..]),
        ("identity_record", IDENTITY_RECORD),
        ("license_like", &b"D123456789CA01"[..]),
        ("unclassified", &b"https://example.com/r/42"[..]),
        ("empty", &b"\r\n"[..]),
    ];

    for (name, payload) in cases {
        group.bench_with_input(BenchmarkId::new("route", name), &payload, |b, &payload| {
            b.iter(|| black_box(classify_bytes(black_box(payload))));
        });
    }

    group.finish();
}

/// Benchmark the two-step text decode with and without the header marker.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_payload_text");

    group.bench_function("utf8_with_marker", |b| {
        b.iter(|| black_box(decode_payload_text(black_box(IDENTITY_RECORD))));
    });

    group.bench_function("windows_1252_fallback", |b| {
        b.iter(|| black_box(decode_payload_text(black_box(b"DCSJOS\xc9 MARTINEZ\n"))));
    });

    group.finish();
}

/// Benchmark the license-like predicate on matching and rejected inputs.
fn bench_license_like(c: &mut Criterion) {
    let mut group = c.benchmark_group("looks_like_1d_license");

    for code in ["TX12345678", "123456789CA01", "QQ1234567QQ", "ORDER-1234"] {
        group.bench_with_input(BenchmarkId::from_parameter(code), &code, |b, &code| {
            b.iter(|| black_box(looks_like_1d_license(black_box(code))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_decode, bench_license_like);
criterion_main!(benches);
