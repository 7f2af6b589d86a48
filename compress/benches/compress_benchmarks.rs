//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Benchmarks for logpipe-compress

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use logpipe_compress::{Algorithm, Codec};
use std::hint::black_box;

// ============================================================================
// Helper Functions
// ============================================================================

fn create_compressible_data(size: usize) -> Vec<u8> {
    vec![b'A'; size]
}

fn create_random_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| ((i * 7 + 13) % 256) as u8).collect()
}

fn create_log_data(size: usize) -> Vec<u8> {
    let line = "2026-01-01T00:00:00.000000Z  INFO app::server: request handled status=200\n";
    line.as_bytes().iter().cycle().take(size).copied().collect()
}

const ALGORITHMS: [Algorithm; 3] = [Algorithm::None, Algorithm::Gzip, Algorithm::Zstd];

// ============================================================================
// Frame Compression Benchmarks
// ============================================================================

fn bench_compress_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress_frame");

    for size in [1024, 4096, 64 * 1024] {
        let data = create_log_data(size);
        group.throughput(Throughput::Bytes(size as u64));

        for algorithm in ALGORITHMS {
            group.bench_with_input(
                BenchmarkId::new(algorithm.to_string(), size),
                &data,
                |b, data| {
                    let mut codec = algorithm.codec();
                    let mut out = Vec::with_capacity(size);
                    b.iter(|| {
                        out.clear();
                        codec.compress(black_box(data), &mut out).unwrap();
                        out.len()
                    });
                },
            );
        }
    }

    group.finish();
}

// ============================================================================
// Data Type Benchmarks
// ============================================================================

fn bench_data_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("data_types");
    let size = 16 * 1024;
    group.throughput(Throughput::Bytes(size as u64));

    let data_types = [
        ("compressible", create_compressible_data(size)),
        ("random", create_random_data(size)),
        ("log", create_log_data(size)),
    ];

    for (name, data) in &data_types {
        for algorithm in [Algorithm::Gzip, Algorithm::Zstd] {
            group.bench_with_input(
                BenchmarkId::new(algorithm.to_string(), name),
                data,
                |b, data| {
                    let mut codec = algorithm.codec();
                    let mut out = Vec::new();
                    b.iter(|| {
                        out.clear();
                        codec.compress(black_box(data), &mut out).unwrap();
                    });
                },
            );
        }
    }

    group.finish();
}

// ============================================================================
// Stream Decompression Benchmarks
// ============================================================================

fn bench_decompress_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress_stream");
    let frame_size = 4096;
    let frames = 64;
    group.throughput(Throughput::Bytes((frame_size * frames) as u64));

    for algorithm in ALGORITHMS {
        let mut codec = algorithm.codec();
        let chunk = create_log_data(frame_size);
        let mut stream = Vec::new();
        for _ in 0..frames {
            codec.compress(&chunk, &mut stream).unwrap();
        }

        group.bench_with_input(
            BenchmarkId::new(algorithm.to_string(), frames),
            &stream,
            |b, stream| {
                b.iter(|| {
                    let mut plain = Vec::with_capacity(frame_size * frames);
                    codec.decompress(black_box(stream), &mut plain).unwrap();
                    plain
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compress_frame,
    bench_data_types,
    bench_decompress_stream
);
criterion_main!(benches);
