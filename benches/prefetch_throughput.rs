//! Benchmarks for prefetch throughput
//!
//! Measures the per-frame overhead of the envelope buffer and the lifecycle cost of
//! starting and stopping a capture:
//! - Draining a fast in-memory source at several buffer sizes
//! - Hiding simulated decode latency behind the lookahead
//! - Start/stop round trip with a parked worker
//!
//! Platform: Cross-platform (synthetic sources, CI-safe)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use framefetch::test_utils::CountingSource;
use framefetch::{FrameCapture, PrefetchConfig};
use std::hint::black_box;
use std::time::Duration;
use tokio::runtime::Runtime;

const FRAMES: u64 = 1_000;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("Failed to build benchmark runtime")
}

async fn drain(frames: u64, config: PrefetchConfig) -> u64 {
    let mut capture =
        FrameCapture::open(CountingSource::finite(frames), config).expect("Failed to open");
    let mut sum = 0;
    while let Some(frame) = capture.read().await.expect("Read failed") {
        sum += black_box(frame);
    }
    capture.stop().await.expect("Stop failed");
    sum
}

fn bench_buffer_sizes(c: &mut Criterion) {
    let rt = runtime();

    let mut group = c.benchmark_group("drain_memory_source");
    group.throughput(Throughput::Elements(FRAMES));

    for buffer_size in [1usize, 4, 16, 64] {
        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            &buffer_size,
            |b, &buffer_size| b.iter(|| rt.block_on(drain(FRAMES, PrefetchConfig::new(buffer_size)))),
        );
    }

    group.finish();
}

fn bench_hidden_latency(c: &mut Criterion) {
    let rt = runtime();

    let mut group = c.benchmark_group("hidden_decode_latency");
    group.sample_size(10);

    // Consumer and decoder each spend ~1ms per frame; with lookahead the two overlap
    group.bench_function("overlapped_decode", |b| {
        b.iter(|| {
            rt.block_on(async {
                let source = CountingSource::finite(20).with_delay(Duration::from_millis(1));
                let mut capture =
                    FrameCapture::open(source, PrefetchConfig::new(4)).expect("Failed to open");
                while let Some(frame) = capture.read().await.expect("Read failed") {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    black_box(frame);
                }
                capture.stop().await.expect("Stop failed");
            })
        })
    });

    group.finish();
}

fn bench_start_stop(c: &mut Criterion) {
    let rt = runtime();

    c.bench_function("start_stop_full_buffer", |b| {
        b.iter(|| {
            rt.block_on(async {
                let source = CountingSource::infinite();
                let counters = source.counters();
                let mut capture =
                    FrameCapture::open(source, PrefetchConfig::new(2)).expect("Failed to open");
                counters.wait_for_produced(3).await;
                capture.stop().await.expect("Stop failed");
            })
        })
    });
}

criterion_group!(benches, bench_buffer_sizes, bench_hidden_latency, bench_start_stop);
criterion_main!(benches);
