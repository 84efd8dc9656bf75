use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use periodici::channel::{EventChannel, EventRecord};
use periodici::counter::SharedCounter;

const NUM_THREADS: usize = 4;
const ITERATIONS_PER_THREAD: usize = 100_000;

fn bench_counter_increment(c: &mut Criterion) {
    let mut group = c.benchmark_group("counter_increment");

    group.bench_function(
        BenchmarkId::new(
            "SharedCounter (timed lock)",
            format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD),
        ),
        |b| {
            b.iter(|| {
                let counter = Arc::new(SharedCounter::new(Duration::from_millis(100)));
                let mut handles = vec![];

                for _ in 0..NUM_THREADS {
                    let counter_clone = Arc::clone(&counter);
                    let handle = thread::spawn(move || {
                        for _ in 0..ITERATIONS_PER_THREAD {
                            counter_clone.increment(1);
                        }
                    });
                    handles.push(handle);
                }

                for handle in handles {
                    handle.join().unwrap();
                }

                black_box(counter.read())
            })
        },
    );

    group.bench_function(
        BenchmarkId::new(
            "AtomicI32 (lock-free)",
            format!("{}threads x {}iter", NUM_THREADS, ITERATIONS_PER_THREAD),
        ),
        |b| {
            b.iter(|| {
                let counter = Arc::new(AtomicI32::new(0));
                let mut handles = vec![];

                for _ in 0..NUM_THREADS {
                    let counter_clone = Arc::clone(&counter);
                    let handle = thread::spawn(move || {
                        for _ in 0..ITERATIONS_PER_THREAD {
                            counter_clone.fetch_add(1, Ordering::Relaxed);
                        }
                    });
                    handles.push(handle);
                }

                for handle in handles {
                    handle.join().unwrap();
                }

                black_box(counter.load(Ordering::Relaxed))
            })
        },
    );

    group.finish();
}

fn bench_channel_send_drain(c: &mut Criterion) {
    c.bench_function("channel_fill_and_drain_512", |b| {
        let channel = EventChannel::default();
        b.iter(|| {
            for i in 0..512 {
                channel.try_send(EventRecord::format(format_args!(
                    "Incremented by {} to ... {}",
                    i % 5 + 1,
                    i
                )));
            }
            black_box(channel.drain().count())
        })
    });
}

criterion_group!(benches, bench_counter_increment, bench_channel_send_drain);
criterion_main!(benches);
