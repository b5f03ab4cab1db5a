use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ringfork::{ParallelMapper, RingBuffer};

fn bench_ring_buffer(c: &mut Criterion) {
    let mut rb = RingBuffer::new(1 << 10).unwrap();
    rb.extend(0u64..1 << 10);

    c.bench_function("push_back_overwrite_u64", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i = i.wrapping_add(1);
            black_box(rb.push_back(i));
        })
    });

    c.bench_function("push_pop_roundtrip_u64", |b| {
        let mut rb = RingBuffer::new(64).unwrap();
        b.iter(|| {
            rb.push_back(black_box(7u64));
            black_box(rb.pop_front().unwrap());
        })
    });
}

fn bench_parallel_map(c: &mut Criterion) {
    let input: Vec<i32> = (0..1_000_000).collect();

    for workers in [1, 4] {
        let mapper = ParallelMapper::new(workers);
        c.bench_function(&format!("map_clamp_1m_{}_workers", workers), |b| {
            b.iter(|| mapper.map(&input, |&p| (p + 50).clamp(0, 255)).unwrap())
        });
    }
}

criterion_group!(benches, bench_ring_buffer, bench_parallel_map);
criterion_main!(benches);
