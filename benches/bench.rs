use criterion::{criterion_group, criterion_main, Bencher, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use sentinel_rbtree::RbTree;
use std::hint::black_box;

struct KeyGenerator {
    rng: StdRng,
    limit: u32,
}
impl KeyGenerator {
    fn new() -> Self {
        const LIMIT: u32 = 1_000_000;
        Self {
            rng: StdRng::from_seed([0; 32]),
            limit: LIMIT,
        }
    }

    fn next(&mut self) -> u32 {
        self.rng.gen_range(0..self.limit)
    }
}

// insert helper fn
fn rbtree_insert(count: usize, bench: &mut Bencher) {
    let mut gen = KeyGenerator::new();
    let keys: Vec<_> = std::iter::repeat_with(|| gen.next()).take(count).collect();
    bench.iter(|| {
        let mut tree = RbTree::new();
        for k in keys.iter().copied() {
            black_box(tree.insert(k, ()));
        }
    });
}

// insert and delete helper fn
fn rbtree_insert_delete(count: usize, bench: &mut Bencher) {
    let mut gen = KeyGenerator::new();
    let keys: Vec<_> = std::iter::repeat_with(|| gen.next()).take(count).collect();
    bench.iter(|| {
        let mut tree = RbTree::new();
        for k in keys.iter().copied() {
            black_box(tree.insert(k, ()));
        }
        for k in &keys {
            black_box(tree.delete(k));
        }
    });
}

// search helper fn
fn rbtree_search(count: usize, bench: &mut Bencher) {
    let mut gen = KeyGenerator::new();
    let keys: Vec<_> = std::iter::repeat_with(|| gen.next()).take(count).collect();
    let mut tree = RbTree::new();
    for k in keys.iter().copied() {
        tree.insert(k, ());
    }
    bench.iter(|| {
        for k in &keys {
            black_box(tree.search(k));
        }
    });
}

// successor walk helper fn
fn rbtree_successor_walk(count: usize, bench: &mut Bencher) {
    let mut gen = KeyGenerator::new();
    let mut tree = RbTree::new();
    for _ in 0..count {
        tree.insert(gen.next(), ());
    }
    bench.iter(|| {
        let mut cur = tree.minimum();
        while let Some(node) = cur {
            cur = black_box(tree.successor(node).ok().flatten());
        }
    });
}

fn bench_rbtree_insert(c: &mut Criterion) {
    c.bench_function("bench_rbtree_insert_100", |b| rbtree_insert(100, b));
    c.bench_function("bench_rbtree_insert_1000", |b| rbtree_insert(1000, b));
    c.bench_function("bench_rbtree_insert_10,000", |b| rbtree_insert(10_000, b));
    c.bench_function("bench_rbtree_insert_100,000", |b| {
        rbtree_insert(100_000, b)
    });
}

fn bench_rbtree_insert_delete(c: &mut Criterion) {
    c.bench_function("bench_rbtree_insert_delete_100", |b| {
        rbtree_insert_delete(100, b)
    });
    c.bench_function("bench_rbtree_insert_delete_1000", |b| {
        rbtree_insert_delete(1000, b)
    });
    c.bench_function("bench_rbtree_insert_delete_10,000", |b| {
        rbtree_insert_delete(10_000, b)
    });
    c.bench_function("bench_rbtree_insert_delete_100,000", |b| {
        rbtree_insert_delete(100_000, b)
    });
}

fn bench_rbtree_search(c: &mut Criterion) {
    c.bench_function("bench_rbtree_search_1000", |b| rbtree_search(1000, b));
    c.bench_function("bench_rbtree_search_100,000", |b| {
        rbtree_search(100_000, b)
    });
}

fn bench_rbtree_successor_walk(c: &mut Criterion) {
    c.bench_function("bench_rbtree_successor_walk_1000", |b| {
        rbtree_successor_walk(1000, b)
    });
    c.bench_function("bench_rbtree_successor_walk_100,000", |b| {
        rbtree_successor_walk(100_000, b)
    });
}

fn criterion_config() -> Criterion {
    Criterion::default().configure_from_args().without_plots()
}

criterion_group! {
    name = benches_basic_op;
    config = criterion_config();
    targets = bench_rbtree_insert, bench_rbtree_insert_delete,
}

criterion_group! {
    name = benches_query;
    config = criterion_config();
    targets = bench_rbtree_search, bench_rbtree_successor_walk
}

criterion_main!(benches_basic_op, benches_query);
