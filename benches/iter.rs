use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use densecs::context::{Context, GroupSchema};
use densecs::group::EntityGroup;
use densecs::manager::TypedManager;
use densecs::EntityID;

#[derive(Clone, Copy, Default)]
struct Position(f32, f32, f32);

struct Schema;

impl GroupSchema for Schema {
    fn build(group: &mut EntityGroup) {
        group.add_manager::<TypedManager<Position>>();
    }
}

fn populated(size: u32) -> (Context<Schema>, densecs::GroupID, Vec<EntityID>) {
    let mut ctx = Context::<Schema>::new();
    let g0 = ctx.add_group();
    ctx.reserve_entities(g0, size as u16);
    ctx.reserve::<Position>(g0, size as u16);

    let entities: Vec<EntityID> = (0..size).map(|_| ctx.add_entity(g0)).collect();
    (ctx, g0, entities)
}

fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");
    for size in [100, 1_000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_batched(
                || populated(size),
                |(mut ctx, _g0, entities)| {
                    for &e in &entities {
                        ctx.add(e, Position(1.0, 2.0, 3.0));
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    for size in [100, 1_000, 10_000, 100_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let (mut ctx, _g0, entities) = populated(size);
            for &e in &entities {
                ctx.add(e, Position(1.0, 2.0, 3.0));
            }

            b.iter(|| {
                let mut sum = 0.0f32;
                for &e in &entities {
                    sum += ctx.get::<Position>(e).0;
                }
                sum
            });
        });
    }
}

fn bench_remove_from_front(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove_from_front");
    for size in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter_batched(
                || {
                    let (mut ctx, _g0, entities) = populated(size);
                    for &e in &entities {
                        ctx.add(e, Position(1.0, 2.0, 3.0));
                    }
                    (ctx, entities)
                },
                |(mut ctx, entities)| {
                    for &e in &entities {
                        ctx.remove::<Position>(e);
                    }
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(30);
    targets = bench_add, bench_get, bench_remove_from_front
}
criterion_main! { benches }
