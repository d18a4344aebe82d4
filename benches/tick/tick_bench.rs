use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use ixa_grid_spread::{NullSink, ParametersBuilder, Simulation};

static SEED: u64 = 123;

fn simulation(population_size: usize) -> Simulation {
    let parameters = ParametersBuilder::default()
        .population_size(population_size)
        .initial_infected(5)
        .comorbid_count(population_size / 10)
        .width(100)
        .height(100)
        .seed(SEED)
        .build()
        .unwrap();
    Simulation::new(&parameters).unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("step 10k people", |bencher| {
        bencher.iter_batched_ref(
            || simulation(10_000),
            |simulation| simulation.step(&mut NullSink),
            BatchSize::LargeInput,
        );
    });

    c.bench_function("run 1k people to completion", |bencher| {
        bencher.iter_batched_ref(
            || simulation(1_000),
            |simulation| simulation.run(100_000, &mut NullSink),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
