use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use gravity_merge::{Bounds, Config, Simulation};

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("gravity_merge_backends");
    group.sample_size(10);

    // Same disk for every backend so the merge pattern matches.
    let setup_sim = |workers: usize| {
        let config = Config::default().with_workers(workers);
        let mut sim = Simulation::new(config).expect("backend");
        let mut rng = fastrand::Rng::with_seed(0);
        sim.reset_accretion_disk(4000, 720.0, 1000.0, Bounds::from_size(1000.0, 720.0), &mut rng)
            .expect("scenario");
        sim
    };

    let threads = std::thread::available_parallelism().map_or(4, |n| n.get());
    let mut counts = vec![1, 2, threads];
    counts.sort_unstable();
    counts.dedup();
    for workers in counts {
        let mut sim = setup_sim(workers);
        // Warmup
        sim.step();

        group.throughput(Throughput::Elements(sim.bodies().len() as u64));
        group.bench_function(format!("workers_{workers}"), |b| {
            b.iter(|| sim.step());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_backends);
criterion_main!(benches);
