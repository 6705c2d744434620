use banditlab::{BetaSampler, PolicyKind, Simulation, SimulationConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn step(sim: &mut Simulation) -> u64 {
    sim.step().unwrap().step
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    for &n_arms in &[4usize, 32usize, 256usize] {
        // A deterministic, slightly-non-uniform probability pattern.
        let probs: Vec<f64> = (0..n_arms).map(|i| ((i * 17 + 3) % 101) as f64 / 100.0).collect();

        for policy in PolicyKind::ALL {
            let cfg = SimulationConfig::default()
                .with_true_probabilities(probs.clone())
                .with_policy(policy)
                .with_seed(123);
            group.bench_with_input(BenchmarkId::new(policy.as_str(), n_arms), &cfg, |b, cfg| {
                let mut sim = Simulation::new(cfg.clone()).unwrap();
                // Past warm-up so the policy's scoring path is measured.
                sim.run(n_arms as u64).unwrap();
                b.iter(|| black_box(step(&mut sim)));
            });
        }

        let cfg = SimulationConfig::default()
            .with_true_probabilities(probs.clone())
            .with_policy(PolicyKind::Thompson)
            .with_beta_sampler(BetaSampler::Exact)
            .with_seed(123);
        group.bench_with_input(BenchmarkId::new("thompson-exact", n_arms), &cfg, |b, cfg| {
            let mut sim = Simulation::new(cfg.clone()).unwrap();
            sim.run(n_arms as u64).unwrap();
            b.iter(|| black_box(step(&mut sim)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step);
criterion_main!(benches);
