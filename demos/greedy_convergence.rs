use banditlab::{PolicyKind, Simulation, SimulationConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    let cfg = SimulationConfig::default()
        .with_policy(PolicyKind::Greedy)
        .with_seed(seed);
    let mut sim = Simulation::new(cfg).expect("default config is valid");

    for _ in 0..5_000 {
        let r = sim.step().expect("arm ids come from the registry");
        if r.step <= 6 || r.step % 500 == 0 {
            eprintln!(
                "t={:5} {:<60} reward={} total={:6} regret={:7.1}",
                r.step, r.diagnostic.to_string(), r.reward, r.total_reward, r.regret
            );
        }
    }

    let e = sim.episode();
    eprintln!(
        "seed={seed} mean_reward={:.3} (optimal {:.3})",
        e.mean_reward(),
        sim.registry().optimal_probability()
    );
    for a in sim.snapshot().arms {
        eprintln!(
            "  arm {}: Q={:.3} N={}",
            a.id + 1,
            a.estimated_value,
            a.pull_count
        );
    }
}
