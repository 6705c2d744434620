use banditlab::{BetaSampler, PolicyKind, Simulation, SimulationConfig};

const STEPS: u64 = 5_000;
const SEEDS: u64 = 20;

fn main() {
    let variants: Vec<(&str, SimulationConfig)> = vec![
        ("greedy", SimulationConfig::default().with_policy(PolicyKind::Greedy)),
        (
            "epsilon-greedy(0.1)",
            SimulationConfig::default()
                .with_policy(PolicyKind::EpsilonGreedy)
                .with_epsilon(0.1),
        ),
        (
            "ucb(c=2)",
            SimulationConfig::default()
                .with_policy(PolicyKind::Ucb)
                .with_ucb_coefficient(2.0),
        ),
        (
            "thompson(power-ratio)",
            SimulationConfig::default().with_policy(PolicyKind::Thompson),
        ),
        (
            "thompson(exact)",
            SimulationConfig::default()
                .with_policy(PolicyKind::Thompson)
                .with_beta_sampler(BetaSampler::Exact),
        ),
    ];

    println!(
        "{:<24} {:>12} {:>12} {:>10} {:>12}",
        "policy", "mean_reward", "regret", "explore%", "best_arm%"
    );
    for (name, base) in variants {
        let (mut reward, mut regret, mut explore, mut best_share) = (0.0, 0.0, 0.0, 0.0);
        for seed in 0..SEEDS {
            let mut sim = Simulation::new(base.clone().with_seed(seed)).expect("valid config");
            sim.run(STEPS).expect("arm ids come from the registry");
            let e = sim.episode();
            reward += e.mean_reward();
            regret += e.regret;
            explore += e.explore_percent();
            let best = sim.registry().optimal_arm_id();
            best_share += sim.registry().arms()[best].pull_count() as f64 / STEPS as f64;
        }
        let n = SEEDS as f64;
        println!(
            "{:<24} {:>12.3} {:>12.1} {:>10.1} {:>12.1}",
            name,
            reward / n,
            regret / n,
            explore / n,
            100.0 * best_share / n
        );
    }
}
