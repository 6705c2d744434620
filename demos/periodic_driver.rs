use std::ops::ControlFlow;

use banditlab::{Driver, PolicyKind, SimulationConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("banditlab=info"))
        .init();

    let cfg = SimulationConfig::default()
        .with_policy(PolicyKind::Ucb)
        .with_step_interval_ms(20);
    let mut driver = Driver::from_config(cfg).expect("valid config");

    let taken = driver
        .run_periodic(50, |r| {
            eprintln!("t={:3} [{}] {}", r.step, r.action, r.diagnostic);
            if r.regret > 10.0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .await
        .expect("arm ids come from the registry");
    eprintln!("periodic run took {taken} steps, now {:?}", driver.run_state());

    // Tuning c does not restart the episode.
    driver.set_ucb_coefficient(0.5).expect("c > 0");
    let r = driver.step_once().expect("arm ids come from the registry");
    eprintln!("single step with c=0.5: t={} {}", r.step, r.diagnostic);

    driver.set_speed(1000);

    // Switching policy is a cancellation point: the session restarts from zero.
    let next = driver
        .simulation()
        .config()
        .clone()
        .with_policy(PolicyKind::Thompson);
    driver.reconfigure(next).expect("valid config");
    eprintln!(
        "after reconfigure (interval {:?}): {:?}",
        driver.interval(),
        driver.simulation().snapshot()
    );
}
