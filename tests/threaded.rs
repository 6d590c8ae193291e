use std::time::Duration;

use rrsim::{Reporter, ScriptedBurst, Sim, SimConfig};

fn config(workloads: usize, quantum: u32) -> SimConfig {
    let mut config = SimConfig::new(quantum);
    config.workloads = workloads;
    config.tick_period = Duration::from_millis(20);
    config
}

#[test]
fn threaded_run_finishes_every_unit() {
    let sim = Sim::new(config(4, 2)).unwrap();
    let mut reporter = Reporter::new(Vec::new());
    let summary = sim
        .run_with(|_| Ok(ScriptedBurst::new([3])), &mut reporter)
        .unwrap();

    assert_eq!(summary.quantum, 2);
    assert_eq!(summary.ready_waits.len(), 4);
    // Each unit needs three run notifications, one per tick.
    assert!(summary.total_ticks >= 12, "only {} ticks", summary.total_ticks);

    let out = String::from_utf8(reporter.into_inner()).unwrap();
    assert!(out.starts_with("[tick 1] running=P00 |"));
    assert!(out.contains("=== RESULT ==="));
    assert_eq!(
        out.lines().filter(|l| l.starts_with("[tick ")).count() as u64,
        summary.total_ticks
    );
}

#[test]
fn threaded_run_with_io_requests_finishes() {
    let sim = Sim::new(config(3, 3)).unwrap();
    let mut reporter = Reporter::new(Vec::new());
    let summary = sim
        .run_with(|id| Ok(ScriptedBurst::new([1 + id as u32, 1])), &mut reporter)
        .unwrap();
    assert_eq!(summary.ready_waits.len(), 3);
    assert!(summary.total_ticks >= 6);
}

#[test]
fn invalid_config_is_rejected_before_running() {
    assert!(Sim::new(SimConfig::new(0)).is_err());
}

#[test]
fn launch_failure_aborts_before_any_tick() {
    let sim = Sim::new(config(5, 2)).unwrap();
    let mut reporter = Reporter::new(Vec::new());
    let result = sim.run_with(
        |id| {
            if id == 3 {
                anyhow::bail!("out of threads");
            }
            Ok(ScriptedBurst::new([2]))
        },
        &mut reporter,
    );

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("P03"));
    assert!(reporter.into_inner().is_empty(), "no tick output expected");
}
