use std::io::Write;

use anyhow::{bail, Result};
use crossbeam::{
    channel::{unbounded, Receiver},
    select,
};
use log::{info, trace};

use super::{
    clock::SimulationClock,
    config::SimConfig,
    lockstep::Lockstep,
    report::{Reporter, Summary},
};
use crate::{
    core::{Dispatcher, Notification, RunSignal, TickReport, WorkloadId},
    workload::{RandomBurst, UnitSet, Workload},
};

pub struct Sim {
    config: SimConfig,
}

impl Sim {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn random_workload(&self) -> impl FnMut(WorkloadId) -> RandomBurst + '_ {
        move |_| {
            RandomBurst::new(
                self.config.burst.clone(),
                self.config.io_probability,
                self.config.io_policy,
            )
        }
    }

    /// Threaded run with randomly sized workloads.
    pub fn run<O: Write>(&self, reporter: &mut Reporter<O>) -> Result<Summary> {
        let mut make = self.random_workload();
        self.run_with(move |id| Ok(make(id)), reporter)
    }

    /// One thread per workload, clock-driven dispatcher on the calling
    /// thread. Each wake handles either a single tick or a single
    /// notification. A factory error aborts before any tick.
    pub fn run_with<W, F, O>(&self, make: F, reporter: &mut Reporter<O>) -> Result<Summary>
    where
        W: Workload + Send + 'static,
        F: FnMut(WorkloadId) -> Result<W>,
        O: Write,
    {
        let mut dispatcher = Dispatcher::new(
            self.config.workloads,
            self.config.quantum,
            self.config.io_block.clone(),
        )?;

        let (notify_tx, notify_rx) = unbounded();
        let mut units = UnitSet::launch(self.config.workloads, make, &notify_tx)?;
        // Only the units hold senders from here on.
        drop(notify_tx);

        let clock = SimulationClock::start(self.config.tick_period);
        info!(
            "simulating {} workloads, quantum={} tick={:?}",
            units.len(),
            self.config.quantum,
            clock.period()
        );

        let result = (|| -> Result<()> {
            while !dispatcher.all_done() {
                select! {
                    recv(clock.ticks()) -> _ => {
                        let report = drain_then_tick(&mut dispatcher, &mut units, &notify_rx)?;
                        reporter.tick(&report.snapshot)?;
                    }
                    recv(notify_rx) -> msg => match msg {
                        Ok(notification) => dispatcher.notify(notification),
                        Err(_) => bail!("every workload unit hung up before finishing"),
                    },
                }
            }
            Ok(())
        })();
        units.shutdown();
        result?;

        trace!("observer checked {} ticks", dispatcher.observer().steps());
        let summary = Summary::from_table(dispatcher.table(), dispatcher.now());
        reporter.summary(&summary)?;
        info!("all workloads done after {} ticks", summary.total_ticks);
        Ok(summary)
    }

    /// Same workloads, no clock and no threads.
    pub fn run_lockstep<O: Write>(&self, reporter: &mut Reporter<O>) -> Result<Summary> {
        let dispatcher = Dispatcher::new(
            self.config.workloads,
            self.config.quantum,
            self.config.io_block.clone(),
        )?;
        let workloads: Vec<_> = (0..self.config.workloads)
            .map(self.random_workload())
            .collect();
        Lockstep::new(dispatcher, workloads).run(reporter)
    }
}

// select! picks randomly between ready arms, so anything that arrived before
// the tick is applied here rather than a tick late.
fn drain_then_tick(
    dispatcher: &mut Dispatcher,
    units: &mut impl RunSignal,
    notify_rx: &Receiver<Notification>,
) -> Result<TickReport> {
    for notification in notify_rx.try_iter() {
        dispatcher.notify(notification);
    }
    dispatcher.tick(units)
}
