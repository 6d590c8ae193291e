use std::io::Write;

use anyhow::Result;
use rand::{rngs::StdRng, Rng};

use super::report::{Reporter, Summary};
use crate::{
    core::{Dispatcher, Notification, RunSignal, TickReport, WorkloadId},
    workload::Workload,
};

// Runs workloads on the dispatcher's thread and buffers what they report.
struct InlineUnits<W: Workload> {
    units: Vec<Option<W>>,
    pending: Vec<Notification>,
}

impl<W: Workload> RunSignal for InlineUnits<W> {
    fn run_one_tick(&mut self, id: WorkloadId) -> Result<()> {
        let Some(workload) = self.units[id].as_mut() else {
            return Ok(());
        };
        let step = workload.run_tick();
        self.pending.extend(step.notifications(id));
        if step.exits() {
            self.units[id] = None;
        }
        Ok(())
    }
}

/// Clockless driver: every notification a workload emits during tick N is
/// delivered before tick N+1 starts, so a run is fully determined by the
/// workloads and the dispatcher's RNG.
pub struct Lockstep<W: Workload, R: Rng = StdRng> {
    dispatcher: Dispatcher<R>,
    units: InlineUnits<W>,
}

impl<W: Workload, R: Rng> Lockstep<W, R> {
    pub fn new(dispatcher: Dispatcher<R>, workloads: Vec<W>) -> Self {
        assert_eq!(
            dispatcher.table().len(),
            workloads.len(),
            "one workload per control block"
        );
        Self {
            dispatcher,
            units: InlineUnits {
                units: workloads.into_iter().map(Some).collect(),
                pending: Vec::new(),
            },
        }
    }

    pub fn step(&mut self) -> Result<TickReport> {
        let report = self.dispatcher.tick(&mut self.units)?;
        for notification in self.units.pending.drain(..) {
            self.dispatcher.notify(notification);
        }
        Ok(report)
    }

    pub fn all_done(&self) -> bool {
        self.dispatcher.all_done()
    }

    pub fn dispatcher(&self) -> &Dispatcher<R> {
        &self.dispatcher
    }

    pub fn summary(&self) -> Summary {
        Summary::from_table(self.dispatcher.table(), self.dispatcher.now())
    }

    pub fn run<O: Write>(mut self, reporter: &mut Reporter<O>) -> Result<Summary> {
        while !self.all_done() {
            let report = self.step()?;
            reporter.tick(&report.snapshot)?;
        }
        let summary = self.summary();
        reporter.summary(&summary)?;
        Ok(summary)
    }
}
