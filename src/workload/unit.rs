use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, trace, warn};

use super::Workload;
use crate::core::{Notification, RunSignal, WorkloadId};

/// Dispatcher-side handle to one workload unit thread.
pub struct UnitHandle {
    id: WorkloadId,
    run_tx: Sender<()>,
    join: JoinHandle<()>,
}

impl UnitHandle {
    /// Starts the unit suspended on its run mailbox. Every notification it
    /// emits goes out through `notify_tx`.
    pub fn spawn<W>(id: WorkloadId, workload: W, notify_tx: Sender<Notification>) -> Result<Self>
    where
        W: Workload + Send + 'static,
    {
        let (run_tx, run_rx) = unbounded();
        let join = thread::Builder::new()
            .name(format!("workload-{id:02}"))
            .spawn(move || unit_main(id, workload, run_rx, notify_tx))
            .with_context(|| format!("Failed to launch workload unit P{id:02}"))?;
        Ok(Self { id, run_tx, join })
    }

    pub fn id(&self) -> WorkloadId {
        self.id
    }
}

fn unit_main<W: Workload>(
    id: WorkloadId,
    mut workload: W,
    run_rx: Receiver<()>,
    notify_tx: Sender<Notification>,
) {
    // Ends when the dispatcher drops its side of the mailbox.
    for () in run_rx.iter() {
        let step = workload.run_tick();
        trace!("P{id:02} ran one tick: {step:?}");
        for notification in step.notifications(id) {
            if notify_tx.send(notification).is_err() {
                return;
            }
        }
        if step.exits() {
            return;
        }
    }
}

/// All live units, indexed by workload id.
pub struct UnitSet {
    units: Vec<UnitHandle>,
}

impl UnitSet {
    /// Launches one unit per workload. A single launch failure aborts the
    /// lot; units already started see their mailbox close and return.
    pub fn launch<W, F>(count: usize, mut make: F, notify_tx: &Sender<Notification>) -> Result<Self>
    where
        W: Workload + Send + 'static,
        F: FnMut(WorkloadId) -> Result<W>,
    {
        let mut units = Vec::with_capacity(count);
        for id in 0..count {
            let workload =
                make(id).with_context(|| format!("Failed to launch workload unit P{id:02}"))?;
            units.push(UnitHandle::spawn(id, workload, notify_tx.clone())?);
        }
        debug!("launched {count} workload units");
        Ok(Self { units })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Closes every mailbox and waits for the threads.
    pub fn shutdown(self) {
        for unit in self.units {
            let UnitHandle { id, run_tx, join } = unit;
            drop(run_tx);
            if join.join().is_err() {
                warn!("workload unit P{id:02} panicked");
            }
        }
    }
}

impl RunSignal for UnitSet {
    fn run_one_tick(&mut self, id: WorkloadId) -> Result<()> {
        // A unit that already returned has its exit notification in flight.
        if self.units[id].run_tx.send(()).is_err() {
            debug!("P{id:02} is gone, run notification dropped");
        }
        Ok(())
    }
}
