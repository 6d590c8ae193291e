use std::ops::RangeInclusive;

use anyhow::{bail, Result};
use log::{debug, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{
    event::{DispatchEvent, Notification},
    observer::Observer,
    snapshot::Snapshot,
    state::{ControlBlockTable, PcbState, Ticks, WorkloadId},
};

/// Delivers the "run one tick" notification to a workload unit.
pub trait RunSignal {
    fn run_one_tick(&mut self, id: WorkloadId) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct TickReport {
    pub snapshot: Snapshot,
    pub events: Vec<DispatchEvent>,
}

impl TickReport {
    pub fn refreshed(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, DispatchEvent::QuantumRefresh { .. }))
    }
}

pub struct Dispatcher<R: Rng = StdRng> {
    table: ControlBlockTable,
    running: Option<WorkloadId>,
    // At most one pending request, consumed every tick
    io_latch: Option<WorkloadId>,
    io_block: RangeInclusive<u32>,
    now: Ticks,
    epoch: u64,
    rng: R,
    observer: Observer,
}

impl Dispatcher<StdRng> {
    pub fn new(workloads: usize, quantum: u32, io_block: RangeInclusive<u32>) -> Result<Self> {
        Self::with_rng(workloads, quantum, io_block, StdRng::from_os_rng())
    }
}

impl<R: Rng> Dispatcher<R> {
    pub fn with_rng(
        workloads: usize,
        quantum: u32,
        io_block: RangeInclusive<u32>,
        rng: R,
    ) -> Result<Self> {
        if quantum == 0 {
            bail!("time quantum must be positive");
        }
        if io_block.is_empty() || *io_block.start() == 0 {
            bail!("I/O block duration range {io_block:?} must be non-empty and positive");
        }

        Ok(Self {
            table: ControlBlockTable::new(workloads, quantum),
            running: None,
            io_latch: None,
            io_block,
            now: 0,
            epoch: 0,
            rng,
            observer: Observer::new(),
        })
    }

    /// Latches an asynchronous notification. Nothing here touches the ready
    /// queue; the effect shows up during the next tick.
    pub fn notify(&mut self, notification: Notification) {
        trace!("t={} notification {:?}", self.now, notification);
        let (Notification::Exited { id } | Notification::IoRequest { id }) = notification;
        if id >= self.table.len() {
            warn!("t={} notification {:?} for unknown workload ignored", self.now, notification);
            return;
        }
        match notification {
            Notification::Exited { id } => {
                if self.table.mark_done(id) {
                    debug!("t={} P{id:02} exited", self.now);
                }
            }
            Notification::IoRequest { id } => {
                if let Some(prev) = self.io_latch.replace(id) {
                    debug!("t={} I/O request from P{prev:02} superseded by P{id:02}", self.now);
                }
            }
        }
    }

    pub fn tick(&mut self, signal: &mut impl RunSignal) -> Result<TickReport> {
        self.now += 1;
        let before: Vec<PcbState> = self.table.pcbs().iter().map(|p| p.state).collect();
        let running_before = self.running;
        let mut events = Vec::new();

        // 1. Reap a running workload that exited since the last tick
        if let Some(id) = self.running {
            if self.table.pcb(id).state == PcbState::Done {
                self.running = None;
            }
        }

        // 2. Fairness bookkeeping
        self.table.accrue_ready_wait();

        // 3. Sleepers count down, finished ones rejoin the queue
        self.table.advance_sleepers();

        // 4. Consume the I/O latch
        if let Some(requester) = self.io_latch.take() {
            match self.running {
                Some(id) if id == requester => {
                    let duration = self.rng.random_range(self.io_block.clone());
                    self.table.demote_to_sleep(id, duration);
                    self.running = None;
                }
                _ => events.push(DispatchEvent::IoRequestDropped { requester }),
            }
        }

        // 5. Charge the quantum, preempt on exhaustion
        if let Some(id) = self.running {
            if self.table.charge_quantum(id) == 0 {
                self.table.preempt(id);
                self.running = None;
            }
        }

        // 6. Epoch refresh
        if self.table.quantum_exhausted() {
            self.table.refresh_quanta();
            self.epoch += 1;
            events.push(DispatchEvent::QuantumRefresh { epoch: self.epoch });
        }

        // 7. Pick the next workload
        if self.running.is_none() {
            if let Some(id) = self.table.pop_next_runnable(&mut events) {
                self.table.set_running(id);
                self.running = Some(id);
            }
        }

        self.observer.observe(&self.table, self.running);

        for (workload, (&from, pcb)) in before.iter().zip(self.table.pcbs()).enumerate() {
            if from != pcb.state {
                events.push(DispatchEvent::StateChange {
                    workload,
                    from,
                    to: pcb.state,
                });
            }
        }
        if running_before != self.running {
            events.push(DispatchEvent::RunningChange {
                from: running_before,
                to: self.running,
            });
        }
        for event in &events {
            debug!("t={} {:?}", self.now, event);
        }

        // 8. Snapshot
        let snapshot = Snapshot::capture(self.now, self.running, &self.table);

        // 9. Hand the CPU over for one tick
        if let Some(id) = self.running {
            signal.run_one_tick(id)?;
        }

        Ok(TickReport { snapshot, events })
    }

    pub fn all_done(&self) -> bool {
        self.table.all_done()
    }

    pub fn now(&self) -> Ticks {
        self.now
    }

    pub fn running(&self) -> Option<WorkloadId> {
        self.running
    }

    pub fn quantum(&self) -> u32 {
        self.table.quantum()
    }

    pub fn table(&self) -> &ControlBlockTable {
        &self.table
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}
