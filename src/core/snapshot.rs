use std::fmt;

use super::state::{ControlBlockTable, PcbState, Ticks, WorkloadId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadView {
    pub state: PcbState,
    pub quantum_remaining: u32,
    pub sleep_remaining: u32,
    pub ready_wait_ticks: Ticks,
}

/// State of every workload as seen at the end of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tick: Ticks,
    pub running: Option<WorkloadId>,
    pub workloads: Vec<WorkloadView>,
}

impl Snapshot {
    pub(crate) fn capture(
        tick: Ticks,
        running: Option<WorkloadId>,
        table: &ControlBlockTable,
    ) -> Self {
        let workloads = table
            .pcbs()
            .iter()
            .map(|pcb| WorkloadView {
                state: pcb.state,
                quantum_remaining: pcb.quantum_remaining,
                sleep_remaining: pcb.sleep_remaining,
                ready_wait_ticks: pcb.ready_wait_ticks,
            })
            .collect();
        Self {
            tick,
            running,
            workloads,
        }
    }

    pub fn state(&self, id: WorkloadId) -> PcbState {
        self.workloads[id].state
    }

    pub fn count(&self, state: PcbState) -> usize {
        self.workloads.iter().filter(|w| w.state == state).count()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[tick {}] running=", self.tick)?;
        match self.running {
            Some(id) => write!(f, "P{id:02}")?,
            None => write!(f, "none")?,
        }
        write!(f, " |")?;
        for (id, w) in self.workloads.iter().enumerate() {
            write!(f, " P{id:02}:{}(tq={}", w.state.code(), w.quantum_remaining)?;
            if w.state == PcbState::Sleeping {
                write!(f, ",io={}", w.sleep_remaining)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}
