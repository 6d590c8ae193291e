use crate::core::{PcbState, WorkloadId};

/// Messages a workload unit sends back to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    IoRequest { id: WorkloadId },
    Exited { id: WorkloadId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    StateChange {
        workload: WorkloadId,
        from: PcbState,
        to: PcbState,
    },
    RunningChange {
        from: Option<WorkloadId>,
        to: Option<WorkloadId>,
    },
    // Whole non-DONE cohort refilled
    QuantumRefresh {
        epoch: u64,
    },
    // Latch consumed with nobody (or somebody else) on the CPU
    IoRequestDropped {
        requester: WorkloadId,
    },
    StaleEntrySkipped {
        workload: WorkloadId,
    },
}
