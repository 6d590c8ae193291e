use super::state::{ControlBlockTable, PcbState, Ticks, WorkloadId};

/// Checks the table invariants after every tick. Violations are bugs in the
/// dispatcher, so they only fire in debug builds.
#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
    last: Vec<(PcbState, Ticks)>,
}

impl Observer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, table: &ControlBlockTable, running: Option<WorkloadId>) {
        self.step += 1;

        let running_count = table
            .pcbs()
            .iter()
            .filter(|p| p.state == PcbState::Running)
            .count();
        debug_assert!(running_count <= 1, "{running_count} workloads RUNNING at once");
        if let Some(id) = running {
            debug_assert_eq!(
                table.pcb(id).state,
                PcbState::Running,
                "running slot holds workload {id} which is not RUNNING"
            );
        } else {
            debug_assert_eq!(running_count, 0, "RUNNING workload with an empty running slot");
        }

        for pcb in table.pcbs() {
            let entries = table.ready_queue().iter().filter(|&&q| q == pcb.id).count();
            if pcb.in_ready_queue {
                debug_assert_eq!(entries, 1, "workload {} flagged queued but has {entries} entries", pcb.id);
                debug_assert!(pcb.quantum_remaining > 0, "queued workload {} has no quantum", pcb.id);
            } else if pcb.state != PcbState::Done {
                debug_assert_eq!(entries, 0, "unflagged workload {} sits in the ready queue", pcb.id);
            }
        }

        for (pcb, &(prev_state, prev_wait)) in table.pcbs().iter().zip(&self.last) {
            debug_assert!(
                pcb.ready_wait_ticks >= prev_wait,
                "ready wait of workload {} went backwards",
                pcb.id
            );
            if prev_state == PcbState::Done {
                debug_assert_eq!(pcb.state, PcbState::Done, "workload {} left DONE", pcb.id);
            }
        }

        self.last = table
            .pcbs()
            .iter()
            .map(|p| (p.state, p.ready_wait_ticks))
            .collect();
    }
}
