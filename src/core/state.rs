use std::collections::VecDeque;

use super::event::DispatchEvent;

// Index into the PCB Vec
pub type WorkloadId = usize;
pub type Ticks = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcbState {
    Ready,
    Running,
    Sleeping,
    Done,
}

impl PcbState {
    /// One-letter code used by the per-tick trace.
    pub fn code(self) -> char {
        match self {
            Self::Ready => 'R',
            Self::Running => 'X',
            Self::Sleeping => 'S',
            Self::Done => 'D',
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pcb {
    pub id: WorkloadId,
    pub state: PcbState,
    pub quantum_remaining: u32,
    pub sleep_remaining: u32,
    pub ready_wait_ticks: Ticks,
    pub in_ready_queue: bool,
}

/// PCBs plus the FIFO ready queue. Only the dispatcher mutates it.
#[derive(Debug)]
pub struct ControlBlockTable {
    pcbs: Vec<Pcb>,
    ready: VecDeque<WorkloadId>,
    quantum: u32,
}

impl ControlBlockTable {
    /// Every workload starts READY with a full quantum, enqueued in id order.
    pub(crate) fn new(workloads: usize, quantum: u32) -> Self {
        let pcbs = (0..workloads)
            .map(|id| Pcb {
                id,
                state: PcbState::Ready,
                quantum_remaining: quantum,
                sleep_remaining: 0,
                ready_wait_ticks: 0,
                in_ready_queue: false,
            })
            .collect();

        let mut table = Self {
            pcbs,
            ready: VecDeque::with_capacity(workloads),
            quantum,
        };
        for id in 0..workloads {
            table.promote_to_ready(id);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.pcbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcbs.is_empty()
    }

    pub fn quantum(&self) -> u32 {
        self.quantum
    }

    pub fn pcb(&self, id: WorkloadId) -> &Pcb {
        &self.pcbs[id]
    }

    pub fn pcbs(&self) -> &[Pcb] {
        &self.pcbs
    }

    pub fn ready_queue(&self) -> &VecDeque<WorkloadId> {
        &self.ready
    }

    pub fn all_done(&self) -> bool {
        self.pcbs.iter().all(|pcb| pcb.state == PcbState::Done)
    }

    pub(crate) fn promote_to_ready(&mut self, id: WorkloadId) {
        let pcb = &mut self.pcbs[id];
        if pcb.state == PcbState::Done {
            return;
        }
        pcb.state = PcbState::Ready;
        if pcb.quantum_remaining > 0 && !pcb.in_ready_queue {
            pcb.in_ready_queue = true;
            self.ready.push_back(id);
        }
    }

    pub(crate) fn demote_to_sleep(&mut self, id: WorkloadId, duration: u32) {
        let pcb = &mut self.pcbs[id];
        if pcb.state == PcbState::Done {
            return;
        }
        pcb.state = PcbState::Sleeping;
        pcb.sleep_remaining = duration;
        pcb.in_ready_queue = false;
    }

    // Leaves any queue entry in place; pop_next_runnable discards it later.
    pub(crate) fn mark_done(&mut self, id: WorkloadId) -> bool {
        let pcb = &mut self.pcbs[id];
        if pcb.state == PcbState::Done {
            return false;
        }
        pcb.state = PcbState::Done;
        pcb.sleep_remaining = 0;
        pcb.in_ready_queue = false;
        true
    }

    pub(crate) fn set_running(&mut self, id: WorkloadId) {
        let pcb = &mut self.pcbs[id];
        debug_assert_eq!(pcb.state, PcbState::Ready, "workload {id} must be READY to run");
        debug_assert!(!pcb.in_ready_queue, "running workload {id} still flagged as queued");
        pcb.state = PcbState::Running;
    }

    pub(crate) fn accrue_ready_wait(&mut self) {
        for pcb in self.pcbs.iter_mut().filter(|p| p.state == PcbState::Ready) {
            pcb.ready_wait_ticks += 1;
        }
    }

    /// Counts down every sleeper; those reaching zero become READY.
    pub(crate) fn advance_sleepers(&mut self) {
        for id in 0..self.pcbs.len() {
            let pcb = &mut self.pcbs[id];
            if pcb.state != PcbState::Sleeping {
                continue;
            }
            pcb.sleep_remaining = pcb.sleep_remaining.saturating_sub(1);
            if pcb.sleep_remaining == 0 {
                self.promote_to_ready(id);
            }
        }
    }

    // Returns the quantum left after charging one tick.
    pub(crate) fn charge_quantum(&mut self, id: WorkloadId) -> u32 {
        let pcb = &mut self.pcbs[id];
        pcb.quantum_remaining = pcb.quantum_remaining.saturating_sub(1);
        pcb.quantum_remaining
    }

    pub(crate) fn preempt(&mut self, id: WorkloadId) {
        self.pcbs[id].state = PcbState::Ready;
        self.promote_to_ready(id);
    }

    pub fn quantum_exhausted(&self) -> bool {
        self.pcbs
            .iter()
            .filter(|p| p.state != PcbState::Done)
            .all(|p| p.quantum_remaining == 0)
    }

    /// Refills the whole non-DONE cohort at once.
    pub(crate) fn refresh_quanta(&mut self) {
        for id in 0..self.pcbs.len() {
            let pcb = &mut self.pcbs[id];
            if pcb.state == PcbState::Done {
                continue;
            }
            pcb.quantum_remaining = self.quantum;
            if pcb.state == PcbState::Ready {
                self.promote_to_ready(id);
            }
        }
    }

    /// Pops until a READY workload with quantum left turns up. Anything else
    /// popped on the way is dropped and reported through `skipped`.
    pub(crate) fn pop_next_runnable(
        &mut self,
        skipped: &mut Vec<DispatchEvent>,
    ) -> Option<WorkloadId> {
        while let Some(id) = self.ready.pop_front() {
            let pcb = &mut self.pcbs[id];
            pcb.in_ready_queue = false;
            if pcb.state == PcbState::Ready && pcb.quantum_remaining > 0 {
                return Some(id);
            }
            skipped.push(DispatchEvent::StaleEntrySkipped { workload: id });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_enqueues_in_id_order() {
        let table = ControlBlockTable::new(4, 3);
        assert_eq!(table.ready_queue().iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert!(table.pcbs().iter().all(|p| p.in_ready_queue && p.quantum_remaining == 3));
    }

    #[test]
    fn promote_is_noop_for_done() {
        let mut table = ControlBlockTable::new(2, 3);
        assert!(table.mark_done(1));
        table.promote_to_ready(1);
        assert_eq!(table.pcb(1).state, PcbState::Done);
        assert!(!table.pcb(1).in_ready_queue);
        assert!(!table.mark_done(1));
    }

    #[test]
    fn promote_never_duplicates_queue_entry() {
        let mut table = ControlBlockTable::new(1, 3);
        table.promote_to_ready(0);
        table.promote_to_ready(0);
        assert_eq!(table.ready_queue().len(), 1);
    }

    #[test]
    fn promote_with_exhausted_quantum_does_not_enqueue() {
        let mut table = ControlBlockTable::new(1, 1);
        let mut skipped = Vec::new();
        let id = table.pop_next_runnable(&mut skipped).unwrap();
        table.set_running(id);
        assert_eq!(table.charge_quantum(id), 0);
        table.preempt(id);
        assert_eq!(table.pcb(id).state, PcbState::Ready);
        assert!(table.ready_queue().is_empty());
        assert!(table.quantum_exhausted());

        table.refresh_quanta();
        assert_eq!(table.pcb(id).quantum_remaining, 1);
        assert_eq!(table.ready_queue().len(), 1);
    }

    #[test]
    fn demote_then_sleep_countdown_promotes() {
        let mut table = ControlBlockTable::new(1, 3);
        let mut skipped = Vec::new();
        let id = table.pop_next_runnable(&mut skipped).unwrap();
        table.set_running(id);
        table.demote_to_sleep(id, 2);
        assert_eq!(table.pcb(id).state, PcbState::Sleeping);

        table.advance_sleepers();
        assert_eq!(table.pcb(id).sleep_remaining, 1);
        assert_eq!(table.pcb(id).state, PcbState::Sleeping);

        table.advance_sleepers();
        assert_eq!(table.pcb(id).sleep_remaining, 0);
        assert_eq!(table.pcb(id).state, PcbState::Ready);
        assert!(table.pcb(id).in_ready_queue);
    }

    #[test]
    fn pop_skips_done_entries() {
        let mut table = ControlBlockTable::new(3, 3);
        table.mark_done(0);
        table.mark_done(1);
        let mut skipped = Vec::new();
        assert_eq!(table.pop_next_runnable(&mut skipped), Some(2));
        assert_eq!(skipped.len(), 2);
        assert!(table.ready_queue().is_empty());
        assert_eq!(table.pop_next_runnable(&mut skipped), None);
    }

    #[test]
    fn ready_wait_only_accrues_for_ready() {
        let mut table = ControlBlockTable::new(2, 3);
        let mut skipped = Vec::new();
        let id = table.pop_next_runnable(&mut skipped).unwrap();
        table.set_running(id);
        table.accrue_ready_wait();
        assert_eq!(table.pcb(0).ready_wait_ticks, 0);
        assert_eq!(table.pcb(1).ready_wait_ticks, 1);
    }
}
