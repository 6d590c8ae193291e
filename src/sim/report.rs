use std::{fmt, io::Write};

use anyhow::{Context, Result};
use average::Estimate;

use crate::core::{ControlBlockTable, Snapshot, Ticks};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub quantum: u32,
    pub total_ticks: Ticks,
    pub ready_waits: Vec<Ticks>,
}

impl Summary {
    pub fn from_table(table: &ControlBlockTable, total_ticks: Ticks) -> Self {
        Self {
            quantum: table.quantum(),
            total_ticks,
            ready_waits: table.pcbs().iter().map(|p| p.ready_wait_ticks).collect(),
        }
    }

    pub fn average_ready_wait(&self) -> f64 {
        avg(self.ready_waits.iter().map(|&w| w as f64))
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== RESULT ===")?;
        writeln!(f, "TIME_QUANTUM = {}", self.quantum)?;
        writeln!(f, "Total ticks = {}", self.total_ticks)?;
        write!(f, "Average READY wait (ticks) = {:.2}", self.average_ready_wait())
    }
}

fn avg(iter: impl Iterator<Item = f64>) -> f64 {
    iter.collect::<average::Mean>().estimate()
}

/// Writes the per-tick trace and the final summary.
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn tick(&mut self, snapshot: &Snapshot) -> Result<()> {
        writeln!(self.out, "{snapshot}").context("Failed to write tick trace")?;
        self.out.flush().context("Failed to flush tick trace")
    }

    pub fn summary(&mut self, summary: &Summary) -> Result<()> {
        writeln!(self.out, "\n{summary}").context("Failed to write summary")?;
        self.out.flush().context("Failed to flush summary")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PcbState, WorkloadView};

    fn view(state: PcbState, quantum_remaining: u32, sleep_remaining: u32) -> WorkloadView {
        WorkloadView {
            state,
            quantum_remaining,
            sleep_remaining,
            ready_wait_ticks: 0,
        }
    }

    #[test]
    fn tick_line_format() {
        let snapshot = Snapshot {
            tick: 7,
            running: Some(1),
            workloads: vec![
                view(PcbState::Ready, 3, 0),
                view(PcbState::Running, 2, 0),
                view(PcbState::Sleeping, 1, 4),
                view(PcbState::Done, 3, 0),
            ],
        };
        let mut reporter = Reporter::new(Vec::new());
        reporter.tick(&snapshot).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            out,
            "[tick 7] running=P01 | P00:R(tq=3) P01:X(tq=2) P02:S(tq=1,io=4) P03:D(tq=3)\n"
        );
    }

    #[test]
    fn idle_tick_says_none() {
        let snapshot = Snapshot {
            tick: 1,
            running: None,
            workloads: vec![view(PcbState::Sleeping, 3, 2)],
        };
        assert_eq!(snapshot.to_string(), "[tick 1] running=none | P00:S(tq=3,io=2)");
    }

    #[test]
    fn summary_reports_mean_wait() {
        let summary = Summary {
            quantum: 3,
            total_ticks: 30,
            ready_waits: vec![1, 4, 7, 10],
        };
        assert!((summary.average_ready_wait() - 5.5).abs() < f64::EPSILON);
        assert_eq!(
            summary.to_string(),
            "=== RESULT ===\nTIME_QUANTUM = 3\nTotal ticks = 30\nAverage READY wait (ticks) = 5.50"
        );
    }
}
