use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver};

/// Periodic tick source. The underlying channel holds at most one pending
/// tick, so a slow consumer never catches up on missed ones.
pub struct SimulationClock {
    period: Duration,
    ticks: Receiver<Instant>,
}

impl SimulationClock {
    pub fn start(period: Duration) -> Self {
        Self {
            period,
            ticks: channel::tick(period),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn ticks(&self) -> &Receiver<Instant> {
        &self.ticks
    }
}
