use std::{ops::RangeInclusive, time::Duration};

use anyhow::{bail, Result};

use crate::workload::IoPolicy;

pub const DFL_WORKLOADS: usize = 10;
pub const DFL_TICK: Duration = Duration::from_secs(1);
pub const DFL_BURST: RangeInclusive<u32> = 1..=10;
pub const DFL_IO_BLOCK: RangeInclusive<u32> = 1..=5;
pub const DFL_IO_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Ticks a workload may run before it is preempted.
    pub quantum: u32,
    pub workloads: usize,
    pub tick_period: Duration,
    /// Range each unit draws its execution length from.
    pub burst: RangeInclusive<u32>,
    pub io_block: RangeInclusive<u32>,
    /// Chance a finished burst turns into an I/O request.
    pub io_probability: f64,
    pub io_policy: IoPolicy,
}

impl SimConfig {
    pub fn new(quantum: u32) -> Self {
        Self {
            quantum,
            workloads: DFL_WORKLOADS,
            tick_period: DFL_TICK,
            burst: DFL_BURST,
            io_block: DFL_IO_BLOCK,
            io_probability: DFL_IO_PROBABILITY,
            io_policy: IoPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.quantum == 0 {
            bail!("time quantum must be positive");
        }
        if self.workloads == 0 {
            bail!("at least one workload is required");
        }
        if self.tick_period.is_zero() {
            bail!("tick period must be non-zero");
        }
        if self.burst.is_empty() || *self.burst.start() == 0 {
            bail!("execution length range {:?} must be non-empty and positive", self.burst);
        }
        if self.io_block.is_empty() || *self.io_block.start() == 0 {
            bail!("I/O block range {:?} must be non-empty and positive", self.io_block);
        }
        if !(0.0..=1.0).contains(&self.io_probability) {
            bail!("I/O probability {} is outside [0, 1]", self.io_probability);
        }
        Ok(())
    }
}
