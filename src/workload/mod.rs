pub mod burst;
pub mod unit;

use crate::core::{Notification, WorkloadId};
pub use burst::{RandomBurst, ScriptedBurst};
pub use unit::{UnitHandle, UnitSet};

/// What a workload did with one tick of CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    // Blocks on I/O and stays alive
    IoRequest,
    IoThenExit,
    Exit,
}

impl Step {
    /// Notifications the unit sends for this step, in order.
    pub fn notifications(self, id: WorkloadId) -> Vec<Notification> {
        match self {
            Self::Continue => Vec::new(),
            Self::IoRequest => vec![Notification::IoRequest { id }],
            Self::IoThenExit => vec![Notification::IoRequest { id }, Notification::Exited { id }],
            Self::Exit => vec![Notification::Exited { id }],
        }
    }

    pub fn exits(self) -> bool {
        matches!(self, Self::IoThenExit | Self::Exit)
    }
}

/// What an I/O request means for the unit that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum IoPolicy {
    /// Suspend, then resume with a fresh burst once dispatched again.
    #[default]
    Resume,
    /// Request I/O and exit right away.
    Terminate,
}

pub trait Workload {
    /// Consumes one "run one tick" notification.
    fn run_tick(&mut self) -> Step;
}

impl<W: Workload + ?Sized> Workload for Box<W> {
    fn run_tick(&mut self) -> Step {
        (**self).run_tick()
    }
}
