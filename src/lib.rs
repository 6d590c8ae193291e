pub mod core;
pub mod sim;
pub mod workload;

pub use crate::core::{Dispatcher, Notification, PcbState, Snapshot};
pub use sim::{Lockstep, Reporter, Sim, SimConfig, Summary};
pub use workload::{IoPolicy, RandomBurst, ScriptedBurst, Workload};
