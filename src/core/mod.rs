pub mod driver;
pub mod event;
pub mod observer;
pub mod snapshot;
pub mod state;

pub use driver::{Dispatcher, RunSignal, TickReport};
pub use event::{DispatchEvent, Notification};
pub use snapshot::{Snapshot, WorkloadView};
pub use state::{ControlBlockTable, Pcb, PcbState, Ticks, WorkloadId};
