pub mod clock;
pub mod config;
pub mod driver;
pub mod lockstep;
pub mod report;

pub use clock::SimulationClock;
pub use config::SimConfig;
pub use driver::Sim;
pub use lockstep::Lockstep;
pub use report::{Reporter, Summary};
