//! # procsim-engine
//!
//! Runs a scheduled operation stream against the simulated hardware and
//! writes the simulation log.
//!
//! - `engine/`: the dispatcher, process states, IO tasks and log sinks
//! - `arrival`: background feed appending processes while the run is live
//! - `runtime`: wires scheduler, queue, feed and dispatcher together

pub mod arrival;
pub mod engine;
pub mod runtime;

pub use arrival::{ArrivalFeed, ArrivalSource, FeedSummary, FileArrivalSource, VecArrivalSource};
pub use engine::{Dispatcher, EngineError, MemorySink, ProcessState, RunSummary, SimLog};
pub use runtime::{SimulationReport, SimulationRuntime};
