mod dispatcher;
mod error;
mod io;
mod log;
mod state;

pub use self::{
    dispatcher::{Dispatcher, RunSummary},
    error::EngineError,
    io::IoSimulator,
    log::{MemorySink, SimLog},
    state::{Pcb, ProcessState},
};

pub mod prelude {
    pub use super::{Dispatcher, EngineError, IoSimulator, SimLog};
}
