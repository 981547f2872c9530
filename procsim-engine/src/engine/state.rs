//! Process control block and its state machine.

use crate::engine::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Start,
    Ready,
    Running,
    Waiting,
    Exit,
}

impl ProcessState {
    pub fn can_transition_to(self, next: ProcessState) -> bool {
        use ProcessState::*;
        matches!(
            (self, next),
            (Start, Ready) | (Ready, Running) | (Running, Waiting) | (Waiting, Running) | (Running, Exit)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcb {
    /// Display number, resolved through the identity map.
    pub ordinal: usize,
    state: ProcessState,
}

impl Pcb {
    pub fn new(ordinal: usize) -> Self {
        Self {
            ordinal,
            state: ProcessState::Start,
        }
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn transition(&mut self, next: ProcessState) -> Result<(), EngineError> {
        if !self.state.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                process: self.ordinal,
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}
