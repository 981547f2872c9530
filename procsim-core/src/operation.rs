//! ## procsim-core::operation
//! **Typed meta-data operations**
//!
//! An operation is one `<code>{<label>}<cycles>` instruction. The pairing of
//! kind and label is checked when the operation is built, so everything past
//! the loader can match on the enums without a fallback arm.

use std::fmt;
use std::str::FromStr;

use crate::error::OperationError;

/// Operation kind, one per meta-data code letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    System,
    Application,
    Process,
    Memory,
    Input,
    Output,
}

impl OpKind {
    /// Meta-data code letter for this kind.
    pub fn code(self) -> char {
        match self {
            OpKind::System => 'S',
            OpKind::Application => 'A',
            OpKind::Process => 'P',
            OpKind::Memory => 'M',
            OpKind::Input => 'I',
            OpKind::Output => 'O',
        }
    }

    pub fn from_code(code: char) -> Result<Self, OperationError> {
        match code {
            'S' => Ok(OpKind::System),
            'A' => Ok(OpKind::Application),
            'P' => Ok(OpKind::Process),
            'M' => Ok(OpKind::Memory),
            'I' => Ok(OpKind::Input),
            'O' => Ok(OpKind::Output),
            other => Err(OperationError::UnknownCode(other)),
        }
    }

    /// Whether `label` belongs to the allowed label set of this kind.
    pub fn allows(self, label: OpLabel) -> bool {
        use OpLabel::*;
        match self {
            OpKind::System | OpKind::Application => matches!(label, Begin | Finish),
            OpKind::Process => matches!(label, Run),
            OpKind::Memory => matches!(label, Allocate | Block),
            OpKind::Input => matches!(label, HardDrive | Keyboard | Scanner),
            OpKind::Output => matches!(label, HardDrive | Monitor | Projector),
        }
    }
}

/// Operation label (the text between the braces).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpLabel {
    Begin,
    Finish,
    Run,
    Allocate,
    Block,
    HardDrive,
    Keyboard,
    Scanner,
    Monitor,
    Projector,
}

impl OpLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            OpLabel::Begin => "begin",
            OpLabel::Finish => "finish",
            OpLabel::Run => "run",
            OpLabel::Allocate => "allocate",
            OpLabel::Block => "block",
            OpLabel::HardDrive => "hard drive",
            OpLabel::Keyboard => "keyboard",
            OpLabel::Scanner => "scanner",
            OpLabel::Monitor => "monitor",
            OpLabel::Projector => "projector",
        }
    }
}

impl fmt::Display for OpLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpLabel {
    type Err = OperationError;

    /// Whitespace is insignificant, so `harddrive` and `hard drive` are the same label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.as_str() {
            "begin" => Ok(OpLabel::Begin),
            "finish" => Ok(OpLabel::Finish),
            "run" => Ok(OpLabel::Run),
            "allocate" => Ok(OpLabel::Allocate),
            "block" => Ok(OpLabel::Block),
            "harddrive" => Ok(OpLabel::HardDrive),
            "keyboard" => Ok(OpLabel::Keyboard),
            "scanner" => Ok(OpLabel::Scanner),
            "monitor" => Ok(OpLabel::Monitor),
            "projector" => Ok(OpLabel::Projector),
            _ => Err(OperationError::UnknownLabel(s.to_string())),
        }
    }
}

/// Simulated hardware classes, each with its own cycle time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    Monitor,
    Processor,
    Scanner,
    HardDrive,
    Keyboard,
    Memory,
    Projector,
}

impl DeviceClass {
    pub const ALL: [DeviceClass; 7] = [
        DeviceClass::Monitor,
        DeviceClass::Processor,
        DeviceClass::Scanner,
        DeviceClass::HardDrive,
        DeviceClass::Keyboard,
        DeviceClass::Memory,
        DeviceClass::Projector,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DeviceClass::Monitor => "Monitor",
            DeviceClass::Processor => "Processor",
            DeviceClass::Scanner => "Scanner",
            DeviceClass::HardDrive => "Hard Drive",
            DeviceClass::Keyboard => "Keyboard",
            DeviceClass::Memory => "Memory",
            DeviceClass::Projector => "Projector",
        }
    }
}

/// A single validated meta-data instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    kind: OpKind,
    label: OpLabel,
    cycles: u64,
}

impl Operation {
    pub fn new(kind: OpKind, label: OpLabel, cycles: u64) -> Result<Self, OperationError> {
        if !kind.allows(label) {
            return Err(OperationError::InvalidLabel { kind, label });
        }
        Ok(Self {
            kind,
            label,
            cycles,
        })
    }

    #[inline]
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    #[inline]
    pub fn label(&self) -> OpLabel {
        self.label
    }

    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Input and output operations, the quantity the IO-count policies sort on.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, OpKind::Input | OpKind::Output)
    }

    pub fn is_process_begin(&self) -> bool {
        self.kind == OpKind::Application && self.label == OpLabel::Begin
    }

    pub fn is_process_finish(&self) -> bool {
        self.kind == OpKind::Application && self.label == OpLabel::Finish
    }

    pub fn is_system_finish(&self) -> bool {
        self.kind == OpKind::System && self.label == OpLabel::Finish
    }

    /// Device whose cycle time prices this operation. System and application
    /// operations take no simulated time.
    pub fn device_class(&self) -> Option<DeviceClass> {
        match (self.kind, self.label) {
            (OpKind::System | OpKind::Application, _) => None,
            (OpKind::Process, _) => Some(DeviceClass::Processor),
            (OpKind::Memory, _) => Some(DeviceClass::Memory),
            (_, OpLabel::HardDrive) => Some(DeviceClass::HardDrive),
            (_, OpLabel::Keyboard) => Some(DeviceClass::Keyboard),
            (_, OpLabel::Scanner) => Some(DeviceClass::Scanner),
            (_, OpLabel::Monitor) => Some(DeviceClass::Monitor),
            (_, OpLabel::Projector) => Some(DeviceClass::Projector),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{{}}}{}", self.kind.code(), self.label, self.cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_label_outside_kind() {
        let err = Operation::new(OpKind::Input, OpLabel::Monitor, 3).unwrap_err();
        assert_eq!(
            err,
            OperationError::InvalidLabel {
                kind: OpKind::Input,
                label: OpLabel::Monitor
            }
        );
        assert!(Operation::new(OpKind::Application, OpLabel::Run, 0).is_err());
        assert!(Operation::new(OpKind::Memory, OpLabel::Block, 0).is_ok());
    }

    #[test]
    fn hard_drive_label_ignores_spacing() {
        assert_eq!("harddrive".parse::<OpLabel>().unwrap(), OpLabel::HardDrive);
        assert_eq!("hard drive".parse::<OpLabel>().unwrap(), OpLabel::HardDrive);
        assert!("printer".parse::<OpLabel>().is_err());
    }

    #[test]
    fn maps_operations_to_devices() {
        let run = Operation::new(OpKind::Process, OpLabel::Run, 1).unwrap();
        let out = Operation::new(OpKind::Output, OpLabel::Projector, 1).unwrap();
        let app = Operation::new(OpKind::Application, OpLabel::Begin, 0).unwrap();
        assert_eq!(run.device_class(), Some(DeviceClass::Processor));
        assert_eq!(out.device_class(), Some(DeviceClass::Projector));
        assert_eq!(app.device_class(), None);
    }

    #[test]
    fn displays_in_metadata_notation() {
        let op = Operation::new(OpKind::Input, OpLabel::HardDrive, 6).unwrap();
        assert_eq!(op.to_string(), "I{hard drive}6");
        assert_eq!(OpKind::from_code('X'), Err(OperationError::UnknownCode('X')));
    }
}
