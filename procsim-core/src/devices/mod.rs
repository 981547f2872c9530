//! ## procsim-core::devices
//! **Simulated hardware profile and its stateful allocators**
//!
//! ### Key Submodules:
//! - `memory`: bump allocator handing out block addresses, wrapping on overflow
//! - `round_robin`: device index cursor for multi-unit device classes
//!
//! The registry is owned by the dispatcher; nothing else mutates it.

pub mod memory;
pub mod round_robin;

use std::num::NonZeroU32;
use std::time::Duration;

use crate::operation::DeviceClass;

pub use memory::MemoryAllocator;
pub use round_robin::RoundRobin;

/// Milliseconds of simulated work per cycle, per device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTimes {
    pub monitor: u64,
    pub processor: u64,
    pub scanner: u64,
    pub hard_drive: u64,
    pub keyboard: u64,
    pub memory: u64,
    pub projector: u64,
}

impl CycleTimes {
    pub fn get(&self, class: DeviceClass) -> u64 {
        match class {
            DeviceClass::Monitor => self.monitor,
            DeviceClass::Processor => self.processor,
            DeviceClass::Scanner => self.scanner,
            DeviceClass::HardDrive => self.hard_drive,
            DeviceClass::Keyboard => self.keyboard,
            DeviceClass::Memory => self.memory,
            DeviceClass::Projector => self.projector,
        }
    }
}

/// Everything the dispatcher needs to know about the simulated machine.
///
/// Device counts are `NonZeroU32`, so a round-robin over zero units cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HardwareProfile {
    pub cycle_times: CycleTimes,
    /// System memory in kbytes.
    pub max_memory_kb: u64,
    /// Allocation block size in kbytes.
    pub block_size_kb: u64,
    pub hdd_count: NonZeroU32,
    pub projector_count: NonZeroU32,
}

/// Cycle-time table plus the allocators that hand out addresses and device units.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    cycle_times: CycleTimes,
    memory: MemoryAllocator,
    hdd: RoundRobin,
    projector: RoundRobin,
}

impl DeviceRegistry {
    pub fn new(profile: &HardwareProfile) -> Self {
        Self {
            cycle_times: profile.cycle_times,
            memory: MemoryAllocator::new(profile.max_memory_kb, profile.block_size_kb),
            hdd: RoundRobin::new(profile.hdd_count),
            projector: RoundRobin::new(profile.projector_count),
        }
    }

    /// Simulated duration of `cycles` units of work on `class`.
    pub fn device_time(&self, class: DeviceClass, cycles: u64) -> Duration {
        Duration::from_millis(self.cycle_times.get(class).saturating_mul(cycles))
    }

    pub fn allocate_memory(&mut self) -> u64 {
        self.memory.allocate()
    }

    /// Unit index for device classes that exist in several units.
    /// Returns `None` for single-unit classes.
    pub fn assign_unit(&mut self, class: DeviceClass) -> Option<u32> {
        match class {
            DeviceClass::HardDrive => Some(self.hdd.next_unit()),
            DeviceClass::Projector => Some(self.projector.next_unit()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> HardwareProfile {
        HardwareProfile {
            cycle_times: CycleTimes {
                monitor: 20,
                processor: 10,
                scanner: 10,
                hard_drive: 15,
                keyboard: 50,
                memory: 30,
                projector: 25,
            },
            max_memory_kb: 2048,
            block_size_kb: 128,
            hdd_count: NonZeroU32::new(2).unwrap(),
            projector_count: NonZeroU32::new(3).unwrap(),
        }
    }

    #[test]
    fn prices_work_by_device() {
        let registry = DeviceRegistry::new(&profile());
        assert_eq!(
            registry.device_time(DeviceClass::Processor, 5),
            Duration::from_millis(50)
        );
        assert_eq!(
            registry.device_time(DeviceClass::Keyboard, 0),
            Duration::ZERO
        );
    }

    #[test]
    fn only_multi_unit_devices_get_an_index() {
        let mut registry = DeviceRegistry::new(&profile());
        assert_eq!(registry.assign_unit(DeviceClass::HardDrive), Some(0));
        assert_eq!(registry.assign_unit(DeviceClass::Projector), Some(0));
        assert_eq!(registry.assign_unit(DeviceClass::HardDrive), Some(1));
        assert_eq!(registry.assign_unit(DeviceClass::HardDrive), Some(0));
        assert_eq!(registry.assign_unit(DeviceClass::Monitor), None);
        assert_eq!(registry.assign_unit(DeviceClass::Projector), Some(1));
    }
}
