//! ## procsim-core::devices::round_robin
//! **Unit cursor for device classes with several identical units**

use std::num::NonZeroU32;

#[derive(Debug, Clone)]
pub struct RoundRobin {
    units: NonZeroU32,
    last: Option<u32>,
}

impl RoundRobin {
    pub fn new(units: NonZeroU32) -> Self {
        Self { units, last: None }
    }

    /// Starts at unit 0 and advances by one per call, wrapping at the unit count.
    pub fn next_unit(&mut self) -> u32 {
        let next = match self.last {
            Some(last) if last + 1 < self.units.get() => last + 1,
            _ => 0,
        };
        self.last = Some(next);
        next
    }
}
