//! ## procsim-core::devices::memory
//! **Bump allocator over the simulated system memory**
//!
//! Addresses are expressed in kbytes. Running past the end of memory wraps
//! back to address 0 without signalling an error.

#[derive(Debug, Clone)]
pub struct MemoryAllocator {
    max_kb: u64,
    block_kb: u64,
    last: Option<u64>,
}

impl MemoryAllocator {
    pub fn new(max_kb: u64, block_kb: u64) -> Self {
        Self {
            max_kb,
            block_kb,
            last: None,
        }
    }

    /// Hands out the next block address.
    ///
    /// The first call returns 0; each later call advances by one block and
    /// returns the new cursor unless it exceeds the memory size, in which case
    /// the cursor resets to 0.
    pub fn allocate(&mut self) -> u64 {
        let next = match self.last {
            None => 0,
            Some(last) => match last.checked_add(self.block_kb) {
                Some(addr) if addr <= self.max_kb => addr,
                _ => 0,
            },
        };
        self.last = Some(next);
        next
    }
}
