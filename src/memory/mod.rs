//! Memory image: separate code and data regions
//!
//! Code is a read-only array of instruction words indexed by the PC. Data is
//! a zeroed region of `data_size` bytes, addressed in whole words by LOAD
//! and STORE. Nothing can reach code through a data address, so programs
//! cannot modify themselves.

use tracing::trace;

use crate::error::ExecutionError;
use crate::error::SimulatorResult;

/// Data memory size used when the caller does not pick one
pub const DEFAULT_DATA_SIZE: usize = 1024 * 1024;

const WORD_BYTES: usize = 4;

/// The memory image of the processor
#[derive(Clone, Debug)]
pub struct MemoryImage {
    code: Vec<u32>,
    data: Vec<u32>,
    /// Every address written by STORE, in program order, duplicates kept
    store_log: Vec<u32>,
}

impl MemoryImage {
    /// Builds an image around `code` with `data_size` zeroed bytes of data
    pub fn new(code: Vec<u32>, data_size: usize) -> Self {
        Self {
            code,
            data: vec![0; data_size / WORD_BYTES],
            store_log: Vec::new(),
        }
    }

    /// Number of addressable data words
    pub fn data_words(&self) -> usize {
        self.data.len()
    }

    /// Reads the instruction at word index `pc`
    pub fn fetch(&self, pc: u32) -> SimulatorResult<u32> {
        self.code
            .get(pc as usize)
            .copied()
            .ok_or_else(|| ExecutionError::FetchOutOfBounds(pc, self.code.len()).into())
    }

    /// Checks that `address` names a data word, i.e. `address * 4 < data_size`
    pub fn check_data_address(&self, address: u32) -> SimulatorResult<()> {
        if (address as usize) < self.data.len() {
            Ok(())
        } else {
            Err(ExecutionError::IllegalDataAddress {
                address,
                words: self.data_words(),
            }
            .into())
        }
    }

    pub fn load(&self, address: u32) -> SimulatorResult<u32> {
        self.check_data_address(address)?;
        Ok(self.data[address as usize])
    }

    /// Writes `value` and records the address in the store log
    pub fn store(&mut self, address: u32, value: u32) -> SimulatorResult<()> {
        self.check_data_address(address)?;
        self.data[address as usize] = value;
        self.store_log.push(address);
        trace!(address, value, "store");
        Ok(())
    }

    pub fn store_log(&self) -> &[u32] {
        &self.store_log
    }

    /// `(address, current value)` for each logged store, in store order
    pub fn store_report(&self) -> Vec<(u32, u32)> {
        self.store_log
            .iter()
            .map(|&address| (address, self.data[address as usize]))
            .collect()
    }
}
