//! Architectural CPU state

use crate::instruction::PC;
use crate::instruction::REGISTER_COUNT;

/// CPU state
#[derive(Clone, Copy, Debug)]
pub struct CPUState {
    /// General purpose registers; the last one is the program counter
    pub gpr: [Register; REGISTER_COUNT],

    /// Result of the most recently executed compare.
    /// Not latched per instruction: a branch sees whatever compare ran last.
    pub flag: bool,

    /// CPU policy
    pub policy: CPUPolicy,

    /// History of execution
    pub history: CPUHistory,
}

impl CPUState {
    pub fn make(policy: CPUPolicy) -> Self {
        Self {
            gpr: [Register::new(0); REGISTER_COUNT],
            flag: false,
            policy,
            history: CPUHistory::default(),
        }
    }

    pub fn pc(&self) -> u32 {
        self.gpr[PC].read()
    }

    pub fn set_pc(&mut self, value: u32) {
        self.gpr[PC].write(value);
    }

    /// Reads register `index`; indices come from 5-bit fields
    pub fn read(&self, index: u32) -> u32 {
        self.gpr[index as usize].read()
    }

    pub fn write(&mut self, index: u32, value: u32) {
        self.gpr[index as usize].write(value);
    }

    /// Snapshot of all register values
    pub fn registers(&self) -> [u32; REGISTER_COUNT] {
        self.gpr.map(|r| r.read())
    }

    /// Increments history cycle count
    pub fn update_cycle_count(&mut self, value: u64) {
        self.history.cycle_count += value;
    }

    /// Increments history instruction count
    pub fn update_inst_count(&mut self, value: u64) {
        self.history.inst_count += value;
    }
}

impl Default for CPUState {
    fn default() -> Self {
        Self::make(CPUPolicy::default())
    }
}

/// Register file simulation
#[derive(Clone, Copy, Debug)]
pub struct Register {
    /// Current data in the register
    data: u32,
}

impl Register {
    pub fn new(data: u32) -> Self {
        Self { data }
    }

    /// Reads the register
    pub fn read(&self) -> u32 {
        self.data
    }

    /// Writes to register
    pub fn write(&mut self, value: u32) {
        self.data = value;
    }
}

/// Implementation enum
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Implementation {
    SingleCycle,
    #[default]
    Pipelined,
}

/// CPU policy
#[derive(Clone, Copy, Debug, Default)]
pub struct CPUPolicy {
    pub verbose: bool,
    pub implementation: Implementation,
    pub history: bool,
    pub single_stepping: bool,
}

/// History module
#[derive(Clone, Copy, Debug, Default)]
pub struct CPUHistory {
    pub cycle_count: u64,
    /// Instructions that reached write-back
    pub inst_count: u64,
}

impl CPUHistory {
    /// Cycles per retired instruction
    pub fn cpi(&self) -> f64 {
        if self.inst_count == 0 {
            0.0
        } else {
            self.cycle_count as f64 / self.inst_count as f64
        }
    }
}
