use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to load program: {0}")]
    LoadError(#[from] LoadError),

    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("CPU execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Errors related to reading a program image
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read program file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Binary image '{0}' is {1} bytes long, not a multiple of 4")]
    Misaligned(PathBuf, usize),

    #[error("Failed to parse '{0}' at line {1}: {2}")]
    ParseError(PathBuf, usize, String),

    #[error("Program '{0}' contains no instructions")]
    EmptyProgram(PathBuf),
}

/// Errors raised while picking an instruction word apart
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Instruction {raw_inst:#010x} has no operand #{operand}")]
    UnsupportedOperand { operand: u32, raw_inst: u32 },

    #[error("Instruction {0:#010x} has no destination register")]
    NoDestination(u32),

    #[error("Unknown instruction: {0:032b}")]
    UnknownInstruction(u32),
}

/// Errors related to CPU execution
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("Invalid instruction: {0:032b} at PC={1:#010x}")]
    InvalidInstruction(u32, u32),

    #[error("Opcode {0:#04x} is not a load or a store")]
    UnsupportedIoOpcode(u8),

    #[error("Illegal data address {address:#x}: data memory holds {words} words")]
    IllegalDataAddress { address: u32, words: usize },

    #[error("Instruction fetch out of bounds: PC={0:#010x}, code size={1}")]
    FetchOutOfBounds(u32, usize),

    #[error("Disassembly of {0:#010x} does not fit in {1} bytes")]
    DisassemblyOverflow(u32, usize),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
