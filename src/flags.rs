use std::path::PathBuf;
use std::str::FromStr;

use crate::cpu::CPUPolicy;
use crate::cpu::Implementation;
use crate::loader::ProgramKind;
use crate::memory::DEFAULT_DATA_SIZE;

xflags::xflags! {
    /// Five-stage pipeline simulator for a small 32-bit RISC instruction set.
    cmd sim-args {
        /// Path to the program to simulate.
        required program: PathBuf

        /// Encoding of the program file.
        /// binary: little-endian instruction words (default)
        /// textual: one `tag bits description` line per instruction
        optional -k, --program-kind kind: ProgramKind

        /// Specifies the simulator implementation.
        /// P: Pipelined (default)
        /// S: Single-cycle reference
        optional -i, --implementation backend: BackendArg

        /// Shows registers and pipeline contents after every cycle and waits
        /// for Enter. End of input (Ctrl+D) resumes normal execution.
        optional -s, --single-stepping

        /// Size of data memory in bytes (default: 1 MiB).
        optional --data-size bytes: usize

        /// Enables history module, printing cycle and instruction counts after simulation.
        optional --history

        /// Enables verbose mode, logging every cycle at debug level.
        optional -v, --verbose
    }
}

impl SimArgs {
    pub fn policy(&self) -> CPUPolicy {
        CPUPolicy {
            verbose: self.verbose,
            implementation: self
                .implementation
                .map(Implementation::from)
                .unwrap_or_default(),
            history: self.history,
            single_stepping: self.single_stepping,
        }
    }

    pub fn kind(&self) -> ProgramKind {
        self.program_kind.unwrap_or_default()
    }

    pub fn data_size(&self) -> usize {
        self.data_size.unwrap_or(DEFAULT_DATA_SIZE)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum BackendArg {
    Pipelined,
    SingleCycle,
}

impl FromStr for BackendArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "P" => Ok(BackendArg::Pipelined),
            "S" => Ok(BackendArg::SingleCycle),
            _ => Err(format!(
                "Invalid implementation: '{}'. Expected 'P' or 'S'.",
                s
            )),
        }
    }
}

impl From<BackendArg> for Implementation {
    fn from(val: BackendArg) -> Self {
        match val {
            BackendArg::Pipelined => Implementation::Pipelined,
            BackendArg::SingleCycle => Implementation::SingleCycle,
        }
    }
}
