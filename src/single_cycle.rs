//! Single cycle implementation
//!
//! Each instruction passes through all five stages before the next one is
//! fetched, so there are no hazards. Pipelined runs of dependency-free
//! programs must end in the same state.

use tracing::debug;

use crate::cpu::CPUState;
use crate::error::SimulatorResult;
use crate::memory::MemoryImage;
use crate::pipelined::stages::*;

/// Runs until HALT is fetched.
/// Returns the number of cycles simulated.
pub fn run(cpu: &mut CPUState, mem: &mut MemoryImage) -> SimulatorResult<u64> {
    let start = cpu.history.cycle_count;
    loop {
        let pc = cpu.pc();

        // IF
        let Some(fetched) = instruction_fetch(cpu, mem)? else {
            debug!(pc, "halt");
            break;
        };

        // Increment CPU cycle count
        cpu.update_cycle_count(1);

        // ID
        let decoded = instruction_decode(cpu, Some(fetched))?;
        // EX
        let executed = execute(cpu, mem, decoded)?;
        // MEM
        let accessed = memory_access(cpu, mem, executed)?;
        // WB
        write_back(cpu, accessed)?;
    }
    Ok(cpu.history.cycle_count - start)
}
