//! Pipelined implementation
//!
//! One instruction per stage, no forwarding, no stalls, no flush on taken
//! branches. A register written by instruction `i` is visible to the decode
//! of an instruction fetched three or more cycles after `i`; anything closer
//! reads the old value. Instructions fetched behind a taken branch or jump
//! still run to completion.

use tracing::debug;

use crate::cpu::CPUState;
use crate::error::SimulatorResult;
use crate::memory::MemoryImage;
use crate::pipelined::pipeline::PipelineState;

pub mod pipeline;
pub mod stages;

/// Pipeline plus the architectural state it drives
#[derive(Debug)]
pub struct Pipeline<'a> {
    pub cpu: &'a mut CPUState,
    pub mem: &'a mut MemoryImage,
    pub state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(cpu: &'a mut CPUState, mem: &'a mut MemoryImage) -> Self {
        Self { cpu, mem, state: PipelineState::default() }
    }

    /// Advances every stage by one cycle.
    /// Returns `false` once HALT has drained and no stage holds work.
    ///
    /// Stages run back to front: each slot is consumed before the stage in
    /// front of it overwrites it.
    pub fn cycle(&mut self) -> SimulatorResult<bool> {
        let cpu = &mut *self.cpu;
        let mem = &mut *self.mem;
        let state = &mut self.state;

        cpu.update_cycle_count(1);
        debug!(
            cycle = cpu.history.cycle_count,
            pc = cpu.pc(),
            in_flight = state.occupancy(),
            "new cycle"
        );

        stages::write_back(cpu, state.mem_wb.take())?;
        state.mem_wb = stages::memory_access(cpu, mem, state.ex_mem.take())?;
        state.ex_mem = stages::execute(cpu, mem, state.id_ex.take())?;
        state.id_ex = stages::instruction_decode(cpu, state.if_id.take())?;
        state.if_id = stages::instruction_fetch(cpu, mem)?;

        Ok(!state.is_drained())
    }
}

/// Runs until HALT drains through all stages.
/// Returns the number of cycles simulated.
pub fn run(cpu: &mut CPUState, mem: &mut MemoryImage) -> SimulatorResult<u64> {
    let start = cpu.history.cycle_count;
    let mut pipeline = Pipeline::new(cpu, mem);
    while pipeline.cycle()? {}
    Ok(pipeline.cpu.history.cycle_count - start)
}
