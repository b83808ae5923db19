//! A simulator wrapper

use std::path::Path;

use tracing::info;
use tracing::warn;

use crate::cpu::CPUHistory;
use crate::cpu::CPUPolicy;
use crate::cpu::CPUState;
use crate::cpu::Implementation;
use crate::error::SimulatorError;
use crate::error::SimulatorResult;
use crate::instruction::REGISTER_COUNT;
use crate::loader;
use crate::loader::ProgramKind;
use crate::memory::MemoryImage;
use crate::pipelined;
use crate::pipelined::Pipeline;
use crate::single_cycle;
use crate::single_step;

/// What is left after a run
#[derive(Clone, Debug)]
pub struct RunReport {
    pub history: CPUHistory,
    pub registers: [u32; REGISTER_COUNT],
    /// `(address, final value)` per store, in store order
    pub stores: Vec<(u32, u32)>,
}

/// Checks a user supplied data memory size
pub fn validate_data_size(data_size: usize) -> SimulatorResult<()> {
    if data_size == 0 || data_size % 4 != 0 {
        return Err(SimulatorError::ConfigError(format!(
            "data size must be a positive multiple of 4, got {data_size}"
        )));
    }
    Ok(())
}

/// Load the program file and run it to completion
pub fn run(
    program: &Path,
    kind: ProgramKind,
    policy: CPUPolicy,
    data_size: usize,
) -> SimulatorResult<RunReport> {
    validate_data_size(data_size)?;

    // Nothing runs unless the whole program loaded
    let code = loader::load_program(program, kind)?;
    let mut mem = MemoryImage::new(code, data_size);
    let mut cpu = CPUState::make(policy);

    run_image(&mut cpu, &mut mem)?;

    let report = RunReport {
        history: cpu.history,
        registers: cpu.registers(),
        stores: mem.store_report(),
    };

    if policy.history {
        let history = report.history;
        eprintln!("[HISTORY] # cycles = {}", history.cycle_count);
        eprintln!("[HISTORY] # instructions = {}", history.inst_count);
        eprintln!("[HISTORY] CPI = {:.2}", history.cpi());
    }

    Ok(report)
}

/// Run an already loaded image with the backend the policy selects
pub fn run_image(cpu: &mut CPUState, mem: &mut MemoryImage) -> SimulatorResult<u64> {
    let policy = cpu.policy;
    let cycles = match policy.implementation {
        Implementation::SingleCycle => {
            if policy.single_stepping {
                warn!("single stepping is only available for the pipelined backend");
            }
            single_cycle::run(cpu, mem)?
        }
        Implementation::Pipelined if policy.single_stepping => {
            let mut stepping = true;
            let mut input = std::io::stdin().lock();
            let mut out = std::io::stdout();
            let mut pipeline = Pipeline::new(cpu, mem);
            let mut cycles = 0;
            loop {
                let busy = pipeline.cycle()?;
                cycles += 1;
                if stepping {
                    // End of input turns stepping off for the rest of the run
                    stepping = single_step::show_and_wait(
                        &*pipeline.cpu,
                        &pipeline.state,
                        &mut input,
                        &mut out,
                    )?;
                }
                if !busy {
                    break;
                }
            }
            cycles
        }
        Implementation::Pipelined => pipelined::run(cpu, mem)?,
    };

    info!(cycles, retired = cpu.history.inst_count, "simulation finished");
    Ok(cycles)
}

/// Prints the final value of every stored address
pub fn print_results(report: &RunReport) {
    println!("Printing results: ");
    for (address, value) in &report.stores {
        println!("[{address:#x}]: {value:#x}");
    }
}
