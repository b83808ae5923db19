//! Single-step debug display

use std::fmt::Write;
use std::io;
use std::io::BufRead;

use crate::cpu::CPUState;
use crate::error::SimulatorResult;
use crate::instruction::disasm::disassemble;
use crate::instruction::Instruction;
use crate::pipelined::pipeline::PipelineState;

/// Clears the terminal and homes the cursor
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[1;1H";

const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Renders the register file and every occupied pipeline slot
pub fn render(cpu: &CPUState, state: &PipelineState) -> SimulatorResult<String> {
    let mut out = String::new();

    writeln!(out, "{RULE}").ok();
    for (i, value) in cpu.registers().iter().enumerate() {
        if i % 4 == 0 {
            out.push_str("======= ");
        }
        write!(out, "r{i:02}: {value:#010x}\t").ok();
        if i % 4 == 3 {
            out.push_str("========\n");
        }
    }
    writeln!(out, "{RULE}").ok();

    if let Some(if_id) = &state.if_id {
        write_slot(&mut out, "IF", if_id.next_pc, &if_id.inst)?;
    }
    if let Some(id_ex) = &state.id_ex {
        write_slot(&mut out, "ID", id_ex.next_pc, &id_ex.inst)?;
        writeln!(
            out,
            "\tOperand 1:\t{:#010x}\n\tOperand 2:\t{:#010x}\n\tIO Operand:\t{:#010x}",
            id_ex.op1, id_ex.op2, id_ex.io_op
        )
        .ok();
    }
    if let Some(ex_mem) = &state.ex_mem {
        write_slot(&mut out, "EX", ex_mem.next_pc, &ex_mem.inst)?;
        writeln!(
            out,
            "\tbranch_taken:\t{:#x}\n\tresult:\t\t{:#010x}",
            ex_mem.branch_taken as u8, ex_mem.result
        )
        .ok();
    }
    if let Some(mem_wb) = &state.mem_wb {
        write_slot(&mut out, "MEM", mem_wb.next_pc, &mem_wb.inst)?;
    }

    Ok(out)
}

fn write_slot(
    out: &mut String,
    stage: &str,
    next_pc: u32,
    inst: &Instruction,
) -> SimulatorResult<()> {
    let text = disassemble(inst.raw_inst)?;
    writeln!(
        out,
        "{stage}:\n\tinstruction: \t[{:#010x}]: \"{text}\"",
        next_pc.wrapping_sub(1)
    )
    .ok();
    Ok(())
}

/// Shows one cycle on `out` and waits for a line on `input`.
/// Returns `false` once `input` is exhausted.
pub fn show_and_wait(
    cpu: &CPUState,
    state: &PipelineState,
    input: &mut impl BufRead,
    out: &mut impl io::Write,
) -> SimulatorResult<bool> {
    let frame = render(cpu, state)?;
    write!(out, "{CLEAR_SCREEN}{frame}")?;
    out.flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    Ok(read > 0)
}
