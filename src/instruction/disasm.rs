//! Disassembler used by the single-step display

use super::Instruction;
use super::InstructionType;
use crate::error::DecodeError;
use crate::error::ExecutionError;
use crate::error::SimulatorResult;

/// Longest text a mnemonic may render to, terminator included
pub const DISASM_BUFFER_LEN: usize = 30;

/// Returns a textual representation of the instruction, e.g.
/// `ADDI\tr01, r00, 00000005` or `BRR\t-0000003`.
pub fn disassemble(raw_inst: u32) -> SimulatorResult<String> {
    let inst = Instruction::new(raw_inst);
    let name = inst
        .mnemonic()
        .ok_or(DecodeError::UnknownInstruction(raw_inst))?;
    let imm = inst.is_immediate();

    let text = match inst.itype {
        InstructionType::BinaryArithmetic => {
            let dest = inst.destination()?;
            let op1 = inst.operand(1)?;
            let op2 = inst.operand(2)?;
            if imm {
                format!("{name}\tr{dest:02}, r{op1:02}, {:08}", op2 as i32)
            } else {
                format!("{name}\tr{dest:02}, r{op1:02}, r{op2:02}")
            }
        }
        InstructionType::UnaryArithmetic => {
            let dest = inst.destination()?;
            let op1 = inst.operand(1)?;
            if imm {
                format!("{name}\tr{dest:02}, {:08}", op1 as i32)
            } else {
                format!("{name}\tr{dest:02}, r{op1:02}")
            }
        }
        InstructionType::Compare => {
            let op1 = inst.operand(1)?;
            let op2 = inst.operand(2)?;
            if imm {
                format!("{name}\tr{op1:02}, {:08}", op2 as i32)
            } else {
                format!("{name}\tr{op1:02}, r{op2:02}")
            }
        }
        InstructionType::Jump | InstructionType::Branch => {
            let target = inst.operand(1)?;
            if imm {
                // PC-relative
                format!("{name}\t{:+08}", target as i32)
            } else {
                format!("{name}\tr{target:02}")
            }
        }
        InstructionType::IO => {
            let dest = inst.destination()?;
            let op1 = inst.operand(1)?;
            let op2 = inst.operand(2)?;
            format!("{name}\tr{dest:02}, r{op1:02}, {:08}", op2 as i32)
        }
        InstructionType::Misc => name.to_string(),
        InstructionType::Unknown => {
            return Err(DecodeError::UnknownInstruction(raw_inst).into())
        }
    };

    if text.len() >= DISASM_BUFFER_LEN {
        return Err(
            ExecutionError::DisassemblyOverflow(raw_inst, DISASM_BUFFER_LEN)
                .into(),
        );
    }
    Ok(text)
}
