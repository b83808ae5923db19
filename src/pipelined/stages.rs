//! The five stages. Each one consumes what its predecessor produced in the
//! previous cycle; an absent input yields an absent output.

use tracing::debug;
use tracing::trace;

use super::pipeline::EXMEMRegister;
use super::pipeline::IDEXRegister;
use super::pipeline::IFIDRegister;
use super::pipeline::MEMWBRegister;
use crate::alu::BinaryOp;
use crate::alu::CompareOp;
use crate::alu::UnaryOp;
use crate::cpu::CPUState;
use crate::error::ExecutionError;
use crate::error::SimulatorResult;
use crate::instruction::opcodes;
use crate::instruction::Instruction;
use crate::instruction::InstructionType;
use crate::memory::MemoryImage;

/// IF stage.
/// Returns `None` on HALT and leaves the PC pointing at it.
pub fn instruction_fetch(
    cpu: &mut CPUState,
    mem: &MemoryImage,
) -> SimulatorResult<Option<IFIDRegister>> {
    let pc = cpu.pc();
    let inst = Instruction::new(mem.fetch(pc)?);

    if inst.is_halt() {
        trace!(pc, "fetch: halt");
        return Ok(None);
    }

    let next_pc = pc.wrapping_add(1);
    cpu.set_pc(next_pc);

    trace!(pc, raw_inst = inst.raw_inst, "fetch");
    Ok(Some(IFIDRegister { next_pc, inst }))
}

/// ID stage: resolves operands, reading registers for register operands
pub fn instruction_decode(
    cpu: &CPUState,
    input: Option<IFIDRegister>,
) -> SimulatorResult<Option<IDEXRegister>> {
    let Some(IFIDRegister { next_pc, inst }) = input else {
        return Ok(None);
    };

    // Register operands are fetched, immediates used as they are
    let reg_or_imm = |operand: u32| {
        if inst.is_immediate() {
            operand
        } else {
            cpu.read(operand)
        }
    };

    let (mut op1, mut op2, mut io_op) = (0, 0, 0);

    match inst.itype {
        InstructionType::BinaryArithmetic | InstructionType::Compare => {
            op1 = cpu.read(inst.operand(1)?);
            op2 = reg_or_imm(inst.operand(2)?);
        }
        InstructionType::UnaryArithmetic => {
            op1 = reg_or_imm(inst.operand(1)?);
        }
        InstructionType::Branch | InstructionType::Jump => {
            op1 = if inst.is_immediate() {
                // PC-relative
                inst.operand(1)?.wrapping_add(next_pc)
            } else {
                cpu.read(inst.operand(1)?)
            };
        }
        InstructionType::IO => {
            op1 = cpu.read(inst.operand(1)?);
            op2 = inst.operand(2)?;
            io_op = match inst.opcode {
                opcodes::LOAD => inst.destination()?,
                opcodes::STORE => cpu.read(inst.destination()?),
                opcode => {
                    return Err(ExecutionError::UnsupportedIoOpcode(opcode).into())
                }
            };
        }
        InstructionType::Misc => {}
        InstructionType::Unknown => {
            return Err(ExecutionError::InvalidInstruction(
                inst.raw_inst,
                next_pc.wrapping_sub(1),
            )
            .into())
        }
    }

    Ok(Some(IDEXRegister { next_pc, inst, op1, op2, io_op }))
}

/// EX stage. Compares update the CPU flag; branches read it.
pub fn execute(
    cpu: &mut CPUState,
    mem: &MemoryImage,
    input: Option<IDEXRegister>,
) -> SimulatorResult<Option<EXMEMRegister>> {
    let Some(IDEXRegister { next_pc, inst, op1, op2, io_op }) = input else {
        return Ok(None);
    };

    let invalid = || {
        ExecutionError::InvalidInstruction(inst.raw_inst, next_pc.wrapping_sub(1))
    };

    let mut branch_taken = false;
    let mut result = 0;

    match inst.itype {
        InstructionType::BinaryArithmetic => {
            let op = BinaryOp::from_opcode(inst.opcode).ok_or_else(invalid)?;
            result = op.apply(op1, op2);
        }
        InstructionType::UnaryArithmetic => {
            let op = UnaryOp::from_opcode(inst.opcode).ok_or_else(invalid)?;
            result = op.apply(op1);
        }
        InstructionType::Compare => {
            let op = CompareOp::from_opcode(inst.opcode).ok_or_else(invalid)?;
            cpu.flag = op.apply(op1, op2);
            trace!(flag = cpu.flag, "compare");
        }
        InstructionType::Branch => {
            branch_taken = cpu.flag;
            result = op1.wrapping_add(op2);
        }
        InstructionType::Jump => {
            branch_taken = true;
            result = op1.wrapping_add(op2);
        }
        InstructionType::IO => {
            result = op1.wrapping_add(op2);
            mem.check_data_address(result)?;
        }
        InstructionType::Misc => {}
        InstructionType::Unknown => return Err(invalid().into()),
    }

    Ok(Some(EXMEMRegister { next_pc, inst, branch_taken, result, io_op }))
}

/// MEM stage: data accesses and PC redirection for taken branches
pub fn memory_access(
    cpu: &mut CPUState,
    mem: &mut MemoryImage,
    input: Option<EXMEMRegister>,
) -> SimulatorResult<Option<MEMWBRegister>> {
    let Some(EXMEMRegister { mut next_pc, inst, branch_taken, mut result, io_op }) =
        input
    else {
        return Ok(None);
    };

    match inst.itype {
        InstructionType::IO => match inst.opcode {
            opcodes::LOAD => result = mem.load(result)?,
            opcodes::STORE => mem.store(result, io_op)?,
            opcode => return Err(ExecutionError::UnsupportedIoOpcode(opcode).into()),
        },
        InstructionType::Branch | InstructionType::Jump
            if inst.itype == InstructionType::Jump || branch_taken =>
        {
            debug!(from = cpu.pc(), to = result, "redirecting PC");
            next_pc = result;
            cpu.set_pc(next_pc);
        }
        InstructionType::Unknown => {
            return Err(ExecutionError::InvalidInstruction(
                inst.raw_inst,
                next_pc.wrapping_sub(1),
            )
            .into())
        }
        _ => {}
    }

    Ok(Some(MEMWBRegister { next_pc, inst, result, io_op }))
}

/// WB stage
pub fn write_back(
    cpu: &mut CPUState,
    input: Option<MEMWBRegister>,
) -> SimulatorResult<()> {
    let Some(MEMWBRegister { inst, result, io_op, .. }) = input else {
        return Ok(());
    };

    match inst.itype {
        InstructionType::BinaryArithmetic | InstructionType::UnaryArithmetic => {
            let dest = inst.destination()?;
            trace!(dest, result, "write back");
            cpu.write(dest, result);
        }
        InstructionType::IO if inst.opcode == opcodes::LOAD => {
            trace!(dest = io_op, result, "write back load");
            cpu.write(io_op, result);
        }
        _ => {}
    }

    cpu.update_inst_count(1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulatorError;
    use crate::instruction::opcodes::*;

    fn ifid(raw: u32, next_pc: u32) -> Option<IFIDRegister> {
        Some(IFIDRegister { next_pc, inst: Instruction::new(raw) })
    }

    #[test]
    fn fetch_stops_at_halt_without_moving_pc() {
        let mut cpu = CPUState::default();
        let mem = MemoryImage::new(vec![NOP as u32, HALT as u32], 16);

        let first = instruction_fetch(&mut cpu, &mem).unwrap().unwrap();
        assert_eq!(first.next_pc, 1);
        assert_eq!(cpu.pc(), 1);

        assert!(instruction_fetch(&mut cpu, &mem).unwrap().is_none());
        assert!(instruction_fetch(&mut cpu, &mem).unwrap().is_none());
        assert_eq!(cpu.pc(), 1);
    }

    #[test]
    fn absent_inputs_stay_absent() {
        let mut cpu = CPUState::default();
        let mut mem = MemoryImage::new(vec![], 16);
        assert!(instruction_decode(&cpu, None).unwrap().is_none());
        assert!(execute(&mut cpu, &mem, None).unwrap().is_none());
        assert!(memory_access(&mut cpu, &mut mem, None).unwrap().is_none());
        write_back(&mut cpu, None).unwrap();
        assert_eq!(cpu.history.inst_count, 0);
    }

    #[test]
    fn decode_reads_registers_and_keeps_immediates() {
        let mut cpu = CPUState::default();
        cpu.write(7, 40);
        cpu.write(12, 2);

        // ADD r3, r7, r12
        let add = (12 << 16) | (7 << 11) | (3 << 6) | ADD as u32;
        let id = instruction_decode(&cpu, ifid(add, 1)).unwrap().unwrap();
        assert_eq!((id.op1, id.op2), (40, 2));

        // ADDI r3, r7, -1
        let addi = (0xffff << 16) | (7 << 11) | (3 << 6) | ADDI as u32;
        let id = instruction_decode(&cpu, ifid(addi, 1)).unwrap().unwrap();
        assert_eq!((id.op1, id.op2), (40, u32::MAX));
    }

    #[test]
    fn decode_makes_relative_targets_absolute() {
        let cpu = CPUState::default();
        // BRR -2, fetched from 10
        let brr = (0x3ff_fffe << 6) | BRR as u32;
        let id = instruction_decode(&cpu, ifid(brr, 11)).unwrap().unwrap();
        assert_eq!(id.op1.wrapping_add(id.op2), 9);
    }

    #[test]
    fn decode_splits_load_and_store() {
        let mut cpu = CPUState::default();
        cpu.write(2, 0xdead);
        cpu.write(5, 10);

        let load = (3 << 16) | (5 << 11) | (2 << 6) | LOAD as u32;
        let id = instruction_decode(&cpu, ifid(load, 1)).unwrap().unwrap();
        assert_eq!((id.op1, id.op2, id.io_op), (10, 3, 2));

        let store = (3 << 16) | (5 << 11) | (2 << 6) | STORE as u32;
        let id = instruction_decode(&cpu, ifid(store, 1)).unwrap().unwrap();
        assert_eq!((id.op1, id.op2, id.io_op), (10, 3, 0xdead));
    }

    #[test]
    fn unknown_instructions_are_fatal() {
        let mut cpu = CPUState::default();
        let mem = MemoryImage::new(vec![], 16);
        assert!(instruction_decode(&cpu, ifid(0b111111, 1)).is_err());

        let bogus = IDEXRegister {
            next_pc: 1,
            inst: Instruction::new(0b111111),
            op1: 0,
            op2: 0,
            io_op: 0,
        };
        assert!(matches!(
            execute(&mut cpu, &mem, Some(bogus)),
            Err(SimulatorError::ExecutionError(
                ExecutionError::InvalidInstruction(0b111111, 0)
            ))
        ));
    }

    #[test]
    fn branch_follows_the_last_compare() {
        let mut cpu = CPUState::default();
        let mem = MemoryImage::new(vec![], 16);
        let compare = |a, b| IDEXRegister {
            next_pc: 1,
            inst: Instruction::new(CEQ as u32),
            op1: a,
            op2: b,
            io_op: 0,
        };
        let branch = IDEXRegister {
            next_pc: 2,
            inst: Instruction::new(BRR as u32),
            op1: 7,
            op2: 0,
            io_op: 0,
        };

        execute(&mut cpu, &mem, Some(compare(1, 1))).unwrap();
        let ex = execute(&mut cpu, &mem, Some(branch.clone())).unwrap().unwrap();
        assert!(ex.branch_taken);
        assert_eq!(ex.result, 7);

        execute(&mut cpu, &mem, Some(compare(1, 2))).unwrap();
        let ex = execute(&mut cpu, &mem, Some(branch)).unwrap().unwrap();
        assert!(!ex.branch_taken);
        assert_eq!(ex.result, 7);
    }

    #[test]
    fn io_address_must_be_inside_data_memory() {
        let mut cpu = CPUState::default();
        let mem = MemoryImage::new(vec![], 16);
        let load = |op1| IDEXRegister {
            next_pc: 1,
            inst: Instruction::new(LOAD as u32),
            op1,
            op2: 1,
            io_op: 0,
        };
        assert_eq!(execute(&mut cpu, &mem, Some(load(2))).unwrap().unwrap().result, 3);
        assert!(matches!(
            execute(&mut cpu, &mem, Some(load(3))),
            Err(SimulatorError::ExecutionError(
                ExecutionError::IllegalDataAddress { address: 4, words: 4 }
            ))
        ));
    }

    #[test]
    fn taken_branches_redirect_the_pc() {
        let mut cpu = CPUState::default();
        let mut mem = MemoryImage::new(vec![], 16);
        cpu.set_pc(20);
        let ex = |raw: u32, branch_taken| EXMEMRegister {
            next_pc: 6,
            inst: Instruction::new(raw),
            branch_taken,
            result: 3,
            io_op: 0,
        };

        let out = memory_access(&mut cpu, &mut mem, Some(ex(BRA as u32, false)))
            .unwrap()
            .unwrap();
        assert_eq!((out.next_pc, cpu.pc()), (6, 20));

        let out = memory_access(&mut cpu, &mut mem, Some(ex(BRA as u32, true)))
            .unwrap()
            .unwrap();
        assert_eq!((out.next_pc, cpu.pc()), (3, 3));

        cpu.set_pc(20);
        let out = memory_access(&mut cpu, &mut mem, Some(ex(JMP as u32, true)))
            .unwrap()
            .unwrap();
        assert_eq!((out.next_pc, cpu.pc()), (3, 3));
    }

    #[test]
    fn store_then_load_through_memory_access() {
        let mut cpu = CPUState::default();
        let mut mem = MemoryImage::new(vec![], 1024);
        let store = EXMEMRegister {
            next_pc: 1,
            inst: Instruction::new(STORE as u32),
            branch_taken: false,
            result: 100,
            io_op: 77,
        };
        memory_access(&mut cpu, &mut mem, Some(store)).unwrap();
        assert_eq!(mem.store_log(), &[100]);

        let load = EXMEMRegister {
            next_pc: 2,
            inst: Instruction::new(LOAD as u32),
            branch_taken: false,
            result: 100,
            io_op: 4,
        };
        let out = memory_access(&mut cpu, &mut mem, Some(load)).unwrap();
        write_back(&mut cpu, out).unwrap();
        assert_eq!(cpu.read(4), 77);
    }

    #[test]
    fn write_back_targets() {
        let mut cpu = CPUState::default();
        let wb = |raw: u32| MEMWBRegister {
            next_pc: 1,
            inst: Instruction::new(raw),
            result: 9,
            io_op: 6,
        };

        // MOVE r5, ...
        write_back(&mut cpu, Some(wb((5 << 6) | MOVE as u32))).unwrap();
        assert_eq!(cpu.read(5), 9);

        // STORE and compares write nothing
        write_back(&mut cpu, Some(wb((8 << 6) | STORE as u32))).unwrap();
        write_back(&mut cpu, Some(wb((8 << 6) | CEQ as u32))).unwrap();
        assert_eq!(cpu.read(6), 0);
        assert_eq!(cpu.read(8), 0);

        assert_eq!(cpu.history.inst_count, 3);
    }
}
