//! Decoding helper functions.
//! All of them work on the raw 32-bit word; register operands are returned
//! as indices and never read from the register file here.

use super::opcodes;
use super::InstructionType;
use crate::error::DecodeError;
use crate::error::SimulatorResult;

const OPCODE_MASK: u32 = 0x3f;

/// Returns the opcode class of a raw instruction.
/// Only the low six bits take part in the lookup.
pub fn decode_type(raw_inst: u32) -> InstructionType {
    opcode_to_type(decode_opcode(raw_inst))
}

/// Maps an opcode to its instruction class
pub fn opcode_to_type(opcode: u8) -> InstructionType {
    use opcodes::*;
    use InstructionType::*;
    match opcode {
        ADD | ADDI | SUB | SUBI | AND | ANDI | OR | ORI | SHL | SHLI | SHRA
        | SHRAI | SHRL | SHRLI => BinaryArithmetic,
        NOT | MOVE | MOVI => UnaryArithmetic,
        CEQ | CEQI | CLTU | CLTUI | CLTS | CLTSI | CGTU | CGTUI | CGTS
        | CGTSI => Compare,
        JMP | JMPR => Jump,
        BRA | BRR => Branch,
        LOAD | STORE => IO,
        NOP | HALT => Misc,
        _ => Unknown,
    }
}

/// Extracts the opcode. Meaningless unless the type was checked first.
pub fn decode_opcode(raw_inst: u32) -> u8 {
    (raw_inst & OPCODE_MASK) as u8
}

/// True iff the last operand is an immediate.
/// STORE shares bit 0 with the immediate flag but never takes one.
pub fn is_immediate_variant(raw_inst: u32) -> bool {
    raw_inst & 0x1 != 0 && decode_opcode(raw_inst) != opcodes::STORE
}

/// Register that receives the result. For STORE it names the register
/// holding the value to store.
pub fn decode_destination(raw_inst: u32) -> SimulatorResult<u32> {
    use InstructionType::*;
    match decode_type(raw_inst) {
        BinaryArithmetic | UnaryArithmetic | IO => Ok(get_field(raw_inst, 6, 5)),
        _ => Err(DecodeError::NoDestination(raw_inst).into()),
    }
}

/// Decodes the `operand`-th operand (1-based) of an instruction.
/// Immediates come back sign-extended; register operands as indices.
pub fn decode_operand(operand: u32, raw_inst: u32) -> SimulatorResult<u32> {
    use InstructionType::*;
    let immediate = is_immediate_variant(raw_inst);
    let value = match (decode_type(raw_inst), operand) {
        (BinaryArithmetic, 1) => get_field(raw_inst, 11, 5),
        (BinaryArithmetic, 2) if immediate => get_imm(raw_inst, 16, 16),
        (BinaryArithmetic, 2) => get_field(raw_inst, 16, 5),
        (UnaryArithmetic, 1) if immediate => get_imm(raw_inst, 11, 21),
        (UnaryArithmetic, 1) => get_field(raw_inst, 11, 5),
        (Compare, 1) => get_field(raw_inst, 6, 5),
        (Compare, 2) if immediate => get_imm(raw_inst, 11, 21),
        (Compare, 2) => get_field(raw_inst, 11, 5),
        (Jump | Branch, 1) if immediate => get_imm(raw_inst, 6, 26),
        (Jump | Branch, 1) => get_field(raw_inst, 6, 5),
        (IO, 1) => get_field(raw_inst, 11, 5),
        // The IO offset is always an immediate
        (IO, 2) => get_imm(raw_inst, 16, 16),
        _ => {
            return Err(
                DecodeError::UnsupportedOperand { operand, raw_inst }.into()
            )
        }
    };
    Ok(value)
}

/// Replicates bit `nbits - 1` of `value` into all higher bits
pub fn sign_extend(value: u32, nbits: u32) -> u32 {
    debug_assert!((1..=32).contains(&nbits));
    let shamt = 32 - nbits;
    (((value << shamt) as i32) >> shamt) as u32
}

/// Extracts `width` bits starting at bit `lo`
fn get_field(raw_inst: u32, lo: u32, width: u32) -> u32 {
    (raw_inst >> lo) & ((1u64 << width) - 1) as u32
}

/// Extracts a sign-extended immediate of `width` bits starting at bit `lo`
fn get_imm(raw_inst: u32, lo: u32, width: u32) -> u32 {
    sign_extend(get_field(raw_inst, lo, width), width)
}
