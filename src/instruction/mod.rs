//! Instruction representation

use crate::error::SimulatorResult;

pub mod decode_helper;
pub mod disasm;

/// The PC is the last register in the register file
pub const PC: usize = 31;

/// Number of registers, PC included
pub const REGISTER_COUNT: usize = 32;

/// Opcodes of the toy instruction set.
/// Bit 0 selects the immediate variant, except for STORE.
pub mod opcodes {
    // ALU operations
    pub const ADD: u8 = 0b100000;
    pub const ADDI: u8 = ADD | 1;
    pub const SUB: u8 = 0b100010;
    pub const SUBI: u8 = SUB | 1;
    pub const AND: u8 = 0b100100;
    pub const ANDI: u8 = AND | 1;
    pub const OR: u8 = 0b100110;
    pub const ORI: u8 = OR | 1;
    pub const NOT: u8 = 0b101000;
    pub const SHL: u8 = 0b101010;
    pub const SHLI: u8 = SHL | 1;
    pub const SHRA: u8 = 0b101100;
    pub const SHRAI: u8 = SHRA | 1;
    pub const SHRL: u8 = 0b101110;
    pub const SHRLI: u8 = SHRL | 1;
    pub const MOVE: u8 = 0b001110;
    pub const MOVI: u8 = MOVE | 1;

    // Control flow
    pub const JMP: u8 = 0b000000;
    pub const JMPR: u8 = JMP | 1;
    pub const BRA: u8 = 0b000010;
    pub const BRR: u8 = BRA | 1;

    // Compare
    pub const CEQ: u8 = 0b000100;
    pub const CEQI: u8 = CEQ | 1;
    pub const CLTU: u8 = 0b000110;
    pub const CLTUI: u8 = CLTU | 1;
    pub const CLTS: u8 = 0b001000;
    pub const CLTSI: u8 = CLTS | 1;
    pub const CGTU: u8 = 0b001010;
    pub const CGTUI: u8 = CGTU | 1;
    pub const CGTS: u8 = 0b001100;
    pub const CGTSI: u8 = CGTS | 1;

    // IO
    pub const LOAD: u8 = 0b010000;
    pub const STORE: u8 = 0b010001;

    // Misc
    pub const NOP: u8 = 0b010010;
    pub const HALT: u8 = 0b010011;
}

/// Instruction classes. Anything the opcode table does not list is `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InstructionType {
    #[default]
    Unknown,
    /// add, sub, and, or, shifts
    BinaryArithmetic,
    /// not, move
    UnaryArithmetic,
    /// ceq, cltu, clts, cgtu, cgts
    Compare,
    /// jmp, jmpr
    Jump,
    /// bra, brr
    Branch,
    /// load, store
    IO,
    /// nop, halt
    Misc,
}

/// Wrapped instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Raw representation
    pub raw_inst: u32,
    /// Low six bits of the word
    pub opcode: u8,
    /// Class derived from the opcode
    pub itype: InstructionType,
}

impl Instruction {
    pub fn new(raw_inst: u32) -> Self {
        Self {
            raw_inst,
            opcode: decode_helper::decode_opcode(raw_inst),
            itype: decode_helper::decode_type(raw_inst),
        }
    }

    pub fn is_immediate(&self) -> bool {
        decode_helper::is_immediate_variant(self.raw_inst)
    }

    pub fn is_halt(&self) -> bool {
        self.opcode == opcodes::HALT
    }

    /// Destination register index, see [`decode_helper::decode_destination`]
    pub fn destination(&self) -> SimulatorResult<u32> {
        decode_helper::decode_destination(self.raw_inst)
    }

    /// The `n`-th operand field (1-based), see [`decode_helper::decode_operand`]
    pub fn operand(&self, n: u32) -> SimulatorResult<u32> {
        decode_helper::decode_operand(n, self.raw_inst)
    }

    pub fn mnemonic(&self) -> Option<&'static str> {
        mnemonic(self.opcode)
    }
}

/// Assembly mnemonic for an opcode, if the opcode exists
pub fn mnemonic(opcode: u8) -> Option<&'static str> {
    use opcodes::*;
    Some(match opcode {
        ADD => "ADD",
        ADDI => "ADDI",
        SUB => "SUB",
        SUBI => "SUBI",
        AND => "AND",
        ANDI => "ANDI",
        OR => "OR",
        ORI => "ORI",
        NOT => "NOT",
        SHL => "SHL",
        SHLI => "SHLI",
        SHRA => "SHRA",
        SHRAI => "SHRAI",
        SHRL => "SHRL",
        SHRLI => "SHRLI",
        JMP => "JMP",
        JMPR => "JMPR",
        BRA => "BRA",
        BRR => "BRR",
        CEQ => "CEQ",
        CEQI => "CEQI",
        CLTU => "CLTU",
        CLTUI => "CLTUI",
        CLTS => "CLTS",
        CLTSI => "CLTSI",
        CGTU => "CGTU",
        CGTUI => "CGTUI",
        CGTS => "CGTS",
        CGTSI => "CGTSI",
        MOVE => "MOVE",
        MOVI => "MOVI",
        LOAD => "LOAD",
        STORE => "STORE",
        NOP => "NOP",
        HALT => "HALT",
        _ => return None,
    })
}
