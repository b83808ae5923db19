//! ALU implementation
//!
//! Three operation families, each selected by opcode. Register and
//! immediate variants of an opcode map to the same operation.

use crate::instruction::opcodes::*;

/// Operations taking two operands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    And,
    Or,
    Shl,
    Shra,
    Shrl,
}

impl BinaryOp {
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            ADD | ADDI => Some(Self::Add),
            SUB | SUBI => Some(Self::Sub),
            AND | ANDI => Some(Self::And),
            OR | ORI => Some(Self::Or),
            SHL | SHLI => Some(Self::Shl),
            SHRA | SHRAI => Some(Self::Shra),
            SHRL | SHRLI => Some(Self::Shrl),
            _ => None,
        }
    }

    pub fn apply(self, a: u32, b: u32) -> u32 {
        match self {
            Self::Add => add(a, b),
            Self::Sub => sub(a, b),
            Self::And => and(a, b),
            Self::Or => or(a, b),
            Self::Shl => shl(a, b),
            Self::Shra => shra(a, b),
            Self::Shrl => shrl(a, b),
        }
    }
}

/// Operations taking one operand
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Move,
}

impl UnaryOp {
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            NOT => Some(Self::Not),
            MOVE | MOVI => Some(Self::Move),
            _ => None,
        }
    }

    pub fn apply(self, a: u32) -> u32 {
        match self {
            Self::Not => not(a),
            Self::Move => mov(a),
        }
    }
}

/// Comparisons feeding the flag
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    LtU,
    LtS,
    GtU,
    GtS,
}

impl CompareOp {
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            CEQ | CEQI => Some(Self::Eq),
            CLTU | CLTUI => Some(Self::LtU),
            CLTS | CLTSI => Some(Self::LtS),
            CGTU | CGTUI => Some(Self::GtU),
            CGTS | CGTSI => Some(Self::GtS),
            _ => None,
        }
    }

    pub fn apply(self, a: u32, b: u32) -> bool {
        match self {
            Self::Eq => ceq(a, b),
            Self::LtU => cltu(a, b),
            Self::LtS => clts(a, b),
            Self::GtU => cgtu(a, b),
            Self::GtS => cgts(a, b),
        }
    }
}

pub fn add(a: u32, b: u32) -> u32 {
    a.wrapping_add(b)
}

pub fn sub(a: u32, b: u32) -> u32 {
    a.wrapping_sub(b)
}

pub fn and(a: u32, b: u32) -> u32 {
    a & b
}

pub fn or(a: u32, b: u32) -> u32 {
    a | b
}

/// `b` selects the distance: zero shifts by one bit, anything else by eight
fn shift_amount(b: u32) -> u32 {
    if b == 0 {
        1
    } else {
        8
    }
}

pub fn shl(a: u32, b: u32) -> u32 {
    a << shift_amount(b)
}

/// Vacated high bits take the old top bit
pub fn shra(a: u32, b: u32) -> u32 {
    ((a as i32) >> shift_amount(b)) as u32
}

pub fn shrl(a: u32, b: u32) -> u32 {
    a >> shift_amount(b)
}

pub fn not(a: u32) -> u32 {
    !a
}

pub fn mov(a: u32) -> u32 {
    a
}

pub fn ceq(a: u32, b: u32) -> bool {
    a == b
}

pub fn cltu(a: u32, b: u32) -> bool {
    a < b
}

pub fn clts(a: u32, b: u32) -> bool {
    (a as i32) < (b as i32)
}

pub fn cgtu(a: u32, b: u32) -> bool {
    a > b
}

pub fn cgts(a: u32, b: u32) -> bool {
    (a as i32) > (b as i32)
}
