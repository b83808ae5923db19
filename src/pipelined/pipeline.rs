//! Pipeline state
use crate::instruction::Instruction;

/// Pipeline state = 4 pipeline registers.
/// An empty slot means the producing stage had no input last cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineState {
    pub if_id: Option<IFIDRegister>,
    pub id_ex: Option<IDEXRegister>,
    pub ex_mem: Option<EXMEMRegister>,
    pub mem_wb: Option<MEMWBRegister>,
}

impl PipelineState {
    /// No stage holds an instruction
    pub fn is_drained(&self) -> bool {
        self.if_id.is_none()
            && self.id_ex.is_none()
            && self.ex_mem.is_none()
            && self.mem_wb.is_none()
    }

    /// Number of occupied slots
    pub fn occupancy(&self) -> usize {
        [
            self.if_id.is_some(),
            self.id_ex.is_some(),
            self.ex_mem.is_some(),
            self.mem_wb.is_some(),
        ]
        .into_iter()
        .filter(|&occupied| occupied)
        .count()
    }
}

/// IF/ID register
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IFIDRegister {
    /// PC of the following instruction
    pub next_pc: u32,

    /// Fetched instruction
    pub inst: Instruction,
}

/// ID/EX register
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IDEXRegister {
    pub next_pc: u32,
    pub inst: Instruction,

    /// Operand 1, register value or immediate
    pub op1: u32,
    /// Operand 2, register value or immediate
    pub op2: u32,

    /// LOAD: destination register index. STORE: value to store.
    pub io_op: u32,
}

/// EX/MEM register
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EXMEMRegister {
    pub next_pc: u32,
    pub inst: Instruction,

    /// Set for jumps and for branches that saw the flag
    pub branch_taken: bool,

    /// ALU result, jump target or data address
    pub result: u32,

    pub io_op: u32,
}

/// MEM/WB register
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MEMWBRegister {
    pub next_pc: u32,
    pub inst: Instruction,

    /// Value to write back, loaded data for LOAD
    pub result: u32,

    pub io_op: u32,
}
