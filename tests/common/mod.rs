//! Shared helpers: instruction encoders and run harnesses.

#![allow(dead_code)]

use sim_lib::cpu::CPUState;
use sim_lib::error::SimulatorResult;
use sim_lib::instruction::opcodes::*;
use sim_lib::memory::MemoryImage;
use sim_lib::{pipelined, single_cycle};

pub const DATA_SIZE: usize = 4096;

fn reg(r: u32) -> u32 {
    assert!(r < 32, "register index {r} out of range");
    r
}

fn imm(value: i32, width: u32) -> u32 {
    let min = -(1i64 << (width - 1));
    let max = (1i64 << (width - 1)) - 1;
    assert!(
        (min..=max).contains(&(value as i64)),
        "immediate {value} does not fit in {width} bits"
    );
    (value as u32) & ((1u32 << width) - 1)
}

// Encoders

/// `OP rd, ra, rb`
pub fn binary(op: u8, rd: u32, ra: u32, rb: u32) -> u32 {
    (reg(rb) << 16) | (reg(ra) << 11) | (reg(rd) << 6) | op as u32
}

/// `OPI rd, ra, imm16`
pub fn binary_imm(op: u8, rd: u32, ra: u32, value: i32) -> u32 {
    (imm(value, 16) << 16) | (reg(ra) << 11) | (reg(rd) << 6) | op as u32
}

/// `OP rd, ra`
pub fn unary(op: u8, rd: u32, ra: u32) -> u32 {
    (reg(ra) << 11) | (reg(rd) << 6) | op as u32
}

/// `OPI rd, imm21`
pub fn unary_imm(op: u8, rd: u32, value: i32) -> u32 {
    (imm(value, 21) << 11) | (reg(rd) << 6) | op as u32
}

/// `OP ra, rb`
pub fn compare(op: u8, ra: u32, rb: u32) -> u32 {
    (reg(rb) << 11) | (reg(ra) << 6) | op as u32
}

/// `OPI ra, imm21`
pub fn compare_imm(op: u8, ra: u32, value: i32) -> u32 {
    (imm(value, 21) << 11) | (reg(ra) << 6) | op as u32
}

/// `JMP ra` / `BRA ra`
pub fn jump_reg(op: u8, ra: u32) -> u32 {
    (reg(ra) << 6) | op as u32
}

/// `JMPR off` / `BRR off`, relative to the following instruction
pub fn jump_rel(op: u8, offset: i32) -> u32 {
    (imm(offset, 26) << 6) | op as u32
}

/// `LOAD rd, [ra + off]` / `STORE rd, [ra + off]`
pub fn io(op: u8, rd: u32, ra: u32, offset: i32) -> u32 {
    (imm(offset, 16) << 16) | (reg(ra) << 11) | (reg(rd) << 6) | op as u32
}

pub fn movi(rd: u32, value: i32) -> u32 {
    unary_imm(MOVI, rd, value)
}

pub fn nop() -> u32 {
    NOP as u32
}

pub fn halt() -> u32 {
    HALT as u32
}

pub fn nops(n: usize) -> Vec<u32> {
    vec![nop(); n]
}

// Harness

pub struct Outcome {
    pub cpu: CPUState,
    pub mem: MemoryImage,
    pub cycles: u64,
}

pub fn run_pipelined(program: Vec<u32>) -> SimulatorResult<Outcome> {
    let mut cpu = CPUState::default();
    let mut mem = MemoryImage::new(program, DATA_SIZE);
    let cycles = pipelined::run(&mut cpu, &mut mem)?;
    Ok(Outcome { cpu, mem, cycles })
}

pub fn run_single_cycle(program: Vec<u32>) -> SimulatorResult<Outcome> {
    let mut cpu = CPUState::default();
    let mut mem = MemoryImage::new(program, DATA_SIZE);
    let cycles = single_cycle::run(&mut cpu, &mut mem)?;
    Ok(Outcome { cpu, mem, cycles })
}
