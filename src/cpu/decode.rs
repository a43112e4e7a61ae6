//! Instruction decoder for the eZ80.
//!
//! Decoding is a pure function of the bytes at the program counter. The
//! primary table covers all 256 opcodes; the `DD`/`FD` (index register) and
//! `ED` (extended) prefixes each select a secondary table that is again
//! total over 256 opcodes. Anything without a handler is reported as
//! [`CpuError::UnimplementedOpcode`].
//!
//! Encodings follow the Z80 field layout: `r` fields are 3 bits
//! (B, C, D, E, H, L, (HL), A) and `rr` fields are 2 bits (BC, DE, HL, SP).

use crate::cpu::memory;
use crate::cpu::registers::{Pair, Reg8};
use crate::cpu::CpuError;
use serde::{Serialize, Deserialize};

/// Accumulator operations that take one 8-bit operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AluOp {
    Add,
    Sub,
    And,
    Xor,
    Or,
}

impl AluOp {
    /// Decode bits 3-5 of an ALU opcode.
    ///
    /// ADC, SBC and CP need the carry and compare flags, which this core
    /// does not model yet.
    fn from_field(field: u8) -> Option<Self> {
        match field & 7 {
            0 => Some(AluOp::Add),
            2 => Some(AluOp::Sub),
            4 => Some(AluOp::And),
            5 => Some(AluOp::Xor),
            6 => Some(AluOp::Or),
            _ => None,
        }
    }
}

/// Source operand of an ALU instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Reg(Reg8),
    /// The byte at MBASE:HL
    IndirectHl,
    Immediate(u8),
}

/// Decoded eZ80 instruction.
///
/// Every operand byte the handler needs is carried in the variant, so
/// execution never goes back to memory for instruction bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// No operation
    Nop,

    // ==================== 8-bit loads ====================

    /// r := n
    LdRegImm { reg: Reg8, value: u8 },
    /// r := r'
    LdRegReg { dst: Reg8, src: Reg8 },
    /// r := (HL)
    LdRegInd { dst: Reg8 },
    /// (HL) := r
    LdIndReg { src: Reg8 },
    /// (HL) := n
    LdIndImm { value: u8 },
    /// A := (IX/IY + d)
    LdAIndexed { index: Pair, displacement: i8 },
    /// (IX/IY + d) := A
    LdIndexedA { index: Pair, displacement: i8 },
    /// MBASE := A
    LdMbA,
    /// A := MBASE
    LdAMb,

    // ==================== 16-bit loads and exchanges ====================

    /// rr := nn (16-bit view, upper lane untouched)
    LdPairImm { pair: Pair, value: u16 },
    /// DE <-> HL
    ExDeHl,

    // ==================== Arithmetic and logic ====================

    /// A := A <op> operand
    Alu { op: AluOp, operand: Operand },
    /// r := r + 1
    IncReg { reg: Reg8 },
    /// r := r - 1
    DecReg { reg: Reg8 },
    /// (HL) := (HL) + 1
    IncInd,
    /// (HL) := (HL) - 1
    DecInd,
    /// rr := rr + 1 (16-bit view)
    IncPair { pair: Pair },
    /// rr := rr - 1 (16-bit view)
    DecPair { pair: Pair },
    /// A := !A
    Cpl,

    // ==================== Control flow ====================

    /// PC16 := nn
    Jp { target: u16 },
    /// PC16 := rr
    JpPair { pair: Pair },
    /// PC16 := PC16 + 2 + d
    Jr { offset: i8 },
}

impl Instruction {
    /// Encoded length in bytes, including any prefix.
    pub fn length(&self) -> u16 {
        match self {
            Instruction::Nop => 1,
            Instruction::LdRegImm { .. } => 2,
            Instruction::LdRegReg { .. } => 1,
            Instruction::LdRegInd { .. } => 1,
            Instruction::LdIndReg { .. } => 1,
            Instruction::LdIndImm { .. } => 2,
            Instruction::LdAIndexed { .. } | Instruction::LdIndexedA { .. } => 3,
            Instruction::LdMbA | Instruction::LdAMb => 2,
            Instruction::LdPairImm { pair, .. } => 3 + prefix_len(*pair),
            Instruction::ExDeHl => 1,
            Instruction::Alu { operand: Operand::Immediate(_), .. } => 2,
            Instruction::Alu { .. } => 1,
            Instruction::IncReg { .. } | Instruction::DecReg { .. } => 1,
            Instruction::IncInd | Instruction::DecInd => 1,
            Instruction::IncPair { pair } | Instruction::DecPair { pair } => 1 + prefix_len(*pair),
            Instruction::Cpl => 1,
            Instruction::Jp { .. } => 3,
            Instruction::JpPair { pair } => 1 + prefix_len(*pair),
            Instruction::Jr { .. } => 2,
        }
    }

    /// Fixed cycle cost (eZ80, Z80 mode, zero wait states).
    pub fn cycles(&self) -> u8 {
        match self {
            Instruction::Nop => 1,
            Instruction::LdRegImm { .. } => 2,
            Instruction::LdRegReg { .. } => 1,
            Instruction::LdRegInd { .. } => 2,
            Instruction::LdIndReg { .. } => 2,
            Instruction::LdIndImm { .. } => 3,
            Instruction::LdAIndexed { .. } | Instruction::LdIndexedA { .. } => 4,
            Instruction::LdMbA | Instruction::LdAMb => 2,
            Instruction::LdPairImm { pair, .. } => 3 + prefix_len(*pair) as u8,
            Instruction::ExDeHl => 1,
            Instruction::Alu { operand: Operand::Reg(_), .. } => 1,
            Instruction::Alu { .. } => 2,
            Instruction::IncReg { .. } | Instruction::DecReg { .. } => 1,
            Instruction::IncInd | Instruction::DecInd => 4,
            Instruction::IncPair { pair } | Instruction::DecPair { pair } => 1 + prefix_len(*pair) as u8,
            Instruction::Cpl => 1,
            Instruction::Jp { .. } => 4,
            Instruction::JpPair { pair } => 1 + prefix_len(*pair) as u8,
            Instruction::Jr { .. } => 3,
        }
    }
}

/// Index register forms carry one extra prefix byte.
fn prefix_len(pair: Pair) -> u16 {
    match pair {
        Pair::Ix | Pair::Iy => 1,
        Pair::Bc | Pair::De | Pair::Hl => 0,
    }
}

/// Instruction bytes at a program counter.
///
/// Offsets wrap inside the 64KB window selected by the upper byte of `pc`,
/// the same way the program counter itself advances.
struct Fetch<'a> {
    memory: &'a [u8],
    pc: u32,
}

impl Fetch<'_> {
    fn address(&self, offset: u16) -> u32 {
        (self.pc & 0xFF_0000) | (self.pc as u16).wrapping_add(offset) as u32
    }

    fn byte(&self, offset: u16) -> Result<u8, CpuError> {
        Ok(memory::read(self.memory, self.address(offset))?)
    }

    fn displacement(&self, offset: u16) -> Result<i8, CpuError> {
        Ok(self.byte(offset)? as i8)
    }

    /// Little-endian 16-bit immediate.
    fn word(&self, offset: u16) -> Result<u16, CpuError> {
        let low = self.byte(offset)?;
        let high = self.byte(offset.wrapping_add(1))?;
        Ok(u16::from_le_bytes([low, high]))
    }

    fn unimplemented(&self, prefix: Option<u8>, opcode: u8) -> CpuError {
        CpuError::UnimplementedOpcode {
            opcode,
            prefix,
            address: self.pc,
        }
    }
}

/// Decode the instruction at the 24-bit address `pc`.
pub fn decode(memory: &[u8], pc: u32) -> Result<Instruction, CpuError> {
    let fetch = Fetch { memory, pc };
    let op = fetch.byte(0)?;

    let instruction = match op {
        0x00 => Instruction::Nop,

        // LD rr,nn (31 = LD SP,nn)
        0x01 | 0x11 | 0x21 | 0x31 => match Pair::from_field(op >> 4) {
            Some(pair) => Instruction::LdPairImm { pair, value: fetch.word(1)? },
            None => return Err(fetch.unimplemented(None, op)),
        },

        // INC rr / DEC rr (33, 3B = SP)
        0x03 | 0x13 | 0x23 | 0x33 | 0x0B | 0x1B | 0x2B | 0x3B => {
            let Some(pair) = Pair::from_field(op >> 4) else {
                return Err(fetch.unimplemented(None, op));
            };
            if op & 0x08 == 0 {
                Instruction::IncPair { pair }
            } else {
                Instruction::DecPair { pair }
            }
        }

        // INC r / INC (HL)
        op if op & 0xC7 == 0x04 && op < 0x40 => match Reg8::from_field(op >> 3) {
            Some(reg) => Instruction::IncReg { reg },
            None => Instruction::IncInd,
        },

        // DEC r / DEC (HL)
        op if op & 0xC7 == 0x05 && op < 0x40 => match Reg8::from_field(op >> 3) {
            Some(reg) => Instruction::DecReg { reg },
            None => Instruction::DecInd,
        },

        // LD r,n / LD (HL),n
        op if op & 0xC7 == 0x06 && op < 0x40 => {
            let value = fetch.byte(1)?;
            match Reg8::from_field(op >> 3) {
                Some(reg) => Instruction::LdRegImm { reg, value },
                None => Instruction::LdIndImm { value },
            }
        }

        0x18 => Instruction::Jr { offset: fetch.displacement(1)? },
        0x2F => Instruction::Cpl,

        // LD r,r' / LD r,(HL) / LD (HL),r (76 = HALT)
        0x40..=0x7F => match (Reg8::from_field(op >> 3), Reg8::from_field(op)) {
            (Some(dst), Some(src)) => Instruction::LdRegReg { dst, src },
            (Some(dst), None) => Instruction::LdRegInd { dst },
            (None, Some(src)) => Instruction::LdIndReg { src },
            (None, None) => return Err(fetch.unimplemented(None, op)),
        },

        // ALU A,r / ALU A,(HL)
        0x80..=0xBF => {
            let Some(alu) = AluOp::from_field(op >> 3) else {
                return Err(fetch.unimplemented(None, op));
            };
            let operand = Reg8::from_field(op).map_or(Operand::IndirectHl, Operand::Reg);
            Instruction::Alu { op: alu, operand }
        }

        0xC3 => Instruction::Jp { target: fetch.word(1)? },

        // ALU A,n (CE, DE, FE need flags)
        0xC6 | 0xD6 | 0xE6 | 0xEE | 0xF6 => match AluOp::from_field(op >> 3) {
            Some(alu) => Instruction::Alu {
                op: alu,
                operand: Operand::Immediate(fetch.byte(1)?),
            },
            None => return Err(fetch.unimplemented(None, op)),
        },

        0xE9 => Instruction::JpPair { pair: Pair::Hl },
        0xEB => Instruction::ExDeHl,

        0xDD | 0xFD => return decode_indexed(&fetch, op),
        0xED => return decode_extended(&fetch),

        _ => return Err(fetch.unimplemented(None, op)),
    };

    Ok(instruction)
}

/// Secondary table for the `DD` (IX) and `FD` (IY) prefixes.
fn decode_indexed(fetch: &Fetch<'_>, prefix: u8) -> Result<Instruction, CpuError> {
    let op = fetch.byte(1)?;
    let Some(index) = Pair::from_index_prefix(prefix) else {
        return Err(fetch.unimplemented(Some(prefix), op));
    };

    let instruction = match op {
        0x21 => Instruction::LdPairImm { pair: index, value: fetch.word(2)? },
        0x23 => Instruction::IncPair { pair: index },
        0x2B => Instruction::DecPair { pair: index },
        0x77 => Instruction::LdIndexedA { index, displacement: fetch.displacement(2)? },
        0x7E => Instruction::LdAIndexed { index, displacement: fetch.displacement(2)? },
        0xE9 => Instruction::JpPair { pair: index },
        _ => return Err(fetch.unimplemented(Some(prefix), op)),
    };

    Ok(instruction)
}

/// Secondary table for the `ED` prefix.
fn decode_extended(fetch: &Fetch<'_>) -> Result<Instruction, CpuError> {
    let op = fetch.byte(1)?;

    let instruction = match op {
        0x6D => Instruction::LdMbA,
        0x6E => Instruction::LdAMb,
        _ => return Err(fetch.unimplemented(Some(0xED), op)),
    };

    Ok(instruction)
}
