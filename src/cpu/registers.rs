//! eZ80 register file.
//!
//! The register model visible to this core:
//! - A: 8-bit accumulator
//! - BC, DE, HL: 24-bit general purpose pairs
//! - IX, IY: 24-bit index registers
//! - MBASE: 8-bit segment register, the upper byte of 16-bit-mode addresses
//! - PC: 24-bit program counter pair (only its low 16 bits are used for fetch)
//!
//! Every 24-bit register is stored as three byte lanes. The 16-bit view is
//! the low and mid lanes; writing it never touches the high lane.

use serde::{Serialize, Deserialize};

/// Mask for a 24-bit value.
pub const MASK_24: u32 = 0x00FF_FFFF;

/// A 24-bit register made of three independently addressable lanes.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Register24 {
    lanes: [u8; 3],
}

impl Register24 {
    /// Create a zero register.
    pub const fn zero() -> Self {
        Self { lanes: [0; 3] }
    }

    /// Create from a 24-bit value. Bits above 23 are discarded.
    pub const fn from_u24(value: u32) -> Self {
        Self {
            lanes: [value as u8, (value >> 8) as u8, (value >> 16) as u8],
        }
    }

    pub const fn low(&self) -> u8 {
        self.lanes[0]
    }

    pub const fn mid(&self) -> u8 {
        self.lanes[1]
    }

    pub const fn high(&self) -> u8 {
        self.lanes[2]
    }

    pub fn set_low(&mut self, value: u8) {
        self.lanes[0] = value;
    }

    pub fn set_mid(&mut self, value: u8) {
        self.lanes[1] = value;
    }

    pub fn set_high(&mut self, value: u8) {
        self.lanes[2] = value;
    }

    /// The 16-bit view: mid lane in bits 8-15, low lane in bits 0-7.
    pub const fn get16(&self) -> u16 {
        u16::from_le_bytes([self.lanes[0], self.lanes[1]])
    }

    /// Write the 16-bit view. The high lane is left as it was.
    pub fn set16(&mut self, value: u16) {
        let [low, mid] = value.to_le_bytes();
        self.lanes[0] = low;
        self.lanes[1] = mid;
    }

    /// The full 24-bit value.
    pub const fn get24(&self) -> u32 {
        (self.lanes[2] as u32) << 16 | (self.lanes[1] as u32) << 8 | self.lanes[0] as u32
    }

    /// Write all three lanes from a 24-bit value.
    pub fn set24(&mut self, value: u32) {
        *self = Self::from_u24(value);
    }
}

impl std::fmt::Debug for Register24 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06X}", self.get24())
    }
}

/// 8-bit registers addressable by instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg8 {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    /// The segment register.
    Mbase,
}

impl Reg8 {
    /// Decode the 3-bit register field used by Z80-family opcodes.
    ///
    /// Field value 6 means `(HL)` and is not a register, so it yields `None`.
    pub fn from_field(field: u8) -> Option<Self> {
        match field & 7 {
            0 => Some(Reg8::B),
            1 => Some(Reg8::C),
            2 => Some(Reg8::D),
            3 => Some(Reg8::E),
            4 => Some(Reg8::H),
            5 => Some(Reg8::L),
            7 => Some(Reg8::A),
            _ => None,
        }
    }
}

/// 24-bit register pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pair {
    Bc,
    De,
    Hl,
    Ix,
    Iy,
}

impl Pair {
    /// Decode the 2-bit pair field of `LD rr,nn` / `INC rr` / `DEC rr`.
    ///
    /// Field value 3 is SP, which this core does not model.
    pub fn from_field(field: u8) -> Option<Self> {
        match field & 3 {
            0 => Some(Pair::Bc),
            1 => Some(Pair::De),
            2 => Some(Pair::Hl),
            _ => None,
        }
    }

    /// The index register selected by a DD or FD prefix byte.
    pub fn from_index_prefix(prefix: u8) -> Option<Self> {
        match prefix {
            0xDD => Some(Pair::Ix),
            0xFD => Some(Pair::Iy),
            _ => None,
        }
    }
}

/// The register file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// A: 8-bit accumulator
    pub a: u8,
    pub bc: Register24,
    pub de: Register24,
    pub hl: Register24,
    pub ix: Register24,
    pub iy: Register24,
    /// MBASE: selects the 64KB window for 16-bit addresses
    pub mbase: u8,
    /// PC pair. Fetch uses the low 16 bits only.
    pub pc: Register24,
}

impl Registers {
    /// Create a register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn read8(&self, reg: Reg8) -> u8 {
        match reg {
            Reg8::A => self.a,
            Reg8::B => self.bc.mid(),
            Reg8::C => self.bc.low(),
            Reg8::D => self.de.mid(),
            Reg8::E => self.de.low(),
            Reg8::H => self.hl.mid(),
            Reg8::L => self.hl.low(),
            Reg8::Mbase => self.mbase,
        }
    }

    pub fn write8(&mut self, reg: Reg8, value: u8) {
        match reg {
            Reg8::A => self.a = value,
            Reg8::B => self.bc.set_mid(value),
            Reg8::C => self.bc.set_low(value),
            Reg8::D => self.de.set_mid(value),
            Reg8::E => self.de.set_low(value),
            Reg8::H => self.hl.set_mid(value),
            Reg8::L => self.hl.set_low(value),
            Reg8::Mbase => self.mbase = value,
        }
    }

    pub fn pair(&self, pair: Pair) -> &Register24 {
        match pair {
            Pair::Bc => &self.bc,
            Pair::De => &self.de,
            Pair::Hl => &self.hl,
            Pair::Ix => &self.ix,
            Pair::Iy => &self.iy,
        }
    }

    pub fn pair_mut(&mut self, pair: Pair) -> &mut Register24 {
        match pair {
            Pair::Bc => &mut self.bc,
            Pair::De => &mut self.de,
            Pair::Hl => &mut self.hl,
            Pair::Ix => &mut self.ix,
            Pair::Iy => &mut self.iy,
        }
    }

    pub fn read16(&self, pair: Pair) -> u16 {
        self.pair(pair).get16()
    }

    /// Write the 16-bit view of a pair, preserving its high lane.
    pub fn write16(&mut self, pair: Pair, value: u16) {
        self.pair_mut(pair).set16(value);
    }

    pub fn read24(&self, pair: Pair) -> u32 {
        self.pair(pair).get24()
    }

    pub fn write24(&mut self, pair: Pair, value: u32) {
        self.pair_mut(pair).set24(value);
    }

    /// Low 16 bits of the PC pair.
    pub fn pc16(&self) -> u16 {
        self.pc.get16()
    }

    /// Set the low 16 bits of the PC pair. MBASE is not touched.
    pub fn set_pc16(&mut self, value: u16) {
        self.pc.set16(value);
    }

    /// Advance PC16 by `length` bytes, wrapping inside the current window.
    pub fn advance_pc(&mut self, length: u16) {
        self.set_pc16(self.pc16().wrapping_add(length));
    }

    /// Combine MBASE with a 16-bit offset into a 24-bit address.
    pub fn effective_address(&self, offset: u16) -> u32 {
        (self.mbase as u32) << 16 | offset as u32
    }

    /// The 24-bit address the next instruction is fetched from.
    pub fn pc24(&self) -> u32 {
        self.effective_address(self.pc16())
    }
}
