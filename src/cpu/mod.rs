//! CPU emulation for the eZ80.
//!
//! This module implements the instruction-set core:
//! - register file with 8/16/24-bit views of each register pair
//! - bounds-checked access to a caller-owned memory image
//! - total decode over the primary, `DD`/`FD` and `ED` opcode tables
//! - one handler per supported instruction with fixed cycle costs

pub mod memory;
pub mod registers;
pub mod decode;
pub mod execute;

pub use memory::MemoryError;
pub use registers::{Pair, Reg8, Register24, Registers};
pub use decode::{AluOp, Instruction, Operand};
pub use execute::{execute_one, CpuError, CpuState, FlagEffect};
