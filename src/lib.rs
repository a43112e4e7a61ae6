//! # eZ80 Emulator
//!
//! A cycle-counted instruction-set emulator core for the eZ80 CPU family.
//!
//! The host owns a flat memory image and calls [`execute_one`] (or
//! [`CpuState::step`]) once per instruction. Each call decodes the
//! instruction at `MBASE:PC`, applies it, advances the program counter and
//! returns the cumulative cycle count.
//!
//! ```
//! use ez80::{execute_one, CpuState};
//!
//! let mut cpu = CpuState::new();
//! let mut memory = [0xC6, 0x80, 0xC6, 0x50];
//!
//! assert_eq!(execute_one(&mut cpu, &mut memory), Ok(2));
//! assert_eq!(execute_one(&mut cpu, &mut memory), Ok(4));
//! assert_eq!(cpu.registers().a, 0xD0);
//! ```

pub mod cpu;
pub mod runner;

// Re-export commonly used types
pub use cpu::{execute_one, CpuError, CpuState, Instruction, MemoryError, Pair, Reg8, Register24, Registers};
pub use runner::{Machine, RunConfig, RunError, RunSummary, StopReason};
