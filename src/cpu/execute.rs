//! CPU execution engine for the eZ80.
//!
//! Implements the decode-execute step and all instruction behaviors.
//!
//! A step is atomic: decode reads every instruction byte up front, the
//! handler runs against a scratch copy of the register file, and a handler
//! performs at most one memory write as its last fallible operation. The
//! scratch registers and the cycle count are committed only once the handler
//! has succeeded.

use crate::cpu::decode::{self, AluOp, Instruction, Operand};
use crate::cpu::memory::{self, MemoryError};
use crate::cpu::registers::{Pair, Reg8, Registers};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, trace};

/// How an instruction affects the condition flags.
///
/// The flag register is not modelled yet, so every instruction reports
/// `Unaffected`. Flag-setting instructions add their variant here and their
/// update in [`update_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagEffect {
    Unaffected,
}

impl Instruction {
    pub fn flag_effect(&self) -> FlagEffect {
        FlagEffect::Unaffected
    }
}

/// Where the program counter goes after a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Fall through to the next instruction.
    Next,
    /// Transfer control to a 16-bit offset in the current window.
    Jump(u16),
}

/// The eZ80 CPU state machine.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    /// CPU registers. Hosts may set these between steps (entry point,
    /// initial operands); a step itself only changes them on success.
    pub regs: Registers,
    /// Cycles consumed since construction.
    cycles: u64,
    /// Last executed instruction (for tracing).
    #[serde(skip)]
    last_instr: Option<Instruction>,
}

impl CpuState {
    /// Create a CPU in the reset state: every register and the cycle
    /// counter zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the CPU to the reset state.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Execute a single instruction.
    ///
    /// Returns the cumulative cycle count. On error nothing is changed.
    pub fn step(&mut self, memory: &mut [u8]) -> Result<u64, CpuError> {
        let pc = self.regs.pc24();

        let instr = decode::decode(memory, pc).map_err(|e| {
            debug!(pc = format_args!("{pc:06X}"), error = %e, "decode failed");
            e
        })?;

        let mut regs = self.regs;
        let flow = execute(instr, &mut regs, memory).map_err(|e| {
            debug!(pc = format_args!("{pc:06X}"), ?instr, error = %e, "execution failed");
            e
        })?;

        update_flags(&mut regs, instr.flag_effect());

        match flow {
            Flow::Next => regs.advance_pc(instr.length()),
            Flow::Jump(target) => regs.set_pc16(target),
        }

        self.regs = regs;
        self.cycles += u64::from(instr.cycles());
        self.last_instr = Some(instr);

        trace!(
            pc = format_args!("{pc:06X}"),
            ?instr,
            a = format_args!("{:02X}", self.regs.a),
            cycles = self.cycles,
            "step"
        );

        Ok(self.cycles)
    }

    /// The 24-bit address of the next instruction.
    pub fn program_counter(&self) -> u32 {
        self.regs.pc24()
    }

    /// Read-only view of the register file.
    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    /// Cycles consumed since construction or the last reset.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }
}

impl std::fmt::Debug for CpuState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuState")
            .field("pc", &format_args!("{:06X}", self.program_counter()))
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Execute one instruction at the current program counter.
///
/// Returns the new cumulative cycle count.
pub fn execute_one(cpu: &mut CpuState, memory: &mut [u8]) -> Result<u64, CpuError> {
    cpu.step(memory)
}

/// Run a decoded instruction's handler against `regs`.
fn execute(instr: Instruction, regs: &mut Registers, memory: &mut [u8]) -> Result<Flow, CpuError> {
    match instr {
        Instruction::Nop => {}

        // ==================== 8-bit loads ====================

        Instruction::LdRegImm { reg, value } => {
            regs.write8(reg, value);
        }

        Instruction::LdRegReg { dst, src } => {
            let value = regs.read8(src);
            regs.write8(dst, value);
        }

        Instruction::LdRegInd { dst } => {
            let value = memory::read(memory, hl_address(regs))?;
            regs.write8(dst, value);
        }

        Instruction::LdIndReg { src } => {
            memory::write(memory, hl_address(regs), regs.read8(src))?;
        }

        Instruction::LdIndImm { value } => {
            memory::write(memory, hl_address(regs), value)?;
        }

        Instruction::LdAIndexed { index, displacement } => {
            let addr = indexed_address(regs, index, displacement);
            regs.a = memory::read(memory, addr)?;
        }

        Instruction::LdIndexedA { index, displacement } => {
            let addr = indexed_address(regs, index, displacement);
            memory::write(memory, addr, regs.a)?;
        }

        Instruction::LdMbA => {
            regs.write8(Reg8::Mbase, regs.a);
        }

        Instruction::LdAMb => {
            regs.a = regs.read8(Reg8::Mbase);
        }

        // ==================== 16-bit loads and exchanges ====================

        Instruction::LdPairImm { pair, value } => {
            regs.write16(pair, value);
        }

        Instruction::ExDeHl => {
            std::mem::swap(&mut regs.de, &mut regs.hl);
        }

        // ==================== Arithmetic and logic ====================

        Instruction::Alu { op, operand } => {
            let value = match operand {
                Operand::Reg(reg) => regs.read8(reg),
                Operand::IndirectHl => memory::read(memory, hl_address(regs))?,
                Operand::Immediate(n) => n,
            };
            regs.a = alu(op, regs.a, value);
        }

        Instruction::IncReg { reg } => {
            regs.write8(reg, regs.read8(reg).wrapping_add(1));
        }

        Instruction::DecReg { reg } => {
            regs.write8(reg, regs.read8(reg).wrapping_sub(1));
        }

        Instruction::IncInd => {
            let addr = hl_address(regs);
            let value = memory::read(memory, addr)?;
            memory::write(memory, addr, value.wrapping_add(1))?;
        }

        Instruction::DecInd => {
            let addr = hl_address(regs);
            let value = memory::read(memory, addr)?;
            memory::write(memory, addr, value.wrapping_sub(1))?;
        }

        Instruction::IncPair { pair } => {
            regs.write16(pair, regs.read16(pair).wrapping_add(1));
        }

        Instruction::DecPair { pair } => {
            regs.write16(pair, regs.read16(pair).wrapping_sub(1));
        }

        Instruction::Cpl => {
            regs.a = !regs.a;
        }

        // ==================== Control flow ====================

        Instruction::Jp { target } => return Ok(Flow::Jump(target)),

        Instruction::JpPair { pair } => return Ok(Flow::Jump(regs.read16(pair))),

        Instruction::Jr { offset } => {
            let target = regs
                .pc16()
                .wrapping_add(instr.length())
                .wrapping_add_signed(i16::from(offset));
            return Ok(Flow::Jump(target));
        }
    }

    Ok(Flow::Next)
}

/// 8-bit accumulator arithmetic, wrapping modulo 256.
fn alu(op: AluOp, a: u8, value: u8) -> u8 {
    match op {
        AluOp::Add => a.wrapping_add(value),
        AluOp::Sub => a.wrapping_sub(value),
        AluOp::And => a & value,
        AluOp::Xor => a ^ value,
        AluOp::Or => a | value,
    }
}

fn update_flags(_regs: &mut Registers, effect: FlagEffect) {
    match effect {
        FlagEffect::Unaffected => {}
    }
}

/// MBASE:HL
fn hl_address(regs: &Registers) -> u32 {
    regs.effective_address(regs.read16(Pair::Hl))
}

/// MBASE:(IX/IY + d), the offset wrapping at 16 bits.
fn indexed_address(regs: &Registers, index: Pair, displacement: i8) -> u32 {
    let offset = regs.read16(index).wrapping_add_signed(i16::from(displacement));
    regs.effective_address(offset)
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CpuError {
    /// No handler exists for this opcode. `prefix` names the secondary
    /// table (`DD`, `FD` or `ED`) when the opcode followed one.
    #[error("unimplemented opcode {}{opcode:02X} at {address:06X}", prefix_label(.prefix))]
    UnimplementedOpcode {
        opcode: u8,
        prefix: Option<u8>,
        address: u32,
    },

    /// An instruction fetch or operand access fell outside the memory image.
    #[error("out of bounds access at {address:06X} (memory image is {size} bytes)")]
    OutOfBoundsAccess { address: u32, size: usize },
}

fn prefix_label(prefix: &Option<u8>) -> String {
    prefix.map(|p| format!("{p:02X} ")).unwrap_or_default()
}

impl From<MemoryError> for CpuError {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::OutOfBounds { address, size } => CpuError::OutOfBoundsAccess { address, size },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run `program` from address 0 for `steps` instructions.
    fn run(program: &[u8], steps: usize) -> (CpuState, Vec<u8>) {
        let mut cpu = CpuState::new();
        let mut mem = vec![0u8; 0x100];
        mem[..program.len()].copy_from_slice(program);
        for _ in 0..steps {
            cpu.step(&mut mem).unwrap();
        }
        (cpu, mem)
    }

    #[test]
    fn test_add_immediate_sequence() {
        let mut cpu = CpuState::new();
        let mut mem = [0xC6, 0x80, 0xC6, 0x50, 0xC6, 0x40];

        assert_eq!(execute_one(&mut cpu, &mut mem).unwrap(), 2);
        assert_eq!(cpu.regs.a, 0x80);

        assert_eq!(execute_one(&mut cpu, &mut mem).unwrap(), 4);
        assert_eq!(cpu.regs.a, 0xD0);

        assert_eq!(execute_one(&mut cpu, &mut mem).unwrap(), 6);
        assert_eq!(cpu.regs.a, 0x10);
        assert_eq!(cpu.program_counter(), 6);
    }

    #[test]
    fn test_unimplemented_opcode_leaves_state() {
        let (mut cpu, mut mem) = run(&[0x3E, 0x12, 0x76], 1);
        let before = cpu.clone();

        let err = cpu.step(&mut mem).unwrap_err();

        assert_eq!(
            err,
            CpuError::UnimplementedOpcode { opcode: 0x76, prefix: None, address: 2 }
        );
        assert_eq!(cpu, before);
        assert_eq!(cpu.cycles(), 2);
    }

    #[test]
    fn test_truncated_instruction_is_out_of_bounds() {
        let mut cpu = CpuState::new();
        let mut mem = [0x00, 0xC6];

        cpu.step(&mut mem).unwrap();
        let err = cpu.step(&mut mem).unwrap_err();

        assert_eq!(err, CpuError::OutOfBoundsAccess { address: 2, size: 2 });
        assert_eq!(cpu.program_counter(), 1);
        assert_eq!(cpu.cycles(), 1);
    }

    #[test]
    fn test_out_of_bounds_write_is_atomic() {
        // LD A,5 ; LD HL,0x8000 ; LD (HL),A
        let (mut cpu, mut mem) = run(&[0x3E, 0x05, 0x21, 0x00, 0x80, 0x77], 2);
        let before = cpu.clone();
        let mem_before = mem.clone();

        let err = cpu.step(&mut mem).unwrap_err();

        assert_eq!(err, CpuError::OutOfBoundsAccess { address: 0x8000, size: 0x100 });
        assert_eq!(cpu, before);
        assert_eq!(mem, mem_before);
    }

    #[test]
    fn test_ld_register_immediate_and_copy() {
        // LD B,0x42 ; LD A,B ; LD E,A
        let (cpu, _) = run(&[0x06, 0x42, 0x78, 0x5F], 3);
        assert_eq!(cpu.regs.a, 0x42);
        assert_eq!(cpu.regs.read8(Reg8::E), 0x42);
        assert_eq!(cpu.cycles(), 2 + 1 + 1);
        assert_eq!(cpu.program_counter(), 4);
    }

    #[test]
    fn test_ld_pair_keeps_upper_lane() {
        let mut cpu = CpuState::new();
        cpu.regs.write24(Pair::De, 0xAA_0000);
        let mut mem = [0x11, 0x34, 0x12];

        cpu.step(&mut mem).unwrap();

        assert_eq!(cpu.regs.read24(Pair::De), 0xAA_1234);
        assert_eq!(cpu.cycles(), 3);
    }

    #[test]
    fn test_indirect_hl_load_store() {
        // LD HL,0x0080 ; LD (HL),0x11 ; INC (HL) ; LD C,(HL) ; LD A,0x07 ; LD (HL),A
        let program = [0x21, 0x80, 0x00, 0x36, 0x11, 0x34, 0x4E, 0x3E, 0x07, 0x77];
        let (cpu, mem) = run(&program, 4);
        assert_eq!(cpu.regs.read8(Reg8::C), 0x12);
        assert_eq!(cpu.cycles(), 3 + 3 + 4 + 2);

        let (cpu, mem2) = run(&program, 6);
        assert_eq!(mem[0x80], 0x12);
        assert_eq!(mem2[0x80], 0x07);
        assert_eq!(cpu.program_counter(), 10);
    }

    #[test]
    fn test_hl_address_uses_mbase() {
        let mut cpu = CpuState::new();
        let mut mem = vec![0u8; 0x2_0000];
        cpu.regs.mbase = 0x01;
        cpu.regs.write16(Pair::Hl, 0x0010);
        cpu.regs.set_pc16(0x0000);
        mem[0x1_0000] = 0x7E; // LD A,(HL)
        mem[0x1_0010] = 0x99;
        mem[0x0010] = 0x55;

        cpu.step(&mut mem).unwrap();

        assert_eq!(cpu.regs.a, 0x99);
        assert_eq!(cpu.program_counter(), 0x1_0001);
    }

    #[test]
    fn test_alu_operations() {
        // LD A,0xF0 ; LD B,0x3C ; AND B ; OR 0x01 ; XOR 0xFF ; SUB 0x10
        let (cpu, _) = run(&[0x3E, 0xF0, 0x06, 0x3C, 0xA0, 0xF6, 0x01, 0xEE, 0xFF, 0xD6, 0x10], 6);
        // 0xF0 & 0x3C = 0x30, | 1 = 0x31, ^ 0xFF = 0xCE, - 0x10 = 0xBE
        assert_eq!(cpu.regs.a, 0xBE);
        assert_eq!(cpu.cycles(), 2 + 2 + 1 + 2 + 2 + 2);
    }

    #[test]
    fn test_alu_indirect_and_wrap() {
        // LD HL,0x0040 ; LD A,0x01 ; SUB (HL)
        let mut cpu = CpuState::new();
        let mut mem = vec![0u8; 0x100];
        mem[..6].copy_from_slice(&[0x21, 0x40, 0x00, 0x3E, 0x01, 0x96]);
        mem[0x40] = 0x02;
        for _ in 0..3 {
            cpu.step(&mut mem).unwrap();
        }
        assert_eq!(cpu.regs.a, 0xFF);
        assert_eq!(cpu.cycles(), 3 + 2 + 2);
    }

    #[test]
    fn test_inc_dec_wrap() {
        // LD A,0xFF ; INC A ; DEC B ; CPL
        let (cpu, _) = run(&[0x3E, 0xFF, 0x3C, 0x05, 0x2F], 4);
        assert_eq!(cpu.regs.a, 0xFF);
        assert_eq!(cpu.regs.read8(Reg8::B), 0xFF);
        // DEC B touches only the B lane of BC
        assert_eq!(cpu.regs.read24(Pair::Bc), 0x00_FF00);
    }

    #[test]
    fn test_inc_dec_pair_16_bit_view() {
        let mut cpu = CpuState::new();
        cpu.regs.write24(Pair::Hl, 0x12_FFFF);
        cpu.regs.write24(Pair::Bc, 0x34_0000);
        let mut mem = [0x23, 0x0B];

        cpu.step(&mut mem).unwrap();
        cpu.step(&mut mem).unwrap();

        assert_eq!(cpu.regs.read24(Pair::Hl), 0x12_0000);
        assert_eq!(cpu.regs.read24(Pair::Bc), 0x34_FFFF);
    }

    #[test]
    fn test_ex_de_hl() {
        let mut cpu = CpuState::new();
        cpu.regs.write24(Pair::De, 0x11_2233);
        cpu.regs.write24(Pair::Hl, 0x44_5566);
        let mut mem = [0xEB];

        cpu.step(&mut mem).unwrap();

        assert_eq!(cpu.regs.read24(Pair::De), 0x44_5566);
        assert_eq!(cpu.regs.read24(Pair::Hl), 0x11_2233);
    }

    #[test]
    fn test_jp_absolute() {
        let mut cpu = CpuState::new();
        cpu.regs.mbase = 0x00;
        let mut mem = vec![0u8; 0x100];
        mem[..3].copy_from_slice(&[0xC3, 0x40, 0x00]);
        mem[0x40] = 0x3C; // INC A

        assert_eq!(cpu.step(&mut mem).unwrap(), 4);
        assert_eq!(cpu.program_counter(), 0x40);
        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.regs.a, 1);
    }

    #[test]
    fn test_jr_relative() {
        // 00: JR +2 ; 02: NOP ; NOP ; 04: JR -6 (back to 00)
        let mut cpu = CpuState::new();
        let mut mem = [0x18, 0x02, 0x00, 0x00, 0x18, 0xFA];

        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.program_counter(), 4);
        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.program_counter(), 0);
        assert_eq!(cpu.cycles(), 6);
    }

    #[test]
    fn test_jp_indirect_pairs() {
        // LD HL,0x0010 ; JP (HL)
        let (cpu, _) = run(&[0x21, 0x10, 0x00, 0xE9], 2);
        assert_eq!(cpu.program_counter(), 0x10);

        // LD IY,0x0020 ; JP (IY)
        let (cpu, _) = run(&[0xFD, 0x21, 0x20, 0x00, 0xFD, 0xE9], 2);
        assert_eq!(cpu.program_counter(), 0x20);
        assert_eq!(cpu.cycles(), 4 + 2);
    }

    #[test]
    fn test_indexed_load_store() {
        // LD IX,0x0050 ; LD A,0x5A ; LD (IX-1),A ; INC IX ; CPL ; LD A,(IX-2)
        let program = [
            0xDD, 0x21, 0x50, 0x00,
            0x3E, 0x5A,
            0xDD, 0x77, 0xFF,
            0xDD, 0x23,
            0x2F,
            0xDD, 0x7E, 0xFE,
        ];
        let (cpu, mem) = run(&program, 5);
        assert_eq!(mem[0x4F], 0x5A);
        assert_eq!(cpu.regs.a, !0x5A);
        assert_eq!(cpu.regs.read16(Pair::Ix), 0x51);

        let (cpu, _) = run(&program, 6);
        assert_eq!(cpu.regs.a, 0x5A);
        assert_eq!(cpu.cycles(), 4 + 2 + 4 + 2 + 1 + 4);
        assert_eq!(cpu.program_counter(), program.len() as u32);
    }

    #[test]
    fn test_indexed_load_reads_memory() {
        let mut cpu = CpuState::new();
        let mut mem = vec![0u8; 0x100];
        mem[..3].copy_from_slice(&[0xFD, 0x7E, 0x03]); // LD A,(IY+3)
        mem[0x63] = 0x77;
        cpu.regs.write24(Pair::Iy, 0x00_0060);

        assert_eq!(cpu.step(&mut mem).unwrap(), 4);
        assert_eq!(cpu.regs.a, 0x77);
        assert_eq!(cpu.program_counter(), 3);
    }

    #[test]
    fn test_dec_indirect_wraps() {
        // LD HL,0x0080 ; DEC (HL) ; DEC (HL)
        let mut cpu = CpuState::new();
        let mut mem = vec![0u8; 0x100];
        mem[..5].copy_from_slice(&[0x21, 0x80, 0x00, 0x35, 0x35]);
        mem[0x80] = 0x01;

        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.step(&mut mem).unwrap(), 3 + 4);
        assert_eq!(mem[0x80], 0x00);
        assert_eq!(cpu.program_counter(), 4);

        assert_eq!(cpu.step(&mut mem).unwrap(), 3 + 4 + 4);
        assert_eq!(mem[0x80], 0xFF);
        assert_eq!(cpu.program_counter(), 5);
    }

    #[test]
    fn test_dec_index_pairs() {
        let mut cpu = CpuState::new();
        cpu.regs.write24(Pair::Ix, 0x7F_0000);
        cpu.regs.write24(Pair::Iy, 0x01_0100);
        let mut mem = [0xDD, 0x2B, 0xFD, 0x2B];

        assert_eq!(cpu.step(&mut mem).unwrap(), 2);
        assert_eq!(cpu.regs.read24(Pair::Ix), 0x7F_FFFF);
        assert_eq!(cpu.program_counter(), 2);

        assert_eq!(cpu.step(&mut mem).unwrap(), 4);
        assert_eq!(cpu.regs.read24(Pair::Iy), 0x01_00FF);
        assert_eq!(cpu.program_counter(), 4);
    }

    #[test]
    fn test_jp_ix() {
        let mut cpu = CpuState::new();
        cpu.regs.write24(Pair::Ix, 0x55_0030);
        let mut mem = vec![0u8; 0x100];
        mem[..2].copy_from_slice(&[0xDD, 0xE9]);
        mem[0x30] = 0x3C; // INC A

        assert_eq!(cpu.step(&mut mem).unwrap(), 2);
        // only the 16-bit view of IX reaches PC16
        assert_eq!(cpu.program_counter(), 0x30);

        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.regs.a, 1);
    }

    #[test]
    fn test_mbase_transfer_changes_window() {
        // LD A,0x01 ; LD MB,A
        let mut cpu = CpuState::new();
        let mut mem = vec![0u8; 0x2_0000];
        mem[..4].copy_from_slice(&[0x3E, 0x01, 0xED, 0x6D]);
        mem[0x1_0004] = 0xED; // LD A,MB
        mem[0x1_0005] = 0x6E;

        cpu.step(&mut mem).unwrap();
        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.regs.mbase, 0x01);
        assert_eq!(cpu.program_counter(), 0x1_0004);

        cpu.regs.a = 0;
        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.regs.a, 0x01);
    }

    #[test]
    fn test_host_register_edits_between_steps() {
        let mut cpu = CpuState::new();
        let mut mem = vec![0u8; 0x100];
        mem[..2].copy_from_slice(&[0xC6, 0x01]); // ADD A,1
        mem[0x40..0x42].copy_from_slice(&[0xC6, 0x02]);

        cpu.step(&mut mem).unwrap();
        cpu.regs.a = 0x10;
        cpu.regs.set_pc16(0x40);
        cpu.step(&mut mem).unwrap();

        assert_eq!(cpu.registers().a, 0x12);
        assert_eq!(cpu.program_counter(), 0x42);
        assert_eq!(cpu.cycles(), 4);
    }

    #[test]
    fn test_reset() {
        let (mut cpu, _) = run(&[0xC6, 0x01], 1);
        assert_eq!(cpu.last_instruction().map(|i| i.cycles()), Some(2));
        cpu.reset();
        assert_eq!(cpu, CpuState::new());
        assert_eq!(cpu.last_instruction(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = CpuError::UnimplementedOpcode { opcode: 0xB0, prefix: Some(0xED), address: 0x01_2345 };
        assert_eq!(err.to_string(), "unimplemented opcode ED B0 at 012345");
        let err = CpuError::UnimplementedOpcode { opcode: 0x76, prefix: None, address: 2 };
        assert_eq!(err.to_string(), "unimplemented opcode 76 at 000002");
    }
}
