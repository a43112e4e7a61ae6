//! Host-side runner.
//!
//! Owns a memory image and a CPU, loads a program image, and calls the step
//! entry point until a step budget is spent or the CPU faults. The core never
//! decides how long to run; the budget lives here.

use crate::cpu::memory::ADDRESS_SPACE;
use crate::cpu::{CpuError, CpuState, Registers};
use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Runner configuration.
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Size of the memory image in bytes (at most 16MB).
    pub memory_size: usize,
    /// 24-bit address the program image is copied to.
    pub load_address: u32,
    /// Initial low 16 bits of the PC pair.
    pub pc: u16,
    /// Initial MBASE value.
    pub mbase: u8,
    /// Maximum number of instructions to execute.
    pub max_steps: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            memory_size: 0x1_0000,
            load_address: 0,
            pc: 0,
            mbase: 0,
            max_steps: 10_000,
        }
    }
}

impl RunConfig {
    /// Parse a JSON config.
    pub fn from_json(source: &str) -> Result<Self, RunError> {
        serde_json::from_str(source).map_err(|e| RunError::Config(e.to_string()))
    }

    /// Load a JSON config file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RunError> {
        let source = std::fs::read_to_string(path.as_ref())
            .map_err(|e| RunError::IoError(e.to_string()))?;
        Self::from_json(&source)
    }

    fn validate(&self) -> Result<(), RunError> {
        if self.memory_size == 0 || self.memory_size > ADDRESS_SPACE {
            return Err(RunError::InvalidMemorySize(self.memory_size));
        }
        Ok(())
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The step budget was used up.
    StepLimit,
    /// A step failed. The CPU is left as it was before that step.
    Fault(CpuError),
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Instructions executed successfully.
    pub steps: u64,
    /// Cumulative cycle count.
    pub cycles: u64,
    /// 24-bit program counter after the run.
    pub pc: u32,
    pub registers: Registers,
    pub stop: StopReason,
}

/// A CPU together with the memory image it runs against.
#[derive(Debug, Clone)]
pub struct Machine {
    pub cpu: CpuState,
    pub memory: Vec<u8>,
}

impl Machine {
    /// Create a machine with zeroed memory and the CPU at the configured
    /// entry point.
    pub fn new(config: &RunConfig) -> Result<Self, RunError> {
        config.validate()?;

        let mut cpu = CpuState::new();
        cpu.regs.mbase = config.mbase;
        cpu.regs.set_pc16(config.pc);

        Ok(Self {
            cpu,
            memory: vec![0; config.memory_size],
        })
    }

    /// Copy a program image into memory at `origin`.
    pub fn load_image(&mut self, origin: u32, image: &[u8]) -> Result<(), RunError> {
        load_image(&mut self.memory, origin, image)?;
        debug!(origin = format_args!("{origin:06X}"), size = image.len(), "image loaded");
        Ok(())
    }

    /// Run for at most `max_steps` instructions.
    pub fn run(&mut self, max_steps: u64) -> RunSummary {
        let mut steps = 0;
        let mut stop = StopReason::StepLimit;

        while steps < max_steps {
            match self.cpu.step(&mut self.memory) {
                Ok(_) => steps += 1,
                Err(e) => {
                    stop = StopReason::Fault(e);
                    break;
                }
            }
        }

        info!(steps, cycles = self.cpu.cycles(), ?stop, "run finished");

        RunSummary {
            steps,
            cycles: self.cpu.cycles(),
            pc: self.cpu.program_counter(),
            registers: *self.cpu.registers(),
            stop,
        }
    }
}

/// Copy a program image into `memory` starting at `origin`.
pub fn load_image(memory: &mut [u8], origin: u32, image: &[u8]) -> Result<(), RunError> {
    let start = origin as usize;
    let available = memory.len().saturating_sub(start);
    let target = start
        .checked_add(image.len())
        .and_then(|end| memory.get_mut(start..end))
        .ok_or(RunError::ImageTooLarge {
            origin,
            size: image.len(),
            available,
        })?;

    target.copy_from_slice(image);
    Ok(())
}

/// Build a machine from `config`, load `image` and run it.
pub fn run(config: &RunConfig, image: &[u8]) -> Result<RunSummary, RunError> {
    let mut machine = Machine::new(config)?;
    machine.load_image(config.load_address, image)?;
    Ok(machine.run(config.max_steps))
}

/// Errors that can occur while setting up a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("memory size {0} must be between 1 and 16777216 bytes")]
    InvalidMemorySize(usize),

    #[error("image of {size} bytes does not fit at {origin:06X} ({available} bytes available)")]
    ImageTooLarge { origin: u32, size: usize, available: usize },
}
