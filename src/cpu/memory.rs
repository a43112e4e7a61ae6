//! Memory interface.
//!
//! The CPU does not own memory. The host hands it a flat byte slice for the
//! duration of a single step, indexed by 24-bit effective address. Every
//! access is bounds-checked against the slice length.

use thiserror::Error;

/// Largest memory image the 24-bit address space can reach.
pub const ADDRESS_SPACE: usize = 1 << 24;

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Address is at or beyond the end of the memory image.
    #[error("address {address:#08X} outside memory image of {size} bytes")]
    OutOfBounds { address: u32, size: usize },
}

/// Verify that `address` is inside `memory`.
#[inline]
pub fn check(memory: &[u8], address: u32) -> Result<usize, MemoryError> {
    let index = address as usize;
    if index >= memory.len() {
        return Err(MemoryError::OutOfBounds {
            address,
            size: memory.len(),
        });
    }
    Ok(index)
}

/// Read one byte.
#[inline]
pub fn read(memory: &[u8], address: u32) -> Result<u8, MemoryError> {
    let index = check(memory, address)?;
    Ok(memory[index])
}

/// Write one byte.
#[inline]
pub fn write(memory: &mut [u8], address: u32, value: u8) -> Result<(), MemoryError> {
    let index = check(memory, address)?;
    memory[index] = value;
    Ok(())
}
