//! LS-8 memory subsystem.
//!
//! 256 byte-addressable cells. The top of memory (below `0xF4`) is used
//! as a descending stack by convention; nothing enforces it.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of memory cells in the LS-8.
pub const MEMORY_SIZE: usize = 256;

/// LS-8 memory: 256 eight-bit cells.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Memory {
    cells: Vec<u8>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read a cell by address (0-255).
    #[inline]
    pub fn read(&self, addr: usize) -> Result<u8, MemoryError> {
        self.cells
            .get(addr)
            .copied()
            .ok_or(MemoryError::AddressOutOfRange(addr))
    }

    /// Write a cell by address (0-255).
    #[inline]
    pub fn write(&mut self, addr: usize, value: u8) -> Result<(), MemoryError> {
        let cell = self.cells
            .get_mut(addr)
            .ok_or(MemoryError::AddressOutOfRange(addr))?;
        *cell = value;
        Ok(())
    }

    /// Read a cell, yielding 0 past the end of memory.
    ///
    /// Only for lookahead bytes the current instruction does not consume
    /// and for diagnostics.
    #[inline]
    pub fn peek(&self, addr: usize) -> u8 {
        self.cells.get(addr).copied().unwrap_or(0)
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Load a program into memory starting at the given address.
    pub fn load_program(&mut self, start_addr: usize, program: &[u8]) -> Result<(), MemoryError> {
        let available = MEMORY_SIZE.saturating_sub(start_addr);
        if program.len() > available {
            return Err(MemoryError::ProgramTooLarge {
                size: program.len(),
                available,
            });
        }

        self.cells[start_addr..start_addr + program.len()].copy_from_slice(program);
        Ok(())
    }

    /// Dump memory contents (for debugging).
    pub fn dump(&self, start: usize, count: usize) -> Vec<(usize, u8)> {
        let end = start.saturating_add(count).min(MEMORY_SIZE);
        (start.min(end)..end)
            .map(|i| (i, self.cells[i]))
            .collect()
    }

    /// All cells, in address order.
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<u8>> for Memory {
    type Error = MemoryError;

    /// Restore memory from a snapshot; it must hold exactly 256 cells.
    fn try_from(cells: Vec<u8>) -> Result<Self, Self::Error> {
        if cells.len() != MEMORY_SIZE {
            return Err(MemoryError::WrongSize(cells.len()));
        }
        Ok(Self { cells })
    }
}

impl From<Memory> for Vec<u8> {
    fn from(mem: Memory) -> Self {
        mem.cells
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show non-zero cells
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Address is outside valid memory range.
    #[error("memory address {0:#04x} out of range (0x00 to 0xff)")]
    AddressOutOfRange(usize),
    /// Program is too large to fit in memory.
    #[error("program size {size} exceeds available space {available}")]
    ProgramTooLarge { size: usize, available: usize },
    /// Snapshot does not have one entry per cell.
    #[error("memory snapshot holds {0} cells, expected 256")]
    WrongSize(usize),
}
