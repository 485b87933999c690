//! CPU emulation for the LS-8.
//!
//! This module implements the complete LS-8 architecture:
//! - 256 bytes of memory
//! - 8 general-purpose registers (R5 = IM, R6 = IS, R7 = SP) and a flags register
//! - an ALU for arithmetic, bitwise and compare operations
//! - a fetch-decode-execute loop over the LS-8 instruction set

pub mod memory;
pub mod registers;
pub mod alu;
pub mod decode;
pub mod execute;

pub use memory::{Memory, MemoryError};
pub use registers::{Flags, Registers, RegisterError};
pub use alu::{Alu, AluOp, AluError};
pub use decode::{Instruction, Opcode, DecodeError};
pub use execute::{Cpu, CpuError, CpuState};
