//! Program files, assembler and disassembler for the LS-8.
//!
//! This module provides:
//! - The `.ls8` binary-literal program format (loader and writer)
//! - A simple two-pass assembler (mnemonics → program bytes)
//! - A disassembler (program bytes → readable text)

pub mod assembler;
pub mod disasm;
pub mod loader;

pub use assembler::{assemble, AssemblerError};
pub use disasm::disassemble;
pub use loader::{Program, LoadError, load_program, parse_program, save_program};
