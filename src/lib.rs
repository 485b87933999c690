//! # LS-8 Emulator
//!
//! An emulator for the LS-8, a small 8-bit register machine used to teach
//! how a CPU works.
//!
//! The LS-8 has 256 bytes of memory, eight 8-bit registers and a flags
//! register. Programs are written one byte per line as binary literals and
//! run through a classic fetch-decode-execute loop.

pub mod cpu;
pub mod asm;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use cpu::{Cpu, CpuState, CpuError, Memory, Registers, Flags, Instruction, Opcode, AluOp};
pub use asm::{assemble, disassemble, AssemblerError, Program, LoadError, load_program, parse_program, save_program};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
