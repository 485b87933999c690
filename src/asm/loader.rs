//! LS-8 program file format.
//!
//! A `.ls8` file is plain text:
//! - One byte per line, written as a base-2 literal (`10000010`)
//! - Anything after `#` is a comment
//! - Blank lines are ignored and take no address
//!
//! Bytes are stored at consecutive addresses starting at 0.

use crate::asm::disasm::decode_at;
use crate::cpu::memory::MEMORY_SIZE;
use log::debug;
use std::path::Path;
use thiserror::Error;

/// A loaded program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Program bytes, address 0 first.
    pub bytes: Vec<u8>,
    /// 1-based source line of each byte.
    pub source_lines: Vec<usize>,
}

impl Program {
    /// Create a new empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a byte that came from source line `line`.
    pub fn push(&mut self, byte: u8, line: usize) {
        self.bytes.push(byte);
        self.source_lines.push(line);
    }

    /// Get the number of bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Parse program text.
pub fn parse_program(text: &str) -> Result<Program, LoadError> {
    let mut program = Program::new();

    for (line_num, line) in text.lines().enumerate() {
        let token = line.split('#').next().unwrap_or("").trim();

        if token.is_empty() {
            continue;
        }

        let byte = parse_binary(token).ok_or_else(|| LoadError::InvalidToken {
            line: line_num + 1,
            token: token.to_string(),
        })?;

        program.push(byte, line_num + 1);
    }

    if program.len() > MEMORY_SIZE {
        return Err(LoadError::ProgramTooLarge {
            size: program.len(),
            available: MEMORY_SIZE,
        });
    }

    Ok(program)
}

/// A base-2 literal that fits in a byte.
fn parse_binary(token: &str) -> Option<u8> {
    if !token.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(token, 2).ok()
}

/// Load a program file from disk.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Program, LoadError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| LoadError::IoError(format!("{}: {}", path.display(), e)))?;

    let program = parse_program(&text)?;
    debug!("parsed {} bytes from {}", program.len(), path.display());
    Ok(program)
}

/// Render program bytes in the `.ls8` format, annotating each instruction.
pub fn format_program(bytes: &[u8]) -> String {
    let mut text = String::new();
    text.push_str("# LS-8 program\n");
    text.push_str(&format!("# {} bytes\n\n", bytes.len()));

    let mut addr = 0;
    while addr < bytes.len() {
        match decode_at(bytes, addr) {
            Some(instr) => {
                text.push_str(&format!("{:08b} # {:02X}: {}\n", bytes[addr], addr, instr));
                for operand in &bytes[addr + 1..addr + instr.size()] {
                    text.push_str(&format!("{:08b}\n", operand));
                }
                addr += instr.size();
            }
            None => {
                text.push_str(&format!("{:08b} # {:02X}: data\n", bytes[addr], addr));
                addr += 1;
            }
        }
    }

    text
}

/// Save program bytes to disk.
pub fn save_program<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), LoadError> {
    if bytes.len() > MEMORY_SIZE {
        return Err(LoadError::ProgramTooLarge {
            size: bytes.len(),
            available: MEMORY_SIZE,
        });
    }

    std::fs::write(path.as_ref(), format_program(bytes))
        .map_err(|e| LoadError::IoError(e.to_string()))
}

/// Errors that can occur while loading a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("line {line}: `{token}` is not an 8-bit binary literal")]
    InvalidToken { line: usize, token: String },

    #[error("program size {size} exceeds available space {available}")]
    ProgramTooLarge { size: usize, available: usize },
}
