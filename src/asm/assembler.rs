//! Simple assembler for LS-8 programs.
//!
//! Syntax:
//! ```text
//! ; Comment (`#` works too)
//! LABEL:              ; Define a label
//!     LDI R0,8        ; Load immediate
//!     LDI R1,LABEL    ; Labels are immediates
//!     ADD R0,R1       ; Register operands are R0-R7
//!     PRN R0
//!     HLT
//!
//!     DB 0x41         ; Data byte
//!     DS 4            ; Reserve 4 zero bytes
//! ```
//!
//! Immediates may be decimal, `0x` hex, `0b` binary, or a label.

use crate::cpu::decode::{Instruction, Opcode};
use crate::cpu::memory::MEMORY_SIZE;
use crate::cpu::registers::REGISTER_COUNT;
use std::collections::HashMap;
use thiserror::Error;

/// Assemble source code to program bytes.
pub fn assemble(source: &str) -> Result<Vec<u8>, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// The kind of operands an opcode takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operands {
    None,
    Reg,
    RegReg,
    RegImm,
}

impl Operands {
    fn of(opcode: Opcode) -> Self {
        match opcode {
            Opcode::Ldi => Operands::RegImm,
            op => match op.operand_count() {
                0 => Operands::None,
                1 => Operands::Reg,
                _ => Operands::RegReg,
            },
        }
    }

    fn count(self) -> usize {
        match self {
            Operands::None => 0,
            Operands::Reg => 1,
            Operands::RegReg | Operands::RegImm => 2,
        }
    }
}

/// The assembler state.
struct Assembler {
    /// Symbol table (label -> address).
    symbols: HashMap<String, usize>,
    /// Pending references (output_index, label, source_line).
    pending: Vec<(usize, String, usize)>,
    /// Output bytes.
    output: Vec<u8>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            symbols: HashMap::new(),
            pending: Vec::new(),
            output: Vec::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Vec<u8>, AssemblerError> {
        // Pass 1: Collect labels and generate code
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        if self.output.len() > MEMORY_SIZE {
            return Err(AssemblerError::ProgramTooLarge { size: self.output.len() });
        }

        // Pass 2: Resolve forward references
        self.resolve_references()?;

        Ok(std::mem::take(&mut self.output))
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        // Remove comments
        let line = line
            .split(|c| c == ';' || c == '#')
            .next()
            .unwrap_or("")
            .trim();

        if line.is_empty() {
            return Ok(());
        }

        // Check for label definition
        if let Some(colon_idx) = line.find(':') {
            let label = line[..colon_idx].trim().to_uppercase();
            if label.is_empty() || label.contains(char::is_whitespace) {
                return Err(AssemblerError::SyntaxError {
                    line: line_num,
                    message: format!("invalid label `{}`", label),
                });
            }
            if self.symbols.insert(label.clone(), self.output.len()).is_some() {
                return Err(AssemblerError::SyntaxError {
                    line: line_num,
                    message: format!("label {} defined twice", label),
                });
            }

            // Process rest of line if any
            let rest = line[colon_idx + 1..].trim();
            if !rest.is_empty() {
                return self.process_instruction(rest, line_num);
            }
            return Ok(());
        }

        self.process_instruction(line, line_num)
    }

    fn process_instruction(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let (mnemonic, rest) = match line.split_once(char::is_whitespace) {
            Some((m, r)) => (m.to_uppercase(), r.trim()),
            None => (line.to_uppercase(), ""),
        };
        let operands: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(',').map(str::trim).collect()
        };

        match mnemonic.as_str() {
            // Directives
            "DB" => {
                if operands.is_empty() {
                    return Err(AssemblerError::SyntaxError {
                        line: line_num,
                        message: "DB requires a value".into(),
                    });
                }
                for operand in operands {
                    let value = self.parse_immediate(operand, line_num)?;
                    self.output.push(value);
                }
            }

            "DS" => {
                let count = match operands.as_slice() {
                    [count] => parse_number(count).ok_or_else(|| AssemblerError::SyntaxError {
                        line: line_num,
                        message: format!("invalid DS size `{}`", count),
                    })?,
                    _ => return Err(AssemblerError::SyntaxError {
                        line: line_num,
                        message: "DS requires a size".into(),
                    }),
                };
                if count < 0 || count as usize > MEMORY_SIZE {
                    return Err(AssemblerError::ValueOutOfRange { line: line_num, value: count });
                }
                self.output.resize(self.output.len() + count as usize, 0);
            }

            // Instructions
            _ => {
                let instr = self.parse_instruction(&mnemonic, &operands, line_num)?;
                self.output.extend(instr.encode());
            }
        }

        Ok(())
    }

    fn parse_instruction(&mut self, mnemonic: &str, operands: &[&str], line_num: usize)
        -> Result<Instruction, AssemblerError>
    {
        let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| {
            AssemblerError::UnknownMnemonic {
                line: line_num,
                mnemonic: mnemonic.to_string(),
            }
        })?;

        let kind = Operands::of(opcode);
        if operands.len() != kind.count() {
            return Err(AssemblerError::SyntaxError {
                line: line_num,
                message: format!(
                    "{} takes {} operand(s), found {}",
                    mnemonic,
                    kind.count(),
                    operands.len()
                ),
            });
        }

        let instr = match kind {
            Operands::None => Instruction::nullary(opcode),
            Operands::Reg => {
                Instruction::unary(opcode, parse_register(operands[0], line_num)?)
            }
            Operands::RegReg => Instruction::new(
                opcode,
                parse_register(operands[0], line_num)?,
                parse_register(operands[1], line_num)?,
            ),
            Operands::RegImm => {
                let reg = parse_register(operands[0], line_num)?;
                // The immediate lands two bytes after the opcode
                let imm = self.parse_immediate_at(operands[1], self.output.len() + 2, line_num)?;
                Instruction::new(opcode, reg, imm)
            }
        };

        Ok(instr)
    }

    /// Parse an immediate that will be emitted at the next output position.
    fn parse_immediate(&mut self, operand: &str, line_num: usize) -> Result<u8, AssemblerError> {
        self.parse_immediate_at(operand, self.output.len(), line_num)
    }

    fn parse_immediate_at(&mut self, operand: &str, out_idx: usize, line_num: usize)
        -> Result<u8, AssemblerError>
    {
        if let Some(value) = parse_number(operand) {
            return u8::try_from(value)
                .map_err(|_| AssemblerError::ValueOutOfRange { line: line_num, value });
        }

        if !is_identifier(operand) {
            return Err(AssemblerError::SyntaxError {
                line: line_num,
                message: format!("invalid operand `{}`", operand),
            });
        }

        // Must be a label reference - store for pass 2
        self.pending.push((out_idx, operand.to_uppercase(), line_num));
        Ok(0)
    }

    fn resolve_references(&mut self) -> Result<(), AssemblerError> {
        for (out_idx, label, line_num) in &self.pending {
            let addr = *self.symbols.get(label).ok_or_else(|| AssemblerError::UndefinedLabel {
                line: *line_num,
                label: label.clone(),
            })?;

            self.output[*out_idx] = u8::try_from(addr).map_err(|_| {
                AssemblerError::ValueOutOfRange { line: *line_num, value: addr as i64 }
            })?;
        }
        Ok(())
    }
}

/// Parse `R0`-`R7`.
fn parse_register(operand: &str, line_num: usize) -> Result<u8, AssemblerError> {
    let index = operand
        .strip_prefix('R')
        .or_else(|| operand.strip_prefix('r'))
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or_else(|| AssemblerError::SyntaxError {
            line: line_num,
            message: format!("expected register, found `{}`", operand),
        })?;

    if index >= REGISTER_COUNT {
        return Err(AssemblerError::ValueOutOfRange { line: line_num, value: index as i64 });
    }
    Ok(index as u8)
}

/// Parse a decimal, `0x` hex or `0b` binary literal.
fn parse_number(operand: &str) -> Option<i64> {
    let operand = operand.trim();
    let lower = operand.to_ascii_lowercase();

    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else {
        operand.parse::<i64>().ok()
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("unknown mnemonic on line {line}: {mnemonic}")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("undefined label on line {line}: {label}")]
    UndefinedLabel { line: usize, label: String },

    #[error("value out of range on line {line}: {value}")]
    ValueOutOfRange { line: usize, value: i64 },

    #[error("assembled program is {size} bytes, memory holds {}", MEMORY_SIZE)]
    ProgramTooLarge { size: usize },
}
