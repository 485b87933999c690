//! Arithmetic/logic unit.
//!
//! Register-to-register operations. Every result wraps to 8 bits.

use crate::cpu::registers::{Flags, RegisterError, Registers};
use serde::{Serialize, Deserialize};
use std::str::FromStr;
use thiserror::Error;

/// An ALU operation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Cmp,
    Inc,
    Dec,
    And,
    Or,
    Xor,
    Not,
    Shl,
    Shr,
}

impl AluOp {
    /// Every operation, in opcode order.
    pub const ALL: [AluOp; 14] = [
        AluOp::Add, AluOp::Sub, AluOp::Mul, AluOp::Div, AluOp::Mod,
        AluOp::Inc, AluOp::Dec, AluOp::Cmp, AluOp::And, AluOp::Not,
        AluOp::Or, AluOp::Xor, AluOp::Shl, AluOp::Shr,
    ];

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Mul => "MUL",
            AluOp::Div => "DIV",
            AluOp::Mod => "MOD",
            AluOp::Cmp => "CMP",
            AluOp::Inc => "INC",
            AluOp::Dec => "DEC",
            AluOp::And => "AND",
            AluOp::Or => "OR",
            AluOp::Xor => "XOR",
            AluOp::Not => "NOT",
            AluOp::Shl => "SHL",
            AluOp::Shr => "SHR",
        }
    }

    /// Whether the operation reads a second register.
    pub const fn is_binary(self) -> bool {
        !matches!(self, AluOp::Inc | AluOp::Dec | AluOp::Not)
    }
}

impl FromStr for AluOp {
    type Err = AluError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        AluOp::ALL
            .into_iter()
            .find(|op| op.mnemonic() == upper)
            .ok_or_else(|| AluError::UnsupportedOperation(s.to_string()))
    }
}

impl std::fmt::Display for AluOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// The ALU. Stateless; all state lives in the register file.
pub struct Alu;

impl Alu {
    /// Apply `op` to registers `a` and `b`.
    ///
    /// Unary operations ignore `b`. CMP writes the flags register and leaves
    /// the general registers untouched.
    pub fn execute(regs: &mut Registers, op: AluOp, a: u8, b: u8) -> Result<(), AluError> {
        let x = regs.get(a)?;
        let y = if op.is_binary() { regs.get(b)? } else { 0 };

        let result = match op {
            AluOp::Add => x.wrapping_add(y),
            AluOp::Sub => x.wrapping_sub(y),
            AluOp::Mul => x.wrapping_mul(y),
            AluOp::Div => x.checked_div(y).ok_or(AluError::DivisionByZero)?,
            AluOp::Mod => x.checked_rem(y).ok_or(AluError::DivisionByZero)?,
            AluOp::Inc => x.wrapping_add(1),
            AluOp::Dec => x.wrapping_sub(1),
            AluOp::And => x & y,
            AluOp::Or => x | y,
            AluOp::Xor => x ^ y,
            AluOp::Not => !x,
            AluOp::Shl => x.checked_shl(y as u32).unwrap_or(0),
            AluOp::Shr => x.checked_shr(y as u32).unwrap_or(0),
            AluOp::Cmp => {
                regs.flags = Flags::compare(x, y);
                return Ok(());
            }
        };

        regs.set(a, result)?;
        Ok(())
    }

    /// Apply the operation named by `selector` (e.g. `"ADD"`).
    pub fn execute_named(regs: &mut Registers, selector: &str, a: u8, b: u8) -> Result<(), AluError> {
        let op: AluOp = selector.parse()?;
        Self::execute(regs, op, a, b)
    }
}

/// Errors raised by the ALU.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AluError {
    #[error("unsupported ALU operation: {0}")]
    UnsupportedOperation(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error(transparent)]
    Register(#[from] RegisterError),
}
