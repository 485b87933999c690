//! Instruction decoder for the LS-8.
//!
//! An instruction is one opcode byte followed by zero, one or two operand
//! bytes. The opcode byte is laid out as `AABCDDDD`:
//! - `AA`: number of operands (0-2)
//! - `B`: 1 if this is an ALU operation
//! - `C`: 1 if the instruction sets the PC directly
//! - `DDDD`: instruction identifier
//!
//! Decoding goes through a 256-entry table indexed by the opcode byte.

use crate::cpu::alu::AluOp;
use serde::{Serialize, Deserialize};
use thiserror::Error;

const ALU_BIT: u8 = 0b0010_0000;
const SETS_PC_BIT: u8 = 0b0001_0000;

/// An LS-8 opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// No operation
    Nop,
    /// Halt the CPU
    Hlt,
    /// Load immediate: R[a] := b
    Ldi,
    /// Load: R[a] := M[R[b]]
    Ld,
    /// Store: M[R[a]] := R[b]
    St,
    /// Push R[a] onto the stack
    Push,
    /// Pop the stack into R[a]
    Pop,
    /// Print R[a] as a decimal number
    Prn,
    /// Print R[a] as a character
    Pra,
    /// Call the subroutine at R[a]
    Call,
    /// Return from subroutine
    Ret,
    /// Jump to R[a]
    Jmp,
    /// Jump to R[a] if equal
    Jeq,
    /// Jump to R[a] if not equal
    Jne,
    /// Jump to R[a] if greater
    Jgt,
    /// Jump to R[a] if less
    Jlt,
    /// Jump to R[a] if less or equal
    Jle,
    /// Jump to R[a] if greater or equal
    Jge,
    /// ALU operation on R[a] (and R[b] for binary ops)
    Alu(AluOp),
}

impl Opcode {
    /// Every opcode the CPU understands.
    pub const ALL: [Opcode; 32] = [
        Opcode::Nop, Opcode::Hlt, Opcode::Ldi, Opcode::Ld, Opcode::St,
        Opcode::Push, Opcode::Pop, Opcode::Prn, Opcode::Pra,
        Opcode::Call, Opcode::Ret, Opcode::Jmp, Opcode::Jeq, Opcode::Jne,
        Opcode::Jgt, Opcode::Jlt, Opcode::Jle, Opcode::Jge,
        Opcode::Alu(AluOp::Add), Opcode::Alu(AluOp::Sub),
        Opcode::Alu(AluOp::Mul), Opcode::Alu(AluOp::Div),
        Opcode::Alu(AluOp::Mod), Opcode::Alu(AluOp::Inc),
        Opcode::Alu(AluOp::Dec), Opcode::Alu(AluOp::Cmp),
        Opcode::Alu(AluOp::And), Opcode::Alu(AluOp::Not),
        Opcode::Alu(AluOp::Or), Opcode::Alu(AluOp::Xor),
        Opcode::Alu(AluOp::Shl), Opcode::Alu(AluOp::Shr),
    ];

    /// The encoded opcode byte.
    pub const fn byte(self) -> u8 {
        match self {
            Opcode::Nop => 0b0000_0000,
            Opcode::Hlt => 0b0000_0001,
            Opcode::Ldi => 0b1000_0010,
            Opcode::Ld => 0b1000_0011,
            Opcode::St => 0b1000_0100,
            Opcode::Push => 0b0100_0101,
            Opcode::Pop => 0b0100_0110,
            Opcode::Prn => 0b0100_0111,
            Opcode::Pra => 0b0100_1000,
            Opcode::Call => 0b0101_0000,
            Opcode::Ret => 0b0001_0001,
            Opcode::Jmp => 0b0101_0100,
            Opcode::Jeq => 0b0101_0101,
            Opcode::Jne => 0b0101_0110,
            Opcode::Jgt => 0b0101_0111,
            Opcode::Jlt => 0b0101_1000,
            Opcode::Jle => 0b0101_1001,
            Opcode::Jge => 0b0101_1010,
            Opcode::Alu(op) => match op {
                AluOp::Add => 0b1010_0000,
                AluOp::Sub => 0b1010_0001,
                AluOp::Mul => 0b1010_0010,
                AluOp::Div => 0b1010_0011,
                AluOp::Mod => 0b1010_0100,
                AluOp::Inc => 0b0110_0101,
                AluOp::Dec => 0b0110_0110,
                AluOp::Cmp => 0b1010_0111,
                AluOp::And => 0b1010_1000,
                AluOp::Not => 0b0110_1001,
                AluOp::Or => 0b1010_1010,
                AluOp::Xor => 0b1010_1011,
                AluOp::Shl => 0b1010_1100,
                AluOp::Shr => 0b1010_1101,
            },
        }
    }

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Nop => "NOP",
            Opcode::Hlt => "HLT",
            Opcode::Ldi => "LDI",
            Opcode::Ld => "LD",
            Opcode::St => "ST",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Prn => "PRN",
            Opcode::Pra => "PRA",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Jmp => "JMP",
            Opcode::Jeq => "JEQ",
            Opcode::Jne => "JNE",
            Opcode::Jgt => "JGT",
            Opcode::Jlt => "JLT",
            Opcode::Jle => "JLE",
            Opcode::Jge => "JGE",
            Opcode::Alu(op) => op.mnemonic(),
        }
    }

    /// Number of operand bytes that follow the opcode.
    pub const fn operand_count(self) -> u8 {
        self.byte() >> 6
    }

    /// Whether the opcode is an ALU operation (bit 5).
    pub const fn is_alu(self) -> bool {
        self.byte() & ALU_BIT != 0
    }

    /// Whether the opcode sets the PC itself (bit 4).
    pub const fn sets_pc(self) -> bool {
        self.byte() & SETS_PC_BIT != 0
    }

    /// Look up an opcode by mnemonic (case-insensitive).
    pub fn from_mnemonic(name: &str) -> Option<Opcode> {
        Opcode::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

const fn build_table() -> [Option<Opcode>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < Opcode::ALL.len() {
        let op = Opcode::ALL[i];
        table[op.byte() as usize] = Some(op);
        i += 1;
    }
    table
}

static DISPATCH: [Option<Opcode>; 256] = build_table();

/// Decode an opcode byte.
pub fn decode(byte: u8) -> Result<Opcode, DecodeError> {
    DISPATCH[byte as usize].ok_or(DecodeError::UnsupportedOperation(byte))
}

/// A fetched instruction: the opcode and both lookahead bytes.
///
/// `a` and `b` are always populated from PC+1 and PC+2; handlers read only
/// as many as the opcode declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub a: u8,
    pub b: u8,
}

impl Instruction {
    pub fn new(opcode: Opcode, a: u8, b: u8) -> Self {
        Self { opcode, a, b }
    }

    /// Instruction with no operands.
    pub fn nullary(opcode: Opcode) -> Self {
        Self::new(opcode, 0, 0)
    }

    /// Instruction with a single operand.
    pub fn unary(opcode: Opcode, a: u8) -> Self {
        Self::new(opcode, a, 0)
    }

    /// Total size in bytes, opcode included.
    pub fn size(&self) -> usize {
        self.opcode.operand_count() as usize + 1
    }

    /// Encode to the opcode byte followed by the declared operands.
    pub fn encode(&self) -> Vec<u8> {
        let bytes = [self.opcode.byte(), self.a, self.b];
        bytes[..self.size()].to_vec()
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.opcode {
            Opcode::Ldi => write!(f, "LDI R{},{}", self.a, self.b),
            Opcode::Ld | Opcode::St => write!(f, "{} R{},R{}", self.opcode, self.a, self.b),
            Opcode::Alu(op) if op.is_binary() => write!(f, "{} R{},R{}", op, self.a, self.b),
            op => match op.operand_count() {
                0 => write!(f, "{}", op),
                _ => write!(f, "{} R{}", op, self.a),
            },
        }
    }
}

/// Encode a sequence of instructions into program bytes.
pub fn encode_all(instructions: &[Instruction]) -> Vec<u8> {
    instructions.iter().flat_map(|i| i.encode()).collect()
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unsupported operation: opcode {0:#010b}")]
    UnsupportedOperation(u8),
}
