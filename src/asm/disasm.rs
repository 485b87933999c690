//! Disassembler for LS-8 programs.
//!
//! Converts program bytes back to readable assembly with a linear sweep.
//! Bytes that do not start a complete instruction are shown as data.

use crate::cpu::decode::{decode, Instruction};

/// Decode the instruction starting at `addr`.
///
/// Returns `None` for an unknown opcode or when the declared operands run
/// past the end of `bytes`.
pub fn decode_at(bytes: &[u8], addr: usize) -> Option<Instruction> {
    let opcode = decode(*bytes.get(addr)?).ok()?;
    let size = opcode.operand_count() as usize + 1;
    if addr + size > bytes.len() {
        return None;
    }

    let operand = |i: usize| if i < size { bytes[addr + i] } else { 0 };
    Some(Instruction::new(opcode, operand(1), operand(2)))
}

/// Disassemble the instruction at `addr`.
///
/// Returns the text and the number of bytes consumed.
pub fn disassemble_instruction(bytes: &[u8], addr: usize) -> (String, usize) {
    match decode_at(bytes, addr) {
        Some(instr) => (instr.to_string(), instr.size()),
        None => match bytes.get(addr) {
            Some(byte) => (format!("DB {:#04x}", byte), 1),
            None => (String::new(), 0),
        },
    }
}

/// Disassemble a whole program.
pub fn disassemble(bytes: &[u8]) -> String {
    let mut output = String::new();
    output.push_str("; LS-8 Disassembly\n");
    output.push_str("; -----------------\n\n");

    for (addr, size, text) in listing(bytes) {
        let raw: Vec<String> = bytes[addr..addr + size]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();
        output.push_str(&format!("{:02X}: {:<9} {}\n", addr, raw.join(" "), text));
    }

    output
}

/// `(address, size, text)` for every instruction in `bytes`.
pub fn listing(bytes: &[u8]) -> Vec<(usize, usize, String)> {
    let mut lines = Vec::new();
    let mut addr = 0;
    while addr < bytes.len() {
        let (text, size) = disassemble_instruction(bytes, addr);
        lines.push((addr, size, text));
        addr += size;
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::Opcode;

    #[test]
    fn test_disassemble_hlt() {
        let (text, size) = disassemble_instruction(&[0b0000_0001], 0);
        assert_eq!(text, "HLT");
        assert_eq!(size, 1);
    }

    #[test]
    fn test_disassemble_ldi() {
        let (text, size) = disassemble_instruction(&[0b1000_0010, 0, 8], 0);
        assert_eq!(text, "LDI R0,8");
        assert_eq!(size, 3);
    }

    #[test]
    fn test_truncated_instruction_is_data() {
        assert_eq!(decode_at(&[0b1000_0010, 0], 0), None);
        let (text, size) = disassemble_instruction(&[0b1000_0010, 0], 0);
        assert_eq!(text, "DB 0x82");
        assert_eq!(size, 1);
    }

    #[test]
    fn test_unknown_opcode_is_data() {
        let (text, _) = disassemble_instruction(&[0xFF], 0);
        assert_eq!(text, "DB 0xff");
    }

    #[test]
    fn test_decode_at_offset() {
        let bytes = [0b0000_0001, 0b0100_0111, 3];
        assert_eq!(decode_at(&bytes, 1), Some(Instruction::unary(Opcode::Prn, 3)));
        assert_eq!(decode_at(&bytes, 3), None);
    }

    #[test]
    fn test_disassemble_listing() {
        let bytes = [0b1000_0010, 0, 8, 0b0100_0111, 0, 0b0000_0001];
        let output = disassemble(&bytes);

        assert!(output.contains("00: 82 00 08  LDI R0,8"));
        assert!(output.contains("03: 47 00     PRN R0"));
        assert!(output.contains("05: 01        HLT"));
    }
}
