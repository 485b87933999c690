//! LS-8 CPU registers.
//!
//! The LS-8 has 8 general-purpose 8-bit registers, R0-R7. Three of them
//! carry a conventional role:
//! - R5: interrupt mask (IM)
//! - R6: interrupt status (IS)
//! - R7: stack pointer (SP)
//!
//! Interrupts are not emulated, so IM and IS are inert. The roles are not
//! enforced; a program may load R7 like any other register.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of general-purpose registers.
pub const REGISTER_COUNT: usize = 8;

/// Index of the interrupt mask register.
pub const IM: u8 = 5;
/// Index of the interrupt status register.
pub const IS: u8 = 6;
/// Index of the stack pointer register.
pub const SP: u8 = 7;

/// Initial stack pointer value. The stack grows down from here.
pub const STACK_TOP: u8 = 0xF4;

/// The flags register, written by CMP.
///
/// Exactly one of [`Flags::EQUAL`], [`Flags::GREATER`] and [`Flags::LESS`]
/// is set after a compare. All bits are clear at power-on.
#[derive(Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flags(u8);

impl Flags {
    /// Equal bit.
    pub const EQUAL: u8 = 0b0000_0001;
    /// Greater-than bit.
    pub const GREATER: u8 = 0b0000_0010;
    /// Less-than bit.
    pub const LESS: u8 = 0b0000_0100;

    /// Wrap a raw flags byte.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// The raw flags byte.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Flags for comparing `a` against `b`.
    pub fn compare(a: u8, b: u8) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Self(Self::LESS),
            std::cmp::Ordering::Greater => Self(Self::GREATER),
            std::cmp::Ordering::Equal => Self(Self::EQUAL),
        }
    }

    pub fn is_equal(self) -> bool {
        self.0 & Self::EQUAL != 0
    }

    pub fn is_greater(self) -> bool {
        self.0 & Self::GREATER != 0
    }

    pub fn is_less(self) -> bool {
        self.0 & Self::LESS != 0
    }
}

impl std::fmt::Debug for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let l = if self.is_less() { 'L' } else { '-' };
        let g = if self.is_greater() { 'G' } else { '-' };
        let e = if self.is_equal() { 'E' } else { '-' };
        write!(f, "FL={}{}{} ({:#010b})", l, g, e, self.0)
    }
}

/// The LS-8 register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// R0-R7.
    regs: [u8; REGISTER_COUNT],

    /// FL: result of the most recent CMP.
    pub flags: Flags,
}

impl Registers {
    /// Create a new register file: all zero except SP.
    pub fn new() -> Self {
        let mut regs = [0; REGISTER_COUNT];
        regs[SP as usize] = STACK_TOP;
        Self {
            regs,
            flags: Flags::default(),
        }
    }

    /// Reset all registers to their power-on values.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Read register `index` (0-7).
    #[inline]
    pub fn get(&self, index: u8) -> Result<u8, RegisterError> {
        self.regs
            .get(index as usize)
            .copied()
            .ok_or(RegisterError::IndexOutOfRange(index))
    }

    /// Write register `index` (0-7).
    #[inline]
    pub fn set(&mut self, index: u8, value: u8) -> Result<(), RegisterError> {
        let reg = self.regs
            .get_mut(index as usize)
            .ok_or(RegisterError::IndexOutOfRange(index))?;
        *reg = value;
        Ok(())
    }

    /// Stack pointer (R7).
    pub fn sp(&self) -> u8 {
        self.regs[SP as usize]
    }

    /// Set the stack pointer (R7).
    pub fn set_sp(&mut self, value: u8) {
        self.regs[SP as usize] = value;
    }

    /// Decrement SP, wrapping at 8 bits, and return the new value.
    pub fn push_sp(&mut self) -> u8 {
        let sp = self.sp().wrapping_sub(1);
        self.set_sp(sp);
        sp
    }

    /// Increment SP, wrapping at 8 bits, and return the old value.
    pub fn pop_sp(&mut self) -> u8 {
        let sp = self.sp();
        self.set_sp(sp.wrapping_add(1));
        sp
    }

    /// Interrupt mask (R5). Reserved; never consulted.
    pub fn interrupt_mask(&self) -> u8 {
        self.regs[IM as usize]
    }

    /// Interrupt status (R6). Reserved; never consulted.
    pub fn interrupt_status(&self) -> u8 {
        self.regs[IS as usize]
    }

    /// All eight registers in index order.
    pub fn as_array(&self) -> &[u8; REGISTER_COUNT] {
        &self.regs
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from register access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("register index {0} out of range (R0 to R7)")]
    IndexOutOfRange(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_on_values() {
        let regs = Registers::new();

        for i in 0..7 {
            assert_eq!(regs.get(i).unwrap(), 0);
        }
        assert_eq!(regs.sp(), 0xF4);
        assert_eq!(regs.get(SP).unwrap(), 0xF4);
        assert_eq!(regs.flags.bits(), 0);
    }

    #[test]
    fn test_register_bounds() {
        let mut regs = Registers::new();

        assert!(regs.set(7, 1).is_ok());
        assert_eq!(regs.get(8), Err(RegisterError::IndexOutOfRange(8)));
        assert_eq!(regs.set(255, 0), Err(RegisterError::IndexOutOfRange(255)));
    }

    #[test]
    fn test_stack_pointer_is_r7() {
        let mut regs = Registers::new();

        regs.set(SP, 0x10).unwrap();
        assert_eq!(regs.sp(), 0x10);

        assert_eq!(regs.push_sp(), 0x0F);
        assert_eq!(regs.get(7).unwrap(), 0x0F);

        assert_eq!(regs.pop_sp(), 0x0F);
        assert_eq!(regs.sp(), 0x10);
    }

    #[test]
    fn test_stack_pointer_wraps() {
        let mut regs = Registers::new();
        regs.set_sp(0);

        assert_eq!(regs.push_sp(), 0xFF);
        regs.set_sp(0xFF);
        assert_eq!(regs.pop_sp(), 0xFF);
        assert_eq!(regs.sp(), 0);
    }

    #[test]
    fn test_flags_compare() {
        assert_eq!(Flags::compare(1, 2).bits(), Flags::LESS);
        assert_eq!(Flags::compare(2, 1).bits(), Flags::GREATER);
        assert_eq!(Flags::compare(3, 3).bits(), Flags::EQUAL);

        let eq = Flags::compare(9, 9);
        assert!(eq.is_equal() && !eq.is_less() && !eq.is_greater());
    }

    #[test]
    fn test_reset() {
        let mut regs = Registers::new();
        regs.set(0, 42).unwrap();
        regs.set_sp(3);
        regs.flags = Flags::compare(0, 1);

        regs.reset();
        assert_eq!(regs, Registers::new());
    }
}
