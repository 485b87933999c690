//! CPU execution engine for the LS-8.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::{Memory, Registers};
use crate::cpu::alu::{Alu, AluError};
use crate::cpu::decode::{self, Instruction, Opcode};
use crate::cpu::memory::MemoryError;
use crate::cpu::registers::RegisterError;
use log::{debug, info, trace};
use serde::{Serialize, Deserialize};
use std::io::Write;
use thiserror::Error;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// CPU is running normally.
    Running,
    /// CPU has halted (executed HLT instruction).
    Halted,
    /// CPU stopped on a fault.
    Faulted,
}

/// What the PC does after an instruction retires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Advance past the instruction and its operands.
    Next,
    /// Continue at an absolute address.
    Jump(usize),
    /// Stop the machine.
    Halt,
}

/// The LS-8 CPU.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Program counter.
    pub pc: usize,
    /// Current execution state.
    pub state: CpuState,
    /// Instruction count (for profiling).
    pub cycles: u64,
    /// Last executed instruction (for debugging).
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU in its power-on state.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            pc: 0,
            state: CpuState::Running,
            cycles: 0,
            last_instr: None,
        }
    }

    /// Reset the CPU to its power-on state.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.pc = 0;
        self.state = CpuState::Running;
        self.cycles = 0;
        self.last_instr = None;
    }

    /// Load a program into memory at address 0.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.mem.load_program(0, program)?;
        info!("loaded {} bytes", program.len());
        Ok(())
    }

    /// Execute a single instruction, writing any printed output to `out`.
    ///
    /// Returns the instruction that was executed. A fault leaves the CPU in
    /// [`CpuState::Faulted`].
    pub fn step(&mut self, out: &mut dyn Write) -> Result<Instruction, CpuError> {
        if self.state != CpuState::Running {
            return Err(CpuError::NotRunning(self.state));
        }

        match self.cycle(out) {
            Ok(instr) => Ok(instr),
            Err(e) => {
                self.state = CpuState::Faulted;
                Err(e)
            }
        }
    }

    fn cycle(&mut self, out: &mut dyn Write) -> Result<Instruction, CpuError> {
        // Fetch
        let pc = self.pc;
        let byte = self.mem.read(pc)?;

        // Decode
        let opcode = decode::decode(byte)
            .map_err(|_| CpuError::UnsupportedOperation { opcode: byte, pc })?;
        let instr = self.fetch_operands(opcode, pc)?;
        trace!("{:02X}: {}", pc, instr);

        // Execute
        match self.execute(instr, pc, out)? {
            Flow::Next => self.pc = pc + instr.size(),
            Flow::Jump(addr) => self.pc = addr,
            Flow::Halt => {
                self.state = CpuState::Halted;
                info!("halted at {:#04x} after {} cycles", pc, self.cycles + 1);
            }
        }

        self.cycles += 1;
        self.last_instr = Some(instr);

        Ok(instr)
    }

    /// Read the two bytes after the opcode.
    ///
    /// Declared operands must lie in memory; the remaining lookahead bytes
    /// read as 0 past the end.
    fn fetch_operands(&self, opcode: Opcode, pc: usize) -> Result<Instruction, CpuError> {
        let declared = opcode.operand_count() as usize;
        let mut operands = [0u8; 2];
        for (i, operand) in operands.iter_mut().enumerate() {
            let addr = pc + 1 + i;
            *operand = if i < declared {
                self.mem.read(addr)?
            } else {
                self.mem.peek(addr)
            };
        }
        Ok(Instruction::new(opcode, operands[0], operands[1]))
    }

    /// Run until halt or error.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self, out: &mut dyn Write) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        while self.state == CpuState::Running {
            self.step(out)?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Run for at most `max_cycles` instructions.
    pub fn run_limited(&mut self, out: &mut dyn Write, max_cycles: u64) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;
        let limit = self.cycles + max_cycles;

        while self.state == CpuState::Running && self.cycles < limit {
            self.step(out)?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Execute a decoded instruction located at `pc`.
    fn execute(&mut self, instr: Instruction, pc: usize, out: &mut dyn Write) -> Result<Flow, CpuError> {
        let Instruction { opcode, a, b } = instr;

        let flow = match opcode {
            Opcode::Nop => Flow::Next,

            Opcode::Hlt => Flow::Halt,

            // ==================== Data Transfer ====================

            Opcode::Ldi => {
                self.regs.set(a, b)?;
                Flow::Next
            }

            Opcode::Ld => {
                let addr = self.regs.get(b)?;
                let value = self.mem.read(addr as usize)?;
                self.regs.set(a, value)?;
                Flow::Next
            }

            Opcode::St => {
                let addr = self.regs.get(a)?;
                let value = self.regs.get(b)?;
                self.mem.write(addr as usize, value)?;
                Flow::Next
            }

            // ==================== Output ====================

            Opcode::Prn => {
                let value = self.regs.get(a)?;
                writeln!(out, "{}", value)?;
                Flow::Next
            }

            Opcode::Pra => {
                let value = self.regs.get(a)?;
                write!(out, "{}", value as char)?;
                Flow::Next
            }

            // ==================== Stack ====================

            Opcode::Push => {
                let value = self.regs.get(a)?;
                self.push(value)?;
                Flow::Next
            }

            Opcode::Pop => {
                let value = self.pop()?;
                self.regs.set(a, value)?;
                Flow::Next
            }

            Opcode::Call => {
                let target = self.regs.get(a)?;
                let ret = pc + instr.size();
                let ret = u8::try_from(ret).map_err(|_| MemoryError::AddressOutOfRange(ret))?;
                self.push(ret)?;
                debug!("CALL {:#04x} from {:#04x}", target, pc);
                Flow::Jump(target as usize)
            }

            Opcode::Ret => Flow::Jump(self.pop()? as usize),

            // ==================== Control Flow ====================

            Opcode::Jmp => self.jump_if(true, a)?,

            Opcode::Jeq => {
                let taken = self.regs.flags.is_equal();
                self.jump_if(taken, a)?
            }

            Opcode::Jne => {
                let taken = !self.regs.flags.is_equal();
                self.jump_if(taken, a)?
            }

            Opcode::Jgt => {
                let taken = self.regs.flags.is_greater();
                self.jump_if(taken, a)?
            }

            Opcode::Jlt => {
                let taken = self.regs.flags.is_less();
                self.jump_if(taken, a)?
            }

            Opcode::Jle => {
                let flags = self.regs.flags;
                self.jump_if(flags.is_less() || flags.is_equal(), a)?
            }

            Opcode::Jge => {
                let flags = self.regs.flags;
                self.jump_if(flags.is_greater() || flags.is_equal(), a)?
            }

            // ==================== ALU ====================

            Opcode::Alu(op) => {
                Alu::execute(&mut self.regs, op, a, b)?;
                Flow::Next
            }
        };

        Ok(flow)
    }

    fn jump_if(&self, taken: bool, reg: u8) -> Result<Flow, CpuError> {
        let target = self.regs.get(reg)?;
        Ok(if taken { Flow::Jump(target as usize) } else { Flow::Next })
    }

    /// Decrement SP and store `value` at the new top of stack.
    fn push(&mut self, value: u8) -> Result<(), CpuError> {
        let sp = self.regs.push_sp();
        self.mem.write(sp as usize, value)?;
        Ok(())
    }

    /// Read the top of stack and increment SP.
    fn pop(&mut self) -> Result<u8, CpuError> {
        let value = self.mem.read(self.regs.sp() as usize)?;
        self.regs.pop_sp();
        Ok(value)
    }

    /// One-line state dump: PC, the next three bytes, and R0-R7.
    ///
    /// ```text
    /// TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4
    /// ```
    pub fn trace(&self) -> String {
        let mut line = format!(
            "TRACE: {:02X} | {:02X} {:02X} {:02X} |",
            self.pc,
            self.mem.peek(self.pc),
            self.mem.peek(self.pc + 1),
            self.mem.peek(self.pc + 2),
        );
        for value in self.regs.as_array() {
            line.push_str(&format!(" {:02X}", value));
        }
        line
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU is halted.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("pc", &self.pc)
            .field("cycles", &self.cycles)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("CPU not running: {0:?}")]
    NotRunning(CpuState),

    #[error("unsupported operation {opcode:#010b}")]
    UnsupportedOperation { opcode: u8, pc: usize },

    #[error("memory error: {0}")]
    MemoryError(#[from] MemoryError),

    #[error("register error: {0}")]
    RegisterError(#[from] RegisterError),

    #[error("ALU error: {0}")]
    AluError(AluError),

    #[error("output error: {0}")]
    Output(String),
}

impl From<AluError> for CpuError {
    fn from(e: AluError) -> Self {
        // A bad register is the same fault wherever it is named
        match e {
            AluError::Register(e) => CpuError::RegisterError(e),
            e => CpuError::AluError(e),
        }
    }
}

impl From<std::io::Error> for CpuError {
    fn from(e: std::io::Error) -> Self {
        CpuError::Output(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::alu::AluOp;
    use crate::cpu::decode::encode_all;
    use crate::cpu::registers::{Flags, STACK_TOP};

    fn ldi(reg: u8, value: u8) -> Instruction {
        Instruction::new(Opcode::Ldi, reg, value)
    }

    fn alu(op: AluOp, a: u8, b: u8) -> Instruction {
        Instruction::new(Opcode::Alu(op), a, b)
    }

    fn unary(opcode: Opcode, reg: u8) -> Instruction {
        Instruction::unary(opcode, reg)
    }

    fn hlt() -> Instruction {
        Instruction::nullary(Opcode::Hlt)
    }

    fn boot(program: &[u8]) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.load_program(program).unwrap();
        cpu
    }

    fn run(program: &[u8]) -> (Cpu, String) {
        let mut cpu = boot(program);
        let mut out = Vec::new();
        cpu.run(&mut out).unwrap();
        (cpu, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cpu_halt() {
        let (cpu, output) = run(&[0b0000_0001]);

        assert!(cpu.is_halted());
        assert_eq!(cpu.cycles, 1);
        assert_eq!(cpu.pc, 0);
        assert_eq!(output, "");
        assert_eq!(cpu.regs, Registers::new());

        let mut expected = Memory::new();
        expected.write(0, 0b0000_0001).unwrap();
        assert_eq!(cpu.mem, expected);
    }

    #[test]
    fn test_print8() {
        let program = [
            0b1000_0010, 0b0000_0000, 0b0000_1000, // LDI R0,8
            0b0100_0111, 0b0000_0000,              // PRN R0
            0b0000_0001,                           // HLT
        ];
        let (cpu, output) = run(&program);

        assert_eq!(output, "8\n");
        assert_eq!(cpu.cycles, 3);
    }

    #[test]
    fn test_add_program() {
        let program = encode_all(&[
            ldi(0, 5),
            ldi(1, 6),
            alu(AluOp::Add, 0, 1),
            unary(Opcode::Prn, 0),
            hlt(),
        ]);
        let (_, output) = run(&program);

        assert_eq!(output, "11\n");
    }

    #[test]
    fn test_mul_program() {
        let program = encode_all(&[
            ldi(0, 8),
            ldi(1, 9),
            alu(AluOp::Mul, 0, 1),
            unary(Opcode::Prn, 0),
            hlt(),
        ]);
        let (_, output) = run(&program);

        assert_eq!(output, "72\n");
    }

    #[test]
    fn test_nop_advances_one() {
        let program = encode_all(&[
            Instruction::nullary(Opcode::Nop),
            Instruction::nullary(Opcode::Nop),
            hlt(),
        ]);
        let (cpu, _) = run(&program);

        assert_eq!(cpu.cycles, 3);
        assert_eq!(cpu.pc, 2);
    }

    #[test]
    fn test_push_pop_restores() {
        let program = encode_all(&[
            ldi(0, 42),
            unary(Opcode::Push, 0),
            ldi(0, 0),
            unary(Opcode::Pop, 0),
            hlt(),
        ]);
        let mut cpu = boot(&program);
        let mut out = Vec::new();

        cpu.step(&mut out).unwrap();
        cpu.step(&mut out).unwrap();
        assert_eq!(cpu.regs.sp(), STACK_TOP - 1);
        assert_eq!(cpu.mem.read(STACK_TOP as usize - 1).unwrap(), 42);

        cpu.run(&mut out).unwrap();
        assert_eq!(cpu.regs.get(0).unwrap(), 42);
        assert_eq!(cpu.regs.sp(), STACK_TOP);
    }

    #[test]
    fn test_call_ret() {
        // 0: LDI R1,8   3: CALL R1   5: PRN R0   7: HLT
        // 8: LDI R0,99  11: RET
        let program = encode_all(&[
            ldi(1, 8),
            unary(Opcode::Call, 1),
            unary(Opcode::Prn, 0),
            hlt(),
            ldi(0, 99),
            Instruction::nullary(Opcode::Ret),
        ]);
        let mut cpu = boot(&program);
        let mut out = Vec::new();

        cpu.step(&mut out).unwrap();
        cpu.step(&mut out).unwrap();
        assert_eq!(cpu.pc, 8);
        assert_eq!(cpu.regs.sp(), STACK_TOP - 1);
        assert_eq!(cpu.mem.read(STACK_TOP as usize - 1).unwrap(), 5);

        cpu.step(&mut out).unwrap();
        cpu.step(&mut out).unwrap();
        assert_eq!(cpu.pc, 5);
        assert_eq!(cpu.regs.sp(), STACK_TOP);

        cpu.run(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "99\n");
    }

    /// CMP R0,R1 then `jump` to a block printing 77; falls through to PRN R0.
    fn branch_program(x: u8, y: u8, jump: Opcode) -> Vec<u8> {
        // 0: LDI R0,x  3: LDI R1,y  6: LDI R2,17  9: CMP R0,R1
        // 12: Jxx R2   14: PRN R0   16: HLT
        // 17: LDI R3,77  20: PRN R3  22: HLT
        encode_all(&[
            ldi(0, x),
            ldi(1, y),
            ldi(2, 17),
            alu(AluOp::Cmp, 0, 1),
            unary(jump, 2),
            unary(Opcode::Prn, 0),
            hlt(),
            ldi(3, 77),
            unary(Opcode::Prn, 3),
            hlt(),
        ])
    }

    fn taken(x: u8, y: u8, jump: Opcode) -> bool {
        let (_, output) = run(&branch_program(x, y, jump));
        output == "77\n"
    }

    #[test]
    fn test_jeq_jne() {
        assert!(taken(4, 4, Opcode::Jeq));
        assert!(!taken(4, 5, Opcode::Jeq));
        assert!(!taken(5, 4, Opcode::Jeq));

        assert!(!taken(4, 4, Opcode::Jne));
        assert!(taken(4, 5, Opcode::Jne));
        assert!(taken(5, 4, Opcode::Jne));
    }

    #[test]
    fn test_ordered_jumps() {
        assert!(taken(5, 4, Opcode::Jgt));
        assert!(!taken(4, 4, Opcode::Jgt));
        assert!(taken(3, 4, Opcode::Jlt));
        assert!(!taken(4, 3, Opcode::Jlt));
        assert!(taken(4, 4, Opcode::Jle));
        assert!(taken(3, 4, Opcode::Jle));
        assert!(!taken(5, 4, Opcode::Jle));
        assert!(taken(4, 4, Opcode::Jge));
        assert!(taken(5, 4, Opcode::Jge));
        assert!(!taken(3, 4, Opcode::Jge));
    }

    #[test]
    fn test_jne_taken_on_initial_flags() {
        // 0: LDI R0,6  3: JNE R0  5: HLT  6: HLT
        let program = encode_all(&[ldi(0, 6), unary(Opcode::Jne, 0), hlt(), hlt()]);
        let mut cpu = boot(&program);
        assert_eq!(cpu.regs.flags, Flags::default());

        let mut out = Vec::new();
        cpu.run(&mut out).unwrap();
        assert_eq!(cpu.pc, 6);

        let program = encode_all(&[ldi(0, 6), unary(Opcode::Jeq, 0), hlt(), hlt()]);
        let (cpu, _) = run(&program);
        assert_eq!(cpu.pc, 5);
    }

    #[test]
    fn test_countdown_loop() {
        // 0: LDI R0,3  3: LDI R1,0  6: LDI R2,9
        // 9: PRN R0  11: DEC R0  13: CMP R0,R1  16: JNE R2  18: HLT
        let program = encode_all(&[
            ldi(0, 3),
            ldi(1, 0),
            ldi(2, 9),
            unary(Opcode::Prn, 0),
            unary(Opcode::Alu(AluOp::Dec), 0),
            alu(AluOp::Cmp, 0, 1),
            unary(Opcode::Jne, 2),
            hlt(),
        ]);
        let (_, output) = run(&program);

        assert_eq!(output, "3\n2\n1\n");
    }

    #[test]
    fn test_pra() {
        let program = encode_all(&[
            ldi(0, b'H'),
            unary(Opcode::Pra, 0),
            ldi(0, b'i'),
            unary(Opcode::Pra, 0),
            hlt(),
        ]);
        let (_, output) = run(&program);

        assert_eq!(output, "Hi");
    }

    #[test]
    fn test_ld_st() {
        let program = encode_all(&[
            ldi(0, 0x80),
            ldi(1, 123),
            Instruction::new(Opcode::St, 0, 1),
            Instruction::new(Opcode::Ld, 2, 0),
            hlt(),
        ]);
        let (cpu, _) = run(&program);

        assert_eq!(cpu.mem.read(0x80).unwrap(), 123);
        assert_eq!(cpu.regs.get(2).unwrap(), 123);
    }

    #[test]
    fn test_unsupported_opcode_faults() {
        let mut cpu = boot(&[0xFF]);
        let mut out = Vec::new();

        assert_eq!(
            cpu.run(&mut out),
            Err(CpuError::UnsupportedOperation { opcode: 0xFF, pc: 0 })
        );
        assert_eq!(cpu.state, CpuState::Faulted);
        assert_eq!(cpu.step(&mut out), Err(CpuError::NotRunning(CpuState::Faulted)));

        let err = CpuError::UnsupportedOperation { opcode: 0xFF, pc: 0 };
        assert_eq!(err.to_string(), "unsupported operation 0b11111111");
    }

    #[test]
    fn test_bad_register_faults() {
        let mut cpu = boot(&encode_all(&[ldi(8, 1), hlt()]));
        let mut out = Vec::new();

        assert_eq!(
            cpu.run(&mut out),
            Err(CpuError::RegisterError(RegisterError::IndexOutOfRange(8)))
        );
    }

    #[test]
    fn test_bad_alu_register_faults_like_any_other() {
        let mut cpu = boot(&encode_all(&[alu(AluOp::Add, 9, 0), hlt()]));
        let mut out = Vec::new();

        assert_eq!(
            cpu.run(&mut out),
            Err(CpuError::RegisterError(RegisterError::IndexOutOfRange(9)))
        );

        let mut cpu = boot(&encode_all(&[unary(Opcode::Alu(AluOp::Inc), 8), hlt()]));
        assert_eq!(
            cpu.run(&mut out),
            Err(CpuError::RegisterError(RegisterError::IndexOutOfRange(8)))
        );
    }

    #[test]
    fn test_division_by_zero_faults() {
        let mut cpu = boot(&encode_all(&[ldi(0, 1), alu(AluOp::Div, 0, 1), hlt()]));
        let mut out = Vec::new();

        assert_eq!(
            cpu.run(&mut out),
            Err(CpuError::AluError(AluError::DivisionByZero))
        );
    }

    #[test]
    fn test_pc_runs_off_memory() {
        // All NOPs: the PC walks off the end
        let mut cpu = Cpu::new();
        let mut out = Vec::new();

        assert_eq!(
            cpu.run(&mut out),
            Err(CpuError::MemoryError(MemoryError::AddressOutOfRange(256)))
        );
        assert_eq!(cpu.cycles, 256);
    }

    #[test]
    fn test_declared_operand_past_end_faults() {
        let mut cpu = Cpu::new();
        cpu.mem.write(255, Opcode::Prn.byte()).unwrap();
        cpu.pc = 255;

        let mut out = Vec::new();
        assert_eq!(
            cpu.step(&mut out),
            Err(CpuError::MemoryError(MemoryError::AddressOutOfRange(256)))
        );
    }

    #[test]
    fn test_halt_in_last_cell() {
        let mut cpu = Cpu::new();
        cpu.mem.write(255, Opcode::Hlt.byte()).unwrap();
        cpu.pc = 255;

        let mut out = Vec::new();
        cpu.run(&mut out).unwrap();
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_step_after_halt() {
        let (mut cpu, _) = run(&[0b0000_0001]);
        let mut out = Vec::new();

        assert_eq!(cpu.step(&mut out), Err(CpuError::NotRunning(CpuState::Halted)));
    }

    #[test]
    fn test_run_limited() {
        // 0: LDI R0,0  3: JMP R0 (forever)
        let program = encode_all(&[ldi(0, 0), unary(Opcode::Jmp, 0)]);
        let mut cpu = boot(&program);
        let mut out = Vec::new();

        assert_eq!(cpu.run_limited(&mut out, 100).unwrap(), 100);
        assert!(cpu.is_running());
    }

    #[test]
    fn test_trace_format() {
        let cpu = boot(&[0b1000_0010, 0b0000_0000, 0b0000_1000]);

        assert_eq!(cpu.trace(), "TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4");
    }

    #[test]
    fn test_trace_has_no_side_effects() {
        let cpu = boot(&[0b1000_0010, 0, 8, 0b0000_0001]);
        let before = cpu.clone();
        let _ = cpu.trace();

        assert_eq!(cpu.regs, before.regs);
        assert_eq!(cpu.mem, before.mem);
        assert_eq!(cpu.pc, before.pc);
    }

    #[test]
    fn test_last_instruction_and_reset() {
        let (mut cpu, _) = run(&encode_all(&[ldi(0, 1), hlt()]));
        assert_eq!(cpu.last_instruction(), Some(hlt()));

        cpu.reset();
        assert!(cpu.is_running());
        assert_eq!(cpu.pc, 0);
        assert_eq!(cpu.mem.read(0).unwrap(), 0);
        assert_eq!(cpu.last_instruction(), None);
    }

    #[test]
    fn test_snapshot_serializes() {
        let (cpu, _) = run(&encode_all(&[ldi(3, 9), hlt()]));
        let json = serde_json::to_string(&cpu).unwrap();
        let restored: Cpu = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.regs.get(3).unwrap(), 9);
        assert_eq!(restored.state, CpuState::Halted);
    }
}
