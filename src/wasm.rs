//! WebAssembly bindings for the LS-8 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use wasm_bindgen::prelude::*;
use crate::Cpu;
use crate::asm::assembler::assemble;
use crate::asm::disasm::disassemble_instruction;
use crate::asm::loader::parse_program;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu,
    program: Vec<u8>,
    output: Vec<u8>,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            program: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Load a program from assembly source code.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let bytes = assemble(source)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load_bytes(bytes)
    }

    /// Load a program from `.ls8` binary-literal text.
    #[wasm_bindgen]
    pub fn load_ls8(&mut self, text: &str) -> Result<usize, JsError> {
        let program = parse_program(text)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        self.load_bytes(program.bytes)
    }

    fn load_bytes(&mut self, bytes: Vec<u8>) -> Result<usize, JsError> {
        let mut cpu = Cpu::new();
        cpu.load_program(&bytes)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        let len = bytes.len();
        self.cpu = cpu;
        self.program = bytes;
        self.output.clear();
        Ok(len)
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let instr = self.cpu.step(&mut self.output)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        Ok(instr.to_string())
    }

    /// Run until halt or max cycles.
    #[wasm_bindgen]
    pub fn run(&mut self, max_cycles: u32) -> Result<u64, JsError> {
        self.cpu.run_limited(&mut self.output, max_cycles as u64)
            .map_err(|e| JsError::new(&format!("{}", e)))?;
        Ok(self.cpu.cycles)
    }

    /// Reset CPU to initial state with loaded program.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu = Cpu::new();
        self.output.clear();
        // Already validated by load_bytes
        let _ = self.cpu.load_program(&self.program);
    }

    /// Check if CPU is running.
    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    /// Check if CPU is halted.
    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Get cycle count.
    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Get program counter.
    #[wasm_bindgen]
    pub fn pc(&self) -> usize {
        self.cpu.pc
    }

    /// Get a register value (0-7). Out-of-range indices read as 0.
    #[wasm_bindgen]
    pub fn register(&self, index: u8) -> u8 {
        self.cpu.regs.get(index).unwrap_or(0)
    }

    /// Get the flags register.
    #[wasm_bindgen]
    pub fn flags(&self) -> u8 {
        self.cpu.regs.flags.bits()
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.cpu.state)
    }

    /// Everything the program has printed since the last reset.
    #[wasm_bindgen]
    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }

    /// The trace line for the current state.
    #[wasm_bindgen]
    pub fn trace(&self) -> String {
        self.cpu.trace()
    }

    /// Get memory byte at address. Out-of-range addresses read as 0.
    #[wasm_bindgen]
    pub fn memory_at(&self, addr: usize) -> u8 {
        self.cpu.mem.peek(addr)
    }

    /// Get all memory.
    #[wasm_bindgen]
    pub fn memory_all(&self) -> Vec<u8> {
        self.cpu.mem.as_slice().to_vec()
    }

    /// Get registers as JSON string.
    #[wasm_bindgen]
    pub fn registers_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.cpu.regs)
            .map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code and return the program size in bytes.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<usize, JsError> {
    let bytes = assemble(source)
        .map_err(|e| JsError::new(&format!("{}", e)))?;
    Ok(bytes.len())
}

/// Disassemble the instruction at the start of `bytes`.
#[wasm_bindgen]
pub fn wasm_disassemble(bytes: &[u8]) -> String {
    disassemble_instruction(bytes, 0).0
}
