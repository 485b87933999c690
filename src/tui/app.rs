//! Debugger application state and logic.

use crate::Cpu;
use crate::asm::disasm::disassemble_instruction;
use crate::cpu::memory::MEMORY_SIZE;
use std::collections::HashSet;

/// Bytes shown per row in the memory view.
pub const MEMORY_ROW: usize = 8;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu,
    /// Original program for reference.
    pub program: Vec<u8>,
    /// Output printed by the program so far.
    pub output: String,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<usize>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory view scroll offset, in rows.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(program: Vec<u8>) -> Self {
        let mut app = Self {
            cpu: Cpu::new(),
            program,
            output: String::new(),
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: String::new(),
            mem_scroll: 0,
        };
        app.reset();
        app.status = "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into();
        app
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.cpu.is_running() {
            self.status = format!("CPU stopped: {:?}", self.cpu.state);
            self.running = false;
            return;
        }

        let pc = self.cpu.pc;
        let mut out = Vec::new();
        let result = self.cpu.step(&mut out);
        self.output.push_str(&String::from_utf8_lossy(&out));

        match result {
            Ok(instr) => {
                self.status = format!("PC={:02X}: {}", pc, instr);
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    /// Run until halt, breakpoint, or error.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
        // Step off a breakpoint we are sitting on
        if self.breakpoints.contains(&self.cpu.pc) {
            self.step();
        }
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.cpu.is_running() {
            self.running = false;
            self.status = format!("{:?} after {} cycles", self.cpu.state, self.cpu.cycles);
            return;
        }

        // Check for breakpoint
        let pc = self.cpu.pc;
        if self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={:02X}", pc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.pc;
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={:02X}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={:02X}", pc);
        }
    }

    /// Reset CPU to initial state.
    pub fn reset(&mut self) {
        self.cpu = Cpu::new();
        if let Err(e) = self.cpu.load_program(&self.program) {
            self.status = format!("Error: {}", e);
            return;
        }
        self.output.clear();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Scroll the memory view up one row.
    pub fn scroll_up(&mut self) {
        self.mem_scroll = self.mem_scroll.saturating_sub(1);
    }

    /// Scroll the memory view down one row.
    pub fn scroll_down(&mut self) {
        if self.mem_scroll + 1 < MEMORY_SIZE / MEMORY_ROW {
            self.mem_scroll += 1;
        }
    }

    /// Disassemble `lines` instructions starting at the current PC.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(usize, String, bool)> {
        let memory = self.cpu.mem.as_slice();
        let mut addr = self.cpu.pc;
        let mut listing = Vec::with_capacity(lines);

        while listing.len() < lines && addr < memory.len() {
            let (text, size) = disassemble_instruction(memory, addr);
            listing.push((addr, text, addr == self.cpu.pc));
            addr += size.max(1);
        }

        listing
    }
}

/// Run the debugger with a program.
pub fn run_debugger(program: Vec<u8>) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create app
    let mut app = DebuggerApp::new(program);

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        // Handle input
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll_up(),
                        KeyCode::Down => app.scroll_down(),
                        _ => {}
                    }
                }
            }
        }

        // Tick for continuous running
        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble;

    fn app(source: &str) -> DebuggerApp {
        DebuggerApp::new(assemble(source).unwrap())
    }

    #[test]
    fn test_step_collects_output() {
        let mut app = app("LDI R0,8\nPRN R0\nHLT");
        app.step();
        app.step();

        assert_eq!(app.output, "8\n");
        assert!(app.status.contains("PRN R0"));
    }

    #[test]
    fn test_run_stops_at_breakpoint() {
        let mut app = app("LDI R0,1\nLDI R1,2\nHLT");
        app.step();
        app.toggle_breakpoint();
        assert!(app.breakpoints.contains(&3));

        app.reset();
        app.run();
        for _ in 0..10 {
            app.tick();
        }
        assert!(!app.running);
        assert_eq!(app.cpu.pc, 3);

        // Resuming steps off the breakpoint
        app.run();
        for _ in 0..10 {
            app.tick();
        }
        assert!(app.cpu.is_halted());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut app = app("LDI R0,8\nPRN R0\nHLT");
        app.run();
        for _ in 0..10 {
            app.tick();
        }
        assert!(app.cpu.is_halted());

        app.reset();
        assert!(app.cpu.is_running());
        assert!(app.output.is_empty());
        assert_eq!(app.cpu.mem.read(0).unwrap(), 0b1000_0010);
    }

    #[test]
    fn test_disassembly_from_pc() {
        let app = app("LDI R0,8\nPRN R0\nHLT");
        let listing = app.get_disassembly(3);

        assert_eq!(listing[0], (0, "LDI R0,8".to_string(), true));
        assert_eq!(listing[1], (3, "PRN R0".to_string(), false));
        assert_eq!(listing[2], (5, "HLT".to_string(), false));
    }

    #[test]
    fn test_memory_scroll_bounds() {
        let mut app = app("HLT");
        app.scroll_up();
        assert_eq!(app.mem_scroll, 0);

        for _ in 0..100 {
            app.scroll_down();
        }
        assert_eq!(app.mem_scroll, MEMORY_SIZE / MEMORY_ROW - 1);
    }
}
