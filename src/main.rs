//! LS-8 Emulator - CLI Entry Point
//!
//! Commands:
//! - `ls8-emu <program>` - Run a program (shorthand for `run`)
//! - `ls8-emu run <program>` - Run an LS-8 or ASM file
//! - `ls8-emu debug <program>` - Interactive debugger
//! - `ls8-emu asm <source>` - Assemble to LS-8
//! - `ls8-emu disasm <program>` - Disassemble an LS-8 file

use clap::{ArgAction, Parser, Subcommand};
use log::{info, warn, LevelFilter};
use ls8::{assemble, disassemble, load_program, save_program, AssemblerError, Cpu, CpuError, LoadError};
use simple_logger::SimpleLogger;
use std::io::Write;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "ls8-emu")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "An emulator for the LS-8, an 8-bit teaching computer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv per-instruction)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the LS-8 or ASM file to execute
        program: String,
        /// Stop after this many instructions
        #[arg(short, long)]
        max_cycles: Option<u64>,
        /// Print a trace line to stderr before each instruction
        #[arg(short, long)]
        trace: bool,
        /// Print the final machine state as JSON
        #[arg(long)]
        dump_state: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the LS-8 or ASM file to debug
        program: String,
    },
    /// Assemble source to an LS-8 file
    Asm {
        /// Path to the source file
        source: String,
        /// Output LS-8 file
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Disassemble a program to readable text
    Disasm {
        /// Path to the LS-8 or ASM file
        program: String,
    },
    #[command(external_subcommand)]
    Program(Vec<String>),
}

/// Options for a single run.
#[derive(Debug, Clone, Copy, Default)]
struct RunOptions {
    max_cycles: Option<u64>,
    trace: bool,
    dump_state: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("{0}")]
    Load(#[from] LoadError),

    #[error("assembly error: {0}")]
    Assembler(#[from] AssemblerError),

    #[error("failed to load program: {0}")]
    Memory(#[from] ls8::cpu::MemoryError),

    #[error("CPU error at PC={pc:#04x}: {source}")]
    Cpu { pc: usize, source: CpuError },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run { program, max_cycles, trace, dump_state } => {
            run_program(&program, RunOptions { max_cycles, trace, dump_state })
        }
        Commands::Debug { program } => debug_program(&program),
        Commands::Asm { source, output } => assemble_file(&source, output),
        Commands::Disasm { program } => disassemble_file(&program),
        Commands::Program(args) => match args.as_slice() {
            [program] => run_program(program, RunOptions::default()),
            _ => Err(AppError::Usage(format!(
                "expected a single program path, found {:?}; see --help",
                args
            ))),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("failed to initialize logging: {}", e);
    }
}

/// Load program bytes from an `.ls8` file, or assemble an `.asm` file.
fn read_program(path: &str) -> Result<Vec<u8>, AppError> {
    let bytes = if path.ends_with(".asm") {
        let source = std::fs::read_to_string(path)
            .map_err(|e| LoadError::IoError(format!("{}: {}", path, e)))?;
        let bytes = assemble(&source)?;
        info!("assembled {} bytes from {}", bytes.len(), path);
        bytes
    } else {
        load_program(path)?.bytes
    };

    if bytes.is_empty() {
        return Err(AppError::Usage(format!("{}: no instructions to execute", path)));
    }

    Ok(bytes)
}

fn run_program(path: &str, options: RunOptions) -> Result<(), AppError> {
    let bytes = read_program(path)?;

    let mut cpu = Cpu::new();
    cpu.load_program(&bytes)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    while cpu.is_running() {
        if let Some(max) = options.max_cycles {
            if cpu.cycles >= max {
                warn!("reached max cycles limit ({}); use --max-cycles to increase", max);
                break;
            }
        }

        if options.trace {
            eprintln!("{}", cpu.trace());
        }

        let pc = cpu.pc;
        if let Err(source) = cpu.step(&mut out) {
            out.flush()?;
            return Err(AppError::Cpu { pc, source });
        }
    }

    out.flush()?;
    info!("{} instructions executed, state {:?}", cpu.cycles, cpu.state);

    if options.dump_state {
        writeln!(out, "{}", serde_json::to_string_pretty(&cpu)?)?;
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn debug_program(path: &str) -> Result<(), AppError> {
    let bytes = read_program(path)?;
    ls8::run_debugger(bytes)?;
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str) -> Result<(), AppError> {
    Err(AppError::Usage("the debugger requires the `tui` feature".into()))
}

fn assemble_file(source_path: &str, output: Option<String>) -> Result<(), AppError> {
    let out_path = output.unwrap_or_else(|| match source_path.strip_suffix(".asm") {
        Some(stem) => format!("{}.ls8", stem),
        None => format!("{}.ls8", source_path),
    });

    let source = std::fs::read_to_string(source_path)
        .map_err(|e| LoadError::IoError(format!("{}: {}", source_path, e)))?;
    let bytes = assemble(&source)?;
    save_program(&out_path, &bytes)?;

    println!("Assembled {} bytes: {} -> {}", bytes.len(), source_path, out_path);
    Ok(())
}

fn disassemble_file(path: &str) -> Result<(), AppError> {
    let bytes = read_program(path)?;
    print!("{}", disassemble(&bytes));
    Ok(())
}
