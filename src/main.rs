use std::fs;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use scoreboard_tea_sim::assembler;
use scoreboard_tea_sim::core::config::ScoreboardConfig;
use scoreboard_tea_sim::isa::decoder::decode;
use scoreboard_tea_sim::isa::disassembler::disassemble;
use scoreboard_tea_sim::isa::instruction::from_binary_string;
use scoreboard_tea_sim::log;
use scoreboard_tea_sim::stepper::Stepper;

#[derive(Parser)]
#[command(name = "scoreboard-tea-sim", about = "Scoreboard out-of-order cipher-workload simulator")]
struct Cli {
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a source file into one binary-string word per line.
    Assemble { input: String, output: String },
    /// Run an assembled program to completion and print final state.
    Run {
        program: String,
        #[arg(long)]
        data: Option<String>,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        trace: bool,
    },
    /// Run an assembled program then write the encrypted data memory.
    EncryptOut {
        program: String,
        data: String,
        #[arg(long)]
        key: Option<String>,
    },
    /// Print one disassembled line per instruction in an assembled program.
    Disasm { program: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _logger = log::init_logging(&cli.log_level);

    let result = match cli.command {
        Command::Assemble { input, output } => run_assemble(&input, &output),
        Command::Run { program, data, key, trace } => run_program(&program, data.as_deref(), key.as_deref(), trace),
        Command::EncryptOut { program, data, key } => run_encrypt_out(&program, &data, key.as_deref()),
        Command::Disasm { program } => run_disasm(&program),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{}", message);
            ExitCode::FAILURE
        }
    }
}

fn run_assemble(input: &str, output: &str) -> Result<(), String> {
    let source = fs::read_to_string(input).map_err(|e| format!("reading {}: {}", input, e))?;
    let lines = assembler::assemble(&source).map_err(|e| e.to_string())?;
    fs::write(output, lines.join("\n") + "\n").map_err(|e| format!("writing {}: {}", output, e))?;
    info!("assembled {} into {} ({} instructions)", input, output, lines.len());
    Ok(())
}

fn run_program(program: &str, data: Option<&str>, key: Option<&str>, trace: bool) -> Result<(), String> {
    let source = fs::read_to_string(program).map_err(|e| format!("reading {}: {}", program, e))?;
    let mut stepper = Stepper::reset(ScoreboardConfig::stepper(), &source, data, key).map_err(|e| e.to_string())?;

    if trace {
        while !stepper.done() {
            stepper.tick();
            info!(clock = stepper.scoreboard.clock, pc = stepper.scoreboard.pc, "tick");
        }
    } else {
        stepper.run();
    }

    let snapshot = stepper.snapshot();
    info!("done at clock {}", snapshot.clock);
    for (i, r) in snapshot.registers.iter().enumerate() {
        info!("R{:<2} = {:#010x}", i, r);
    }
    Ok(())
}

fn run_encrypt_out(program: &str, data: &str, key: Option<&str>) -> Result<(), String> {
    let source = fs::read_to_string(program).map_err(|e| format!("reading {}: {}", program, e))?;
    let original_len = fs::metadata(data).map_err(|e| format!("stat {}: {}", data, e))?.len() as usize;
    let mut stepper = Stepper::reset(ScoreboardConfig::stepper(), &source, Some(data), key).map_err(|e| e.to_string())?;
    stepper.run();
    stepper
        .memory
        .write_encrypted_output(data, original_len)
        .map_err(|e| e.to_string())?;
    info!("wrote {}.enc", data);
    Ok(())
}

fn run_disasm(program: &str) -> Result<(), String> {
    let source = fs::read_to_string(program).map_err(|e| format!("reading {}: {}", program, e))?;
    for (i, line) in source.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let word = from_binary_string(trimmed).ok_or_else(|| format!("line {}: malformed word", i + 1))?;
        let inst = decode(word, i).map_err(|e| format!("line {}: {}", i + 1, e))?;
        println!("{}", disassemble(&inst).formatted);
    }
    Ok(())
}
