//! `Stepper`: the program-visible facade binding the register file, data
//! memory, instruction memory and key safe to one resettable scoreboard.

use crate::core::config::ScoreboardConfig;
use crate::core::instruction_memory::InstructionMemory;
use crate::core::memory::DataMemory;
use crate::core::registers::RegisterFile;
use crate::core::safe::KeySafe;
use crate::core::scoreboard::Scoreboard;
use crate::error::{ExecutionDiagnostic, LoaderError};
use crate::isa::decoder::decode;

pub struct Stepper {
    config: ScoreboardConfig,
    pub registers: RegisterFile,
    pub memory: DataMemory,
    pub safe: KeySafe,
    pub scoreboard: Scoreboard,
}

/// The four pipeline timestamps for one instruction, plus its result and
/// any non-fatal fault its unit raised. `None` timestamps mean the
/// instruction hasn't reached that stage yet.
#[derive(Debug, Clone)]
pub struct InstructionTrace {
    pub issue: Option<u64>,
    pub read_operands: Option<u64>,
    pub execute_complete: Option<u64>,
    pub write_back: Option<u64>,
    pub result: Option<u32>,
    pub diagnostic: Option<ExecutionDiagnostic>,
}

/// A read-only copy of everything `snapshot()` exposes to a UI or CLI.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub registers: [u32; 16],
    pub safe: [[(u32, u32); 2]; 4],
    pub memory: Vec<u32>,
    pub pc: usize,
    pub clock: u64,
    pub timestamps: Vec<InstructionTrace>,
}

impl Stepper {
    /// Constructs fresh state and loads instruction/data/key memory.
    pub fn reset(
        config: ScoreboardConfig,
        assembled_program: &str,
        data_file: Option<&str>,
        key_file: Option<&str>,
    ) -> Result<Self, LoaderError> {
        let instructions = InstructionMemory::from_assembled_lines(assembled_program)
            .ok_or_else(|| LoaderError::UnparseableHexLine { line: 0, text: "<assembled program>".into() })?;

        let mut decoded = Vec::with_capacity(instructions.len());
        for (i, word) in instructions.words().iter().enumerate() {
            let inst = decode(*word, i).map_err(|e| LoaderError::UnparseableHexLine {
                line: i + 1,
                text: e.to_string(),
            })?;
            decoded.push(inst);
        }

        let mut memory = DataMemory::new(config.memory_size);
        if let Some(path) = key_file {
            memory.load_hex_key_file(path)?;
        }
        if let Some(path) = data_file {
            memory.load_binary_file(path)?;
        }

        let scoreboard = Scoreboard::new(&config, decoded);

        Ok(Self {
            config,
            registers: RegisterFile::new(),
            memory,
            safe: KeySafe::new(),
            scoreboard,
        })
    }

    pub fn tick(&mut self) {
        self.scoreboard.tick(&mut self.registers, &mut self.memory, &mut self.safe);
    }

    pub fn run(&mut self) {
        self.scoreboard.run(&mut self.registers, &mut self.memory, &mut self.safe);
    }

    pub fn done(&self) -> bool {
        self.scoreboard.done()
    }

    pub fn config(&self) -> &ScoreboardConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        let timestamps = self
            .scoreboard
            .program
            .iter()
            .map(|inst| InstructionTrace {
                issue: inst.issue,
                read_operands: inst.read_operands,
                execute_complete: inst.execute_complete,
                write_back: inst.write_back,
                result: inst.result,
                diagnostic: inst.diagnostic.clone(),
            })
            .collect();

        Snapshot {
            registers: self.registers.dump(),
            safe: self.safe.dump(),
            memory: self.memory.dump(),
            pc: self.scoreboard.pc,
            clock: self.scoreboard.clock,
            timestamps,
        }
    }
}
