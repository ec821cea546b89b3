//! The scoreboard controller: issue, read-operands, execute and write-back,
//! driven one tick at a time.

use tracing::{debug, warn};

use crate::core::config::ScoreboardConfig;
use crate::core::memory::DataMemory;
use crate::core::registers::RegisterFile;
use crate::core::safe::KeySafe;
use crate::core::units::{FunctionalUnit, Stage, UnitKind};
use crate::isa::instruction::{DecodedInstruction, Opcode};

pub struct Scoreboard {
    pub units: Vec<FunctionalUnit>,
    pub register_status: [Option<usize>; 16],
    pub program: Vec<DecodedInstruction>,
    pub pc: usize,
    pub clock: u64,
    pub wait_branch: bool,
}

impl Scoreboard {
    pub fn new(config: &ScoreboardConfig, program: Vec<DecodedInstruction>) -> Self {
        let mut units = Vec::new();
        for _ in 0..config.alu_count {
            units.push(FunctionalUnit::new(UnitKind::Alu, config.latencies.alu));
        }
        for _ in 0..config.mem_count {
            units.push(FunctionalUnit::new(UnitKind::Memory, config.latencies.mem));
        }
        for _ in 0..config.mul_count {
            units.push(FunctionalUnit::new(UnitKind::Mult, config.latencies.mul));
        }
        for _ in 0..config.div_count {
            units.push(FunctionalUnit::new(UnitKind::Div, config.latencies.div));
        }
        for _ in 0..config.saxs_count {
            units.push(FunctionalUnit::new(UnitKind::Saxs, config.latencies.saxs));
        }
        Self {
            units,
            register_status: [None; 16],
            program,
            pc: 0,
            clock: 1,
            wait_branch: false,
        }
    }

    pub fn done(&self) -> bool {
        self.pc >= self.program.len() && self.units.iter().all(|u| !u.busy)
    }

    pub fn tick(&mut self, regs: &mut RegisterFile, mem: &mut DataMemory, safe: &mut KeySafe) {
        self.clock += 1;
        for u in &mut self.units {
            u.locked = false;
        }

        self.try_writeback_all(regs, mem, safe);
        self.try_execute_all(mem, safe);
        self.try_read_operands_all(regs);
        self.try_issue();
    }

    pub fn run(&mut self, regs: &mut RegisterFile, mem: &mut DataMemory, safe: &mut KeySafe) {
        while !self.done() {
            self.tick(regs, mem, safe);
        }
    }

    // --- Write-Back ------------------------------------------------------

    /// A unit still sitting in `Issued` that reads the register we're about
    /// to overwrite blocks our write-back (WAR) *unless* we are the very
    /// producer it's waiting on (`q_j/q_k/q_fi == Some(i)`) — that's ordinary
    /// RAW, not a hazard, and its wait is resolved by this same write-back
    /// a few lines below. Without the `q_* != Some(i)` exclusion, any unit
    /// with a live dependent would deadlock: the dependent can't capture
    /// operands until we retire, and `!v.r_j`-style checks would never let
    /// us retire until the dependent already had.
    fn writeback_ready(&self, i: usize) -> bool {
        let dest = self.units[i].dest();
        let Some(dest) = dest else { return true };
        for (j, v) in self.units.iter().enumerate() {
            if j == i || !v.busy || v.stage != Some(Stage::Issued) {
                continue;
            }
            if v.fj == Some(dest) && v.q_j != Some(i) {
                return false;
            }
            if !v.is_imm && v.fk == Some(dest) && v.q_k != Some(i) {
                return false;
            }
            if v.opcode == Some(Opcode::Stor) && v.fi == Some(dest) && v.q_fi != Some(i) {
                return false;
            }
        }
        true
    }

    fn try_writeback_all(&mut self, regs: &mut RegisterFile, mem: &mut DataMemory, safe: &mut KeySafe) {
        for i in 0..self.units.len() {
            if self.units[i].locked || !self.units[i].busy {
                continue;
            }
            if self.units[i].stage != Some(Stage::AwaitingWriteback) {
                continue;
            }
            if self.writeback_ready(i) {
                self.do_writeback(i, regs, mem, safe);
                self.units[i].locked = true;
            }
        }
    }

    fn do_writeback(&mut self, i: usize, regs: &mut RegisterFile, mem: &mut DataMemory, safe: &mut KeySafe) {
        let (zero_flag, dest, result, mem_store, safe_store, opcode, inst_index, diagnostic) = {
            let u = &self.units[i];
            (
                u.zero_flag,
                u.dest(),
                u.result,
                u.mem_store,
                u.safe_store,
                u.opcode,
                u.inst_index.expect("busy unit always carries its instruction index"),
                u.diagnostic.clone(),
            )
        };

        if zero_flag {
            self.pc = result.unwrap_or(0) as usize;
        } else if let Some(d) = dest {
            if d != 0 {
                regs.write(d, result.unwrap_or(0));
            }
        }
        if let Some((addr, value)) = mem_store {
            mem.write(addr, value);
        }
        if let Some((index, r1, r2, r3, r4)) = safe_store {
            safe.store(index, r1, r2, r3, r4);
        }
        if opcode == Some(Opcode::Loop) {
            self.wait_branch = false;
        }
        if let Some(d) = dest {
            if d != 0 && self.register_status[d as usize] == Some(i) {
                self.register_status[d as usize] = None;
            }
        }
        for v in self.units.iter_mut() {
            if v.q_j == Some(i) {
                v.r_j = true;
                v.q_j = None;
            }
            if v.q_k == Some(i) {
                v.r_k = true;
                v.q_k = None;
            }
            if v.q_fi == Some(i) {
                v.r_fi = true;
                v.q_fi = None;
            }
        }

        if let Some(d) = &diagnostic {
            warn!(unit = i, inst = inst_index, clock = self.clock, %d, "execution diagnostic");
        }
        debug!(unit = i, inst = inst_index, clock = self.clock, "write-back");
        self.program[inst_index].write_back = Some(self.clock);
        self.program[inst_index].result = result;
        self.program[inst_index].diagnostic = diagnostic;

        self.units[i].release();
    }

    // --- Execute -----------------------------------------------------------

    fn try_execute_all(&mut self, mem: &DataMemory, safe: &KeySafe) {
        for i in 0..self.units.len() {
            if self.units[i].locked || !self.units[i].busy {
                continue;
            }
            if self.units[i].stage != Some(Stage::Executing) {
                continue;
            }
            self.units[i].cycles_remaining -= 1;
            if self.units[i].cycles_remaining == 0 {
                self.units[i].compute(mem, safe);
                self.units[i].stage = Some(Stage::AwaitingWriteback);
                let inst_index = self.units[i].inst_index.unwrap();
                debug!(unit = i, inst = inst_index, clock = self.clock, "execute-complete");
                self.program[inst_index].execute_complete = Some(self.clock);
            }
            self.units[i].locked = true;
        }
    }

    // --- Read-Operands -------------------------------------------------

    fn read_operands_ready(&self, i: usize) -> bool {
        let u = &self.units[i];
        if !(u.r_j && u.r_k && u.r_fi) {
            return false;
        }
        if u.opcode == Some(Opcode::Stk) {
            return (1..=4).all(|r| self.register_status[r].is_none());
        }
        true
    }

    fn try_read_operands_all(&mut self, regs: &RegisterFile) {
        for i in 0..self.units.len() {
            if self.units[i].locked || !self.units[i].busy {
                continue;
            }
            if self.units[i].stage != Some(Stage::Issued) {
                continue;
            }
            if self.read_operands_ready(i) {
                self.units[i].capture_operands(regs);
                self.units[i].stage = Some(Stage::Executing);
                self.units[i].cycles_remaining = self.units[i].nominal_latency;
                let inst_index = self.units[i].inst_index.unwrap();
                debug!(unit = i, inst = inst_index, clock = self.clock, "read-operands");
                self.program[inst_index].read_operands = Some(self.clock);
                self.units[i].locked = true;
            }
        }
    }

    // --- Issue -----------------------------------------------------------

    fn try_issue(&mut self) {
        if self.wait_branch || self.pc >= self.program.len() {
            return;
        }
        let inst = &self.program[self.pc];
        let required_kind = inst.opcode.unit_kind();

        let waw_clear = match inst.dest() {
            Some(d) if d != 0 => self.register_status[d as usize].is_none(),
            _ => true,
        };
        if !waw_clear {
            return;
        }

        let Some(unit_i) = self
            .units
            .iter()
            .position(|u| !u.locked && !u.busy && u.kind == required_kind)
        else {
            return;
        };

        let (fj, fk) = inst.sources();
        let is_imm = inst.is_imm();
        let fi = inst.fi();
        let dest = inst.dest();

        let r_j = fj.map_or(true, |r| self.register_status[r as usize].is_none());
        let q_j = fj.and_then(|r| self.register_status[r as usize]);
        let r_k = if is_imm {
            true
        } else {
            fk.map_or(true, |r| self.register_status[r as usize].is_none())
        };
        let q_k = if is_imm { None } else { fk.and_then(|r| self.register_status[r as usize]) };

        // STOR reads fi as the value to store; every other opcode either
        // writes fi or leaves it unused, so there's nothing to hazard-check.
        let (r_fi, q_fi) = if inst.opcode == Opcode::Stor {
            (fi.map_or(true, |r| self.register_status[r as usize].is_none()), fi.and_then(|r| self.register_status[r as usize]))
        } else {
            (true, None)
        };

        let u = &mut self.units[unit_i];
        u.busy = true;
        u.stage = Some(Stage::Issued);
        u.opcode = Some(inst.opcode);
        u.inst_index = Some(self.pc);
        u.fi = fi;
        u.fj = fj;
        u.fk = fk;
        u.is_imm = is_imm;
        u.imm = inst.imm();
        u.r_j = r_j;
        u.r_k = r_k;
        u.q_j = q_j;
        u.q_k = q_k;
        u.r_fi = r_fi;
        u.q_fi = q_fi;
        u.zero_flag = false;
        u.result = None;
        u.diagnostic = None;
        u.locked = true;

        if let Some(d) = dest {
            if d != 0 {
                self.register_status[d as usize] = Some(unit_i);
            }
        }

        debug!(unit = unit_i, inst = self.pc, clock = self.clock, opcode = inst.opcode.mnemonic(), "issue");
        self.program[self.pc].issue = Some(self.clock);

        if inst.opcode == Opcode::Loop {
            self.wait_branch = true;
        }
        self.pc += 1;
    }
}
