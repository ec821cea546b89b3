//! Functional-unit state and per-opcode execution semantics.

use crate::core::memory::DataMemory;
use crate::core::registers::RegisterFile;
use crate::core::safe::KeySafe;
use crate::error::ExecutionDiagnostic;
use crate::isa::instruction::Opcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Alu,
    Memory,
    Mult,
    Div,
    Saxs,
}

impl UnitKind {
    pub fn label(self) -> &'static str {
        match self {
            UnitKind::Alu => "alu",
            UnitKind::Memory => "memory",
            UnitKind::Mult => "mult",
            UnitKind::Div => "div",
            UnitKind::Saxs => "saxs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Issued,
    Executing,
    AwaitingWriteback,
}

/// One functional unit. `locked` is cleared at the start of every tick and
/// set the moment the unit makes a stage transition, so it can make at most
/// one transition per tick.
#[derive(Debug, Clone)]
pub struct FunctionalUnit {
    pub kind: UnitKind,
    pub nominal_latency: u32,

    pub busy: bool,
    pub locked: bool,
    pub stage: Option<Stage>,
    pub cycles_remaining: u32,

    pub opcode: Option<Opcode>,
    pub inst_index: Option<usize>,
    pub fi: Option<u8>,
    pub fj: Option<u8>,
    pub fk: Option<u8>,
    pub is_imm: bool,
    pub imm: Option<u32>,

    pub r_j: bool,
    pub r_k: bool,
    pub q_j: Option<usize>,
    pub q_k: Option<usize>,
    /// `STOR` reads `fi` as the value to store, a third source role besides
    /// `fj`/`fk`. Tracked the same way; always `true`/`None` for every other
    /// opcode, where `fi` is a destination (or unused).
    pub r_fi: bool,
    pub q_fi: Option<usize>,

    /// Operand values captured at Read-Operands, once `r_j`/`r_k` go true.
    /// Execute reads these instead of the live register file, so a later,
    /// shorter-latency instruction writing the same register back first
    /// cannot corrupt an operand this unit already consumed (the WAR
    /// hazard the Read-Operands stage exists to close).
    pub v_j: u32,
    pub v_k: u32,
    /// `STK` snapshots R1-R4 at Read-Operands into all four slots; `STOR`
    /// reuses slot 0 for its own `fi`-sourced value. Same reasoning as
    /// `v_j`/`v_k` — neither opcode touches the register file again after
    /// this snapshot.
    pub v_stk: [u32; 4],

    pub zero_flag: bool,
    pub result: Option<u32>,
    pub diagnostic: Option<ExecutionDiagnostic>,

    pub mem_store: Option<(u32, u32)>,
    pub safe_store: Option<(u32, u32, u32, u32, u32)>,
}

impl FunctionalUnit {
    pub fn new(kind: UnitKind, nominal_latency: u32) -> Self {
        Self {
            kind,
            nominal_latency,
            busy: false,
            locked: false,
            stage: None,
            cycles_remaining: 0,
            opcode: None,
            inst_index: None,
            fi: None,
            fj: None,
            fk: None,
            is_imm: false,
            imm: None,
            r_j: false,
            r_k: false,
            q_j: None,
            q_k: None,
            r_fi: true,
            q_fi: None,
            v_j: 0,
            v_k: 0,
            v_stk: [0; 4],
            zero_flag: false,
            result: None,
            diagnostic: None,
            mem_store: None,
            safe_store: None,
        }
    }

    /// Destination register this unit will commit at write-back, if any.
    pub fn dest(&self) -> Option<u8> {
        if self.opcode.map(Opcode::has_dest).unwrap_or(false) {
            self.fi
        } else {
            None
        }
    }

    fn live_value_j(&self, regs: &RegisterFile) -> u32 {
        self.fj.map(|r| regs.read(r)).unwrap_or(0)
    }

    fn live_value_k(&self, regs: &RegisterFile) -> u32 {
        if self.is_imm {
            self.imm.unwrap_or(0)
        } else {
            self.fk.map(|r| regs.read(r)).unwrap_or(0)
        }
    }

    /// Snapshots every register this unit will need, the moment Read-Operands
    /// admits it (`r_j && r_k`, plus the R1-R4 check for `STK`). From this
    /// point on the unit never touches the register file again, so a later
    /// instruction's write-back can safely reuse the same register.
    pub fn capture_operands(&mut self, regs: &RegisterFile) {
        self.v_j = self.live_value_j(regs);
        self.v_k = self.live_value_k(regs);
        if self.opcode == Some(Opcode::Stk) {
            self.v_stk = [regs.read(1), regs.read(2), regs.read(3), regs.read(4)];
        }
        if self.opcode == Some(Opcode::Stor) {
            // STOR's stored value comes from fi, a pure source role here.
            self.v_stk[0] = self.fi.map(|r| regs.read(r)).unwrap_or(0);
        }
    }

    /// Computes this unit's result (and any deferred memory/safe side
    /// effect) once its execute counter reaches zero, from the operands
    /// `capture_operands` snapshotted at Read-Operands.
    pub fn compute(&mut self, mem: &DataMemory, safe: &KeySafe) {
        let Some(opcode) = self.opcode else { return };
        match opcode {
            Opcode::Add => self.result = Some(self.v_j.wrapping_add(self.v_k)),
            Opcode::Sub => self.result = Some(self.v_j.wrapping_sub(self.v_k)),
            Opcode::And => self.result = Some(self.v_j & self.v_k),
            Opcode::Or => self.result = Some(self.v_j | self.v_k),
            Opcode::Xor => self.result = Some(self.v_j ^ self.v_k),
            Opcode::Shrl => self.result = Some(self.v_j.wrapping_shr(self.v_k)),
            Opcode::Shll => self.result = Some(self.v_j.wrapping_shl(self.v_k)),
            Opcode::Mul => self.result = Some(self.v_j.wrapping_mul(self.v_k)),
            Opcode::Div => {
                if self.v_k == 0 {
                    self.diagnostic = Some(ExecutionDiagnostic::DivisionByZero);
                    self.result = Some(0);
                } else {
                    self.result = Some(self.v_j / self.v_k);
                }
            }
            Opcode::Saxs => {
                let (low, high) = safe.load(self.v_k);
                self.result = Some((self.v_j << 4).wrapping_add(low) ^ (self.v_j >> 5).wrapping_add(high));
            }
            Opcode::Load => {
                let addr = self.v_j.wrapping_add(self.v_k);
                self.result = Some(mem.read(addr));
            }
            Opcode::Stor => {
                let addr = self.v_j.wrapping_add(self.v_k);
                self.mem_store = Some((addr, self.v_stk[0]));
            }
            Opcode::Stk => {
                let index = self.v_j.wrapping_add(self.v_k);
                let [r1, r2, r3, r4] = self.v_stk;
                self.safe_store = Some((index, r1, r2, r3, r4));
            }
            Opcode::Dlt => {
                self.result = Some(self.v_j.wrapping_add(0x9E3779B9));
            }
            Opcode::Loop => {
                if self.v_j == 0 {
                    self.result = self.imm;
                    self.zero_flag = true;
                } else {
                    self.result = None;
                    self.zero_flag = false;
                }
            }
        }
    }

    /// Resets all per-instruction state; called when the unit frees up
    /// at write-back.
    pub fn release(&mut self) {
        *self = FunctionalUnit::new(self.kind, self.nominal_latency);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_for(opcode: Opcode) -> FunctionalUnit {
        let mut u = FunctionalUnit::new(opcode.unit_kind(), 1);
        u.opcode = Some(opcode);
        u
    }

    #[test]
    fn dlt_adds_constant() {
        let regs = RegisterFile::new();
        let mem = DataMemory::new(16);
        let safe = KeySafe::new();
        let mut u = unit_for(Opcode::Dlt);
        u.fj = Some(0);
        u.capture_operands(&regs);
        u.compute(&mem, &safe);
        assert_eq!(u.result, Some(0x9E3779B9));
    }

    #[test]
    fn saxs_mixes_with_safe_contents() {
        let mut regs = RegisterFile::new();
        regs.write(6, 1);
        let mem = DataMemory::new(16);
        let mut safe = KeySafe::new();
        safe.store(0, 0xA, 0xB, 0xC, 0xD);
        let mut u = unit_for(Opcode::Saxs);
        u.fj = Some(6);
        u.is_imm = true;
        u.imm = Some(0);
        u.capture_operands(&regs);
        u.compute(&mem, &safe);
        assert_eq!(u.result, Some(0x11));
    }

    #[test]
    fn div_by_zero_reports_diagnostic() {
        let regs = RegisterFile::new();
        let mem = DataMemory::new(16);
        let safe = KeySafe::new();
        let mut u = unit_for(Opcode::Div);
        u.fj = Some(0);
        u.fk = Some(0);
        u.capture_operands(&regs);
        u.compute(&mem, &safe);
        assert_eq!(u.result, Some(0));
        assert_eq!(u.diagnostic, Some(ExecutionDiagnostic::DivisionByZero));
    }

    #[test]
    fn loop_sets_zero_flag_only_when_tested_register_is_zero() {
        let mut regs = RegisterFile::new();
        regs.write(1, 5);
        let mem = DataMemory::new(16);
        let safe = KeySafe::new();

        let mut taken = unit_for(Opcode::Loop);
        taken.fj = Some(0);
        taken.imm = Some(7);
        taken.capture_operands(&regs);
        taken.compute(&mem, &safe);
        assert!(taken.zero_flag);
        assert_eq!(taken.result, Some(7));

        let mut not_taken = unit_for(Opcode::Loop);
        not_taken.fj = Some(1);
        not_taken.imm = Some(7);
        not_taken.capture_operands(&regs);
        not_taken.compute(&mem, &safe);
        assert!(!not_taken.zero_flag);
        assert_eq!(not_taken.result, None);
    }
}
