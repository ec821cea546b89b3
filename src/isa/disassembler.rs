//! Human-readable rendering of a decoded instruction, for `disasm` and trace logging.

use crate::isa::instruction::{DecodedInstruction, DecodedShape};

#[derive(Debug, Clone)]
pub struct Disassembled {
    pub formatted: String,
}

pub fn register_alias(r: u8) -> String {
    format!("R{}", r)
}

pub fn disassemble(inst: &DecodedInstruction) -> Disassembled {
    let mnemonic = inst.opcode.mnemonic();
    let operands = match inst.shape {
        DecodedShape::ArithLogicReg { fi, fj, fk } => {
            format!("{}, {}, {}", register_alias(fi), register_alias(fj), register_alias(fk))
        }
        DecodedShape::ArithLogicImm { fi, fj, imm } => {
            format!("{}, {}, #{}", register_alias(fi), register_alias(fj), imm)
        }
        DecodedShape::Memory { fi, fj, fk } => {
            format!("{}, {}, {}", register_alias(fi), register_alias(fj), register_alias(fk))
        }
        DecodedShape::Branch { fj, tag } => {
            format!("{}, @{}", register_alias(fj), tag)
        }
    };
    Disassembled {
        formatted: format!("{:04}: {:<5} {}", inst.index, mnemonic, operands),
    }
}
