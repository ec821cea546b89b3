//! Turns a raw encoded word into a `DecodedInstruction`.

use crate::isa::instruction::{DecodedInstruction, DecodedShape, Opcode, Shape, WORD_MASK};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub word: u32,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized opcode in word {:021b}", self.word & WORD_MASK)
    }
}

impl std::error::Error for DecodeError {}

pub fn decode(word: u32, index: usize) -> Result<DecodedInstruction, DecodeError> {
    let word = word & WORD_MASK;
    let op_bits = (word >> 17) & 0xF;
    let opcode = Opcode::from_bits(op_bits).ok_or(DecodeError { word })?;

    let shape = match opcode.shape() {
        Shape::ArithLogic => {
            let is_imm = (word >> 16) & 1 == 1;
            let fi = ((word >> 12) & 0xF) as u8;
            let fj = ((word >> 8) & 0xF) as u8;
            if is_imm {
                let imm = word & 0xFF;
                DecodedShape::ArithLogicImm { fi, fj, imm }
            } else {
                let fk = ((word >> 4) & 0xF) as u8;
                DecodedShape::ArithLogicReg { fi, fj, fk }
            }
        }
        Shape::Memory => {
            let fi = ((word >> 13) & 0xF) as u8;
            let fj = ((word >> 9) & 0xF) as u8;
            let fk = ((word >> 5) & 0xF) as u8;
            DecodedShape::Memory { fi, fj, fk }
        }
        Shape::Branch => {
            let fj = ((word >> 13) & 0xF) as u8;
            let tag = word & 0x1FFF;
            DecodedShape::Branch { fj, tag }
        }
    };

    Ok(DecodedInstruction::new(word, index, opcode, shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::instruction::{encode_arith_imm, encode_arith_reg, encode_branch, encode_memory};

    #[test]
    fn decodes_register_form() {
        let w = encode_arith_reg(Opcode::Add, 1, 2, 3);
        let d = decode(w, 0).unwrap();
        assert_eq!(d.opcode, Opcode::Add);
        assert_eq!(d.shape, DecodedShape::ArithLogicReg { fi: 1, fj: 2, fk: 3 });
    }

    #[test]
    fn decodes_immediate_form() {
        let w = encode_arith_imm(Opcode::Add, 1, 2, 7);
        let d = decode(w, 0).unwrap();
        assert_eq!(d.shape, DecodedShape::ArithLogicImm { fi: 1, fj: 2, imm: 7 });
    }

    #[test]
    fn decodes_memory_form() {
        let w = encode_memory(Opcode::Stk, 0, 9, 10);
        let d = decode(w, 0).unwrap();
        assert_eq!(d.opcode, Opcode::Stk);
        assert_eq!(d.shape, DecodedShape::Memory { fi: 0, fj: 9, fk: 10 });
    }

    #[test]
    fn decodes_branch_form() {
        let w = encode_branch(4, 100);
        let d = decode(w, 0).unwrap();
        assert_eq!(d.opcode, Opcode::Loop);
        assert_eq!(d.shape, DecodedShape::Branch { fj: 4, tag: 100 });
    }

    #[test]
    fn rejects_unknown_opcode() {
        let w = 15u32 << 17;
        assert!(decode(w, 0).is_err());
    }
}
