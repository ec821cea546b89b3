pub mod decoder;
pub mod disassembler;
pub mod instruction;

pub use decoder::decode;
pub use disassembler::Disassembled;
pub use instruction::{DecodedInstruction, DecodedShape, Opcode};
