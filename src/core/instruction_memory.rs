//! Ordered, immutable-after-load sequence of encoded instructions.

use crate::isa::instruction::WORD_MASK;

#[derive(Debug, Clone)]
pub struct InstructionMemory {
    words: Vec<u32>,
}

impl InstructionMemory {
    pub fn from_words(words: Vec<u32>) -> Self {
        Self {
            words: words.into_iter().map(|w| w & WORD_MASK).collect(),
        }
    }

    /// Loads an assembled program: one binary-string-encoded word per line.
    pub fn from_assembled_lines(text: &str) -> Option<Self> {
        let mut words = Vec::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            words.push(crate::isa::instruction::from_binary_string(trimmed)?);
        }
        Some(Self::from_words(words))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Byte address to word index: `index = address / 4`.
    pub fn fetch_by_byte_address(&self, address: u32) -> Option<u32> {
        self.fetch(address as usize / 4)
    }

    pub fn fetch(&self, index: usize) -> Option<u32> {
        self.words.get(index).copied()
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::instruction::{encode_arith_reg, to_binary_string, Opcode};

    #[test]
    fn byte_address_divides_by_four() {
        let w = encode_arith_reg(Opcode::Add, 1, 2, 3);
        let mem = InstructionMemory::from_words(vec![0, w]);
        assert_eq!(mem.fetch_by_byte_address(4), Some(w));
    }

    #[test]
    fn parses_assembled_text() {
        let w = encode_arith_reg(Opcode::Add, 1, 2, 3);
        let text = format!("{}\n", to_binary_string(w));
        let mem = InstructionMemory::from_assembled_lines(&text).unwrap();
        assert_eq!(mem.fetch(0), Some(w));
    }
}
