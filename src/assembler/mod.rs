//! Two-pass assembler: text with labels and comments → one binary-string
//! encoded word per line.

use std::collections::HashMap;

use regex::Regex;

use crate::error::AssemblerError;
use crate::isa::instruction::{
    encode_arith_imm, encode_arith_reg, encode_branch, encode_memory, to_binary_string, Opcode, Shape,
};

struct QueuedLine {
    source_line: usize,
    text: String,
}

/// Assembles source text into one binary-string line per instruction.
pub fn assemble(source: &str) -> Result<Vec<String>, AssemblerError> {
    let comment = Regex::new(r"//.*$").unwrap();
    let separators = Regex::new(r"[\s,]+").unwrap();

    let mut labels: HashMap<String, usize> = HashMap::new();
    let mut queued: Vec<QueuedLine> = Vec::new();
    let mut count = 0usize;

    for (i, raw_line) in source.lines().enumerate() {
        let source_line = i + 1;
        let stripped = comment.replace(raw_line, "");
        let trimmed = stripped.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(colon) = trimmed.find(':') {
            let label = trimmed[..colon].trim().to_string();
            labels.insert(label, count);
            continue;
        }
        queued.push(QueuedLine {
            source_line,
            text: trimmed.to_string(),
        });
        count += 1;
    }

    let mut out = Vec::with_capacity(queued.len());
    for line in &queued {
        let tokens: Vec<&str> = separators.split(line.text.trim()).filter(|t| !t.is_empty()).collect();
        let word = assemble_line(line.source_line, &tokens, &labels)?;
        out.push(to_binary_string(word));
    }
    Ok(out)
}

fn parse_register(line: usize, token: &str) -> Result<u8, AssemblerError> {
    let body = token
        .strip_prefix('R')
        .or_else(|| token.strip_prefix('r'))
        .ok_or_else(|| AssemblerError::new(line, format!("expected register operand, found '{}'", token)))?;
    let n: u32 = body
        .parse()
        .map_err(|_| AssemblerError::new(line, format!("invalid register '{}'", token)))?;
    if n > 15 {
        return Err(AssemblerError::new(line, format!("register out of range: R{}", n)));
    }
    Ok(n as u8)
}

fn resolve_value(line: usize, token: &str, labels: &HashMap<String, usize>, max: u32) -> Result<u32, AssemblerError> {
    let value = if let Ok(n) = token.parse::<u32>() {
        n
    } else if let Some(&addr) = labels.get(token) {
        addr as u32
    } else {
        return Err(AssemblerError::new(line, format!("unknown label '{}'", token)));
    };
    if value > max {
        return Err(AssemblerError::new(line, format!("immediate or branch target out of range: {}", value)));
    }
    Ok(value)
}

fn assemble_line(line: usize, tokens: &[&str], labels: &HashMap<String, usize>) -> Result<u32, AssemblerError> {
    let Some(mnemonic) = tokens.first() else {
        return Err(AssemblerError::new(line, "empty instruction"));
    };
    let opcode = Opcode::from_mnemonic(&mnemonic.to_uppercase())
        .ok_or_else(|| AssemblerError::new(line, format!("unknown opcode '{}'", mnemonic)))?;
    let operands = &tokens[1..];

    match opcode.shape() {
        Shape::ArithLogic => {
            if operands.len() != 3 {
                return Err(AssemblerError::new(line, format!("{} expects 3 operands", mnemonic)));
            }
            let fi = parse_register(line, operands[0])?;
            if fi == 0 {
                return Err(AssemblerError::new(line, "R0 is illegal as a destination"));
            }
            let fj = parse_register(line, operands[1])?;
            if operands[2].starts_with(['R', 'r']) && parse_register(line, operands[2]).is_ok() {
                let fk = parse_register(line, operands[2])?;
                Ok(encode_arith_reg(opcode, fi, fj, fk))
            } else {
                let imm = resolve_value(line, operands[2], labels, 0xFF)?;
                Ok(encode_arith_imm(opcode, fi, fj, imm as u8))
            }
        }
        Shape::Memory => {
            if operands.len() != 3 {
                return Err(AssemblerError::new(line, format!("{} expects 3 operands", mnemonic)));
            }
            let fi = parse_register(line, operands[0])?;
            // STK's fi is unused (its slot index comes from fj+fk), so R0
            // there is harmless; every other memory-shape opcode either
            // writes fi (LOAD, DLT) or stores its value (STOR), so R0 is
            // rejected there the same way it is for an arithmetic destination.
            if opcode != Opcode::Stk && fi == 0 {
                return Err(AssemblerError::new(line, "R0 is illegal as a destination"));
            }
            let fj = parse_register(line, operands[1])?;
            let fk = parse_register(line, operands[2])?;
            Ok(encode_memory(opcode, fi, fj, fk))
        }
        Shape::Branch => {
            if operands.len() != 2 {
                return Err(AssemblerError::new(line, "LOOP expects 2 operands"));
            }
            let fj = parse_register(line, operands[0])?;
            let tag = resolve_value(line, operands[1], labels, 0x1FFF)?;
            Ok(encode_branch(fj, tag))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_simple_program() {
        let src = "ADD R1, R2, R3\nSTOR R1, R0, R0\n";
        let lines = assemble(src).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 21);
    }

    #[test]
    fn rejects_r0_as_destination() {
        let src = "ADD R0, R2, R3\n";
        assert!(assemble(src).is_err());
    }

    #[test]
    fn resolves_labels_for_loop() {
        let src = "start:\nADD R1, R2, R3\nLOOP R1, start\n";
        let lines = assemble(src).unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn strips_comments() {
        let src = "// a comment\nADD R1, R2, R3 // trailing\n";
        let lines = assemble(src).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn rejects_out_of_range_immediate() {
        let src = "ADD R1, R2, 256\n";
        assert!(assemble(src).is_err());
    }

    #[test]
    fn rejects_unknown_opcode() {
        let src = "FOO R1, R2, R3\n";
        assert!(assemble(src).is_err());
    }
}
