use std::fmt::Write;

use crate::decode::{ParameterMode, decode};

/// Pretty-print a linear sweep over `memory` for human inspection.
///
/// Every word that decodes as an instruction is shown with its operands:
/// `[n]` for position mode, `n` for immediate, `[rb+n]` for relative. Words
/// that do not decode, and instructions truncated by the end of memory, are
/// shown as data.
pub fn disassemble(memory: &[i64]) -> String {
    let mut out = String::new();
    let mut ip = 0;
    while ip < memory.len() {
        let word = memory[ip];
        let instr = match decode(word) {
            Ok(instr) if ip + instr.opcode.arity() < memory.len() => instr,
            _ => {
                let _ = writeln!(out, "{ip:04}: {word:<24} data {word}");
                ip += 1;
                continue;
            }
        };

        let arity = instr.opcode.arity();
        let raw = &memory[ip..=ip + arity];
        let words = raw
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let operands = raw[1..]
            .iter()
            .zip(instr.modes)
            .map(|(&value, mode)| match mode {
                ParameterMode::Position => format!("[{value}]"),
                ParameterMode::Immediate => value.to_string(),
                ParameterMode::Relative => format!("[rb{value:+}]"),
            })
            .collect::<Vec<_>>()
            .join(", ");
        let mnemonic = instr.opcode.mnemonic();
        if operands.is_empty() {
            let _ = writeln!(out, "{ip:04}: {words:<24} {mnemonic}");
        } else {
            let _ = writeln!(out, "{ip:04}: {words:<24} {mnemonic} {operands}");
        }
        ip += arity + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_listing() {
        let text = disassemble(&[1002, 4, 3, 4, 33]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0000: 1002,4,3,4"));
        assert!(lines[0].ends_with("mul [4], 3, [4]"));
        assert!(lines[1].starts_with("0004: 33"));
        assert!(lines[1].ends_with("data 33"));
    }

    #[test]
    fn test_relative_and_halt() {
        let text = disassemble(&[109, 1, 204, -1, 99]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("arb 1"));
        assert!(lines[1].ends_with("out [rb-1]"));
        assert!(lines[2].ends_with("halt"));
    }

    #[test]
    fn test_truncated_instruction_is_data() {
        let text = disassemble(&[99, 1, 0]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with("data 1"));
        assert!(lines[2].ends_with("data 0"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(disassemble(&[]), "");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn never_panics(memory in prop::collection::vec(any::<i64>(), 0..128)) {
            let text = disassemble(&memory);
            prop_assert!(text.lines().count() <= memory.len());
        }
    }
}
