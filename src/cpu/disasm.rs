//! Disassembler for Intcode programs.
//!
//! Programs freely mix code and data, so the listing is a linear sweep:
//! anything that does not decode to a valid instruction is shown as data.

use crate::cpu::decode::{decode, Mode, Opcode};
use crate::cpu::memory::Cell;

/// Disassemble the instruction at `addr`.
///
/// Returns the text and the number of cells it covers.
pub fn disassemble_at(program: &[Cell], addr: usize) -> (String, usize) {
    let word = program.get(addr).copied().unwrap_or(0);
    let instr = decode(word);

    let Some(op) = instr.op() else {
        return (format!("DATA {}", word), 1);
    };

    let mut operands = Vec::with_capacity(op.params());
    for k in 1..=op.params() {
        let mode = match instr.mode(k) {
            Some(Mode::Immediate) if op.writes(k) => None,
            mode => mode,
        };
        let Some(mode) = mode else {
            return (format!("DATA {}", word), 1);
        };
        let param = program.get(addr + k).copied().unwrap_or(0);
        operands.push(format_operand(param, mode));
    }

    let text = match op {
        Opcode::Halt => op.mnemonic().to_string(),
        _ => format!("{} {}", op.mnemonic(), operands.join(", ")),
    };
    (text, op.width())
}

/// Disassemble a whole program.
pub fn disassemble(program: &[Cell]) -> String {
    let mut output = String::new();
    output.push_str("; Intcode Disassembly\n");
    output.push_str("; -------------------\n\n");

    let mut addr = 0;
    while addr < program.len() {
        let (line, width) = disassemble_at(program, addr);
        let end = (addr + width).min(program.len());
        let raw: Vec<String> = program[addr..end].iter().map(|c| c.to_string()).collect();
        output.push_str(&format!("{:05}: {:<28} ; {}\n", addr, line, raw.join(",")));
        addr += width;
    }

    output
}

/// Format a parameter with its mode.
fn format_operand(param: Cell, mode: Mode) -> String {
    match mode {
        Mode::Position => format!("[{}]", param),
        Mode::Immediate => format!("{}", param),
        Mode::Relative if param < 0 => format!("rb{}", param),
        Mode::Relative => format!("rb+{}", param),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_add() {
        let (text, width) = disassemble_at(&[1002, 4, 3, 4, 33], 0);
        assert_eq!(text, "MUL [4], 3, [4]");
        assert_eq!(width, 4);
    }

    #[test]
    fn test_disassemble_relative() {
        let (text, width) = disassemble_at(&[109, 1, 204, -1], 2);
        assert_eq!(text, "OUT rb-1");
        assert_eq!(width, 2);

        let (text, _) = disassemble_at(&[21101, 5, 6, 3], 0);
        assert_eq!(text, "ADD 5, 6, rb+3");
    }

    #[test]
    fn test_disassemble_halt() {
        assert_eq!(disassemble_at(&[99], 0), ("HLT".to_string(), 1));
    }

    #[test]
    fn test_data_words() {
        assert_eq!(disassemble_at(&[42], 0), ("DATA 42".to_string(), 1));
        // Immediate write target.
        assert_eq!(disassemble_at(&[11101, 1, 1, 0], 0), ("DATA 11101".to_string(), 1));
    }

    #[test]
    fn test_listing() {
        let listing = disassemble(&[3, 0, 4, 0, 99]);
        assert!(listing.contains("00000: IN [0]"));
        assert!(listing.contains("00002: OUT [0]"));
        assert!(listing.contains("00004: HLT"));
    }
}
