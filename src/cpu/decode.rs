//! Instruction decoder for Intcode.
//!
//! An instruction word packs the opcode in its two low decimal digits and
//! one parameter mode per following digit:
//!
//! ```text
//!   ABCDE
//!    1002
//!   DE - two-digit opcode
//!    C - mode of 1st parameter
//!    B - mode of 2nd parameter
//!    A - mode of 3rd parameter
//! ```

use crate::cpu::memory::Cell;
use serde::{Serialize, Deserialize};

/// Parameter mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// The parameter is an address to dereference.
    Position,
    /// The parameter is used literally.
    Immediate,
    /// The parameter is an offset from the relative base.
    Relative,
}

impl Mode {
    /// Map a mode digit to a mode.
    pub fn from_digit(digit: Cell) -> Option<Self> {
        match digit {
            0 => Some(Mode::Position),
            1 => Some(Mode::Immediate),
            2 => Some(Mode::Relative),
            _ => None,
        }
    }

    pub fn to_digit(self) -> Cell {
        match self {
            Mode::Position => 0,
            Mode::Immediate => 1,
            Mode::Relative => 2,
        }
    }
}

/// Recognized operation codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    /// `[3] := [1] + [2]`
    Add,
    /// `[3] := [1] * [2]`
    Mult,
    /// `[1] := input`
    Read,
    /// `output := [1]`
    Write,
    /// `if [1] != 0 { pc := [2] }`
    JumpIfTrue,
    /// `if [1] == 0 { pc := [2] }`
    JumpIfFalse,
    /// `[3] := [1] < [2]`
    LessThan,
    /// `[3] := [1] == [2]`
    Equals,
    /// `rb += [1]`
    RelativeBaseOffset,
    Halt,
}

impl Opcode {
    pub fn from_cell(value: Cell) -> Option<Self> {
        let op = match value {
            1 => Opcode::Add,
            2 => Opcode::Mult,
            3 => Opcode::Read,
            4 => Opcode::Write,
            5 => Opcode::JumpIfTrue,
            6 => Opcode::JumpIfFalse,
            7 => Opcode::LessThan,
            8 => Opcode::Equals,
            9 => Opcode::RelativeBaseOffset,
            99 => Opcode::Halt,
            _ => return None,
        };
        Some(op)
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Opcode::Add => 1,
            Opcode::Mult => 2,
            Opcode::Read => 3,
            Opcode::Write => 4,
            Opcode::JumpIfTrue => 5,
            Opcode::JumpIfFalse => 6,
            Opcode::LessThan => 7,
            Opcode::Equals => 8,
            Opcode::RelativeBaseOffset => 9,
            Opcode::Halt => 99,
        }
    }

    /// Number of parameters following the opcode word.
    pub fn params(self) -> usize {
        match self {
            Opcode::Add | Opcode::Mult | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Read | Opcode::Write | Opcode::RelativeBaseOffset => 1,
            Opcode::Halt => 0,
        }
    }

    /// Instruction width in cells, opcode word included.
    pub fn width(self) -> usize {
        self.params() + 1
    }

    /// Whether parameter `k` (1-based) is a write target.
    pub fn writes(self, k: usize) -> bool {
        match self {
            Opcode::Add | Opcode::Mult | Opcode::LessThan | Opcode::Equals => k == 3,
            Opcode::Read => k == 1,
            _ => false,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Mult => "MUL",
            Opcode::Read => "IN",
            Opcode::Write => "OUT",
            Opcode::JumpIfTrue => "JNZ",
            Opcode::JumpIfFalse => "JZ",
            Opcode::LessThan => "LT",
            Opcode::Equals => "EQ",
            Opcode::RelativeBaseOffset => "ARB",
            Opcode::Halt => "HLT",
        }
    }
}

/// A decoded instruction word.
///
/// Nothing is validated here: the opcode may be unknown and the mode digits
/// may be out of range. The interpreter checks what it actually uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// Raw opcode (`word % 100`).
    pub opcode: Cell,
    modes: [Cell; 3],
}

impl Instruction {
    /// Raw mode digit of parameter `k` (1-based).
    pub fn mode_digit(&self, k: usize) -> Cell {
        self.modes[k - 1]
    }

    /// Mode of parameter `k` (1-based), if the digit is valid.
    pub fn mode(&self, k: usize) -> Option<Mode> {
        Mode::from_digit(self.mode_digit(k))
    }

    /// The recognized opcode, if any.
    pub fn op(&self) -> Option<Opcode> {
        Opcode::from_cell(self.opcode)
    }
}

/// Split an instruction word into opcode and parameter modes.
pub fn decode(word: Cell) -> Instruction {
    Instruction {
        opcode: word % 100,
        modes: [word / 100 % 10, word / 1000 % 10, word / 10000 % 10],
    }
}

/// Build an instruction word. Inverse of [`decode`] for valid instructions.
pub fn encode(opcode: Opcode, modes: [Mode; 3]) -> Cell {
    opcode.to_cell()
        + modes[0].to_digit() * 100
        + modes[1].to_digit() * 1000
        + modes[2].to_digit() * 10000
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_mixed_modes() {
        let instr = decode(1002);
        assert_eq!(instr.op(), Some(Opcode::Mult));
        assert_eq!(instr.mode(1), Some(Mode::Position));
        assert_eq!(instr.mode(2), Some(Mode::Immediate));
        assert_eq!(instr.mode(3), Some(Mode::Position));
    }

    #[test]
    fn test_decode_relative_write() {
        let instr = decode(21101);
        assert_eq!(instr.op(), Some(Opcode::Add));
        assert_eq!(instr.mode(1), Some(Mode::Immediate));
        assert_eq!(instr.mode(2), Some(Mode::Immediate));
        assert_eq!(instr.mode(3), Some(Mode::Relative));
    }

    #[test]
    fn test_decode_halt() {
        let instr = decode(99);
        assert_eq!(instr.op(), Some(Opcode::Halt));
        assert_eq!(Opcode::Halt.width(), 1);
    }

    #[test]
    fn test_decode_keeps_unknown_values() {
        let instr = decode(312);
        assert_eq!(instr.opcode, 12);
        assert_eq!(instr.op(), None);
        assert_eq!(instr.mode_digit(1), 3);
        assert_eq!(instr.mode(1), None);
    }

    #[test]
    fn test_decode_negative_word() {
        // Truncating division keeps the sign on the opcode.
        let instr = decode(-1);
        assert_eq!(instr.opcode, -1);
        assert_eq!(instr.op(), None);
    }

    #[test]
    fn test_widths() {
        assert_eq!(Opcode::Add.width(), 4);
        assert_eq!(Opcode::JumpIfFalse.width(), 3);
        assert_eq!(Opcode::Read.width(), 2);
        assert!(Opcode::Read.writes(1));
        assert!(!Opcode::Write.writes(1));
    }

    proptest! {
        #[test]
        fn prop_decode_digits(word in 0i64..100_000) {
            let instr = decode(word);
            prop_assert_eq!(instr.opcode, word % 100);
            prop_assert_eq!(instr.mode_digit(1), (word / 100) % 10);
            prop_assert_eq!(instr.mode_digit(2), (word / 1000) % 10);
            prop_assert_eq!(instr.mode_digit(3), (word / 10000) % 10);
        }
    }
}
