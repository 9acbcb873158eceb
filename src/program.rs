//! Intcode program text format.
//!
//! A program is a list of decimal integers separated by commas and/or
//! newlines. The last value does not need a trailing separator.

use crate::cpu::Cell;
use std::path::Path;
use thiserror::Error;

/// Parse program text into cells.
///
/// Whitespace around values is ignored, and so are empty tokens, which
/// makes trailing separators harmless.
pub fn parse(source: &str) -> Result<Vec<Cell>, ProgramError> {
    source
        .split(|c: char| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| {
            token.parse::<Cell>().map_err(|e| ProgramError::Parse {
                index,
                token: token.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Load a program file from disk.
pub fn load_program<P: AsRef<Path>>(path: P) -> Result<Vec<Cell>, ProgramError> {
    let source = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ProgramError::IoError(e.to_string()))?;
    let program = parse(&source)?;
    if program.is_empty() {
        return Err(ProgramError::Empty);
    }
    Ok(program)
}

/// Errors that can occur while reading a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("parse error on value {index} ({token:?}): {message}")]
    Parse { index: usize, token: String, message: String },

    #[error("program is empty")]
    Empty,
}
