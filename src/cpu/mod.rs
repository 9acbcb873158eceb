//! The Intcode computer.
//!
//! - a growable tape of signed 64-bit cells
//! - an instruction pointer and a relative base register
//! - ten opcodes with Position, Immediate and Relative parameter modes
//! - blocking input and output ports

pub mod memory;
pub mod decode;
pub mod io;
pub mod execute;
pub mod disasm;

pub use memory::{Memory, Cell, AddressError};
pub use decode::{Instruction, Mode, Opcode};
pub use io::{Source, Sink, NoInput};
pub use execute::{Computer, ExecutionError, State};
