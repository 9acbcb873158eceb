//! # Intcode
//!
//! A virtual machine for Intcode, a small integer instruction set where
//! code and data share one memory of signed 64-bit cells.
//!
//! Computers talk to the outside world through [`Source`] and [`Sink`]
//! ports. The same computer can run against a slice of inputs, a channel
//! fed by another computer, or an interactive [`Session`].

pub mod cpu;
pub mod program;
pub mod pipeline;
pub mod peripherals;

// Re-export commonly used types
pub use cpu::{Cell, Computer, ExecutionError, Memory, NoInput, Sink, Source, State};
pub use program::{load_program, parse, ProgramError};
pub use pipeline::{feedback_loop, highest_signal, series, sweep, PipelineError, Session, Wiring};
pub use cpu::disasm::disassemble;
