//! Interactive session with a single computer.
//!
//! The computer runs on its own thread behind rendezvous channels, so each
//! value offered or received is a synchronization point with the program.
//! When the program stops, its ports are dropped and the next exchange
//! falls back to the completion channel to tell a clean halt from an error.

use crate::cpu::{Cell, Computer, ExecutionError};
use crate::pipeline::PipelineError;
use log::debug;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;

/// Outcome of one exchange with the computer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange<T> {
    /// The exchange went through.
    Value(T),
    /// The program halted before the exchange could happen.
    Halted,
}

/// A computer running on a background thread.
///
/// Dropping the session hangs up both ports, which aborts the computer at
/// its next Read or Write.
pub struct Session {
    input: Option<SyncSender<Cell>>,
    output: Receiver<Cell>,
    done: Receiver<Result<(), ExecutionError>>,
    status: Option<Result<(), ExecutionError>>,
}

impl Session {
    /// Start running a copy of `program`.
    pub fn spawn(program: &[Cell]) -> Self {
        let (input_tx, input_rx) = mpsc::sync_channel::<Cell>(0);
        let (output_tx, output_rx) = mpsc::sync_channel::<Cell>(0);
        let (done_tx, done_rx) = mpsc::channel();

        let mut computer = Computer::with_program(program);
        thread::spawn(move || {
            let result = computer.execute(input_rx, output_tx);
            debug!("session computer stopped: {:?}", result);
            // The session may already be gone.
            let _ = done_tx.send(result);
        });

        Self {
            input: Some(input_tx),
            output: output_rx,
            done: done_rx,
            status: None,
        }
    }

    /// Hand one value to the next Read instruction.
    pub fn offer(&mut self, value: Cell) -> Result<Exchange<()>, PipelineError> {
        let Some(input) = &self.input else {
            return Err(PipelineError::Protocol("input is closed".to_string()));
        };
        match input.send(value) {
            Ok(()) => Ok(Exchange::Value(())),
            Err(_) => self.finished(),
        }
    }

    /// Take the value of the next Write instruction.
    pub fn receive(&mut self) -> Result<Exchange<Cell>, PipelineError> {
        match self.output.recv() {
            Ok(value) => Ok(Exchange::Value(value)),
            Err(_) => self.finished(),
        }
    }

    /// Take the next `N` written values as one group.
    ///
    /// A halt before the first value is a clean end; a halt in the middle
    /// of a group is a protocol error.
    pub fn receive_group<const N: usize>(&mut self) -> Result<Exchange<[Cell; N]>, PipelineError> {
        let mut group = [0; N];
        for (i, slot) in group.iter_mut().enumerate() {
            match self.receive()? {
                Exchange::Value(value) => *slot = value,
                Exchange::Halted if i == 0 => return Ok(Exchange::Halted),
                Exchange::Halted => {
                    return Err(PipelineError::Protocol(format!(
                        "halted after {} of {} values",
                        i, N
                    )));
                }
            }
        }
        Ok(Exchange::Value(group))
    }

    /// Close the input port; any later Read aborts the computer.
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Report how the computer stopped.
    fn finished<T>(&mut self) -> Result<Exchange<T>, PipelineError> {
        let status = match &self.status {
            Some(status) => status.clone(),
            None => {
                let status = self
                    .done
                    .recv()
                    .map_err(|_| PipelineError::Panicked { index: 0 })?;
                self.status = Some(status.clone());
                status
            }
        };
        status
            .map(|()| Exchange::Halted)
            .map_err(|source| PipelineError::Execution { index: 0, source })
    }
}
