//! Intcode execution engine.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::cpu::decode::{self, Instruction, Mode, Opcode};
use crate::cpu::io::{NoInput, Sink, Source};
use crate::cpu::memory::{AddressError, Cell, Memory};
use log::{debug, trace};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Computer execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    /// Ready to execute the next instruction.
    Running,
    /// Executed a Halt instruction.
    Halted,
    /// Stopped on an error.
    Failed,
}

/// The Intcode computer.
#[derive(Clone, Serialize, Deserialize)]
pub struct Computer {
    mem: Memory,
    pc: Cell,
    rbo: Cell,
    state: State,
    cycles: u64,
}

impl Computer {
    /// Create a computer with empty memory.
    pub fn new() -> Self {
        Self::with_memory(Memory::new())
    }

    /// Create a computer whose memory refuses addresses at or beyond `limit`.
    pub fn with_memory_limit(limit: usize) -> Self {
        Self::with_memory(Memory::with_limit(limit))
    }

    /// Create a computer loaded with a copy of `program`.
    pub fn with_program(program: &[Cell]) -> Self {
        let mut computer = Self::new();
        computer.load(program);
        computer
    }

    fn with_memory(mem: Memory) -> Self {
        Self {
            mem,
            pc: 0,
            rbo: 0,
            state: State::Running,
            cycles: 0,
        }
    }

    /// Copy `program` into fresh memory and reset the registers.
    pub fn load(&mut self, program: &[Cell]) {
        self.mem.load(program);
        self.pc = 0;
        self.rbo = 0;
        self.state = State::Running;
        self.cycles = 0;
        debug!("loaded program of {} cells", program.len());
    }

    /// Run until Halt or error.
    pub fn execute<I: Source, O: Sink>(&mut self, mut input: I, mut output: O) -> Result<(), ExecutionError> {
        while self.state == State::Running {
            self.step(&mut input, &mut output)?;
        }
        Ok(())
    }

    /// Run a program that never reads.
    ///
    /// A Read instruction aborts the execution.
    pub fn run<O: Sink>(&mut self, output: O) -> Result<(), ExecutionError> {
        self.execute(NoInput, output)
    }

    /// Run for at most `max_cycles` instructions.
    ///
    /// Returns the number of instructions executed.
    pub fn execute_limited<I: Source, O: Sink>(
        &mut self,
        mut input: I,
        mut output: O,
        max_cycles: u64,
    ) -> Result<u64, ExecutionError> {
        let start_cycles = self.cycles;
        let limit = self.cycles.saturating_add(max_cycles);

        while self.state == State::Running && self.cycles < limit {
            self.step(&mut input, &mut output)?;
        }

        Ok(self.cycles - start_cycles)
    }

    /// Execute a single instruction.
    ///
    /// Returns the opcode that was executed, or an error. Any error leaves
    /// the computer in the `Failed` state.
    pub fn step<I: Source, O: Sink>(&mut self, input: &mut I, output: &mut O) -> Result<Opcode, ExecutionError> {
        if self.state != State::Running {
            return Err(ExecutionError::NotRunning(self.state));
        }

        match self.exec(input, output) {
            Ok(op) => {
                self.cycles += 1;
                if op == Opcode::Halt {
                    self.state = State::Halted;
                    debug!("halted after {} cycles", self.cycles);
                }
                Ok(op)
            }
            Err(e) => {
                self.state = State::Failed;
                debug!("failed at pc={} after {} cycles: {}", self.pc, self.cycles, e);
                Err(e)
            }
        }
    }

    fn exec<I: Source, O: Sink>(&mut self, input: &mut I, output: &mut O) -> Result<Opcode, ExecutionError> {
        let pc = self.pc;
        let instr = decode::decode(self.mem.read(pc)?);
        let op = instr.op().ok_or(ExecutionError::UnsupportedOpcode {
            opcode: instr.opcode,
            pc,
        })?;
        trace!("{:>6}: {:?} rb={}", pc, op, self.rbo);

        match op {
            Opcode::Add => self.binary(&instr, |l, r| l.wrapping_add(r))?,
            Opcode::Mult => self.binary(&instr, |l, r| l.wrapping_mul(r))?,
            Opcode::LessThan => self.binary(&instr, |l, r| Cell::from(l < r))?,
            Opcode::Equals => self.binary(&instr, |l, r| Cell::from(l == r))?,

            Opcode::JumpIfTrue => self.jump(&instr, |c| c != 0)?,
            Opcode::JumpIfFalse => self.jump(&instr, |c| c == 0)?,

            Opcode::Read => {
                let value = input.read().ok_or(ExecutionError::Aborted)?;
                self.store(&instr, 1, value)?;
                self.pc += 2;
            }

            Opcode::Write => {
                let value = self.load_param(&instr, 1)?;
                if !output.write(value) {
                    return Err(ExecutionError::Aborted);
                }
                self.pc += 2;
            }

            Opcode::RelativeBaseOffset => {
                let offset = self.load_param(&instr, 1)?;
                self.rbo = self.rbo.wrapping_add(offset);
                self.pc += 2;
            }

            Opcode::Halt => {}
        }

        Ok(op)
    }

    /// `[3] := f([1], [2])`
    fn binary(&mut self, instr: &Instruction, f: impl FnOnce(Cell, Cell) -> Cell) -> Result<(), ExecutionError> {
        let lhs = self.load_param(instr, 1)?;
        let rhs = self.load_param(instr, 2)?;
        self.store(instr, 3, f(lhs, rhs))?;
        self.pc += 4;
        Ok(())
    }

    /// `if cond([1]) { pc := [2] }`
    fn jump(&mut self, instr: &Instruction, cond: impl FnOnce(Cell) -> bool) -> Result<(), ExecutionError> {
        let value = self.load_param(instr, 1)?;
        let target = self.load_param(instr, 2)?;
        if cond(value) {
            self.pc = target;
        } else {
            self.pc += 3;
        }
        Ok(())
    }

    /// Load parameter `k` honoring its mode.
    fn load_param(&mut self, instr: &Instruction, k: usize) -> Result<Cell, ExecutionError> {
        let param = self.mem.read(self.pc + k as Cell)?;
        match self.mode(instr, k)? {
            Mode::Position => Ok(self.mem.read(param)?),
            Mode::Immediate => Ok(param),
            Mode::Relative => Ok(self.mem.read(self.relative(param)?)?),
        }
    }

    /// Store `value` at parameter `k` honoring its mode.
    fn store(&mut self, instr: &Instruction, k: usize, value: Cell) -> Result<(), ExecutionError> {
        let param = self.mem.read(self.pc + k as Cell)?;
        let addr = match self.mode(instr, k)? {
            Mode::Position => param,
            Mode::Relative => self.relative(param)?,
            // Write targets are never immediate.
            Mode::Immediate => {
                return Err(ExecutionError::InvalidMode {
                    mode: instr.mode_digit(k),
                    param: k,
                    pc: self.pc,
                });
            }
        };
        self.mem.write(addr, value)?;
        Ok(())
    }

    fn mode(&self, instr: &Instruction, k: usize) -> Result<Mode, ExecutionError> {
        instr.mode(k).ok_or(ExecutionError::InvalidMode {
            mode: instr.mode_digit(k),
            param: k,
            pc: self.pc,
        })
    }

    fn relative(&self, offset: Cell) -> Result<Cell, AddressError> {
        self.rbo
            .checked_add(offset)
            .ok_or(AddressError(self.rbo.saturating_add(offset)))
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    /// Address of the next instruction.
    pub fn pc(&self) -> Cell {
        self.pc
    }

    pub fn relative_base(&self) -> Cell {
        self.rbo
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Instructions executed since the last load.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn is_halted(&self) -> bool {
        self.state == State::Halted
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }
}

impl Default for Computer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Computer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computer")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("pc", &self.pc)
            .field("rbo", &self.rbo)
            .field("mem", &self.mem)
            .finish()
    }
}

/// Errors that can occur during execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("invalid mode {mode} for parameter {param} at pc {pc}")]
    InvalidMode { mode: Cell, param: usize, pc: Cell },

    #[error("unsupported opcode {opcode} at pc {pc}")]
    UnsupportedOpcode { opcode: Cell, pc: Cell },

    #[error("execution aborted")]
    Aborted,

    #[error("computer not running: {0:?}")]
    NotRunning(State),
}
