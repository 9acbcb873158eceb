//! Intcode memory subsystem.
//!
//! Program and data share one flat address space of signed 64-bit cells.
//! The tape grows on demand in power-of-two steps and never shrinks.

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// A single memory cell.
pub type Cell = i64;

/// Default cell limit for a fresh memory (16M cells, 128 MiB).
pub const DEFAULT_LIMIT: usize = 1 << 24;

/// Intcode memory: a growable, zero-filled tape of cells.
#[derive(Clone, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<Cell>,
    limit: usize,
}

impl Memory {
    /// Create an empty memory with the default cell limit.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    /// Create an empty memory that refuses addresses at or beyond `limit`.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            cells: Vec::new(),
            limit,
        }
    }

    /// Create a memory holding a copy of `program`.
    pub fn from_program(program: &[Cell]) -> Self {
        let mut mem = Self::new();
        mem.load(program);
        mem
    }

    /// Replace the whole tape with a copy of `program`.
    ///
    /// A program longer than the limit is kept whole: every loaded cell stays
    /// addressable, but the tape never grows past them.
    pub fn load(&mut self, program: &[Cell]) {
        self.cells.clear();
        self.cells.extend_from_slice(program);
    }

    /// Read the cell at `addr`, growing the tape if needed.
    #[inline]
    pub fn read(&mut self, addr: Cell) -> Result<Cell, AddressError> {
        let index = self.index(addr)?;
        self.expand(index);
        Ok(self.cells[index])
    }

    /// Write `value` at `addr`, growing the tape if needed.
    #[inline]
    pub fn write(&mut self, addr: Cell, value: Cell) -> Result<(), AddressError> {
        let index = self.index(addr)?;
        self.expand(index);
        self.cells[index] = value;
        Ok(())
    }

    /// Inspect a cell without growing the tape.
    /// Cells past the end read as zero.
    pub fn get(&self, index: usize) -> Cell {
        self.cells.get(index).copied().unwrap_or(0)
    }

    /// The physically allocated cells.
    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of physically allocated cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Addresses at or beyond this value are rejected.
    pub fn limit(&self) -> usize {
        self.limit
    }

    fn index(&self, addr: Cell) -> Result<usize, AddressError> {
        match usize::try_from(addr) {
            Ok(index) if index < self.limit.max(self.cells.len()) => Ok(index),
            _ => Err(AddressError(addr)),
        }
    }

    /// Make sure `index` is backed by storage.
    fn expand(&mut self, index: usize) {
        if index >= self.cells.len() {
            let size = (index + 1).next_power_of_two().min(self.limit);
            self.cells.resize(size, 0);
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.iter().filter(|&&c| c != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &self.cells.len())
            .finish()
    }
}

/// A negative (or out of limit) memory address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid memory address {0}")]
pub struct AddressError(pub Cell);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::from_program(&[1, 2, 3]);
        mem.write(1, 42).unwrap();
        assert_eq!(mem.read(1).unwrap(), 42);
        assert_eq!(mem.as_slice(), &[1, 42, 3]);
    }

    #[test]
    fn test_memory_grows_in_powers_of_two() {
        let mut mem = Memory::from_program(&[7; 5]);
        assert_eq!(mem.read(5).unwrap(), 0);
        assert_eq!(mem.len(), 8);

        mem.write(1000, -3).unwrap();
        assert_eq!(mem.len(), 1024);
        assert_eq!(mem.read(1000).unwrap(), -3);
        assert_eq!(&mem.as_slice()[..5], &[7; 5]);
        assert!(mem.as_slice()[5..1000].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_negative_address() {
        let mut mem = Memory::from_program(&[1, 2, 3]);
        assert_eq!(mem.read(-1), Err(AddressError(-1)));
        assert_eq!(mem.write(-7, 1), Err(AddressError(-7)));
        // Errors never grow the tape.
        assert_eq!(mem.len(), 3);
    }

    #[test]
    fn test_limit() {
        let mut mem = Memory::with_limit(100);
        assert!(mem.write(99, 1).is_ok());
        assert_eq!(mem.len(), 100);
        assert_eq!(mem.read(100), Err(AddressError(100)));
        assert_eq!(mem.read(Cell::MAX), Err(AddressError(Cell::MAX)));
    }

    #[test]
    fn test_program_longer_than_limit() {
        let mut mem = Memory::with_limit(4);
        mem.load(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(mem.read(5), Ok(6));
        mem.write(4, -5).unwrap();
        assert_eq!(mem.read(4), Ok(-5));
        assert_eq!(mem.read(6), Err(AddressError(6)));
        assert_eq!(mem.len(), 6);
    }

    #[test]
    fn test_load_replaces_contents() {
        let mut mem = Memory::new();
        mem.write(50, 9).unwrap();
        mem.load(&[4, 5]);
        assert_eq!(mem.as_slice(), &[4, 5]);
        assert_eq!(mem.get(50), 0);
    }

    proptest! {
        #[test]
        fn prop_writes_survive_growth(
            writes in prop::collection::vec((0i64..5000, any::<i64>()), 1..50)
        ) {
            let mut mem = Memory::new();
            let mut expected = std::collections::HashMap::new();
            for &(addr, value) in &writes {
                mem.write(addr, value).unwrap();
                expected.insert(addr, value);
            }
            for (&addr, &value) in &expected {
                prop_assert_eq!(mem.read(addr).unwrap(), value);
            }
        }

        #[test]
        fn prop_negative_addresses_fail(addr in i64::MIN..0) {
            let mut mem = Memory::new();
            prop_assert_eq!(mem.read(addr), Err(AddressError(addr)));
            prop_assert!(mem.is_empty());
        }
    }
}
