//! Input and output ports of the Computer.
//!
//! A [`Source`] feeds Read instructions and a [`Sink`] takes Write values.
//! Channel halves from `std::sync::mpsc` implement both, so computers can
//! be chained by handing one's output sender to the next one's receiver.

use crate::cpu::memory::Cell;
use std::collections::VecDeque;
use std::sync::mpsc::{Receiver, Sender, SyncSender};

/// Where Read instructions take their values from.
pub trait Source {
    /// Block until a value is available.
    ///
    /// Returns `None` once the source is closed or exhausted.
    fn read(&mut self) -> Option<Cell>;
}

/// Where Write instructions put their values.
pub trait Sink {
    /// Push a value, blocking if the sink is bounded and full.
    ///
    /// Returns `false` if the consumer hung up.
    fn write(&mut self, value: Cell) -> bool;
}

/// A source that is closed from the start.
///
/// For programs that never read; any Read aborts the execution.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl Source for NoInput {
    fn read(&mut self) -> Option<Cell> {
        None
    }
}

impl Source for Receiver<Cell> {
    fn read(&mut self) -> Option<Cell> {
        self.recv().ok()
    }
}

impl Source for VecDeque<Cell> {
    fn read(&mut self) -> Option<Cell> {
        self.pop_front()
    }
}

impl Source for &[Cell] {
    fn read(&mut self) -> Option<Cell> {
        let (&first, rest) = self.split_first()?;
        *self = rest;
        Some(first)
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn read(&mut self) -> Option<Cell> {
        (**self).read()
    }
}

impl Sink for Sender<Cell> {
    fn write(&mut self, value: Cell) -> bool {
        self.send(value).is_ok()
    }
}

impl Sink for SyncSender<Cell> {
    fn write(&mut self, value: Cell) -> bool {
        self.send(value).is_ok()
    }
}

impl Sink for Vec<Cell> {
    fn write(&mut self, value: Cell) -> bool {
        self.push(value);
        true
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write(&mut self, value: Cell) -> bool {
        (**self).write(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_slice_source() {
        let values = [1, 2];
        let mut src: &[Cell] = &values;
        assert_eq!(src.read(), Some(1));
        assert_eq!(src.read(), Some(2));
        assert_eq!(src.read(), None);
    }

    #[test]
    fn test_closed_channel() {
        let (tx, mut rx) = mpsc::channel::<Cell>();
        tx.send(5).unwrap();
        drop(tx);
        assert_eq!(rx.read(), Some(5));
        assert_eq!(rx.read(), None);
    }

    #[test]
    fn test_hung_up_sink() {
        let (mut tx, rx) = mpsc::channel::<Cell>();
        assert!(tx.write(1));
        drop(rx);
        assert!(!tx.write(2));
    }
}
