//! Amplifier chains.
//!
//! Every amplifier runs its own copy of the same program. It first reads
//! its phase setting, then the signal coming from the previous amplifier,
//! and writes the amplified signal to the next one. In a feedback loop the
//! last amplifier feeds the first, and the signal circulates until every
//! amplifier halts.

use crate::cpu::{Cell, Computer, ExecutionError};
use crate::pipeline::PipelineError;
use log::{debug, warn};
use rayon::prelude::*;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

/// How the amplifiers are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wiring {
    /// Each amplifier runs once, feeding the next; see [`series`].
    Series,
    /// The last amplifier feeds the first; see [`feedback_loop`].
    #[default]
    Feedback,
}

impl Wiring {
    /// Run the chain with the phases in the given order.
    pub fn run(self, program: &[Cell], phases: &[Cell]) -> Result<Cell, PipelineError> {
        match self {
            Wiring::Series => series(program, phases),
            Wiring::Feedback => feedback_loop(program, phases),
        }
    }
}

/// Run the amplifiers one after the other, each on a single signal.
pub fn series(program: &[Cell], phases: &[Cell]) -> Result<Cell, PipelineError> {
    if phases.is_empty() {
        return Err(PipelineError::Empty);
    }

    let mut signal = 0;
    for (index, &phase) in phases.iter().enumerate() {
        let mut amp = Computer::with_program(program);
        let mut output = Vec::new();
        amp.execute(&[phase, signal][..], &mut output)
            .map_err(|source| PipelineError::Execution { index, source })?;
        signal = output.last().copied().ok_or(PipelineError::NoSignal)?;
    }
    Ok(signal)
}

/// Run the amplifiers concurrently, wired in a ring.
///
/// Channel `i` is amplifier `i`'s input and amplifier `i - 1`'s output. It
/// starts with phase `i`; channel 0 also gets the initial signal 0. Once
/// every amplifier has halted, the result is the last value left on
/// channel 0.
///
/// A failing amplifier drops its channels, which aborts its neighbours in
/// turn, so one failure stops the whole ring. The first genuine failure is
/// reported in preference to the aborts it caused.
pub fn feedback_loop(program: &[Cell], phases: &[Cell]) -> Result<Cell, PipelineError> {
    let n = phases.len();
    if n == 0 {
        return Err(PipelineError::Empty);
    }

    let (mut outputs, inputs): (Vec<Sender<Cell>>, Vec<Receiver<Cell>>) =
        (0..n).map(|_| mpsc::channel()).unzip();
    for (i, (tx, &phase)) in outputs.iter().zip(phases).enumerate() {
        // The receivers are alive, so these sends cannot fail.
        let _ = tx.send(phase);
        if i == 0 {
            let _ = tx.send(0);
        }
    }
    // Amplifier i writes into channel i + 1.
    outputs.rotate_left(1);
    debug!("starting feedback loop of {} amplifiers, phases {:?}", n, phases);

    let outcomes: Vec<thread::Result<(Result<(), ExecutionError>, Receiver<Cell>)>> =
        thread::scope(|s| {
            let handles: Vec<_> = inputs
                .into_iter()
                .zip(outputs)
                .map(|(mut input, output)| {
                    s.spawn(move || {
                        let mut amp = Computer::with_program(program);
                        let result = amp.execute(&mut input, output);
                        // Hand the input back so the last signal outlives the thread.
                        (result, input)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join()).collect()
        });

    let mut failure: Option<PipelineError> = None;
    let mut first_input = None;
    for (index, outcome) in outcomes.into_iter().enumerate() {
        let (result, input) = outcome.map_err(|_| PipelineError::Panicked { index })?;
        if let Err(source) = result {
            let err = PipelineError::Execution { index, source };
            if err.is_aborted() {
                debug!("amplifier {} aborted", index);
            } else {
                warn!("amplifier {} failed: {}", index, err);
            }
            failure = match failure {
                Some(prev) if !(prev.is_aborted() && !err.is_aborted()) => Some(prev),
                _ => Some(err),
            };
        }
        if index == 0 {
            first_input = Some(input);
        }
    }

    if let Some(err) = failure {
        return Err(err);
    }
    first_input
        .and_then(|input| input.try_iter().last())
        .ok_or(PipelineError::NoSignal)
}

/// Try every ordering of `phases` and return the strongest signal.
pub fn highest_signal(
    program: &[Cell],
    phases: &[Cell],
    wiring: Wiring,
) -> Result<Cell, PipelineError> {
    if phases.is_empty() {
        return Err(PipelineError::Empty);
    }

    let signals = permutations(phases)
        .par_iter()
        .map(|sequence| wiring.run(program, sequence))
        .collect::<Result<Vec<_>, _>>()?;
    signals.into_iter().max().ok_or(PipelineError::NoSignal)
}

/// All orderings of `set`, generated with Heap's algorithm.
pub fn permutations(set: &[Cell]) -> Vec<Vec<Cell>> {
    fn generate(k: usize, xs: &mut [Cell], all: &mut Vec<Vec<Cell>>) {
        if k <= 1 {
            all.push(xs.to_vec());
            return;
        }
        generate(k - 1, xs, all);
        for i in 0..k - 1 {
            if k % 2 == 0 {
                xs.swap(i, k - 1);
            } else {
                xs.swap(0, k - 1);
            }
            generate(k - 1, xs, all);
        }
    }

    let mut xs = set.to_vec();
    let mut all = Vec::new();
    generate(xs.len(), &mut xs, &mut all);
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SERIES: [(&[Cell], [Cell; 5], Cell); 3] = [
        (
            &[3, 15, 3, 16, 1002, 16, 10, 16, 1, 16, 15, 15, 4, 15, 99, 0, 0],
            [4, 3, 2, 1, 0],
            43210,
        ),
        (
            &[
                3, 23, 3, 24, 1002, 24, 10, 24, 1002, 23, -1, 23, 101, 5, 23, 23, 1, 24, 23, 23, 4,
                23, 99, 0, 0,
            ],
            [0, 1, 2, 3, 4],
            54321,
        ),
        (
            &[
                3, 31, 3, 32, 1002, 32, 10, 32, 1001, 31, -2, 31, 1007, 31, 0, 33, 1002, 33, 7, 33,
                1, 33, 31, 31, 1, 32, 31, 31, 4, 31, 99, 0, 0, 0,
            ],
            [1, 0, 4, 3, 2],
            65210,
        ),
    ];

    const FEEDBACK: [(&[Cell], [Cell; 5], Cell); 2] = [
        (
            &[
                3, 26, 1001, 26, -4, 26, 3, 27, 1002, 27, 2, 27, 1, 27, 26, 27, 4, 27, 1001, 28,
                -1, 28, 1005, 28, 6, 99, 0, 0, 5,
            ],
            [9, 8, 7, 6, 5],
            139629729,
        ),
        (
            &[
                3, 52, 1001, 52, -5, 52, 3, 53, 1, 52, 56, 54, 1007, 54, 5, 55, 1005, 55, 26, 1001,
                54, -5, 54, 1105, 1, 12, 1, 53, 54, 53, 1008, 54, 0, 55, 1001, 55, 1, 55, 2, 53,
                55, 53, 4, 53, 1001, 56, -1, 56, 1005, 56, 6, 99, 0, 0, 0, 0, 10,
            ],
            [9, 7, 8, 5, 6],
            18216,
        ),
    ];

    #[test]
    fn test_series() {
        for (program, phases, expected) in SERIES {
            assert_eq!(series(program, &phases), Ok(expected));
            // A ring behaves like a series when every amplifier halts after one signal.
            assert_eq!(feedback_loop(program, &phases), Ok(expected));
        }
    }

    #[test]
    fn test_feedback_loop() {
        for (program, phases, expected) in FEEDBACK {
            assert_eq!(feedback_loop(program, &phases), Ok(expected));
        }
    }

    #[test]
    fn test_highest_signal() {
        for (program, _, expected) in SERIES {
            assert_eq!(highest_signal(program, &[0, 1, 2, 3, 4], Wiring::Series), Ok(expected));
            assert_eq!(highest_signal(program, &[0, 1, 2, 3, 4], Wiring::Feedback), Ok(expected));
        }
        for (program, _, expected) in FEEDBACK {
            assert_eq!(highest_signal(program, &[5, 6, 7, 8, 9], Wiring::Feedback), Ok(expected));
        }
        assert_eq!(highest_signal(&[99], &[], Wiring::Series), Err(PipelineError::Empty));
    }

    #[test]
    fn test_failure_is_reported_over_aborts() {
        // Phase 0 jumps to an invalid opcode; otherwise forward one signal.
        let program = [3, 11, 1006, 11, 10, 3, 12, 4, 12, 99, 42, 0, 0];
        let err = feedback_loop(&program, &[1, 2, 0, 3]).unwrap_err();
        assert_eq!(
            err,
            PipelineError::Execution {
                index: 2,
                source: ExecutionError::UnsupportedOpcode { opcode: 42, pc: 10 },
            }
        );
    }

    #[test]
    fn test_no_signal() {
        assert_eq!(feedback_loop(&[3, 0, 3, 0, 99], &[5]), Err(PipelineError::NoSignal));
        assert_eq!(feedback_loop(&[99], &[]), Err(PipelineError::Empty));
    }

    #[test]
    fn test_permutations() {
        let all = permutations(&[1, 2, 3]);
        assert_eq!(all.len(), 6);
        let unique: HashSet<Vec<Cell>> = all.into_iter().collect();
        assert_eq!(unique.len(), 6);
        assert_eq!(permutations(&[5, 6, 7, 8, 9]).len(), 120);
    }
}
