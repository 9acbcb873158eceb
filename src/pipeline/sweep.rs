//! Parameter sweep.
//!
//! Each (noun, verb) pair runs on its own copy of the program with the
//! noun at address 1 and the verb at address 2; the result is whatever is
//! left at address 0 once the program halts. Pairs whose run fails are
//! dropped from the results.

use crate::cpu::{Cell, Computer, ExecutionError, NoInput};
use log::trace;
use rayon::prelude::*;
use std::ops::Range;

/// Address of the sweep result.
pub const OUTPUT: usize = 0;
/// Address of the noun.
pub const NOUN: usize = 1;
/// Address of the verb.
pub const VERB: usize = 2;

/// A (noun, verb) pair that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepHit {
    pub noun: Cell,
    pub verb: Cell,
    pub output: Cell,
}

impl SweepHit {
    /// `100 * noun + verb`
    pub fn code(&self) -> Cell {
        100 * self.noun + self.verb
    }
}

/// Run `program` with the given noun and verb, returning address 0.
pub fn run_noun_verb(program: &[Cell], noun: Cell, verb: Cell) -> Result<Cell, ExecutionError> {
    let mut seeded = program.to_vec();
    if seeded.len() <= VERB {
        seeded.resize(VERB + 1, 0);
    }
    seeded[NOUN] = noun;
    seeded[VERB] = verb;

    let mut computer = Computer::with_program(&seeded);
    computer.execute(NoInput, Vec::<Cell>::new())?;
    Ok(computer.memory().get(OUTPUT))
}

fn run_pair(program: &[Cell], noun: Cell, verb: Cell) -> Option<SweepHit> {
    match run_noun_verb(program, noun, verb) {
        Ok(output) => Some(SweepHit { noun, verb, output }),
        Err(e) => {
            trace!("noun={} verb={} discarded: {}", noun, verb, e);
            None
        }
    }
}

fn pairs(nouns: Range<Cell>, verbs: Range<Cell>) -> Vec<(Cell, Cell)> {
    nouns
        .flat_map(|noun| verbs.clone().map(move |verb| (noun, verb)))
        .collect()
}

/// Run every pair in parallel.
///
/// Results come back in noun-major order; failed runs are left out.
pub fn sweep(program: &[Cell], nouns: Range<Cell>, verbs: Range<Cell>) -> Vec<SweepHit> {
    pairs(nouns, verbs)
        .into_par_iter()
        .filter_map(|(noun, verb)| run_pair(program, noun, verb))
        .collect()
}

/// Find the first pair, in noun-major order, whose result is `target`.
pub fn find_noun_verb(
    program: &[Cell],
    target: Cell,
    nouns: Range<Cell>,
    verbs: Range<Cell>,
) -> Option<SweepHit> {
    pairs(nouns, verbs)
        .into_par_iter()
        .find_map_first(|(noun, verb)| {
            run_pair(program, noun, verb).filter(|hit| hit.output == target)
        })
}
