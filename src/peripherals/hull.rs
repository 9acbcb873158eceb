//! Hull painting robot.
//!
//! The robot's brain is an Intcode program. Each turn the robot reports
//! the color of the panel below it, then receives the color to paint that
//! panel with and the direction to turn before moving one panel forward.

use crate::cpu::Cell;
use crate::peripherals::{render_grid, Point};
use crate::pipeline::{Exchange, PipelineError, Session};
use log::debug;
use std::collections::HashMap;

/// Where the robot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heading {
    #[default]
    North,
    East,
    South,
    West,
}

/// A 90 degree turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

/// Panel paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Black,
    White,
}

impl Turn {
    pub fn from_cell(value: Cell) -> Option<Self> {
        match value {
            0 => Some(Turn::Left),
            1 => Some(Turn::Right),
            _ => None,
        }
    }
}

impl Color {
    pub fn from_cell(value: Cell) -> Option<Self> {
        match value {
            0 => Some(Color::Black),
            1 => Some(Color::White),
            _ => None,
        }
    }

    pub fn to_cell(self) -> Cell {
        match self {
            Color::Black => 0,
            Color::White => 1,
        }
    }
}

impl Heading {
    /// The heading after turning.
    pub fn turning(self, turn: Turn) -> Heading {
        match (self, turn) {
            (Heading::North, Turn::Left) | (Heading::South, Turn::Right) => Heading::West,
            (Heading::North, Turn::Right) | (Heading::South, Turn::Left) => Heading::East,
            (Heading::East, Turn::Left) | (Heading::West, Turn::Right) => Heading::North,
            (Heading::East, Turn::Right) | (Heading::West, Turn::Left) => Heading::South,
        }
    }
}

impl Point {
    /// The neighbouring point in the given heading.
    pub fn moving(self, heading: Heading) -> Point {
        match heading {
            Heading::North => Point::new(self.x, self.y - 1),
            Heading::East => Point::new(self.x + 1, self.y),
            Heading::South => Point::new(self.x, self.y + 1),
            Heading::West => Point::new(self.x - 1, self.y),
        }
    }
}

/// The ship's hull: black everywhere until painted.
#[derive(Debug, Clone, Default)]
pub struct Hull {
    panels: HashMap<Point, Color>,
}

impl Hull {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_at(&self, p: Point) -> Color {
        self.panels.get(&p).copied().unwrap_or_default()
    }

    pub fn paint(&mut self, p: Point, color: Color) {
        self.panels.insert(p, color);
    }

    /// Number of panels painted at least once.
    pub fn painted_count(&self) -> usize {
        self.panels.len()
    }

    /// Draw the painted area, `#` for white and space for black.
    pub fn render(&self) -> String {
        render_grid(self.panels.keys(), |p| match self.color_at(p) {
            Color::White => '#',
            Color::Black => ' ',
        })
    }
}

/// The painting robot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Robot {
    pub heading: Heading,
    pub position: Point,
}

impl Robot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `program` as the robot's brain until it halts.
    pub fn paint(&mut self, hull: &mut Hull, program: &[Cell]) -> Result<(), PipelineError> {
        let mut brain = Session::spawn(program);
        loop {
            let seen = hull.color_at(self.position);
            if let Exchange::Halted = brain.offer(seen.to_cell())? {
                break;
            }

            let color = match brain.receive()? {
                Exchange::Value(color) => color,
                Exchange::Halted => break,
            };
            let color = Color::from_cell(color)
                .ok_or_else(|| PipelineError::Protocol(format!("{}: invalid color", color)))?;
            hull.paint(self.position, color);

            // Halting between the paint and the turn leaves the robot in place.
            let turn = match brain.receive()? {
                Exchange::Value(turn) => turn,
                Exchange::Halted => break,
            };
            let turn = Turn::from_cell(turn)
                .ok_or_else(|| PipelineError::Protocol(format!("{}: invalid turn", turn)))?;

            self.heading = self.heading.turning(turn);
            self.position = self.position.moving(self.heading);
        }
        debug!("robot stopped at {:?}, {} panels painted", self.position, hull.painted_count());
        Ok(())
    }
}
