//! Arcade cabinet screen.
//!
//! The game writes `(x, y, tile)` triples. The special position `(-1, 0)`
//! carries the score instead of a tile.

use crate::cpu::Cell;
use crate::peripherals::{render_grid, Point};
use crate::pipeline::{Exchange, PipelineError, Session};
use log::debug;
use std::collections::HashMap;

/// What can be drawn on a screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tile {
    #[default]
    Empty,
    Wall,
    Block,
    Paddle,
    Ball,
}

impl Tile {
    pub fn from_cell(value: Cell) -> Option<Self> {
        match value {
            0 => Some(Tile::Empty),
            1 => Some(Tile::Wall),
            2 => Some(Tile::Block),
            3 => Some(Tile::Paddle),
            4 => Some(Tile::Ball),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Tile::Empty => ' ',
            Tile::Wall => '|',
            Tile::Block => '#',
            Tile::Paddle => '_',
            Tile::Ball => 'o',
        }
    }
}

/// Sparse screen contents.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    tiles: HashMap<Point, Tile>,
    pub score: Cell,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile_at(&self, p: Point) -> Tile {
        self.tiles.get(&p).copied().unwrap_or_default()
    }

    /// Number of positions currently showing `tile`.
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.values().filter(|&&t| t == tile).count()
    }

    /// Apply one output triple.
    pub fn apply(&mut self, [x, y, value]: [Cell; 3]) -> Result<(), PipelineError> {
        match (x, y) {
            (-1, 0) => self.score = value,
            _ if x < 0 || y < 0 => {
                return Err(PipelineError::Protocol(format!(
                    "({}, {}): position off screen",
                    x, y
                )));
            }
            _ => {
                let tile = Tile::from_cell(value)
                    .ok_or_else(|| PipelineError::Protocol(format!("{}: unknown tile", value)))?;
                self.tiles.insert(Point::new(x, y), tile);
            }
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        render_grid(self.tiles.keys(), |p| self.tile_at(p).glyph())
    }
}

/// Run the game with no joystick input and collect the screen it draws.
pub fn draw(program: &[Cell]) -> Result<Screen, PipelineError> {
    let mut game = Session::spawn(program);
    game.close_input();

    let mut screen = Screen::new();
    while let Exchange::Value(triple) = game.receive_group::<3>()? {
        screen.apply(triple)?;
    }
    debug!("screen drawn: {} tiles, score {}", screen.tiles.len(), screen.score);
    Ok(screen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(values: &[Cell]) -> Vec<Cell> {
        let mut program: Vec<Cell> = values.iter().flat_map(|&v| [104, v]).collect();
        program.push(99);
        program
    }

    #[test]
    fn test_draw() {
        let screen = draw(&output(&[1, 2, 3, 6, 5, 4])).unwrap();
        assert_eq!(screen.tile_at(Point::new(1, 2)), Tile::Paddle);
        assert_eq!(screen.tile_at(Point::new(6, 5)), Tile::Ball);
        assert_eq!(screen.tile_at(Point::new(0, 0)), Tile::Empty);
        assert_eq!(screen.count(Tile::Paddle), 1);
        assert_eq!(screen.count(Tile::Block), 0);
    }

    #[test]
    fn test_score_and_overdraw() {
        let screen = draw(&output(&[0, 0, 2, 1, 0, 2, -1, 0, 12345, 0, 0, 0])).unwrap();
        assert_eq!(screen.score, 12345);
        assert_eq!(screen.count(Tile::Block), 1);
        assert_eq!(screen.count(Tile::Empty), 1);
        assert_eq!(screen.render(), " #\n");
    }

    #[test]
    fn test_protocol_errors() {
        let err = draw(&output(&[0, 0, 9])).unwrap_err();
        assert_eq!(err, PipelineError::Protocol("9: unknown tile".to_string()));

        let err = draw(&output(&[-2, 0, 1])).unwrap_err();
        assert!(matches!(err, PipelineError::Protocol(_)));

        let err = draw(&output(&[0, 0])).unwrap_err();
        assert!(matches!(err, PipelineError::Protocol(_)));
    }

    #[test]
    fn test_joystick_read_aborts() {
        let err = draw(&[104, 0, 104, 0, 104, 1, 3, 0, 99]).unwrap_err();
        assert!(err.is_aborted());
    }
}
