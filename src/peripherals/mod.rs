//! Devices driven by an interactive [`Session`](crate::pipeline::Session).
//!
//! Both keep their state in a sparse grid keyed by integer coordinates,
//! with `x` growing right and `y` growing down.

pub mod hull;
pub mod arcade;

pub use hull::{Color, Heading, Hull, Robot, Turn};
pub use arcade::{draw, Screen, Tile};

/// A position on a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Render the bounding box of `points` row by row.
fn render_grid<'a>(
    points: impl Iterator<Item = &'a Point> + Clone,
    glyph: impl Fn(Point) -> char,
) -> String {
    let xs = points.clone().map(|p| p.x);
    let (Some(min_x), Some(max_x)) = (xs.clone().min(), xs.max()) else {
        return String::new();
    };
    let min_y = points.clone().map(|p| p.y).min().unwrap_or(0);
    let max_y = points.map(|p| p.y).max().unwrap_or(0);

    let mut out = String::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            out.push(glyph(Point::new(x, y)));
        }
        out.push('\n');
    }
    out
}
