use itertools::iproduct;
use serde::{Deserialize, Serialize};

/// A board coordinate: `x` is the column, `y` is the row.
///
/// Signed so that coordinates recorded outside the board can still be
/// represented and rejected by bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance, used for the mouse path metric.
    pub fn distance(&self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

/// Width and height of a rectangular board, mapping positions to flat
/// row-major tile indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.index_of(pos).is_some()
    }

    pub fn index_of(&self, pos: Position) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn position_of(&self, index: usize) -> Position {
        Position::new((index % self.width) as i32, (index / self.width) as i32)
    }

    /// In-bounds neighbour indices of `index`, at most eight.
    pub fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let pos = self.position_of(index);
        let dims = *self;
        iproduct!(-1..=1, -1..=1)
            .filter(|&(dy, dx)| dx != 0 || dy != 0)
            .filter_map(move |(dy, dx)| dims.index_of(Position::new(pos.x + dx, pos.y + dy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(5, 10);
        assert_eq!(pos.x, 5);
        assert_eq!(pos.y, 10);
    }

    #[test]
    fn test_distance() {
        let a = Position::new(0, 0);
        assert_eq!(a.distance(Position::new(3, 4)), 5.0);
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn test_dimensions_indexing() {
        let dims = Dimensions::new(4, 3);
        assert_eq!(dims.len(), 12);
        assert_eq!(dims.index_of(Position::new(3, 2)), Some(11));
        assert_eq!(dims.index_of(Position::new(4, 0)), None);
        assert_eq!(dims.index_of(Position::new(-1, 0)), None);
        assert_eq!(dims.position_of(5), Position::new(1, 1));
    }

    #[test]
    fn test_dimensions_neighbours_clip_at_edges() {
        let dims = Dimensions::new(4, 3);
        assert_eq!(dims.neighbours(0).count(), 3);
        assert_eq!(dims.neighbours(1).count(), 5);
        assert_eq!(dims.neighbours(5).count(), 8);

        let mut around_corner: Vec<usize> = dims.neighbours(11).collect();
        around_corner.sort_unstable();
        assert_eq!(around_corner, vec![6, 7, 10]);
    }
}
