use crate::{Dimensions, FormatError, GameError, Position};
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Symbol marking a mine in textual layouts.
pub const MINE_SYMBOL: char = '*';
/// Tile value used for mines.
pub const MINE: i8 = -1;

/// A fully known mine layout with precomputed neighbour counts.
///
/// Values are indexed `[[y, x]]`: `-1` for a mine, `0..=8` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct MineLayout {
    values: Array2<i8>,
    mines: u32,
}

impl MineLayout {
    /// Parses a layout from text, one line per row. Any symbol other than
    /// `mine_symbol` is a safe cell. Trailing blank lines are ignored.
    pub fn parse(text: &str, mine_symbol: char) -> Result<Self, FormatError> {
        let mut rows: Vec<&str> = text.lines().collect();
        while rows.last().is_some_and(|row| row.trim().is_empty()) {
            rows.pop();
        }
        Self::from_rows(&rows, mine_symbol)
    }

    pub fn from_rows<S: AsRef<str>>(rows: &[S], mine_symbol: char) -> Result<Self, FormatError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.as_ref().chars().count());
        if height == 0 || width == 0 {
            return Err(FormatError::EmptyGrid);
        }

        let mut mask = Array2::from_elem((height, width), false);
        for (y, row) in rows.iter().enumerate() {
            let found = row.as_ref().chars().count();
            if found != width {
                return Err(FormatError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, symbol) in row.as_ref().chars().enumerate() {
                mask[[y, x]] = symbol == mine_symbol;
            }
        }

        Ok(Self::from_mask(&mask))
    }

    /// Builds a layout from a mine mask, recomputing every neighbour count.
    pub fn from_mask(mask: &Array2<bool>) -> Self {
        let (height, width) = mask.dim();
        let dims = Dimensions::new(width, height);
        let values = Array2::from_shape_fn((height, width), |(y, x)| {
            if mask[[y, x]] {
                return MINE;
            }
            dims.neighbours(y * width + x)
                .filter(|&n| mask[[n / width, n % width]])
                .count() as i8
        });
        let mines = mask.iter().filter(|&&mine| mine).count() as u32;

        Self { values, mines }
    }

    /// Places `mines` mines uniformly at random, never on `exclude`.
    pub fn random<R: Rng + ?Sized>(
        width: u32,
        height: u32,
        mines: u32,
        exclude: Option<Position>,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let dims = Dimensions::new(width as usize, height as usize);
        let excluded = exclude.and_then(|pos| dims.index_of(pos));
        let mut field: Vec<usize> = (0..dims.len()).filter(|&i| Some(i) != excluded).collect();

        if dims.is_empty() || mines as usize > field.len() {
            return Err(GameError::TooManyMines {
                width,
                height,
                mines,
            });
        }

        field.shuffle(rng);
        let mut mask = Array2::from_elem((dims.height, dims.width), false);
        for &index in &field[..mines as usize] {
            mask[[index / dims.width, index % dims.width]] = true;
        }

        Ok(Self::from_mask(&mask))
    }

    pub fn dimensions(&self) -> Dimensions {
        let (height, width) = self.values.dim();
        Dimensions::new(width, height)
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    pub fn mines_count(&self) -> u32 {
        self.mines
    }

    /// Number of tiles that are not mines.
    pub fn safe_count(&self) -> usize {
        self.values.len() - self.mines as usize
    }

    /// Value of the tile at flat index `index`.
    pub fn value(&self, index: usize) -> i8 {
        let width = self.width();
        self.values[[index / width, index % width]]
    }

    pub fn value_at(&self, pos: Position) -> Option<i8> {
        self.dimensions().index_of(pos).map(|index| self.value(index))
    }

    pub fn is_mine(&self, index: usize) -> bool {
        self.value(index) == MINE
    }
}

impl FromStr for MineLayout {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, MINE_SYMBOL)
    }
}

impl fmt::Display for MineLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.values.rows() {
            for &value in row {
                let symbol = match value {
                    MINE => MINE_SYMBOL,
                    0 => '.',
                    n => char::from(b'0' + n as u8),
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
