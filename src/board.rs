use crate::{Dimensions, DisplayCode, GameError, MineLayout, Position, Tile};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

/// Indices of the tiles whose visible state changed during one operation.
pub type Changes = BTreeSet<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardState {
    Playing,
    Finished,
    Blasted,
}

impl BoardState {
    pub fn is_terminal(self) -> bool {
        self != BoardState::Playing
    }
}

/// The live board: a flat arena of tiles with index-based adjacency.
#[derive(Debug, Clone)]
pub struct Board {
    dims: Dimensions,
    tiles: Vec<Tile>,
    mines_count: u32,
    armed: bool,
    state: BoardState,
    covered_safe: usize,
    detonated: bool,
}

impl Board {
    /// An unarmed board; mines are placed later through [`Board::arm`].
    pub fn new(width: u32, height: u32, mines_count: u32) -> Result<Self, GameError> {
        let too_many = width
            .checked_mul(height)
            .map_or(true, |cells| mines_count >= cells);
        if width == 0 || height == 0 || too_many {
            return Err(GameError::TooManyMines {
                width,
                height,
                mines: mines_count,
            });
        }

        let dims = Dimensions::new(width as usize, height as usize);
        let tiles = (0..dims.len())
            .map(|index| Tile::new(dims.neighbours(index).collect()))
            .collect();

        Ok(Board {
            dims,
            tiles,
            mines_count,
            armed: false,
            state: BoardState::Playing,
            covered_safe: dims.len(),
            detonated: false,
        })
    }

    pub fn from_layout(layout: &MineLayout) -> Self {
        let dims = layout.dimensions();
        let tiles = (0..dims.len())
            .map(|index| Tile::new(dims.neighbours(index).collect()))
            .collect();

        let mut board = Board {
            dims,
            tiles,
            mines_count: layout.mines_count(),
            armed: false,
            state: BoardState::Playing,
            covered_safe: dims.len(),
            detonated: false,
        };
        board.arm(layout);
        board.reset();
        board
    }

    /// Copies tile values from `layout`. Cover and flag state is kept, so
    /// flags placed before the mines exist stay on the board.
    pub fn arm(&mut self, layout: &MineLayout) {
        debug_assert_eq!(layout.dimensions(), self.dims);
        for (index, tile) in self.tiles.iter_mut().enumerate() {
            tile.value = layout.value(index);
        }
        self.mines_count = layout.mines_count();
        self.armed = true;
        self.covered_safe = self
            .tiles
            .iter()
            .filter(|t| t.covered && !t.is_mine())
            .count();
    }

    /// Covers every tile again, keeping the mine layout.
    pub fn reset(&mut self) {
        self.tiles.iter_mut().for_each(Tile::recover);
        self.state = BoardState::Playing;
        self.covered_safe = self.tiles.iter().filter(|t| !t.is_mine()).count();
        self.detonated = false;
    }

    /// Forgets the mine layout as well.
    pub fn clear(&mut self) {
        self.tiles.iter_mut().for_each(|tile| tile.value = 0);
        self.armed = false;
        self.reset();
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn state(&self) -> BoardState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn mines_count(&self) -> u32 {
        self.mines_count
    }

    pub fn index_of(&self, pos: Position) -> Option<usize> {
        self.dims.index_of(pos)
    }

    pub fn tile(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Uncovers the tile and propagates. Plain variant expands only zeros;
    /// the BFS variant also expands tiles whose flags satisfy their value.
    pub fn open(&mut self, pos: Position, bfs: bool) -> Changes {
        match self.index_of(pos) {
            Some(index) => self.operate(|board| board.open_from(index, bfs)),
            None => Changes::new(),
        }
    }

    /// Toggles a flag. On an uncovered tile with `easy_flag`, flags every
    /// covered neighbour when their count equals the tile's value.
    pub fn flag(&mut self, pos: Position, easy_flag: bool) -> Changes {
        match self.index_of(pos) {
            Some(index) => self.operate(|board| board.toggle_flag(index, easy_flag)),
            None => Changes::new(),
        }
    }

    /// Opens every neighbour of an uncovered tile whose flags satisfy it.
    pub fn chord(&mut self, pos: Position, bfs: bool) -> Changes {
        match self.index_of(pos) {
            Some(index) => self.operate(|board| board.chord_from(index, bfs)),
            None => Changes::new(),
        }
    }

    pub fn press_hold(&mut self, pos: Position) -> Changes {
        match self.index_of(pos) {
            Some(index) => self.operate(|board| board.hold(std::iter::once(index))),
            None => Changes::new(),
        }
    }

    /// Holds the tile and all of its neighbours, as in a two-button press.
    pub fn double_press_hold(&mut self, pos: Position) -> Changes {
        match self.index_of(pos) {
            Some(index) => self.operate(|board| {
                let area: Vec<usize> = std::iter::once(index)
                    .chain(board.tiles[index].neighbours.iter().copied())
                    .collect();
                board.hold(area)
            }),
            None => Changes::new(),
        }
    }

    /// Clears every pressed indicator.
    pub fn release(&mut self) {
        for tile in &mut self.tiles {
            tile.pressed = false;
        }
    }

    pub fn display(&self, index: usize) -> DisplayCode {
        let tile = &self.tiles[index];
        match self.state {
            BoardState::Playing => tile.display(),
            BoardState::Finished => tile.display_finished(),
            BoardState::Blasted => tile.display_blasted(),
        }
    }

    /// Every tile with its display code, row by row.
    pub fn snapshot(&self) -> Vec<(Position, DisplayCode)> {
        (0..self.tiles.len())
            .map(|index| (self.dims.position_of(index), self.display(index)))
            .collect()
    }

    pub fn flagged_neighbours(&self, index: usize) -> usize {
        self.tiles[index]
            .neighbours
            .iter()
            .filter(|&&n| self.tiles[n].flagged)
            .count()
    }

    pub fn covered_neighbours(&self, index: usize) -> usize {
        self.tiles[index]
            .neighbours
            .iter()
            .filter(|&&n| self.tiles[n].covered)
            .count()
    }

    /// Shared pipeline around every mutating operation.
    fn operate<F>(&mut self, op: F) -> Changes
    where
        F: FnOnce(&mut Self) -> Changes,
    {
        if self.is_terminal() {
            return Changes::new();
        }
        self.release();
        let changed = op(self);
        self.update_state();
        changed
    }

    fn update_state(&mut self) {
        if self.detonated {
            self.state = BoardState::Blasted;
        } else if self.covered_safe == 0 {
            self.state = BoardState::Finished;
        }
    }

    fn uncover(&mut self, index: usize) -> bool {
        let tile = &mut self.tiles[index];
        if tile.flagged || !tile.covered {
            return false;
        }
        tile.covered = false;
        if tile.is_mine() {
            self.detonated = true;
        } else {
            self.covered_safe -= 1;
        }
        true
    }

    fn expands(&self, index: usize, bfs: bool) -> bool {
        let tile = &self.tiles[index];
        if tile.is_mine() {
            return false;
        }
        tile.value == 0 || (bfs && tile.value as usize == self.flagged_neighbours(index))
    }

    fn open_from(&mut self, origin: usize, bfs: bool) -> Changes {
        let mut changed = Changes::new();
        let mut queued = vec![false; self.tiles.len()];
        let mut queue = VecDeque::from([origin]);
        queued[origin] = true;

        while let Some(current) = queue.pop_front() {
            if !self.uncover(current) {
                continue;
            }
            changed.insert(current);

            if self.expands(current, bfs) {
                for &n in &self.tiles[current].neighbours {
                    let neighbour = &self.tiles[n];
                    if !queued[n] && neighbour.covered && !neighbour.flagged {
                        queued[n] = true;
                        queue.push_back(n);
                    }
                }
            }
        }

        changed
    }

    fn toggle_flag(&mut self, index: usize, easy_flag: bool) -> Changes {
        let tile = &mut self.tiles[index];
        if tile.flagged || tile.covered {
            tile.flagged = !tile.flagged;
            return Changes::from([index]);
        }

        let value = tile.value as usize;
        if !easy_flag || value != self.covered_neighbours(index) {
            return Changes::new();
        }

        let targets: Vec<usize> = self.tiles[index]
            .neighbours
            .iter()
            .copied()
            .filter(|&n| self.tiles[n].covered && !self.tiles[n].flagged)
            .collect();
        for &n in &targets {
            self.tiles[n].flagged = true;
        }
        targets.into_iter().collect()
    }

    fn chord_from(&mut self, index: usize, bfs: bool) -> Changes {
        let tile = &self.tiles[index];
        if tile.covered || tile.value as usize != self.flagged_neighbours(index) {
            return Changes::new();
        }

        let neighbours = tile.neighbours.clone();
        let mut changed = Changes::new();
        for n in neighbours {
            changed.extend(self.open_from(n, bfs));
        }
        changed
    }

    fn hold<I>(&mut self, area: I) -> Changes
    where
        I: IntoIterator<Item = usize>,
    {
        let mut changed = Changes::new();
        for index in area {
            let tile = &mut self.tiles[index];
            if tile.can_hold() {
                tile.pressed = true;
                changed.insert(index);
            }
        }
        changed
    }
}
