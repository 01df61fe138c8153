use crate::{ActionEvent, ActionKind, Board, MineLayout, Position};
use rand::prelude::*;

/// Configuration for generated game records
#[derive(Debug, Clone)]
pub struct RecordConfig {
    pub width: u32,
    pub height: u32,
    pub mine_density: f64,
    /// Chance that a step flags a mine instead of opening a tile.
    pub flag_rate: f64,
    /// Chance that a step chords a satisfied number with a press/release pair.
    pub chord_rate: f64,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            mine_density: 0.15,
            flag_rate: 0.2,
            chord_rate: 0.1,
        }
    }
}

/// Generates layouts together with a plausible, error-free action log that
/// clears them.
pub struct RecordGenerator {
    config: RecordConfig,
    rng: StdRng,
}

impl RecordGenerator {
    pub fn new(config: RecordConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(config: RecordConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generates one layout and a log that finishes it
    pub fn generate(&mut self) -> (MineLayout, Vec<ActionEvent>) {
        let RecordConfig { width, height, .. } = self.config;
        let mines = ((width * height) as f64 * self.config.mine_density) as u32;
        let first = Position::new(
            self.rng.gen_range(0..width) as i32,
            self.rng.gen_range(0..height) as i32,
        );
        let layout = MineLayout::random(width, height, mines, Some(first), &mut self.rng)
            .expect("generated mine count fits the board");

        let mut board = Board::from_layout(&layout);
        let dims = layout.dimensions();
        let mut log = Vec::new();
        let mut time_ms = 0;

        log.push(ActionEvent::new(ActionKind::Open, first.x, first.y, time_ms));
        board.open(first, false);

        while !board.is_terminal() {
            time_ms += self.rng.gen_range(80..400);

            if self.rng.gen_bool(self.config.chord_rate) {
                if let Some(index) = self.satisfied_number(&board) {
                    let pos = dims.position_of(index);
                    if self.flag_neighbours(&mut board, index, &mut log, &mut time_ms) {
                        log.push(ActionEvent::new(ActionKind::Press, pos.x, pos.y, time_ms));
                        time_ms += self.rng.gen_range(1..5);
                        log.push(ActionEvent::new(ActionKind::Release, pos.x, pos.y, time_ms));
                        board.chord(pos, false);
                        continue;
                    }
                }
            }

            if self.rng.gen_bool(self.config.flag_rate) {
                if let Some(index) = self.pick(&board, |b, i| {
                    let tile = b.tile(i);
                    tile.covered && !tile.flagged && tile.is_mine()
                }) {
                    let pos = dims.position_of(index);
                    log.push(ActionEvent::new(ActionKind::Flag, pos.x, pos.y, time_ms));
                    board.flag(pos, false);
                    continue;
                }
            }

            let Some(index) = self.pick(&board, |b, i| {
                let tile = b.tile(i);
                tile.covered && !tile.flagged && !tile.is_mine()
            }) else {
                break;
            };
            let pos = dims.position_of(index);
            log.push(ActionEvent::new(ActionKind::Open, pos.x, pos.y, time_ms));
            board.open(pos, false);
        }

        (layout, log)
    }

    /// Generates multiple records
    pub fn generate_batch(&mut self, count: usize) -> Vec<(MineLayout, Vec<ActionEvent>)> {
        (0..count).map(|_| self.generate()).collect()
    }

    fn pick<F>(&mut self, board: &Board, accept: F) -> Option<usize>
    where
        F: Fn(&Board, usize) -> bool,
    {
        let candidates: Vec<usize> = (0..board.tiles().len())
            .filter(|&i| accept(board, i))
            .collect();
        candidates.choose(&mut self.rng).copied()
    }

    /// An uncovered number with at least one covered safe neighbour.
    fn satisfied_number(&mut self, board: &Board) -> Option<usize> {
        self.pick(board, |b, i| {
            let tile = b.tile(i);
            !tile.covered
                && tile.value > 0
                && tile
                    .neighbours
                    .iter()
                    .any(|&n| b.tile(n).covered && !b.tile(n).is_mine())
        })
    }

    /// Flags every unflagged mine around `index`, logging one flag per mine.
    fn flag_neighbours(
        &mut self,
        board: &mut Board,
        index: usize,
        log: &mut Vec<ActionEvent>,
        time_ms: &mut u64,
    ) -> bool {
        let dims = board.dimensions();
        let mines: Vec<usize> = board
            .tile(index)
            .neighbours
            .iter()
            .copied()
            .filter(|&n| board.tile(n).is_mine() && !board.tile(n).flagged)
            .collect();

        for n in mines {
            let pos = dims.position_of(n);
            *time_ms += self.rng.gen_range(80..400);
            log.push(ActionEvent::new(ActionKind::Flag, pos.x, pos.y, *time_ms));
            board.flag(pos, false);
        }
        board.tile(index).value as usize == board.flagged_neighbours(index)
    }
}
