use crate::{
    refine, segment, ActionEvent, ActionKind, AnalysisResult, Board, BoardState, Button, Changes,
    Counters, DisplayCode, GameError, GameSettings, MineLayout, Position, RawStats, RegionTracker,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// Rule variants that change how the board reacts to input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStyle {
    /// Also expand tiles whose flagged neighbours match their value.
    pub bfs: bool,
    /// Disable flagging, chording and two-button holds.
    pub no_flag: bool,
    /// Flagging a satisfied number flags all of its covered neighbours.
    pub easy_flag: bool,
}

/// One game or replay session: the board, its region tables and counters.
pub struct Game {
    board: Board,
    style: GameStyle,
    tracker: Option<RegionTracker>,
    counters: Counters,
    rng: StdRng,
}

impl Game {
    /// A live game whose mines are placed on the first open, away from the
    /// clicked tile.
    pub fn new(settings: &GameSettings) -> Result<Self, GameError> {
        settings.validate()?;
        let board = Board::new(settings.width, settings.height, settings.mines)?;
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            board,
            style: settings.style(),
            tracker: None,
            counters: Counters::default(),
            rng,
        })
    }

    /// A session over a known layout, as used for replays.
    pub fn with_layout(layout: &MineLayout, style: GameStyle) -> Self {
        Self {
            board: Board::from_layout(layout),
            style,
            tracker: Some(RegionTracker::new(segment(layout))),
            counters: Counters::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Applies one input event and returns the tiles it visibly changed.
    ///
    /// Events outside the board or after the game has ended do nothing and
    /// are not counted.
    pub fn apply(&mut self, event: &ActionEvent) -> Changes {
        let pos = event.position;
        if !self.board.dimensions().contains(pos) || self.board.is_terminal() {
            trace!(?event, "ignored event");
            return Changes::new();
        }

        if event.kind == ActionKind::Open && !self.board.is_armed() {
            let flagged = self
                .board
                .index_of(pos)
                .is_some_and(|index| self.board.tile(index).flagged);
            if !flagged {
                self.arm(pos);
            }
        }

        let style = self.style;
        let changes = match event.kind {
            ActionKind::Open => self.board.open(pos, style.bfs),
            ActionKind::Flag if !style.no_flag => self.board.flag(pos, style.easy_flag),
            ActionKind::Chord if !style.no_flag => self.board.chord(pos, style.bfs),
            ActionKind::Press if !style.no_flag => self.board.double_press_hold(pos),
            ActionKind::Release => {
                self.board.release();
                Changes::new()
            }
            ActionKind::Flag | ActionKind::Chord | ActionKind::Press => return Changes::new(),
        };
        trace!(kind = ?event.kind, x = pos.x, y = pos.y, changed = changes.len(), "applied event");

        if let Some(button) = Button::of(event.kind) {
            self.record(button, event, &changes);
        }
        changes
    }

    /// Same layout, fresh board state and counters.
    pub fn restart(&mut self) {
        self.board.reset();
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.reset();
        }
        self.counters.reset();
    }

    /// Forgets the layout; mines are placed again on the next first open.
    pub fn new_game(&mut self) {
        self.board.clear();
        self.tracker = None;
        self.counters.reset();
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> BoardState {
        self.board.state()
    }

    pub fn style(&self) -> GameStyle {
        self.style
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn tracker(&self) -> Option<&RegionTracker> {
        self.tracker.as_ref()
    }

    pub fn snapshot(&self) -> Vec<(Position, DisplayCode)> {
        self.board.snapshot()
    }

    /// Derives the statistics table from everything recorded so far.
    pub fn analyze(&self) -> AnalysisResult {
        let dims = self.board.dimensions();
        let counters = &self.counters;
        let mut stats = RawStats {
            rows: dims.height,
            columns: dims.width,
            mines: self.board.mines_count(),
            seconds: counters.timer.seconds(),
            left: counters.left,
            right: counters.right,
            double: counters.double,
            path: counters.path,
            flags: counters.flags,
            misflags: counters.misflags,
            unflags: counters.unflags,
            misunflags: counters.misunflags,
            ..RawStats::default()
        };
        if let Some(tracker) = &self.tracker {
            let regions = tracker.regions();
            stats.bbbv = regions.bbbv;
            stats.openings = regions.openings;
            stats.islands = regions.islands;
            stats.solved_bbbv = tracker.solved_bbbv();
            stats.solved_openings = tracker.solved_openings();
            stats.solved_islands = tracker.solved_islands();
        }
        AnalysisResult::from_stats(&stats)
    }

    fn arm(&mut self, first_click: Position) {
        let dims = self.board.dimensions();
        let placed = MineLayout::random(
            dims.width as u32,
            dims.height as u32,
            self.board.mines_count(),
            Some(first_click),
            &mut self.rng,
        );
        match placed {
            Ok(layout) => {
                debug!(x = first_click.x, y = first_click.y, "placed mines");
                self.board.arm(&layout);
                self.tracker = Some(RegionTracker::new(segment(&layout)));
            }
            Err(err) => warn!(%err, "mine placement failed"),
        }
    }

    fn record(&mut self, button: Button, event: &ActionEvent, changes: &Changes) {
        let effective = !changes.is_empty();
        // The clock starts with the first click that changes the board.
        if effective || self.counters.timer.is_running() {
            self.counters.timer.tick(event.time_ms);
        }
        self.counters.record_click(button, effective);
        if effective {
            self.counters.record_move(event.position);
        }

        match button {
            Button::Right => {
                for &index in changes {
                    let tile = self.board.tile(index);
                    self.counters.record_flag(tile.flagged, tile.is_mine());
                }
            }
            Button::Left | Button::Double => {
                if let Some(tracker) = self.tracker.as_mut() {
                    for &index in changes {
                        let tile = self.board.tile(index);
                        if !tile.covered && !tile.is_mine() {
                            tracker.uncover(index);
                        }
                    }
                }
            }
        }

        if self.board.is_terminal() {
            self.counters.timer.stop(event.time_ms);
            info!(
                state = ?self.board.state(),
                elapsed_ms = self.counters.timer.elapsed_ms(),
                "game over"
            );
        }
    }
}

/// Refines a raw action log and replays it against `layout`.
pub fn replay(layout: &MineLayout, style: GameStyle, log: &[ActionEvent]) -> AnalysisResult {
    let mut game = Game::with_layout(layout, style);
    for event in refine(log) {
        game.apply(&event);
    }
    game.analyze()
}
