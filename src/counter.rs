use crate::{ActionKind, Position};
use serde::Serialize;

/// Which gesture a click was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Button {
    Left,
    Right,
    Double,
}

impl Button {
    pub fn of(kind: ActionKind) -> Option<Self> {
        match kind {
            ActionKind::Open => Some(Button::Left),
            ActionKind::Flag => Some(Button::Right),
            ActionKind::Chord => Some(Button::Double),
            ActionKind::Press | ActionKind::Release => None,
        }
    }
}

/// Total clicks (`cl`) and clicks that changed the board (`ce`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub cl: u32,
    pub ce: u32,
}

/// Game clock driven by event timestamps.
///
/// Starts at the first click and stops when the board reaches a terminal
/// state. While running, the last seen click time stands in for the stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    start_ms: Option<u64>,
    last_ms: Option<u64>,
    stop_ms: Option<u64>,
}

impl Timer {
    pub fn tick(&mut self, time_ms: u64) {
        if self.stop_ms.is_some() {
            return;
        }
        self.start_ms.get_or_insert(time_ms);
        self.last_ms = Some(time_ms);
    }

    pub fn stop(&mut self, time_ms: u64) {
        if self.start_ms.is_some() && self.stop_ms.is_none() {
            self.stop_ms = Some(time_ms);
        }
    }

    pub fn is_running(&self) -> bool {
        self.start_ms.is_some() && self.stop_ms.is_none()
    }

    pub fn elapsed_ms(&self) -> u64 {
        match (self.start_ms, self.stop_ms.or(self.last_ms)) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            _ => 0,
        }
    }

    pub fn seconds(&self) -> f64 {
        self.elapsed_ms() as f64 / 1000.0
    }
}

/// Per-session click, path and flag statistics.
#[derive(Debug, Clone, Default)]
pub struct Counters {
    pub left: Tally,
    pub right: Tally,
    pub double: Tally,
    pub timer: Timer,
    pub path: f64,
    last_position: Option<Position>,
    pub flags: u32,
    pub misflags: u32,
    pub unflags: u32,
    pub misunflags: u32,
}

impl Counters {
    pub fn tally(&self, button: Button) -> Tally {
        match button {
            Button::Left => self.left,
            Button::Right => self.right,
            Button::Double => self.double,
        }
    }

    fn tally_mut(&mut self, button: Button) -> &mut Tally {
        match button {
            Button::Left => &mut self.left,
            Button::Right => &mut self.right,
            Button::Double => &mut self.double,
        }
    }

    pub fn record_click(&mut self, button: Button, effective: bool) {
        let tally = self.tally_mut(button);
        tally.cl += 1;
        if effective {
            tally.ce += 1;
        }
    }

    /// Advances the path to an effective click at `pos`.
    pub fn record_move(&mut self, pos: Position) {
        if let Some(last) = self.last_position {
            self.path += last.distance(pos);
        }
        self.last_position = Some(pos);
    }

    /// Accounts one tile whose flag was toggled.
    pub fn record_flag(&mut self, flagged: bool, is_mine: bool) {
        if flagged {
            self.flags += 1;
            if !is_mine {
                self.misflags += 1;
            }
        } else {
            self.flags = self.flags.saturating_sub(1);
            if is_mine {
                self.misunflags += 1;
            } else {
                self.unflags += 1;
            }
        }
    }

    pub fn clicks(&self) -> u32 {
        self.left.cl + self.right.cl + self.double.cl
    }

    pub fn effective_clicks(&self) -> u32 {
        self.left.ce + self.right.ce + self.double.ce
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
