use crate::layout::MINE;
use serde::{Deserialize, Serialize};

/// What the presentation layer should draw for a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayCode {
    Covered,
    Pressed,
    Flagged,
    Revealed(u8),
    /// A mine left unflagged on a finished board.
    MissedMine,
    /// A flag on a safe tile, shown once the board blasts.
    WrongFlag,
    /// The mine that was opened.
    Detonated,
    Mine,
}

impl DisplayCode {
    /// Compact numeric form: `0..=8` revealed, `9` covered, `10` pressed,
    /// `11` flagged, `12` missed mine, `13` wrong flag, `14` detonated,
    /// `15` mine.
    pub fn code(self) -> u8 {
        match self {
            DisplayCode::Revealed(n) => n,
            DisplayCode::Covered => 9,
            DisplayCode::Pressed => 10,
            DisplayCode::Flagged => 11,
            DisplayCode::MissedMine => 12,
            DisplayCode::WrongFlag => 13,
            DisplayCode::Detonated => 14,
            DisplayCode::Mine => 15,
        }
    }
}

/// Minimal unit of the live board.
///
/// Neighbours are stored as indices into the owning board's tile array.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub value: i8,
    pub covered: bool,
    pub flagged: bool,
    pub pressed: bool,
    pub neighbours: Vec<usize>,
}

impl Tile {
    pub fn new(neighbours: Vec<usize>) -> Self {
        Self {
            value: 0,
            covered: true,
            flagged: false,
            pressed: false,
            neighbours,
        }
    }

    pub fn is_mine(&self) -> bool {
        self.value == MINE
    }

    /// Back to the untouched state, keeping value and neighbours.
    pub fn recover(&mut self) {
        self.covered = true;
        self.flagged = false;
        self.pressed = false;
    }

    pub fn can_hold(&self) -> bool {
        self.covered && !self.flagged
    }

    /// Display code while the game is in progress.
    pub fn display(&self) -> DisplayCode {
        if self.flagged {
            DisplayCode::Flagged
        } else if self.pressed {
            DisplayCode::Pressed
        } else if self.covered {
            DisplayCode::Covered
        } else {
            DisplayCode::Revealed(self.value.max(0) as u8)
        }
    }

    pub fn display_finished(&self) -> DisplayCode {
        if !self.flagged && self.is_mine() {
            DisplayCode::MissedMine
        } else {
            self.display()
        }
    }

    pub fn display_blasted(&self) -> DisplayCode {
        if self.flagged && !self.is_mine() {
            DisplayCode::WrongFlag
        } else if !self.covered && self.is_mine() {
            DisplayCode::Detonated
        } else if !self.flagged && self.is_mine() {
            DisplayCode::Mine
        } else {
            self.display()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(value: i8) -> Tile {
        Tile {
            value,
            ..Tile::new(Vec::new())
        }
    }

    #[test]
    fn test_display_precedence() {
        let mut t = tile(3);
        assert_eq!(t.display(), DisplayCode::Covered);
        t.pressed = true;
        assert_eq!(t.display(), DisplayCode::Pressed);
        t.flagged = true;
        assert_eq!(t.display(), DisplayCode::Flagged);
        t.flagged = false;
        t.pressed = false;
        t.covered = false;
        assert_eq!(t.display(), DisplayCode::Revealed(3));
    }

    #[test]
    fn test_finished_marks_missed_mines_only() {
        let mine = tile(MINE);
        assert_eq!(mine.display_finished(), DisplayCode::MissedMine);

        let mut flagged_safe = tile(1);
        flagged_safe.flagged = true;
        assert_eq!(flagged_safe.display_finished(), DisplayCode::Flagged);
    }

    #[test]
    fn test_blasted_codes() {
        let mut wrong = tile(2);
        wrong.flagged = true;
        assert_eq!(wrong.display_blasted(), DisplayCode::WrongFlag);

        let mut detonated = tile(MINE);
        detonated.covered = false;
        assert_eq!(detonated.display_blasted(), DisplayCode::Detonated);

        assert_eq!(tile(MINE).display_blasted(), DisplayCode::Mine);

        let mut flagged_mine = tile(MINE);
        flagged_mine.flagged = true;
        assert_eq!(flagged_mine.display_blasted(), DisplayCode::Flagged);
    }

    #[test]
    fn test_numeric_codes() {
        assert_eq!(DisplayCode::Revealed(0).code(), 0);
        assert_eq!(DisplayCode::Covered.code(), 9);
        assert_eq!(DisplayCode::Mine.code(), 15);
    }
}
