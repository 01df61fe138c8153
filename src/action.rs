use crate::{GameError, Position};
use serde::{Deserialize, Serialize};

/// Maximum distance in milliseconds between a release and the press it pairs
/// with to form a chord.
pub const CHORD_TOLERANCE_MS: u64 = 10;

/// Kind of a recorded input event.
///
/// `Press` is the second button going down while the first is held (the start
/// of a two-button chord gesture). `Release` is a button coming up after such a
/// hold. `Chord` is never recorded directly: [`refine`] promotes a `Release`
/// to it when a `Press` on the same tile lies within [`CHORD_TOLERANCE_MS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Open,
    Flag,
    Press,
    Release,
    Chord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub kind: ActionKind,
    #[serde(flatten)]
    pub position: Position,
    pub time_ms: u64,
}

impl ActionEvent {
    pub fn new(kind: ActionKind, x: i32, y: i32, time_ms: u64) -> Self {
        Self {
            kind,
            position: Position::new(x, y),
            time_ms,
        }
    }
}

/// Reads a JSON array of events, e.g.
/// `[{"kind": "open", "x": 3, "y": 4, "time_ms": 0}]`.
pub fn parse_log(json: &str) -> Result<Vec<ActionEvent>, GameError> {
    Ok(serde_json::from_str(json)?)
}

/// Promotes every release that pairs with a nearby press on the same tile to
/// a chord. The nearest press after the release wins; earlier presses are
/// only considered when none follows within the tolerance.
pub fn refine(log: &[ActionEvent]) -> Vec<ActionEvent> {
    let mut refined = log.to_vec();
    for (index, event) in log.iter().enumerate() {
        if event.kind != ActionKind::Release {
            continue;
        }
        let paired = nearest_press(log, index, index + 1..log.len())
            .or_else(|| nearest_press(log, index, (0..index).rev()));
        if paired.is_some() {
            refined[index].kind = ActionKind::Chord;
        }
    }
    refined
}

fn nearest_press<I>(log: &[ActionEvent], release: usize, candidates: I) -> Option<usize>
where
    I: Iterator<Item = usize>,
{
    let origin = log[release];
    candidates
        .take_while(|&i| log[i].time_ms.abs_diff(origin.time_ms) <= CHORD_TOLERANCE_MS)
        .find(|&i| log[i].kind == ActionKind::Press && log[i].position == origin.position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ActionKind::*;

    fn kinds(log: &[ActionEvent]) -> Vec<ActionKind> {
        log.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_release_before_press_becomes_chord() {
        let log = vec![
            ActionEvent::new(Release, 2, 3, 100),
            ActionEvent::new(Press, 2, 3, 105),
        ];
        assert_eq!(kinds(&refine(&log)), vec![Chord, Press]);
    }

    #[test]
    fn test_release_after_press_becomes_chord() {
        let log = vec![
            ActionEvent::new(Press, 2, 3, 95),
            ActionEvent::new(Release, 2, 3, 100),
        ];
        assert_eq!(kinds(&refine(&log)), vec![Press, Chord]);
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        let log = vec![
            ActionEvent::new(Release, 0, 0, 0),
            ActionEvent::new(Press, 0, 0, CHORD_TOLERANCE_MS),
        ];
        assert_eq!(kinds(&refine(&log)), vec![Chord, Press]);
    }

    #[test]
    fn test_distant_press_does_not_pair() {
        let log = vec![
            ActionEvent::new(Press, 1, 1, 0),
            ActionEvent::new(Release, 1, 1, 11),
            ActionEvent::new(Open, 4, 4, 15),
            ActionEvent::new(Press, 1, 1, 30),
        ];
        assert_eq!(kinds(&refine(&log)), vec![Press, Release, Open, Press]);
    }

    #[test]
    fn test_press_on_other_tile_does_not_pair() {
        let log = vec![
            ActionEvent::new(Release, 1, 1, 0),
            ActionEvent::new(Press, 1, 2, 3),
        ];
        assert_eq!(kinds(&refine(&log)), vec![Release, Press]);
    }

    #[test]
    fn test_refine_preserves_everything_else() {
        let log = vec![
            ActionEvent::new(Open, 0, 0, 0),
            ActionEvent::new(Flag, 5, 5, 400),
            ActionEvent::new(Press, 3, 3, 800),
            ActionEvent::new(Release, 3, 3, 804),
            ActionEvent::new(Open, 3, 4, 900),
        ];
        let refined = refine(&log);

        assert_eq!(refined.len(), log.len());
        assert_eq!(kinds(&refined), vec![Open, Flag, Press, Chord, Open]);
        for (before, after) in log.iter().zip(&refined) {
            assert_eq!(before.time_ms, after.time_ms);
            assert_eq!(before.position, after.position);
        }
    }

    #[test]
    fn test_parse_log() {
        let log = parse_log(r#"[{"kind": "open", "x": 3, "y": 4, "time_ms": 17}]"#).unwrap();
        assert_eq!(log, vec![ActionEvent::new(Open, 3, 4, 17)]);

        assert!(matches!(
            parse_log(r#"[{"kind": "tap", "x": 0, "y": 0, "time_ms": 0}]"#),
            Err(GameError::Json(_))
        ));
    }
}
