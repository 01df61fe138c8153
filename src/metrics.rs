use crate::Tally;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Division where `0 / 0 == 0` and `x / 0 == inf` for any other `x`.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        if numerator == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        numerator / denominator
    }
}

/// Board class, keyed by (rows, columns, mines).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    /// 16 rows by 30 columns.
    ExpertHorizontal,
    /// 30 rows by 16 columns.
    ExpertVertical,
    Custom {
        rows: usize,
        columns: usize,
        mines: u32,
    },
}

impl Difficulty {
    pub fn classify(rows: usize, columns: usize, mines: u32) -> Self {
        match (rows, columns, mines) {
            (8, 8, 10) => Difficulty::Beginner,
            (16, 16, 40) => Difficulty::Intermediate,
            (16, 30, 99) => Difficulty::ExpertHorizontal,
            (30, 16, 99) => Difficulty::ExpertVertical,
            _ => Difficulty::Custom {
                rows,
                columns,
                mines,
            },
        }
    }

    /// Mode number in the STNB formula; only standard boards have one.
    fn stnb_mode(self) -> Option<f64> {
        match self {
            Difficulty::Beginner => Some(1.0),
            Difficulty::Intermediate => Some(2.0),
            Difficulty::ExpertHorizontal | Difficulty::ExpertVertical => Some(3.0),
            Difficulty::Custom { .. } => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => f.write_str("beg"),
            Difficulty::Intermediate => f.write_str("int"),
            Difficulty::ExpertHorizontal => f.write_str("exp-h"),
            Difficulty::ExpertVertical => f.write_str("exp-v"),
            Difficulty::Custom {
                rows,
                columns,
                mines,
            } => write!(f, "{rows}x{columns}+{mines}"),
        }
    }
}

impl Serialize for Difficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Whether the player used flags at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Style {
    #[serde(rename = "FL")]
    Flagging,
    #[serde(rename = "NF")]
    NonFlagging,
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Style::Flagging => f.write_str("FL"),
            Style::NonFlagging => f.write_str("NF"),
        }
    }
}

/// Accumulated quantities the derived metrics are computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawStats {
    pub rows: usize,
    pub columns: usize,
    pub mines: u32,
    pub bbbv: u32,
    pub openings: u32,
    pub islands: u32,
    pub solved_bbbv: u32,
    pub solved_openings: u32,
    pub solved_islands: u32,
    pub seconds: f64,
    pub left: Tally,
    pub right: Tally,
    pub double: Tally,
    pub path: f64,
    pub flags: u32,
    pub misflags: u32,
    pub unflags: u32,
    pub misunflags: u32,
}

/// Named statistics of one game plus its static descriptors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    difficulty: Difficulty,
    style: Style,
    metrics: BTreeMap<&'static str, f64>,
}

impl AnalysisResult {
    pub fn from_stats(stats: &RawStats) -> Self {
        let difficulty = Difficulty::classify(stats.rows, stats.columns, stats.mines);
        let style = if stats.right.cl > 0 {
            Style::Flagging
        } else {
            Style::NonFlagging
        };

        let time = stats.seconds;
        let bv = f64::from(stats.bbbv);
        let solved = f64::from(stats.solved_bbbv);
        let cl = f64::from(stats.left.cl + stats.right.cl + stats.double.cl);
        let ce = f64::from(stats.left.ce + stats.right.ce + stats.double.ce);
        let unfinished = if stats.bbbv != stats.solved_bbbv { 1.0 } else { 0.0 };

        let bvs = safe_divide(solved, time);
        let qg = safe_divide(time.powf(1.7), solved);
        let corr = safe_divide(
            ce - f64::from(stats.misflags)
                - f64::from(stats.unflags)
                - f64::from(stats.misunflags)
                - unfinished,
            cl,
        );

        let mut metrics = BTreeMap::from([
            ("row", stats.rows as f64),
            ("column", stats.columns as f64),
            ("mines", f64::from(stats.mines)),
            ("bv", bv),
            ("op", f64::from(stats.openings)),
            ("is", f64::from(stats.islands)),
            ("solved_bv", solved),
            ("solved_op", f64::from(stats.solved_openings)),
            ("solved_is", f64::from(stats.solved_islands)),
            ("rtime", time),
            ("left", f64::from(stats.left.cl)),
            ("right", f64::from(stats.right.cl)),
            ("double", f64::from(stats.double.cl)),
            ("cl", cl),
            ("ce", ce),
            ("path", stats.path),
            ("flags", f64::from(stats.flags)),
            ("misflags", f64::from(stats.misflags)),
            ("unflags", f64::from(stats.unflags)),
            ("misunflags", f64::from(stats.misunflags)),
            ("bvs", bvs),
            ("cls", safe_divide(cl, time)),
            ("ces", safe_divide(ce, time)),
            ("est", safe_divide(time, solved) * bv),
            ("rqp", safe_divide(time + 1.0, bvs)),
            ("qg", qg),
            ("ioe", safe_divide(solved, cl)),
            ("iome", safe_divide(solved, stats.path)),
            ("thrp", safe_divide(solved, ce)),
            ("corr", corr),
        ]);

        if let Some(mode) = difficulty.stnb_mode() {
            let scale = 87.420 * mode * mode - 155.829 * mode + 115.708;
            let stnb = safe_divide(scale, qg * safe_divide(solved, bv).sqrt());
            metrics.insert("stnb", stnb);
        }

        Self {
            difficulty,
            style,
            metrics,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    pub fn metrics(&self) -> &BTreeMap<&'static str, f64> {
        &self.metrics
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>10}: {}", "difficulty", self.difficulty)?;
        writeln!(f, "{:>10}: {}", "style", self.style)?;
        for (name, value) in &self.metrics {
            writeln!(f, "{name:>10}: {value:.3}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn beginner_win() -> RawStats {
        RawStats {
            rows: 8,
            columns: 8,
            mines: 10,
            bbbv: 20,
            openings: 3,
            islands: 4,
            solved_bbbv: 20,
            solved_openings: 3,
            solved_islands: 4,
            seconds: 10.0,
            left: Tally { cl: 25, ce: 22 },
            right: Tally { cl: 5, ce: 5 },
            double: Tally { cl: 3, ce: 2 },
            path: 50.0,
            flags: 3,
            misflags: 1,
            unflags: 1,
            misunflags: 0,
        }
    }

    #[test]
    fn test_safe_divide() {
        assert_eq!(safe_divide(6.0, 3.0), 2.0);
        assert_eq!(safe_divide(0.0, 0.0), 0.0);
        assert_eq!(safe_divide(1.0, 0.0), f64::INFINITY);
        assert_eq!(safe_divide(-1.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn test_difficulty_labels() {
        assert_eq!(Difficulty::classify(8, 8, 10).to_string(), "beg");
        assert_eq!(Difficulty::classify(16, 16, 40).to_string(), "int");
        assert_eq!(Difficulty::classify(16, 30, 99).to_string(), "exp-h");
        assert_eq!(Difficulty::classify(30, 16, 99).to_string(), "exp-v");
        assert_eq!(Difficulty::classify(9, 9, 10).to_string(), "9x9+10");
    }

    #[test]
    fn test_rate_metrics() {
        let result = AnalysisResult::from_stats(&beginner_win());

        assert_eq!(result.get("cl"), Some(33.0));
        assert_eq!(result.get("ce"), Some(29.0));
        assert!(close(result.get("bvs").unwrap(), 2.0));
        assert!(close(result.get("cls").unwrap(), 3.3));
        assert!(close(result.get("ces").unwrap(), 2.9));
        assert!(close(result.get("est").unwrap(), 10.0));
        assert!(close(result.get("rqp").unwrap(), 5.5));
        assert!(close(result.get("ioe").unwrap(), 20.0 / 33.0));
        assert!(close(result.get("iome").unwrap(), 0.4));
        assert!(close(result.get("thrp").unwrap(), 20.0 / 29.0));
        assert!(close(result.get("corr").unwrap(), 27.0 / 33.0));
    }

    #[test]
    fn test_qg_and_stnb() {
        let result = AnalysisResult::from_stats(&beginner_win());
        let qg = 10f64.powf(1.7) / 20.0;

        assert!(close(result.get("qg").unwrap(), qg));
        assert!(close(result.get("stnb").unwrap(), 47.299 / qg));
        assert_eq!(result.difficulty(), Difficulty::Beginner);
        assert_eq!(result.style(), Style::Flagging);
    }

    #[test]
    fn test_custom_board_has_no_stnb() {
        let stats = RawStats {
            rows: 9,
            ..beginner_win()
        };
        let result = AnalysisResult::from_stats(&stats);
        assert_eq!(result.get("stnb"), None);
        assert_eq!(result.difficulty().to_string(), "9x8+10");
    }

    #[test]
    fn test_zero_time_and_progress() {
        let stats = RawStats {
            rows: 8,
            columns: 8,
            mines: 10,
            bbbv: 20,
            ..RawStats::default()
        };
        let result = AnalysisResult::from_stats(&stats);

        assert_eq!(result.get("bvs"), Some(0.0));
        assert_eq!(result.get("est"), Some(0.0));
        assert_eq!(result.get("qg"), Some(0.0));
        assert_eq!(result.get("rqp"), Some(f64::INFINITY));
        assert_eq!(result.get("ioe"), Some(0.0));
        assert_eq!(result.style(), Style::NonFlagging);
    }

    #[test]
    fn test_unfinished_game_penalises_corr() {
        let stats = RawStats {
            solved_bbbv: 19,
            ..beginner_win()
        };
        let result = AnalysisResult::from_stats(&stats);
        assert!(close(result.get("corr").unwrap(), 26.0 / 33.0));
    }

    #[test]
    fn test_serializes_descriptors_as_labels() {
        let result = AnalysisResult::from_stats(&beginner_win());
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["difficulty"], "beg");
        assert_eq!(json["style"], "FL");
        assert_eq!(json["metrics"]["bv"], 20.0);
    }
}
