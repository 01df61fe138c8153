use crate::{Dimensions, MineLayout, MINE};
use ndarray::Array2;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Region identifier: positive for openings, negative for islands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RegionId(pub i32);

impl RegionId {
    pub fn is_opening(self) -> bool {
        self.0 > 0
    }
}

/// Static region structure of a mine layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Regions {
    pub openings: u32,
    pub islands: u32,
    /// Minimum clicks needed to clear the board.
    pub bbbv: u32,
    /// Region ids per tile index. Mines belong to no region.
    pub membership: Vec<Vec<RegionId>>,
    /// Tile count per region.
    pub remaining: BTreeMap<RegionId, usize>,
}

/// Splits a layout into openings (zero areas plus their numbered border)
/// and islands (connected numbered tiles outside every opening).
pub fn segment(layout: &MineLayout) -> Regions {
    let mut fill = AbsorbingFill::new(layout);

    let openings = fill.pass(|value| value == 0, 1);
    let untouched = fill.visited.iter().filter(|&&marked| !marked).count() as u32;
    let islands = fill.pass(|value| value != MINE && value != 0, -1);

    let regions = Regions {
        openings,
        islands,
        bbbv: openings + untouched,
        membership: fill.membership,
        remaining: fill.remaining,
    };
    debug!(
        openings = regions.openings,
        islands = regions.islands,
        bbbv = regions.bbbv,
        "segmented layout"
    );
    regions
}

/// Flood fill that marks every unvisited neighbour of a qualifying tile but
/// only continues through neighbours that qualify themselves.
struct AbsorbingFill<'a> {
    layout: &'a MineLayout,
    dims: Dimensions,
    visited: Array2<bool>,
    membership: Vec<Vec<RegionId>>,
    remaining: BTreeMap<RegionId, usize>,
}

impl<'a> AbsorbingFill<'a> {
    fn new(layout: &'a MineLayout) -> Self {
        let dims = layout.dimensions();
        // Mines start out visited so no pass can claim them.
        let visited = Array2::from_shape_fn((dims.height, dims.width), |(y, x)| {
            layout.is_mine(y * dims.width + x)
        });

        Self {
            layout,
            dims,
            visited,
            membership: vec![Vec::new(); dims.len()],
            remaining: BTreeMap::new(),
        }
    }

    /// Seeds a region at every unvisited tile satisfying `qualifies`.
    /// Ids are allocated as `sign * n` for n = 1, 2, ...
    fn pass<P>(&mut self, qualifies: P, sign: i32) -> u32
    where
        P: Fn(i8) -> bool,
    {
        let mut seeds = 0;
        for index in 0..self.dims.len() {
            if self.is_visited(index) || !qualifies(self.layout.value(index)) {
                continue;
            }
            seeds += 1;
            self.absorb(index, RegionId(sign * seeds), &qualifies);
        }
        seeds as u32
    }

    fn absorb<P>(&mut self, seed: usize, id: RegionId, qualifies: &P)
    where
        P: Fn(i8) -> bool,
    {
        let dims = self.dims;
        self.mark(seed, id);
        let mut stack = vec![seed];

        while let Some(current) = stack.pop() {
            if !qualifies(self.layout.value(current)) {
                continue;
            }
            for neighbour in dims.neighbours(current) {
                if self.mark(neighbour, id) {
                    stack.push(neighbour);
                }
            }
        }
    }

    fn is_visited(&self, index: usize) -> bool {
        self.visited[[index / self.dims.width, index % self.dims.width]]
    }

    fn mark(&mut self, index: usize, id: RegionId) -> bool {
        let cell = &mut self.visited[[index / self.dims.width, index % self.dims.width]];
        if *cell {
            return false;
        }
        *cell = true;
        self.membership[index].push(id);
        *self.remaining.entry(id).or_insert(0) += 1;
        true
    }
}

/// Incremental solved-region bookkeeping over a [`Regions`] table.
///
/// An opening credits one 3BV when its last tile is uncovered. Every island
/// tile credits one 3BV on its own; the island counts as solved once all of
/// its tiles are uncovered.
#[derive(Debug, Clone)]
pub struct RegionTracker {
    regions: Regions,
    remaining: BTreeMap<RegionId, usize>,
    solved_openings: u32,
    solved_islands: u32,
    solved_bbbv: u32,
}

impl RegionTracker {
    pub fn new(regions: Regions) -> Self {
        Self {
            remaining: regions.remaining.clone(),
            regions,
            solved_openings: 0,
            solved_islands: 0,
            solved_bbbv: 0,
        }
    }

    pub fn regions(&self) -> &Regions {
        &self.regions
    }

    /// Records that the safe tile at `index` went from covered to uncovered.
    pub fn uncover(&mut self, index: usize) {
        for &id in &self.regions.membership[index] {
            let Some(left) = self.remaining.get_mut(&id).filter(|left| **left > 0) else {
                continue;
            };
            *left -= 1;

            if id.is_opening() {
                if *left == 0 {
                    self.solved_openings += 1;
                    self.solved_bbbv += 1;
                }
            } else {
                self.solved_bbbv += 1;
                if *left == 0 {
                    self.solved_islands += 1;
                }
            }
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.regions.remaining.clone();
        self.solved_openings = 0;
        self.solved_islands = 0;
        self.solved_bbbv = 0;
    }

    pub fn remaining(&self, id: RegionId) -> Option<usize> {
        self.remaining.get(&id).copied()
    }

    pub fn solved_openings(&self) -> u32 {
        self.solved_openings
    }

    pub fn solved_islands(&self) -> u32 {
        self.solved_islands
    }

    pub fn solved_bbbv(&self) -> u32 {
        self.solved_bbbv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;

    fn regions(rows: &str) -> Regions {
        segment(&rows.parse().unwrap())
    }

    #[test]
    fn test_mine_free_board_is_one_opening() {
        let r = regions("....\n....\n....");
        assert_eq!((r.openings, r.islands, r.bbbv), (1, 0, 1));
        assert_eq!(r.remaining[&RegionId(1)], 12);
    }

    #[test]
    fn test_opening_absorbs_numbered_border() {
        let r = regions("...\n...\n..*");
        assert_eq!((r.openings, r.islands, r.bbbv), (1, 0, 1));
        assert_eq!(r.remaining[&RegionId(1)], 8);
        assert!(r.membership[8].is_empty());
        assert!(r.membership[..8].iter().all(|ids| ids == &[RegionId(1)]));
    }

    #[test]
    fn test_board_without_zeros_is_all_islands() {
        let r = regions("*.*\n.*.\n*.*");
        assert_eq!(r.openings, 0);
        assert_eq!(r.islands, 1);
        assert_eq!(r.bbbv, 4);
    }

    #[test]
    fn test_ring_around_single_mine() {
        let r = regions("...\n.*.\n...");
        assert_eq!((r.openings, r.islands, r.bbbv), (0, 1, 8));
        assert_eq!(r.remaining[&RegionId(-1)], 8);
    }

    #[test]
    fn test_single_isolated_number_is_island_of_one() {
        let r = regions("*.*");
        assert_eq!((r.openings, r.islands, r.bbbv), (0, 1, 1));
        assert_eq!(r.remaining[&RegionId(-1)], 1);
        assert_eq!(r.membership[1], vec![RegionId(-1)]);
    }

    #[test]
    fn test_diagonal_numbers_merge_into_one_island() {
        let r = regions(".**\n*.*\n**.");
        assert_eq!((r.openings, r.islands, r.bbbv), (0, 1, 3));

        let clusters = regions("..**\n**..\n****");
        assert_eq!(clusters.islands, 1);
        assert_eq!(clusters.bbbv, 4);
        assert_eq!(clusters.remaining[&RegionId(-1)], 4);
    }

    #[test]
    fn test_separated_numbers_stay_apart() {
        let r = regions(".*.\n***");
        assert_eq!((r.openings, r.islands, r.bbbv), (0, 2, 2));
        assert_eq!(r.membership[0], vec![RegionId(-1)]);
        assert_eq!(r.membership[2], vec![RegionId(-2)]);
    }

    #[test]
    fn test_openings_and_islands_mixed() {
        let r = regions("*.*...");
        assert_eq!((r.openings, r.islands, r.bbbv), (1, 1, 2));

        let two = regions("..*..");
        assert_eq!((two.openings, two.islands, two.bbbv), (2, 0, 2));
        assert_eq!(two.remaining[&RegionId(1)], 2);
        assert_eq!(two.remaining[&RegionId(2)], 2);
    }

    #[test]
    fn test_every_safe_tile_has_exactly_one_region() {
        let layout: MineLayout = "..*..*\n......\n*.....\n....**".parse().unwrap();
        let r = segment(&layout);
        for (index, ids) in r.membership.iter().enumerate() {
            let expected = if layout.is_mine(index) { 0 } else { 1 };
            assert_eq!(ids.len(), expected, "tile {:?}", layout.dimensions().position_of(index));
        }
        let total: usize = r.remaining.values().sum();
        assert_eq!(total, layout.safe_count());
    }

    #[test]
    fn test_tracker_credits_opening_when_complete() {
        let mut tracker = RegionTracker::new(regions("..*.."));
        tracker.uncover(0);
        assert_eq!(tracker.solved_bbbv(), 0);
        assert_eq!(tracker.remaining(RegionId(1)), Some(1));

        tracker.uncover(1);
        assert_eq!(tracker.solved_bbbv(), 1);
        assert_eq!(tracker.solved_openings(), 1);
    }

    #[test]
    fn test_tracker_credits_each_island_tile() {
        let mut tracker = RegionTracker::new(regions("..**\n**..\n****"));
        assert_eq!(tracker.regions().membership.len(), 12);

        tracker.uncover(0);
        tracker.uncover(1);
        assert_eq!(tracker.solved_bbbv(), 2);
        assert_eq!(tracker.solved_islands(), 0);

        tracker.uncover(6);
        tracker.uncover(7);
        assert_eq!(tracker.solved_bbbv(), 4);
        assert_eq!(tracker.solved_islands(), 1);

        // Repeated notifications never over-credit.
        tracker.uncover(7);
        assert_eq!(tracker.solved_bbbv(), 4);

        tracker.reset();
        assert_eq!(tracker.solved_bbbv(), 0);
        assert_eq!(tracker.remaining(RegionId(-1)), Some(4));
    }

    #[test]
    fn test_layout_positions_match_membership() {
        let layout: MineLayout = "*.*...".parse().unwrap();
        let r = segment(&layout);
        let island_tile = layout.dimensions().index_of(Position::new(1, 0)).unwrap();
        assert_eq!(r.membership[island_tile], vec![RegionId(-1)]);
    }
}
