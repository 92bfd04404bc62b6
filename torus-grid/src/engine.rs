use std::collections::{HashMap, HashSet};

use crate::grid::ToroidalGrid;

/// Applies the birth/survival rule one generation at a time.
///
/// A step reads only the active set and its neighborhood, keeping the work
/// proportional to the live population rather than the grid area. Every
/// survival/birth decision is made from generation-n values: all neighbor
/// counts are cached before any cell is mutated, and the two mutation
/// passes touch disjoint cells (survival only live ones, birth only dead
/// ones). Scratch storage is reused across steps.
#[derive(Debug, Default)]
pub struct RuleEngine {
    counts: HashMap<u32, u32>,
    born_candidates: HashSet<u32>,
    active_scratch: Vec<u32>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the grid by one generation.
    pub fn step(&mut self, grid: &mut ToroidalGrid) {
        self.counts.clear();
        self.born_candidates.clear();
        self.active_scratch.clear();

        // Lazy pruning at the generation boundary: the set shrinks back to
        // the live population before it drives this generation's work.
        grid.prune_active();
        self.active_scratch.extend(grid.active().iter());

        // Counting pass. Each active cell gets a memoized alive-neighbor
        // count, and every dead neighbor seen along the way is a birth
        // candidate; no other dead cell can reach three live neighbors.
        for &index in &self.active_scratch {
            cached_alive_count(&mut self.counts, grid, index);
            for &neighbor in grid.neighbors_of(index) {
                if grid.value(neighbor) == 0 {
                    self.born_candidates.insert(neighbor);
                }
            }
        }
        for &index in &self.born_candidates {
            cached_alive_count(&mut self.counts, grid, index);
        }

        let dead_key = grid.states().dead_key();
        let alive_key = grid.states().alive_key();

        // Survival: a live cell keeps its state (canonical or not) on a
        // count of 2 or 3 and dies otherwise.
        let mut deaths = 0usize;
        for (&index, &count) in &self.counts {
            if grid.value(index) == 1 && !(2..=3).contains(&count) {
                grid.set_state(index, dead_key);
                deaths += 1;
            }
        }

        // Birth: exactly three live neighbors, always to the canonical
        // alive key.
        let mut births = 0usize;
        for &index in &self.born_candidates {
            if self.counts[&index] == 3 {
                grid.set_state(index, alive_key);
                grid.active_mut().insert(index);
                births += 1;
            }
        }

        log::debug!(
            "step: {} active, {births} births, {deaths} deaths",
            self.active_scratch.len()
        );
    }
}

/// Generation-n alive-neighbor count for `index`, memoized so a cell shared
/// by several active neighborhoods is counted once per generation.
fn cached_alive_count(counts: &mut HashMap<u32, u32>, grid: &ToroidalGrid, index: u32) -> u32 {
    if let Some(&count) = counts.get(&index) {
        return count;
    }
    let count = grid
        .neighbors_of(index)
        .iter()
        .map(|&neighbor| grid.value(neighbor) as u32)
        .sum();
    counts.insert(index, count);
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{StateKey, StateRow, StateTable};

    fn life_grid(live: &[(u32, u32)]) -> ToroidalGrid {
        grid_with_table(StateTable::conway(), live)
    }

    fn grid_with_table(table: StateTable, live: &[(u32, u32)]) -> ToroidalGrid {
        let mut grid = ToroidalGrid::new(10, 10, 1, table).unwrap();
        let alive = grid.states().alive_key();
        for &(row, col) in live {
            let index = grid.position_to_index(row, col);
            grid.set_state(index, alive);
            grid.active_mut().insert(index);
        }
        grid
    }

    fn live_positions(grid: &ToroidalGrid) -> Vec<(u32, u32)> {
        let mut result: Vec<_> = (0..grid.num_cells() as u32)
            .filter(|&index| grid.value(index) == 1)
            .map(|index| grid.index_to_position(index))
            .collect();
        result.sort_unstable();
        result
    }

    #[test]
    fn block_is_a_still_life() {
        let block = [(4, 4), (4, 5), (5, 4), (5, 5)];
        let mut grid = life_grid(&block);
        let mut engine = RuleEngine::new();
        engine.step(&mut grid);
        assert_eq!(live_positions(&grid), block);
        engine.step(&mut grid);
        assert_eq!(live_positions(&grid), block);
    }

    #[test]
    fn blinker_oscillates_with_period_two() {
        let horizontal = [(5, 4), (5, 5), (5, 6)];
        let vertical = [(4, 5), (5, 5), (6, 5)];
        let mut grid = life_grid(&horizontal);
        let mut engine = RuleEngine::new();

        engine.step(&mut grid);
        assert_eq!(live_positions(&grid), vertical);

        engine.step(&mut grid);
        assert_eq!(live_positions(&grid), horizontal);
    }

    #[test]
    fn live_cell_survival_boundaries() {
        // Center at (5, 5) with n live neighbors placed in its row/corners.
        let neighbor_slots = [(4, 4), (4, 6), (6, 4), (6, 6)];
        for (count, expect_alive) in [(1, false), (2, true), (3, true), (4, false)] {
            let mut live = vec![(5, 5)];
            live.extend_from_slice(&neighbor_slots[..count]);
            let mut grid = life_grid(&live);
            let center = grid.position_to_index(5, 5);
            RuleEngine::new().step(&mut grid);
            assert_eq!(
                grid.value(center) == 1,
                expect_alive,
                "center with {count} neighbors"
            );
        }
    }

    #[test]
    fn dead_cell_births_only_on_three() {
        let neighbor_slots = [(4, 4), (4, 6), (6, 4), (6, 6)];
        for count in 1..=4 {
            let mut grid = life_grid(&neighbor_slots[..count]);
            let center = grid.position_to_index(5, 5);
            RuleEngine::new().step(&mut grid);
            assert_eq!(grid.value(center) == 1, count == 3, "{count} neighbors");
        }
    }

    #[test]
    fn active_set_covers_all_live_cells_after_step() {
        let mut grid = life_grid(&[(5, 4), (5, 5), (5, 6), (0, 0), (9, 9)]);
        let mut engine = RuleEngine::new();
        engine.step(&mut grid);
        for index in 0..grid.num_cells() as u32 {
            if grid.value(index) == 1 {
                assert!(grid.active().contains(index), "live cell {index} not active");
            }
        }
    }

    #[test]
    fn active_set_converges_after_pruning() {
        let mut grid = life_grid(&[(5, 4), (5, 5), (5, 6)]);
        let mut engine = RuleEngine::new();
        engine.step(&mut grid);
        // Dead-but-active entries disappear at the next boundary.
        engine.step(&mut grid);
        grid.prune_active();
        assert_eq!(grid.active().len(), 3);
    }

    #[test]
    fn zombie_counts_as_live_neighbor_but_is_never_born() {
        let zombie = StateKey(2);
        let table = StateTable::new(vec![
            StateRow {
                key: StateKey(0),
                value: 0,
                tag: [0; 4],
            },
            StateRow {
                key: StateKey(1),
                value: 1,
                tag: [0xff; 4],
            },
            StateRow {
                key: zombie,
                value: 1,
                tag: [0xff, 0, 0, 0xff],
            },
        ])
        .unwrap();

        // Two canonical live cells plus one zombie: three live values around
        // the dead center, so the center is born, and born canonical.
        let mut grid = grid_with_table(table, &[(4, 4), (4, 6)]);
        let zombie_index = grid.position_to_index(6, 5);
        grid.set_state(zombie_index, zombie);
        grid.active_mut().insert(zombie_index);

        let center = grid.position_to_index(5, 5);
        RuleEngine::new().step(&mut grid);

        let alive = grid.states().alive_key();
        assert_eq!(grid.state(center), alive);

        // The zombie itself had no live neighbors... except the newborn
        // doesn't count: decisions used generation-n values, so it died.
        assert_eq!(grid.value(zombie_index), 0);
        assert_eq!(grid.state(zombie_index), grid.states().dead_key());
    }

    #[test]
    fn decisions_use_pre_transition_snapshot() {
        // An L-tromino: (5,4) and (5,5) survive/die purely on gen-n counts.
        // (4,4),(4,5),(5,4),(5,5) minus one -> tromino becomes a block.
        let mut grid = life_grid(&[(4, 4), (4, 5), (5, 4)]);
        RuleEngine::new().step(&mut grid);
        assert_eq!(live_positions(&grid), [(4, 4), (4, 5), (5, 4), (5, 5)]);
    }

    #[test]
    fn empty_grid_stays_empty() {
        let mut grid = life_grid(&[]);
        let mut engine = RuleEngine::new();
        engine.step(&mut grid);
        assert!(grid.active().is_empty());
        assert_eq!(live_positions(&grid), []);
    }
}
