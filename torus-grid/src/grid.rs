use arrayvec::ArrayVec;
use std::collections::HashSet;

use crate::error::GridError;
use crate::state::{StateKey, StateTable};

/// Largest supported Moore-neighborhood radius.
pub const MAX_RANGE: u32 = 2;

const MAX_NEIGHBORS: usize = (2 * MAX_RANGE as usize + 1).pow(2) - 1;

/// One grid position: its current state key, the cached table value of that
/// key, and its neighbor indexes, computed once at grid construction.
#[derive(Clone, Debug)]
struct Cell {
    state: StateKey,
    value: u8,
    neighbors: ArrayVec<u32, MAX_NEIGHBORS>,
}

/// Flat rows×cols array of cells with wraparound neighbor topology.
///
/// Indexes are `col + row * cols`, a bijection onto `0..rows*cols`. The
/// topology is fixed for the grid's lifetime; only states change. The grid
/// also owns the [`ActiveSet`] the rule engine works from.
#[derive(Clone, Debug)]
pub struct ToroidalGrid {
    rows: u32,
    cols: u32,
    states: StateTable,
    cells: Vec<Cell>,
    active: ActiveSet,
}

impl ToroidalGrid {
    pub fn new(rows: u32, cols: u32, range: u32, states: StateTable) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::InvalidDimension { rows, cols });
        }
        if range == 0 || range > MAX_RANGE {
            return Err(GridError::InvalidRange { range });
        }
        let dead = states.dead_key();
        let num_cells = rows as usize * cols as usize;
        let cells = (0..num_cells as u32)
            .map(|index| Cell {
                state: dead,
                value: 0,
                neighbors: Self::neighbor_indexes(index, rows, cols, range),
            })
            .collect();
        Ok(Self {
            rows,
            cols,
            states,
            cells,
            active: ActiveSet::default(),
        })
    }

    /// Moore neighborhood of `index` with toroidal wraparound, excluding
    /// `index` itself. On grids narrower than the neighborhood the wrapped
    /// list contains repeats, same as the topology it approximates.
    fn neighbor_indexes(index: u32, rows: u32, cols: u32, range: u32) -> ArrayVec<u32, MAX_NEIGHBORS> {
        let row = (index / cols) as i64;
        let col = (index % cols) as i64;
        let range = range as i64;

        let mut neighbors = ArrayVec::new();
        for row_offset in -range..=range {
            let neighbor_row = wrap(row + row_offset, rows);
            for col_offset in -range..=range {
                let neighbor_col = wrap(col + col_offset, cols);
                let neighbor = neighbor_col + neighbor_row * cols;
                if neighbor != index {
                    neighbors.push(neighbor);
                }
            }
        }
        neighbors
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn states(&self) -> &StateTable {
        &self.states
    }

    pub fn position_to_index(&self, row: u32, col: u32) -> u32 {
        col + row * self.cols
    }

    pub fn index_to_position(&self, index: u32) -> (u32, u32) {
        (index / self.cols, index % self.cols)
    }

    /// Strict bounds test for externally supplied coordinates. Off-grid
    /// positions are invalid input here, never wrapped; wrapping applies
    /// only to the internal neighbor topology.
    pub fn in_bounds(&self, row: i64, col: i64) -> bool {
        (0..self.rows as i64).contains(&row) && (0..self.cols as i64).contains(&col)
    }

    /// Sets a cell's state, refreshing its cached value. No-op when the key
    /// is unchanged.
    pub fn set_state(&mut self, index: u32, key: StateKey) {
        let value = self.states.value_of(key);
        let cell = self.cell_mut(index);
        if cell.state == key {
            return;
        }
        cell.state = key;
        cell.value = value;
    }

    pub fn state(&self, index: u32) -> StateKey {
        self.cell(index).state
    }

    pub fn value(&self, index: u32) -> u8 {
        self.cell(index).value
    }

    pub fn neighbors_of(&self, index: u32) -> &[u32] {
        &self.cell(index).neighbors
    }

    pub fn active(&self) -> &ActiveSet {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut ActiveSet {
        &mut self.active
    }

    /// Drops every index whose current value is 0 from the active set,
    /// restoring the set to exactly the live population.
    pub fn prune_active(&mut self) {
        let cells = &self.cells;
        self.active.indexes.retain(|&index| cells[index as usize].value == 1);
    }

    fn cell(&self, index: u32) -> &Cell {
        self.cells
            .get(index as usize)
            .unwrap_or_else(|| panic!("cell index {index} out of range"))
    }

    fn cell_mut(&mut self, index: u32) -> &mut Cell {
        self.cells
            .get_mut(index as usize)
            .unwrap_or_else(|| panic!("cell index {index} out of range"))
    }
}

fn wrap(v: i64, n: u32) -> u32 {
    v.rem_euclid(n as i64) as u32
}

/// Sparse set of indexes of cells considered possibly alive.
///
/// Conservative by design: it may briefly hold cells that just died, but
/// after a prune it never misses a live cell. Membership bounds the rule
/// engine's per-generation work.
#[derive(Clone, Debug, Default)]
pub struct ActiveSet {
    indexes: HashSet<u32>,
}

impl ActiveSet {
    pub fn insert(&mut self, index: u32) -> bool {
        self.indexes.insert(index)
    }

    pub fn remove(&mut self, index: u32) -> bool {
        self.indexes.remove(&index)
    }

    pub fn contains(&self, index: u32) -> bool {
        self.indexes.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    pub fn clear(&mut self) {
        self.indexes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.indexes.iter().copied()
    }
}
