use crate::Random;
use crate::engine::RuleEngine;
use crate::error::GridError;
use crate::grid::ToroidalGrid;
use crate::state::StateTable;
use crate::viewport::{ViewState, Viewport};

/// Construction knobs for a [`LifeSession`].
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Side length of one cell in logical pixels at zoom 1.
    pub cell_size: u32,
    /// Moore-neighborhood radius.
    pub range: u32,
    pub states: StateTable,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cell_size: 3,
            range: 1,
            states: StateTable::conway(),
        }
    }
}

/// Everything the paint callback needs for one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaintableCell {
    pub row: u32,
    pub col: u32,
    pub screen_x: i64,
    pub screen_y: i64,
    pub screen_size: i64,
    pub tag: [u8; 4],
}

/// The simulation session: grid, rule engine, and viewport under one
/// explicit owner, exposing the whole surface a rendering/input front end
/// needs. One instance per simulation; nothing here is global.
#[derive(Debug)]
pub struct LifeSession {
    grid: ToroidalGrid,
    engine: RuleEngine,
    viewport: Viewport,
    cell_size: u32,
}

impl LifeSession {
    pub fn new(rows: u32, cols: u32, config: SessionConfig) -> Result<Self, GridError> {
        if config.cell_size == 0 {
            return Err(GridError::InvalidCellSize);
        }
        let grid = ToroidalGrid::new(rows, cols, config.range, config.states)?;
        let viewport = Viewport::new(cols * config.cell_size, rows * config.cell_size);
        Ok(Self {
            grid,
            engine: RuleEngine::new(),
            viewport,
            cell_size: config.cell_size,
        })
    }

    pub fn grid(&self) -> &ToroidalGrid {
        &self.grid
    }

    /// Sets each cell alive with probability `fill_probability`, dead
    /// otherwise, and rebuilds the active set to match.
    pub fn seed_random(&mut self, rand: &mut Random, fill_probability: f64) {
        let alive = self.grid.states().alive_key();
        let dead = self.grid.states().dead_key();
        self.grid.active_mut().clear();
        for index in 0..self.grid.num_cells() as u32 {
            if rand.next_bool(fill_probability) {
                self.grid.set_state(index, alive);
                self.grid.active_mut().insert(index);
            } else {
                self.grid.set_state(index, dead);
            }
        }
        log::debug!("seeded {} live cells", self.grid.active().len());
    }

    /// Kills every cell and empties the active set.
    pub fn clear(&mut self) {
        let dead = self.grid.states().dead_key();
        for index in 0..self.grid.num_cells() as u32 {
            self.grid.set_state(index, dead);
        }
        self.grid.active_mut().clear();
    }

    /// Advances one generation.
    pub fn step(&mut self) {
        self.engine.step(&mut self.grid);
    }

    /// Resolves a pointer position to a cell and flips it between the
    /// canonical dead and alive states, keeping the active set in sync.
    /// Returns `None` for positions outside the grid.
    pub fn toggle_at(&mut self, screen_x: i64, screen_y: i64) -> Option<u32> {
        let (x, y) = self.viewport.unproject(screen_x, screen_y);
        let size = self.cell_size as i64;
        let (row, col) = (y.div_euclid(size), x.div_euclid(size));
        if !self.grid.in_bounds(row, col) {
            return None;
        }
        let index = self.grid.position_to_index(row as u32, col as u32);

        if self.grid.value(index) == 1 {
            let dead = self.grid.states().dead_key();
            self.grid.set_state(index, dead);
            self.grid.active_mut().remove(index);
        } else {
            let alive = self.grid.states().alive_key();
            self.grid.set_state(index, alive);
            self.grid.active_mut().insert(index);
        }
        Some(index)
    }

    pub fn view(&self) -> ViewState {
        self.viewport.view()
    }

    pub fn set_view(&mut self, zoom: u32, dx: i64, dy: i64) -> ViewState {
        self.viewport.set_view(zoom, dx, dy)
    }

    pub fn zoom_in(&mut self) -> ViewState {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> ViewState {
        self.viewport.zoom_out()
    }

    pub fn pan_by(&mut self, ddx: i64, ddy: i64) -> ViewState {
        self.viewport.pan_by(ddx, ddy)
    }

    pub fn pan_step(&self) -> i64 {
        self.viewport.pan_step()
    }

    /// Optimized paint path: only cells in the active set, in no
    /// particular order.
    pub fn for_each_active<F>(&self, mut f: F)
    where
        F: FnMut(PaintableCell),
    {
        for index in self.grid.active().iter() {
            f(self.paintable(index));
        }
    }

    /// Full-redraw paint path: every cell, in no particular order.
    pub fn for_each_cell<F>(&self, mut f: F)
    where
        F: FnMut(PaintableCell),
    {
        for index in 0..self.grid.num_cells() as u32 {
            f(self.paintable(index));
        }
    }

    fn paintable(&self, index: u32) -> PaintableCell {
        let (row, col) = self.grid.index_to_position(index);
        let size = self.cell_size as i64;
        let (screen_x, screen_y, screen_size) =
            self.viewport
                .project(col as i64 * size, row as i64 * size, size);
        PaintableCell {
            row,
            col,
            screen_x,
            screen_y,
            screen_size,
            tag: self.grid.states().tag_of(self.grid.state(index)),
        }
    }
}
