#![deny(clippy::all)]
#![forbid(unsafe_code)]

//! Sparse simulation engine for Conway's Game of Life (and value-compatible
//! variants) on a toroidal grid, plus the zoom/pan viewport transform that
//! maps grid cells to screen rectangles for a rendering front end.
//!
//! The front end owns the window, timing, and input; it drives the engine
//! through [`LifeSession`] and never touches cells directly.

use rand::SeedableRng;
use rand::prelude::*;
use rand::rngs::SmallRng;

mod engine;
mod error;
mod grid;
mod session;
mod state;
mod viewport;

pub use engine::RuleEngine;
pub use error::GridError;
pub use grid::{ActiveSet, MAX_RANGE, ToroidalGrid};
pub use session::{LifeSession, PaintableCell, SessionConfig};
pub use state::{StateKey, StateRow, StateTable};
pub use viewport::{ViewState, Viewport, ZOOM_MAX};

#[derive(Debug)]
pub struct Random {
    rng: SmallRng,
}

impl Random {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }

    /// Deterministic stream for reproducible fills.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn next_bool(&mut self, p: f64) -> bool {
        self.rng.random_bool(p)
    }
}

impl Default for Random {
    fn default() -> Self {
        Self::new()
    }
}
