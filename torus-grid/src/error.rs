use thiserror::Error;

use crate::grid::MAX_RANGE;

/// Recoverable construction-time failures.
///
/// Out-of-range index lookups against a built grid are not represented here:
/// they indicate engine misuse and panic, while pointer-derived coordinates
/// outside the grid surface as `None` from the lookup that rejected them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimension { rows: u32, cols: u32 },

    #[error("neighborhood range must be in 1..={MAX_RANGE}, got {range}")]
    InvalidRange { range: u32 },

    #[error("cell size must be positive")]
    InvalidCellSize,

    #[error("invalid state table: {0}")]
    InvalidStateTable(&'static str),
}
