// error.rs - Error types for the grid and the simulation controller

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    /// A cell coordinate outside `[0, rows) x [0, cols)`.
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    EmptyDimensions { rows: usize, cols: usize },

    #[error("line {line} has {found} cells, expected {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("unexpected character {0:?}, use 'o' for alive and '.' for dead")]
    UnexpectedChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("speed must be a positive number of milliseconds")]
    InvalidSpeed,

    /// `Simulation::new` was called outside of a tokio runtime.
    #[error("no tokio runtime available to schedule ticks")]
    NoRuntime,

    #[error(transparent)]
    Grid(#[from] GridError),
}
