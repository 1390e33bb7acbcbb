//! Conway's Game of Life on a fixed grid with bounded edges.
//!
//! [`Grid`] is an immutable value holding one generation and the transition
//! rule. [`Simulation`] owns the current grid and steps it on a tokio timer
//! while running, accepting edits from a UI at any time.
//!
//! ```no_run
//! # async fn demo() -> Result<(), conway::SimulationError> {
//! use conway::{SimConfig, Simulation};
//!
//! let sim = Simulation::new(SimConfig::default())?;
//! sim.toggle_cell(12, 11)?;
//! sim.toggle_cell(12, 12)?;
//! sim.toggle_cell(12, 13)?;
//! sim.start();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod grid;
pub mod patterns;

pub use config::{SimConfig, SPEED_PRESETS_MS};
pub use controller::{RunState, Simulation, Snapshot};
pub use error::{GridError, SimulationError};
pub use grid::Grid;
pub use patterns::{Pattern, PATTERNS};
