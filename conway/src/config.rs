// config.rs - Construction-time settings for a simulation

use crate::error::{GridError, SimulationError};

/// Board size used by the reference UI.
pub const DEFAULT_ROWS: usize = 25;
pub const DEFAULT_COLS: usize = 25;

/// Delay between generations when nothing else is chosen.
pub const DEFAULT_SPEED_MS: u64 = 500;

/// Delays offered by the speed menu, slowest first. The engine itself accepts
/// any positive delay.
pub const SPEED_PRESETS_MS: [u64; 8] = [2000, 1500, 1000, 750, 600, 350, 100, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub rows: usize,
    pub cols: usize,
    /// Inter-tick delay in milliseconds.
    pub speed_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            speed_ms: DEFAULT_SPEED_MS,
        }
    }
}

impl SimConfig {
    pub fn with_size(mut self, rows: usize, cols: usize) -> Self {
        self.rows = rows;
        self.cols = cols;
        self
    }

    pub fn with_speed(mut self, speed_ms: u64) -> Self {
        self.speed_ms = speed_ms;
        self
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GridError::EmptyDimensions {
                rows: self.rows,
                cols: self.cols,
            }
            .into());
        }
        if self.speed_ms == 0 {
            return Err(SimulationError::InvalidSpeed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = SimConfig::default();
        assert_eq!((config.rows, config.cols, config.speed_ms), (25, 25, 500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_sizes_and_speed() {
        assert_eq!(
            SimConfig::default().with_size(0, 5).validate(),
            Err(SimulationError::Grid(GridError::EmptyDimensions { rows: 0, cols: 5 }))
        );
        assert_eq!(
            SimConfig::default().with_speed(0).validate(),
            Err(SimulationError::InvalidSpeed)
        );
    }

    #[test]
    fn presets_are_positive_and_slowest_first() {
        assert!(SPEED_PRESETS_MS.iter().all(|&ms| ms > 0));
        assert!(SPEED_PRESETS_MS.windows(2).all(|w| w[0] > w[1]));
    }
}
